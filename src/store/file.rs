//! Credential file persistence.
//!
//! The store is a single JSON document mapping usernames to account
//! records. It is loaded fresh at the start of every operation and written
//! back whole at the end of every mutating one; there is no cross-operation
//! cache. The design is single-process and single-user: an embedder that
//! introduces concurrent callers must serialize the load-mutate-save
//! sequence per file with an exclusive lock, since overlapping whole-file
//! rewrites would corrupt the store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::account::Account;

/// Storage errors.
///
/// Only writes can fail; reads fall back to a fresh default store so a
/// corrupt file never locks operators out.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(String),
}

/// The full username -> account mapping.
///
/// Keys are ordered so the persisted JSON is stable across rewrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Accounts(BTreeMap<String, Account>);

impl Accounts {
    /// Look up an account by username (case-sensitive).
    pub fn get(&self, username: &str) -> Option<&Account> {
        self.0.get(username)
    }

    /// Mutable lookup by username.
    pub fn get_mut(&mut self, username: &str) -> Option<&mut Account> {
        self.0.get_mut(username)
    }

    /// Whether the username is present.
    pub fn contains(&self, username: &str) -> bool {
        self.0.contains_key(username)
    }

    /// Insert or replace an account.
    pub fn insert(&mut self, username: impl Into<String>, account: Account) {
        self.0.insert(username.into(), account);
    }

    /// Iterate over `(username, account)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Account)> {
        self.0.iter().map(|(name, account)| (name.as_str(), account))
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the store holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    admin_username: String,
}

impl CredentialStore {
    /// Create a store over the given file, with the given well-known
    /// administrator username.
    pub fn new(path: impl Into<PathBuf>, admin_username: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            admin_username: admin_username.into(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Username of the well-known administrator account.
    pub fn admin_username(&self) -> &str {
        &self.admin_username
    }

    /// Load the store.
    ///
    /// Never fails: a missing, unreadable or unparsable file yields a fresh
    /// store containing only the administrator with no password and strict
    /// rules. Accounts whose rules are stored in the legacy boolean form
    /// are migrated to the structured form during deserialization; the next
    /// [`save`](Self::save) persists them migrated.
    pub fn load(&self) -> Accounts {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "credential file absent, starting fresh");
                return self.default_accounts();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "credential file unreadable, starting fresh");
                return self.default_accounts();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "credential file corrupt, starting fresh");
                self.default_accounts()
            }
        }
    }

    /// Write the whole store back, replacing the backing file.
    ///
    /// The document goes to a temporary file first and is renamed into
    /// place, so the store is either fully replaced or left untouched.
    pub fn save(&self, accounts: &Accounts) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(accounts)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Fresh store as produced when the backing file is unusable.
    fn default_accounts(&self) -> Accounts {
        let mut accounts = Accounts::default();
        accounts.insert(self.admin_username.clone(), Account::bootstrap_admin());
        accounts
    }
}
