//! Administrative account mutations.
//!
//! Every operation re-checks the caller's session and follows the same
//! shape: load the store, mutate in memory, write it back whole. The
//! well-known administrator identity is exempt from blocking.

use thiserror::Error;
use tracing::info;

use crate::auth::policy::{PasswordPolicy, PolicyViolation};
use crate::auth::{digest_password, verify_password, Role, SessionState};
use crate::store::{Account, CredentialStore, StoreError};

/// Errors from administrative operations.
#[derive(Error, Debug)]
pub enum AdminError {
    /// Caller is not an authenticated administrator (or, for
    /// [`AdminService::change_own_password`], not authenticated at all).
    #[error("not authorized")]
    NotAuthorized,

    /// No account with that username.
    #[error("user not found")]
    UserNotFound,

    /// An account with that username already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Username is blank or whitespace-only.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The well-known administrator is exempt from blocking.
    #[error("the administrator account cannot be blocked")]
    CannotBlockAdmin,

    /// The current password did not verify.
    #[error("invalid password")]
    InvalidPassword,

    /// The new password failed the account's rules.
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    /// The store could not be written.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// A row of the administrator's user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    /// The account's username.
    pub username: String,
    /// Whether the account is blocked.
    pub blocked: bool,
    /// Whether any password rule is active for the account.
    pub has_rules: bool,
}

/// Privileged mutations over the credential store.
///
/// Operations take the caller's [`SessionState`] and fail with
/// [`AdminError::NotAuthorized`] unless it is authenticated as an
/// administrator; [`change_own_password`](Self::change_own_password) only
/// requires an authenticated session of either role.
#[derive(Debug, Clone)]
pub struct AdminService {
    store: CredentialStore,
}

impl AdminService {
    /// Create a service over the given store.
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }

    /// Block an account. The well-known administrator cannot be blocked.
    pub fn block(&self, session: &SessionState, username: &str) -> Result<(), AdminError> {
        self.set_blocked(session, username, true)
    }

    /// Unblock an account.
    pub fn unblock(&self, session: &SessionState, username: &str) -> Result<(), AdminError> {
        self.set_blocked(session, username, false)
    }

    /// Grant the admin role to an existing account.
    pub fn promote(&self, session: &SessionState, username: &str) -> Result<(), AdminError> {
        require_admin(session)?;
        let mut accounts = self.store.load();
        let account = accounts.get_mut(username).ok_or(AdminError::UserNotFound)?;
        account.admin = true;
        self.store.save(&accounts)?;
        info!(username = %username, "account promoted to administrator");
        Ok(())
    }

    /// Create an account with no password and the given rules (none if
    /// unspecified). The user establishes a password at first login.
    pub fn add_user(
        &self,
        session: &SessionState,
        username: &str,
        policy: Option<PasswordPolicy>,
    ) -> Result<(), AdminError> {
        require_admin(session)?;
        if username.trim().is_empty() {
            return Err(AdminError::EmptyUsername);
        }
        let mut accounts = self.store.load();
        if accounts.contains(username) {
            return Err(AdminError::UserAlreadyExists);
        }
        accounts.insert(username, Account::new(policy.unwrap_or_default()));
        self.store.save(&accounts)?;
        info!(username = %username, "account added with no password");
        Ok(())
    }

    /// Replace an account's password rules wholesale.
    pub fn set_policy(
        &self,
        session: &SessionState,
        username: &str,
        policy: PasswordPolicy,
    ) -> Result<(), AdminError> {
        require_admin(session)?;
        let mut accounts = self.store.load();
        let account = accounts.get_mut(username).ok_or(AdminError::UserNotFound)?;
        account.password_rules = policy;
        self.store.save(&accounts)?;
        info!(username = %username, "password rules updated");
        Ok(())
    }

    /// Change the calling user's own password.
    ///
    /// Re-verifies the current password, validates the new one against the
    /// account's rules, then overwrites the digest. Available to standard
    /// users and administrators alike.
    pub fn change_own_password(
        &self,
        session: &SessionState,
        old_password: &str,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), AdminError> {
        let username = session.current_user().ok_or(AdminError::NotAuthorized)?;
        let mut accounts = self.store.load();
        let account = accounts.get_mut(username).ok_or(AdminError::UserNotFound)?;
        if !verify_password(old_password, &account.password) {
            return Err(AdminError::InvalidPassword);
        }
        account.password_rules.validate(new_password, confirmation)?;
        account.password = digest_password(new_password);
        self.store.save(&accounts)?;
        info!(username = %username, "password changed");
        Ok(())
    }

    /// List every account except the well-known administrator identity,
    /// in stable username order.
    pub fn list_users(&self, session: &SessionState) -> Result<Vec<UserSummary>, AdminError> {
        require_admin(session)?;
        let accounts = self.store.load();
        Ok(accounts
            .iter()
            .filter(|(username, _)| *username != self.store.admin_username())
            .map(|(username, account)| UserSummary {
                username: username.to_string(),
                blocked: account.blocked,
                has_rules: account.password_rules.has_constraints(),
            })
            .collect())
    }

    fn set_blocked(
        &self,
        session: &SessionState,
        username: &str,
        blocked: bool,
    ) -> Result<(), AdminError> {
        require_admin(session)?;
        if blocked && username == self.store.admin_username() {
            return Err(AdminError::CannotBlockAdmin);
        }
        let mut accounts = self.store.load();
        let account = accounts.get_mut(username).ok_or(AdminError::UserNotFound)?;
        account.blocked = blocked;
        self.store.save(&accounts)?;
        info!(username = %username, blocked, "account block flag updated");
        Ok(())
    }
}

/// Gate an operation on the caller being an authenticated administrator.
fn require_admin(session: &SessionState) -> Result<(), AdminError> {
    if session.role() == Some(Role::Admin) {
        Ok(())
    } else {
        Err(AdminError::NotAuthorized)
    }
}
