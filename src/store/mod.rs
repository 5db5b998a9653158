//! Durable credential storage.
//!
//! This module owns the persisted account model and its schema migration:
//! [`Account`] records, the legacy rules-field upgrade, and the
//! [`CredentialStore`] that loads and saves the whole mapping.

mod account;
mod file;

pub use account::Account;
pub use file::{Accounts, CredentialStore, StoreError};
