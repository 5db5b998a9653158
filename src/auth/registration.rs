//! Self-registration of new accounts.
//!
//! Registration is reachable from the login surface without prior
//! authentication, matching deployments that expose a register button next
//! to the login form. New accounts start with no password rules and never
//! with the admin flag; administrators grant that separately via
//! [`promote`](crate::admin::AdminService::promote).

use thiserror::Error;
use tracing::info;

use crate::auth::password::digest_password;
use crate::auth::policy::{PasswordPolicy, PolicyViolation};
use crate::store::{Account, CredentialStore, StoreError};

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Username is blank or whitespace-only.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// Username already exists.
    #[error("username already exists")]
    UsernameExists,

    /// The password failed validation.
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    /// The store could not be written.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Register a new standard account with an immediately-set password.
///
/// The password is validated against the unconstrained policy new accounts
/// carry (non-blank and confirmed), hashed and stored in one step.
pub fn register(
    store: &CredentialStore,
    username: &str,
    password: &str,
    confirmation: &str,
) -> Result<(), RegistrationError> {
    if username.trim().is_empty() {
        return Err(RegistrationError::EmptyUsername);
    }
    let mut accounts = store.load();
    if accounts.contains(username) {
        return Err(RegistrationError::UsernameExists);
    }

    let policy = PasswordPolicy::none();
    policy.validate(password, confirmation)?;

    let mut account = Account::new(policy);
    account.password = digest_password(password);
    accounts.insert(username, account);
    store.save(&accounts)?;
    info!(username = %username, "account registered");
    Ok(())
}
