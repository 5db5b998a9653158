//! passgate: a local, file-backed credential store with a configurable
//! password-policy engine and login-attempt governance.
//!
//! The crate is the core behind a thin presentation layer: an embedding
//! application renders prompts and dialogs, while every decision (login
//! outcomes, lockout, password rules, administrative mutations) lives
//! here. State flows through an explicit [`SessionState`] value; durable
//! state is a single JSON file rewritten whole on every mutation.
//!
//! Two conditions are fatal by contract and must end the hosting session or
//! process: session lockout after repeated failed logins
//! ([`LoginOutcome::LockedOut`]) and a declined administrator bootstrap
//! ([`AuthError::StartupAborted`]). The library never exits the process
//! itself.

pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;

pub use admin::{AdminError, AdminService, UserSummary};
pub use auth::{
    digest_password, register, verify_password, AuthEngine, AuthError, Authentication, Bootstrap,
    LoginOutcome, PasswordPolicy, PolicyViolation, RegistrationError, Role, SessionState,
    MAX_LOGIN_ATTEMPTS,
};
pub use config::{AuthConfig, Config, LoggingConfig, StoreConfig};
pub use error::{PassgateError, Result};
pub use store::{Account, Accounts, CredentialStore, StoreError};
