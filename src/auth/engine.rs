//! Login state machine and attempt governance.
//!
//! The engine orchestrates login attempts over a [`CredentialStore`]:
//! lockout counting, the first-use password flow for accounts without a
//! digest, and the one-time administrator bootstrap. All session state
//! lives in an explicit [`SessionState`] value threaded through the calls;
//! the engine itself holds no mutable state.

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::password::{digest_password, verify_password};
use crate::auth::policy::{PasswordPolicy, PolicyViolation};
use crate::store::{Account, CredentialStore, StoreError};

/// Consecutive failed attempts tolerated before the session is locked out.
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Regular account.
    Standard,
    /// Administrator account.
    Admin,
}

/// Authentication state of the single active session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Authentication {
    /// Nobody is logged in.
    #[default]
    Unauthenticated,
    /// The named account exists but has no password yet; the next step is
    /// [`AuthEngine::set_initial_password`] for it.
    AwaitingPasswordSetup(String),
    /// A user is logged in.
    Authenticated {
        /// The authenticated username.
        username: String,
        /// Admin or standard, from the account's admin flag.
        role: Role,
    },
    /// Terminal state after too many consecutive failures. Every further
    /// login attempt is refused; the caller must end the session.
    LockedOut,
}

/// The session context threaded through every engine call.
///
/// Carries the authentication state and the consecutive-failure counter.
/// The counter is scoped to this value: it spans usernames, resets on any
/// successful login and is never persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    auth: Authentication,
    failed_attempts: u32,
}

impl SessionState {
    /// A fresh, unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current authentication state.
    pub fn authentication(&self) -> &Authentication {
        &self.auth
    }

    /// Username of the logged-in user, if any.
    pub fn current_user(&self) -> Option<&str> {
        match &self.auth {
            Authentication::Authenticated { username, .. } => Some(username),
            _ => None,
        }
    }

    /// Role of the logged-in user, if any.
    pub fn role(&self) -> Option<Role> {
        match &self.auth {
            Authentication::Authenticated { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// Whether the logged-in user is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Whether the session has been locked out.
    pub fn is_locked_out(&self) -> bool {
        self.auth == Authentication::LockedOut
    }

    /// Consecutive failed login attempts so far.
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }
}

/// Outcome of a single login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials verified; the session is now authenticated.
    Authenticated(Role),
    /// The account has no password yet. The session is now awaiting
    /// [`AuthEngine::set_initial_password`] for this username.
    NeedsPasswordSetup,
    /// Wrong password; `remaining` attempts are left before lockout.
    InvalidPassword {
        /// Attempts left in this session.
        remaining: u32,
    },
    /// The account is blocked and cannot authenticate.
    AccountBlocked,
    /// No such username in the store.
    UserNotFound,
    /// The attempt limit has been reached. Terminal for this session.
    LockedOut,
}

/// Pre-login engine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// The administrator exists and has a password; normal operation.
    Ready,
    /// The administrator is missing or has no password.
    /// [`AuthEngine::complete_bootstrap`] must run before anything else.
    AdminPasswordRequired,
}

/// Errors from the password-setup and bootstrap flows.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The candidate failed the account's password rules.
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    /// No account with that username.
    #[error("user not found")]
    UserNotFound,

    /// `set_initial_password` was called for a username the session is not
    /// currently setting up.
    #[error("no password setup is pending for this user")]
    NotAwaitingSetup,

    /// Administrator bootstrap was declined. Fatal: the embedding
    /// application must terminate rather than continue without an
    /// administrator password.
    #[error("administrator password setup was declined")]
    StartupAborted,

    /// The store could not be written.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Orchestrates login attempts, lockout counting and first-use password
/// flows over a [`CredentialStore`].
#[derive(Debug, Clone)]
pub struct AuthEngine {
    store: CredentialStore,
    max_attempts: u32,
}

impl AuthEngine {
    /// Create an engine with the default attempt limit.
    pub fn new(store: CredentialStore) -> Self {
        Self::with_max_attempts(store, MAX_LOGIN_ATTEMPTS)
    }

    /// Create an engine with a custom attempt limit (at least 1).
    pub fn with_max_attempts(store: CredentialStore, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    /// The underlying credential store.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Check whether the well-known administrator account is usable.
    ///
    /// Must be consulted before any other operation on a fresh engine. When
    /// it returns [`Bootstrap::AdminPasswordRequired`] the caller has to
    /// drive [`complete_bootstrap`](Self::complete_bootstrap); a caller that
    /// cannot supply a password must treat that as
    /// [`AuthError::StartupAborted`] and terminate.
    pub fn ensure_admin_exists(&self) -> Bootstrap {
        let accounts = self.store.load();
        match accounts.get(self.store.admin_username()) {
            Some(account) if account.has_password() => Bootstrap::Ready,
            _ => Bootstrap::AdminPasswordRequired,
        }
    }

    /// Establish the administrator password on first run.
    ///
    /// The candidate is validated without policy constraints, matching the
    /// first-run flow of existing deployments; the stored account then
    /// carries the strict rules for every later change.
    pub fn complete_bootstrap(&self, candidate: &str, confirmation: &str) -> Result<(), AuthError> {
        PasswordPolicy::none().validate(candidate, confirmation)?;
        let mut accounts = self.store.load();
        let username = self.store.admin_username().to_string();
        let mut account = accounts
            .get(&username)
            .cloned()
            .unwrap_or_else(Account::bootstrap_admin);
        account.password = digest_password(candidate);
        account.admin = true;
        account.password_rules = PasswordPolicy::strict();
        accounts.insert(username.clone(), account);
        self.store.save(&accounts)?;
        info!(username = %username, "administrator password established");
        Ok(())
    }

    /// One login attempt.
    ///
    /// Drives the session state machine; see [`LoginOutcome`] for the
    /// possible results. Once the session is locked out every call returns
    /// [`LoginOutcome::LockedOut`], including calls with correct
    /// credentials.
    pub fn attempt_login(
        &self,
        session: &mut SessionState,
        username: &str,
        password: &str,
    ) -> LoginOutcome {
        if session.is_locked_out() {
            warn!(username = %username, "login refused: session is locked out");
            return LoginOutcome::LockedOut;
        }

        let accounts = self.store.load();
        let account = match accounts.get(username) {
            Some(account) => account,
            None => {
                warn!(username = %username, "login failed: user not found");
                return self
                    .register_failure(session)
                    .unwrap_or(LoginOutcome::UserNotFound);
            }
        };

        if account.blocked {
            warn!(username = %username, "login refused: account is blocked");
            return LoginOutcome::AccountBlocked;
        }

        if !account.has_password() {
            info!(username = %username, "password setup required before first login");
            session.auth = Authentication::AwaitingPasswordSetup(username.to_string());
            return LoginOutcome::NeedsPasswordSetup;
        }

        if verify_password(password, &account.password) {
            let role = if account.admin { Role::Admin } else { Role::Standard };
            session.failed_attempts = 0;
            session.auth = Authentication::Authenticated {
                username: username.to_string(),
                role,
            };
            info!(username = %username, ?role, "login succeeded");
            LoginOutcome::Authenticated(role)
        } else {
            warn!(
                username = %username,
                attempts = session.failed_attempts + 1,
                "login failed: invalid password"
            );
            self.register_failure(session)
                .unwrap_or_else(|| LoginOutcome::InvalidPassword {
                    remaining: self.max_attempts - session.failed_attempts,
                })
        }
    }

    /// Establish the first password for an account that has none.
    ///
    /// Only valid while the session is awaiting setup for exactly this
    /// username (the state [`attempt_login`](Self::attempt_login) enters on
    /// an empty-digest account). On success the session lands
    /// authenticated and the role is returned.
    pub fn set_initial_password(
        &self,
        session: &mut SessionState,
        username: &str,
        candidate: &str,
        confirmation: &str,
    ) -> Result<Role, AuthError> {
        match &session.auth {
            Authentication::AwaitingPasswordSetup(pending) if pending == username => {}
            _ => return Err(AuthError::NotAwaitingSetup),
        }

        let mut accounts = self.store.load();
        let account = accounts.get_mut(username).ok_or(AuthError::UserNotFound)?;
        account.password_rules.validate(candidate, confirmation)?;
        account.password = digest_password(candidate);
        let role = if account.admin { Role::Admin } else { Role::Standard };
        self.store.save(&accounts)?;

        session.failed_attempts = 0;
        session.auth = Authentication::Authenticated {
            username: username.to_string(),
            role,
        };
        info!(username = %username, "initial password established");
        Ok(role)
    }

    /// Count one failed attempt; lock the session out at the limit.
    fn register_failure(&self, session: &mut SessionState) -> Option<LoginOutcome> {
        session.failed_attempts += 1;
        if session.failed_attempts >= self.max_attempts {
            warn!(
                attempts = session.failed_attempts,
                "attempt limit reached, session locked out"
            );
            session.auth = Authentication::LockedOut;
            Some(LoginOutcome::LockedOut)
        } else {
            None
        }
    }
}
