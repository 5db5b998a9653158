//! End-to-end login, bootstrap and lockout scenarios.

mod common;

use common::{bootstrapped_engine, create_test_user, temp_store, ADMIN_PASSWORD};
use passgate::{
    AuthEngine, AuthError, Bootstrap, LoginOutcome, PolicyViolation, Role, SessionState,
};

/// First run: the store file does not exist, bootstrap is demanded, and the
/// engine is ready once the administrator password is set.
#[test]
fn test_first_run_bootstrap_flow() {
    let (_temp_dir, store) = temp_store();
    let engine = AuthEngine::new(store);

    assert_eq!(engine.ensure_admin_exists(), Bootstrap::AdminPasswordRequired);
    engine.complete_bootstrap("letmein", "letmein").unwrap();
    assert_eq!(engine.ensure_admin_exists(), Bootstrap::Ready);

    let mut session = SessionState::new();
    assert_eq!(
        engine.attempt_login(&mut session, "admin", "letmein"),
        LoginOutcome::Authenticated(Role::Admin)
    );
}

/// A corrupt store file falls back to the default store, which again
/// demands bootstrap instead of failing.
#[test]
fn test_corrupt_store_demands_bootstrap() {
    let (_temp_dir, store) = temp_store();
    std::fs::write(store.path(), "####").unwrap();

    let engine = AuthEngine::new(store);
    assert_eq!(engine.ensure_admin_exists(), Bootstrap::AdminPasswordRequired);
    engine.complete_bootstrap("recovered", "recovered").unwrap();

    // The rewritten file is valid again.
    let engine = AuthEngine::new(engine.store().clone());
    assert_eq!(engine.ensure_admin_exists(), Bootstrap::Ready);
}

/// Declining bootstrap surfaces the fatal error the embedder must honor.
#[test]
fn test_declined_bootstrap_is_fatal() {
    let err = AuthError::StartupAborted;
    assert_eq!(err.to_string(), "administrator password setup was declined");
}

/// The whole first-use flow for a user added without a password: login
/// demands setup, policy violations are reported one at a time, and the
/// accepted password authenticates immediately and on later logins.
#[test]
fn test_first_use_password_setup_flow() {
    let (_temp_dir, engine) = bootstrapped_engine();

    let mut admin_session = SessionState::new();
    engine.attempt_login(&mut admin_session, "admin", ADMIN_PASSWORD);
    let service = passgate::AdminService::new(engine.store().clone());
    service
        .add_user(
            &admin_session,
            "alice",
            Some(passgate::PasswordPolicy {
                min_length: 8,
                require_digit: true,
                ..passgate::PasswordPolicy::none()
            }),
        )
        .unwrap();

    let mut session = SessionState::new();
    assert_eq!(
        engine.attempt_login(&mut session, "alice", "whatever"),
        LoginOutcome::NeedsPasswordSetup
    );
    assert!(matches!(
        engine.set_initial_password(&mut session, "alice", "short1", "short1"),
        Err(AuthError::Policy(PolicyViolation::TooShort { min: 8 }))
    ));
    assert!(matches!(
        engine.set_initial_password(&mut session, "alice", "longenough", "longenough"),
        Err(AuthError::Policy(PolicyViolation::MissingDigit))
    ));
    assert_eq!(
        engine
            .set_initial_password(&mut session, "alice", "longenough1", "longenough1")
            .unwrap(),
        Role::Standard
    );
    assert_eq!(session.current_user(), Some("alice"));

    let mut later = SessionState::new();
    assert_eq!(
        engine.attempt_login(&mut later, "alice", "longenough1"),
        LoginOutcome::Authenticated(Role::Standard)
    );
}

/// Three consecutive failures across different usernames, existing or not,
/// lock the session out; correct credentials are refused afterwards.
#[test]
fn test_lockout_across_usernames() {
    let (_temp_dir, engine) = bootstrapped_engine();
    create_test_user(engine.store(), "bob", "bob-pw");

    let mut session = SessionState::new();
    assert_eq!(
        engine.attempt_login(&mut session, "bob", "nope"),
        LoginOutcome::InvalidPassword { remaining: 2 }
    );
    assert_eq!(
        engine.attempt_login(&mut session, "no-such-user", "nope"),
        LoginOutcome::UserNotFound
    );
    assert_eq!(
        engine.attempt_login(&mut session, "admin", "nope"),
        LoginOutcome::LockedOut
    );
    assert!(session.is_locked_out());

    // Fourth attempt with correct credentials is refused.
    assert_eq!(
        engine.attempt_login(&mut session, "admin", ADMIN_PASSWORD),
        LoginOutcome::LockedOut
    );

    // Lockout is per session, not persisted: a new session starts clean.
    let mut fresh = SessionState::new();
    assert_eq!(
        engine.attempt_login(&mut fresh, "admin", ADMIN_PASSWORD),
        LoginOutcome::Authenticated(Role::Admin)
    );
}

/// A successful login resets the failure budget.
#[test]
fn test_success_resets_failure_budget() {
    let (_temp_dir, engine) = bootstrapped_engine();

    let mut session = SessionState::new();
    engine.attempt_login(&mut session, "admin", "nope");
    engine.attempt_login(&mut session, "admin", "nope");
    assert_eq!(
        engine.attempt_login(&mut session, "admin", ADMIN_PASSWORD),
        LoginOutcome::Authenticated(Role::Admin)
    );
    assert_eq!(
        engine.attempt_login(&mut session, "admin", "nope"),
        LoginOutcome::InvalidPassword { remaining: 2 }
    );
}

/// Blocked accounts cannot authenticate, and the refusal does not burn an
/// attempt.
#[test]
fn test_blocked_account_cannot_login() {
    let (_temp_dir, engine) = bootstrapped_engine();
    create_test_user(engine.store(), "bob", "bob-pw");

    let mut admin_session = SessionState::new();
    engine.attempt_login(&mut admin_session, "admin", ADMIN_PASSWORD);
    let service = passgate::AdminService::new(engine.store().clone());
    service.block(&admin_session, "bob").unwrap();

    let mut session = SessionState::new();
    assert_eq!(
        engine.attempt_login(&mut session, "bob", "bob-pw"),
        LoginOutcome::AccountBlocked
    );
    assert_eq!(session.failed_attempts(), 0);

    service.unblock(&admin_session, "bob").unwrap();
    assert_eq!(
        engine.attempt_login(&mut session, "bob", "bob-pw"),
        LoginOutcome::Authenticated(Role::Standard)
    );
}

/// Self-registration immediately sets a password and the account can log
/// in; registration never grants the admin role.
#[test]
fn test_registration_then_login() {
    let (_temp_dir, engine) = bootstrapped_engine();

    passgate::register(engine.store(), "carol", "carol-pw", "carol-pw").unwrap();

    let mut session = SessionState::new();
    assert_eq!(
        engine.attempt_login(&mut session, "carol", "carol-pw"),
        LoginOutcome::Authenticated(Role::Standard)
    );
    assert!(!session.is_admin());
}

/// A store written by an old deployment (legacy boolean rules) is usable
/// transparently: the migrated minimum length applies to password setup.
#[test]
fn test_legacy_store_end_to_end() {
    let (_temp_dir, store) = temp_store();
    std::fs::write(
        store.path(),
        format!(
            r#"{{
                "admin": {{"password": "{}", "admin": true, "blocked": false, "password_rules": false}},
                "eve": {{"password": "", "admin": false, "blocked": false, "password_rules": true}}
            }}"#,
            passgate::digest_password("admin-pw")
        ),
    )
    .unwrap();

    let engine = AuthEngine::new(store);
    assert_eq!(engine.ensure_admin_exists(), Bootstrap::Ready);

    let mut session = SessionState::new();
    assert_eq!(
        engine.attempt_login(&mut session, "eve", ""),
        LoginOutcome::NeedsPasswordSetup
    );
    // The legacy "has rules" flag means a 6-character minimum.
    assert!(matches!(
        engine.set_initial_password(&mut session, "eve", "five5", "five5"),
        Err(AuthError::Policy(PolicyViolation::TooShort { min: 6 }))
    ));
    assert_eq!(
        engine
            .set_initial_password(&mut session, "eve", "sixsix", "sixsix")
            .unwrap(),
        Role::Standard
    );
}
