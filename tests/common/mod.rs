//! Shared fixtures for passgate integration tests.

use tempfile::TempDir;

use passgate::{Account, AuthEngine, CredentialStore, PasswordPolicy};

/// Password the fixture administrator is bootstrapped with.
pub const ADMIN_PASSWORD: &str = "Admin1pw!";

/// A credential store on a fresh temporary directory.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn temp_store() -> (TempDir, CredentialStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = CredentialStore::new(temp_dir.path().join("users.json"), "admin");
    (temp_dir, store)
}

/// A bootstrapped engine whose administrator password is [`ADMIN_PASSWORD`].
pub fn bootstrapped_engine() -> (TempDir, AuthEngine) {
    let (temp_dir, store) = temp_store();
    let engine = AuthEngine::new(store);
    engine
        .complete_bootstrap(ADMIN_PASSWORD, ADMIN_PASSWORD)
        .unwrap();
    (temp_dir, engine)
}

/// Insert an account with an already-set password and no rules.
pub fn create_test_user(store: &CredentialStore, username: &str, password: &str) {
    let mut accounts = store.load();
    let mut account = Account::new(PasswordPolicy::none());
    account.password = passgate::digest_password(password);
    accounts.insert(username, account);
    store.save(&accounts).unwrap();
}
