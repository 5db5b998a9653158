//! Password hashing for passgate.
//!
//! Passwords are stored as unsalted lowercase-hex SHA-256 digests of their
//! UTF-8 bytes, for compatibility with credential files written by earlier
//! deployments. The lack of a salt means identical passwords share a digest;
//! see DESIGN.md for the open migration question.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_LENGTH: usize = 64;

/// Hash a plaintext password.
///
/// Deterministic: the same plaintext always yields the same digest.
///
/// # Examples
///
/// ```
/// use passgate::auth::digest_password;
///
/// let digest = digest_password("hunter2");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, digest_password("hunter2"));
/// ```
pub fn digest_password(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

/// Verify a plaintext password against a stored digest.
///
/// An empty stored digest never matches; it marks an account that has not
/// set a password yet. The comparison is constant-time.
pub fn verify_password(plaintext: &str, expected_digest: &str) -> bool {
    if expected_digest.is_empty() {
        return false;
    }
    let computed = digest_password(plaintext);
    computed.as_bytes().ct_eq(expected_digest.as_bytes()).into()
}
