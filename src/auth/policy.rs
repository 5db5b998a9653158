//! Per-account password rules and their validator.
//!
//! Every account carries a `PasswordPolicy` that governs what its *next*
//! password must look like. Rules are pure opt-in: the default policy with
//! all flags off and no minimum length accepts any non-empty password.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters accepted by the special-character rule.
pub const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Minimum length implied by the legacy boolean rules field.
pub const LEGACY_MIN_LENGTH: u32 = 6;

/// A single failed password rule.
///
/// Rules are checked in a fixed order and the first failure wins, so the
/// caller gets exactly one deterministic message per candidate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    /// Candidate is empty or whitespace-only.
    #[error("password cannot be empty")]
    Empty,

    /// Candidate and its re-entered confirmation differ.
    #[error("passwords do not match")]
    ConfirmationMismatch,

    /// Candidate is shorter than the required minimum.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// The policy's minimum length.
        min: u32,
    },

    /// No uppercase letter present.
    #[error("password must contain at least one uppercase letter")]
    MissingUppercase,

    /// No lowercase letter present.
    #[error("password must contain at least one lowercase letter")]
    MissingLowercase,

    /// No digit present.
    #[error("password must contain at least one digit")]
    MissingDigit,

    /// No special character present.
    #[error("password must contain at least one special character")]
    MissingSpecial,
}

/// Password rules attached to a single account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length in characters; 0 disables the check.
    #[serde(default)]
    pub min_length: u32,
    /// Require an uppercase Latin or Cyrillic letter.
    #[serde(default)]
    pub require_upper: bool,
    /// Require a lowercase Latin or Cyrillic letter.
    #[serde(default)]
    pub require_lower: bool,
    /// Require a digit 0-9.
    #[serde(default)]
    pub require_digit: bool,
    /// Require one of [`SPECIAL_CHARS`].
    #[serde(default)]
    pub require_special: bool,
}

impl PasswordPolicy {
    /// Policy with no constraints, the default for new accounts.
    pub fn none() -> Self {
        Self::default()
    }

    /// Conservative policy applied to the bootstrap administrator and to
    /// the fail-safe default store: 8 characters minimum, every character
    /// class required.
    pub fn strict() -> Self {
        Self {
            min_length: 8,
            require_upper: true,
            require_lower: true,
            require_digit: true,
            require_special: true,
        }
    }

    /// Policy implied by the legacy boolean `password_rules` field.
    pub fn from_legacy_flag(has_rules: bool) -> Self {
        if has_rules {
            Self {
                min_length: LEGACY_MIN_LENGTH,
                ..Self::default()
            }
        } else {
            Self::default()
        }
    }

    /// Whether any rule is active.
    pub fn has_constraints(&self) -> bool {
        self.min_length > 0
            || self.require_upper
            || self.require_lower
            || self.require_digit
            || self.require_special
    }

    /// Validate a candidate password and its re-entered confirmation.
    ///
    /// Checks, in order: non-blank, confirmation match, minimum length,
    /// then each required character class. The first failing rule is
    /// returned; later rules are not evaluated.
    ///
    /// # Examples
    ///
    /// ```
    /// use passgate::auth::policy::{PasswordPolicy, PolicyViolation};
    ///
    /// let policy = PasswordPolicy { min_length: 8, require_digit: true, ..PasswordPolicy::none() };
    /// assert_eq!(policy.validate("short1", "short1"), Err(PolicyViolation::TooShort { min: 8 }));
    /// assert!(policy.validate("longenough1", "longenough1").is_ok());
    /// ```
    pub fn validate(&self, candidate: &str, confirmation: &str) -> Result<(), PolicyViolation> {
        if candidate.trim().is_empty() {
            return Err(PolicyViolation::Empty);
        }
        if candidate != confirmation {
            return Err(PolicyViolation::ConfirmationMismatch);
        }
        // Length in characters, not bytes, so multi-byte passwords are not
        // penalized.
        if self.min_length > 0 && candidate.chars().count() < self.min_length as usize {
            return Err(PolicyViolation::TooShort {
                min: self.min_length,
            });
        }
        if self.require_upper && !candidate.chars().any(is_uppercase_letter) {
            return Err(PolicyViolation::MissingUppercase);
        }
        if self.require_lower && !candidate.chars().any(is_lowercase_letter) {
            return Err(PolicyViolation::MissingLowercase);
        }
        if self.require_digit && !candidate.chars().any(|c| c.is_ascii_digit()) {
            return Err(PolicyViolation::MissingDigit);
        }
        if self.require_special && !candidate.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            return Err(PolicyViolation::MissingSpecial);
        }
        Ok(())
    }
}

/// Uppercase Latin (A-Z) or Cyrillic (А-Я) letter.
fn is_uppercase_letter(c: char) -> bool {
    c.is_ascii_uppercase() || ('А'..='Я').contains(&c)
}

/// Lowercase Latin (a-z) or Cyrillic (а-я) letter.
fn is_lowercase_letter(c: char) -> bool {
    c.is_ascii_lowercase() || ('а'..='я').contains(&c)
}
