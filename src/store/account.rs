//! Account records and the legacy rules-field migration.

use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::policy::PasswordPolicy;

/// Either form of the persisted `password_rules` field.
///
/// Early credential files stored a bare boolean ("has rules"); current files
/// store the structured policy. This enum exists only at the
/// deserialization boundary and is normalized immediately; nothing past
/// this module ever sees the legacy form. Files are always written back in
/// the structured form.
#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyField {
    Legacy(bool),
    Structured(PasswordPolicy),
}

fn deserialize_policy<'de, D>(deserializer: D) -> Result<PasswordPolicy, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match PolicyField::deserialize(deserializer)? {
        PolicyField::Legacy(flag) => PasswordPolicy::from_legacy_flag(flag),
        PolicyField::Structured(policy) => policy,
    })
}

/// A stored user account.
///
/// The username is the key of the credential file's top-level object and is
/// not repeated inside the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Hex SHA-256 digest of the password, or empty while none is set.
    #[serde(default)]
    pub password: String,
    /// Administrator flag.
    #[serde(default)]
    pub admin: bool,
    /// Blocked accounts cannot authenticate.
    #[serde(default)]
    pub blocked: bool,
    /// Rules the next password for this account must satisfy.
    #[serde(default, deserialize_with = "deserialize_policy")]
    pub password_rules: PasswordPolicy,
}

impl Account {
    /// A standard account with no password set and the given rules.
    pub fn new(policy: PasswordPolicy) -> Self {
        Self {
            password: String::new(),
            admin: false,
            blocked: false,
            password_rules: policy,
        }
    }

    /// The well-known administrator as seeded by bootstrap: no password
    /// yet, strict rules.
    pub fn bootstrap_admin() -> Self {
        Self {
            password: String::new(),
            admin: true,
            blocked: false,
            password_rules: PasswordPolicy::strict(),
        }
    }

    /// Whether a password has been established for this account.
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}
