//! Error types for passgate.

use thiserror::Error;

/// Common error type for passgate plumbing.
///
/// Domain operations return their own error enums (`AuthError`,
/// `AdminError`, `RegistrationError`); this type covers configuration and
/// I/O concerns of the embedding application.
#[derive(Error, Debug)]
pub enum PassgateError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Credential storage error.
    #[error("storage error: {0}")]
    Storage(#[from] crate::store::StoreError),
}

/// Result type alias for passgate operations.
pub type Result<T> = std::result::Result<T, PassgateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = PassgateError::Config("bad max_attempts".to_string());
        assert_eq!(err.to_string(), "configuration error: bad max_attempts");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PassgateError = io_err.into();
        assert!(matches!(err, PassgateError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_storage_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PassgateError = crate::store::StoreError::Io(io_err).into();
        assert!(matches!(err, PassgateError::Storage(_)));
    }
}
