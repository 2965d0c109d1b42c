use thiserror::Error;

/// Application-wide error types for Hireboard.
#[derive(Error, Debug)]
pub enum AppError {
    /// A lookup matched no record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required field is missing or a value is malformed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The record already exists (e.g. saving an already-saved job).
    #[error("Duplicate: {0}")]
    DuplicateError(String),

    /// The record client answered but reported `success = false`.
    #[error("Remote failure: {0}")]
    RemoteFailure(String),

    /// HTTP request to the record backend failed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(AppError::NetworkError("reset".into()).is_retryable());
        assert!(AppError::Timeout(30).is_retryable());
        assert!(AppError::HttpError("connection reset by peer".into()).is_retryable());
        assert!(!AppError::RemoteFailure("quota exceeded".into()).is_retryable());
        assert!(!AppError::ValidationError("title is required".into()).is_retryable());
    }

    #[test]
    fn test_not_found_detection() {
        assert!(AppError::NotFound("job 7".into()).is_not_found());
        assert!(!AppError::DuplicateError("job 7".into()).is_not_found());
    }

    #[test]
    fn test_display_carries_remote_message() {
        let err = AppError::RemoteFailure("Field title_c is read-only".into());
        assert_eq!(err.to_string(), "Remote failure: Field title_c is read-only");
    }
}
