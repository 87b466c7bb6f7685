use thiserror::Error;

/// Application-wide error types for Tidings.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-success status.
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// A page or stored record has no usable body text.
    #[error("No content found for {0}")]
    EmptyContent(String),

    /// JSON serialization/deserialization failed (malformed stored record).
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Container or blob operation failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error marks a skipped item rather than a failure.
    ///
    /// Stages log these at `warn` instead of `error`.
    pub fn is_warning(&self) -> bool {
        matches!(self, AppError::EmptyContent(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_is_warning() {
        assert!(AppError::EmptyContent("https://example.com".into()).is_warning());
        assert!(!AppError::FetchError("HTTP 503".into()).is_warning());
        assert!(!AppError::StorageError("disk full".into()).is_warning());
        assert!(!AppError::ConfigError("missing".into()).is_warning());
    }

    #[test]
    fn test_serialization_error_from_serde() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::SerializationError(_)));
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
