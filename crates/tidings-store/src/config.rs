use std::path::PathBuf;

use tidings_core::AppError;

/// Environment variable holding the storage connection string.
pub const CONNECTION_STRING_VAR: &str = "BLOB_CONNECTION_STRING";

/// Storage settings. The connection string is read eagerly but only
/// validated when a backend is first needed.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub connection_string: Option<String>,
    pub max_connections: u32,
}

/// Backend selected by a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// `memory://`
    Memory,
    /// `file:///path` or a bare absolute/relative path.
    Filesystem(PathBuf),
    /// `postgres://...` or `postgresql://...`
    Postgres(String),
}

impl StoreConfig {
    pub fn new(connection_string: Option<String>) -> Self {
        Self {
            connection_string,
            max_connections: 5,
        }
    }

    /// Read configuration from environment variables.
    ///
    /// - `BLOB_CONNECTION_STRING` (required for storage access, not checked here)
    /// - `BLOB_MAX_CONNECTIONS` (optional, defaults to 5)
    pub fn from_env() -> Result<Self, AppError> {
        let connection_string = std::env::var(CONNECTION_STRING_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty());

        let max_connections = match std::env::var("BLOB_MAX_CONNECTIONS") {
            Err(_) => 5,
            Ok(raw) => {
                let parsed: u32 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid BLOB_MAX_CONNECTIONS '{raw}': must be a positive integer"
                    ))
                })?;
                if parsed == 0 {
                    return Err(AppError::ConfigError(
                        "BLOB_MAX_CONNECTIONS must be at least 1".into(),
                    ));
                }
                parsed
            }
        };

        Ok(Self {
            connection_string,
            max_connections,
        })
    }

    /// Resolve the connection string into a backend.
    pub fn backend(&self) -> Result<Backend, AppError> {
        let raw = self
            .connection_string
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| {
                AppError::ConfigError(format!(
                    "{CONNECTION_STRING_VAR} not set. Required for storage operations."
                ))
            })?;

        if raw == "memory://" || raw == "memory" {
            return Ok(Backend::Memory);
        }
        if raw.starts_with("postgres://") || raw.starts_with("postgresql://") {
            return Ok(Backend::Postgres(raw.to_string()));
        }
        if let Some(path) = raw.strip_prefix("file://") {
            if path.is_empty() {
                return Err(AppError::ConfigError(format!(
                    "{CONNECTION_STRING_VAR} has an empty file path"
                )));
            }
            return Ok(Backend::Filesystem(PathBuf::from(path)));
        }
        if raw.starts_with('/') || raw.starts_with('.') {
            return Ok(Backend::Filesystem(PathBuf::from(raw)));
        }

        // Never echo the string itself: it may carry credentials.
        let scheme = raw.split_once("://").map(|(s, _)| s).unwrap_or("<none>");
        Err(AppError::ConfigError(format!(
            "Unsupported {CONNECTION_STRING_VAR} scheme '{scheme}' (expected memory://, file://, or postgres://)"
        )))
    }
}
