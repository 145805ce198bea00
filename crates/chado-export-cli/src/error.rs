//! Error types for the chado-export CLI
//!
//! Validation and filesystem errors are fatal and reported to the operator
//! before any job is dispatched. Failures inside the generated scripts are
//! deliberately not represented here: they surface later through the
//! completion-checker email, never through this process.

use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Comprehensive error type for export operations
#[derive(Error, Debug)]
pub enum ExportError {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check the configuration file and re-run.")]
    Config(String),

    /// A caller supplied an invalid argument value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// Configuration file parsing failed
    #[error("Failed to parse configuration file: {0}")]
    ConfigParse(#[from] config::ConfigError),

    /// Database operation failed
    #[error("Database error: {0}. Check the [connection] settings in the configuration file.")]
    Database(#[from] sqlx::Error),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
