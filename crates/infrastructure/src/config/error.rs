//! Configuration errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration; all are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be parsed or does not match the expected shape
    #[error("Malformed configuration in {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    /// A value is outside its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Malformed {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
