//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Generation failed at runtime
    #[error("Inference error: {0}")]
    Inference(String),

    /// Generation failed because of the device (out of memory, driver)
    #[error("Device failure: {0}")]
    DeviceFailure(String),

    /// Model could not be loaded onto a device
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    /// Generation exceeded its time budget
    #[error("Generation timed out after {0}ms")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Whether the error was caused by the caller's input
    pub const fn is_input_error(&self) -> bool {
        match self {
            Self::Domain(err) => err.is_input_error(),
            _ => false,
        }
    }

    /// Whether a retry on another device may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DeviceFailure(_))
    }
}
