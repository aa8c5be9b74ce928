//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// User input was empty or contained only whitespace
    #[error("Message cannot be empty")]
    EmptyMessage,

    /// Session identifier could not be parsed
    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    /// Unknown compute device name
    #[error("Invalid device: {0}. Use 'auto', 'cuda', 'mps' or 'cpu'")]
    InvalidDevice(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Whether the error was caused by the caller's input
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyMessage | Self::InvalidSessionId(_))
    }
}
