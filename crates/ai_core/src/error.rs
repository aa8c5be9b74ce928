//! Inference errors

use thiserror::Error;

/// Errors that can occur while loading a model or generating text
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Failed to connect to the model server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the model server failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Model not found on the server
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Device ran out of memory
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// Requested device cannot run the model
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Response parsing failed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during inference
    #[error("Inference timeout after {0}ms")]
    Timeout(u64),

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),
}

impl InferenceError {
    /// Map a transport error, reporting timeouts with the configured budget
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }

    /// Classify an error body returned by the server
    pub fn from_server_body(status: u16, body: &str) -> Self {
        let lower = body.to_lowercase();
        if lower.contains("out of memory") || lower.contains("insufficient memory") {
            Self::OutOfMemory(body.to_string())
        } else if ["cuda", "gpu", "metal", "device"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            Self::DeviceError(body.to_string())
        } else if status == 404 && lower.contains("not found") {
            Self::ModelNotAvailable(body.to_string())
        } else {
            Self::ServerError(format!("Status {status}: {body}"))
        }
    }

    /// Whether the failure is tied to the device and may succeed on another one
    pub const fn is_device_related(&self) -> bool {
        matches!(self, Self::OutOfMemory(_) | Self::DeviceError(_))
    }
}
