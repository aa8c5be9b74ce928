//! Port definitions for inference engine
//!
//! Defines the traits (ports) that inference adapters must implement.

use async_trait::async_trait;
use domain::Device;
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Request for a single text completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// Fully rendered prompt
    pub prompt: String,
    /// Device to run on (server default when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top-p (nucleus) sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Sample tokens; greedy decoding when false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_sample: Option<bool>,
    /// Sequences that end generation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

impl InferenceRequest {
    /// Create a request using the engine's configured parameters
    pub fn simple(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            device: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            do_sample: None,
            stop: Vec::new(),
        }
    }

    /// Pin the request to a device
    #[must_use]
    pub const fn on_device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Set temperature
    #[must_use]
    pub const fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set top-p
    #[must_use]
    pub const fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set the generation budget
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Enable or disable sampling
    #[must_use]
    pub const fn with_sampling(mut self, do_sample: bool) -> Self {
        self.do_sample = Some(do_sample);
        self
    }

    /// Add a stop sequence
    #[must_use]
    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }
}

/// Response from inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    /// Generated content, trimmed
    pub content: String,
    /// Model that generated the response
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason
    pub finish_reason: Option<String>,
    /// Server-side generation time in milliseconds
    pub duration_ms: Option<u64>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Port for inference engine implementations
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Generate a complete response
    async fn generate(&self, request: InferenceRequest)
    -> Result<InferenceResponse, InferenceError>;

    /// Make the model resident on the given device
    async fn load_model(&self, device: Device) -> Result<(), InferenceError>;

    /// Release the model's weights from device memory
    async fn unload_model(&self) -> Result<(), InferenceError>;

    /// Check if the model server is healthy
    async fn health_check(&self) -> Result<bool, InferenceError>;

    /// Name of the configured model
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_request_defers_to_engine_defaults() {
        let req = InferenceRequest::simple("Hello");
        assert_eq!(req.prompt, "Hello");
        assert!(req.device.is_none());
        assert!(req.max_tokens.is_none());
        assert!(req.temperature.is_none());
        assert!(req.stop.is_empty());
    }

    #[test]
    fn builder_sets_parameters() {
        let req = InferenceRequest::simple("Hi")
            .on_device(Device::Cpu)
            .with_temperature(0.2)
            .with_top_p(0.5)
            .with_max_tokens(16)
            .with_sampling(false)
            .with_stop("\nUser:");

        assert_eq!(req.device, Some(Device::Cpu));
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(req.top_p, Some(0.5));
        assert_eq!(req.max_tokens, Some(16));
        assert_eq!(req.do_sample, Some(false));
        assert_eq!(req.stop, vec!["\nUser:".to_string()]);
    }

    #[test]
    fn unset_fields_are_not_serialized() {
        let json = serde_json::to_string(&InferenceRequest::simple("x")).unwrap();
        assert_eq!(json, r#"{"prompt":"x"}"#);
    }
}
