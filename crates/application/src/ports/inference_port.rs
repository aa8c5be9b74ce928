//! Inference port - Interface for a loaded language model

use async_trait::async_trait;
use domain::Device;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Sampling parameters for one generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Maximum tokens to generate
    pub max_new_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling threshold
    pub top_p: f32,
    /// Sample tokens; greedy decoding when false
    pub do_sample: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 128,
            temperature: 0.7,
            top_p: 0.9,
            do_sample: true,
        }
    }
}

/// A rendered prompt ready for the model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Full prompt transcript
    pub prompt: String,
    /// Device to run on
    pub device: Device,
    /// Sampling parameters
    pub params: GenerationParams,
    /// Sequences that end generation
    pub stop: Vec<String>,
}

/// Result of an inference call
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// Generated response content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Number of tokens used (if available)
    pub tokens_used: Option<u32>,
    /// Latency in milliseconds
    pub latency_ms: u64,
}

/// Port for a model that has been loaded onto a device
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InferencePort: Send + Sync {
    /// Generate a completion for the request
    async fn generate(&self, request: &GenerationRequest)
    -> Result<InferenceResult, ApplicationError>;

    /// Check if the inference backend is healthy
    async fn is_healthy(&self) -> bool;

    /// Get the name of the loaded model
    fn model_name(&self) -> String;

    /// Mark a generation as in flight
    ///
    /// Adapters count in-flight generations so `clear_cache` is deferred
    /// while any are running. The backend owns the memory itself.
    fn begin_generation(&self) {}

    /// Mark a generation as finished, successful or not
    fn end_generation(&self) {}

    /// Release the model's weights from accelerator memory
    async fn clear_cache(&self) -> Result<(), ApplicationError>;
}
