//! AI Core - Inference engine and model management
//!
//! Talks to a local Ollama-compatible model server: probing and warming up a
//! model on a device, generating completions, and releasing device memory.

pub mod config;
pub mod error;
pub mod ollama;
pub mod ports;

pub use config::InferenceConfig;
pub use error::InferenceError;
pub use ollama::OllamaInferenceEngine;
pub use ports::{InferenceEngine, InferenceRequest, InferenceResponse, TokenUsage};
