//! Ollama-compatible inference engine implementation
//!
//! Uses the raw `/api/generate` completion endpoint so the prompt transcript is
//! passed through untouched.

mod client;

pub use client::OllamaInferenceEngine;
