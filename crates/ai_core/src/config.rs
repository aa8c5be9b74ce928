//! Configuration for the inference engine

use serde::{Deserialize, Serialize};

/// Configuration for the inference engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the model server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model to load and generate with
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum tokens to generate per reply
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Context window (prompt tokens) passed to the server
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top-p (nucleus) sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Sample tokens; greedy decoding when false
    #[serde(default = "default_do_sample")]
    pub do_sample: bool,

    /// How long the server keeps the model resident after a request
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2:1b".to_string()
}

const fn default_timeout_ms() -> u64 {
    60000 // 60 seconds
}

const fn default_max_new_tokens() -> u32 {
    128
}

const fn default_max_length() -> u32 {
    1024
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_top_p() -> f32 {
    0.9
}

const fn default_do_sample() -> bool {
    true
}

fn default_keep_alive() -> String {
    "5m".to_string()
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            max_new_tokens: default_max_new_tokens(),
            max_length: default_max_length(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            do_sample: default_do_sample(),
            keep_alive: default_keep_alive(),
        }
    }
}

impl InferenceConfig {
    /// Default configuration for the given model
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}
