//! Model, inference and conversation settings.

use domain::DevicePreference;
use serde::{Deserialize, Serialize};

/// Model configuration (`model` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAppConfig {
    /// Model name as known to the model server
    #[serde(default = "default_name")]
    pub name: String,

    /// Model server base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Device preference: auto, cuda, mps or cpu
    #[serde(default)]
    pub device: DevicePreference,

    /// Sampling temperature, 0.0 - 2.0
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Nucleus sampling threshold
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Context window in tokens
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Informational only
    #[serde(default = "default_architecture")]
    pub architecture: String,
}

fn default_name() -> String {
    "llama3.2:1b".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

const fn default_temperature() -> f64 {
    0.7
}

const fn default_top_p() -> f64 {
    0.9
}

const fn default_max_length() -> u32 {
    1024
}

fn default_architecture() -> String {
    "transformer".to_string()
}

impl Default for ModelAppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            endpoint: default_endpoint(),
            device: DevicePreference::default(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_length: default_max_length(),
            architecture: default_architecture(),
        }
    }
}

/// Generation configuration (`inference` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceAppConfig {
    /// Maximum tokens generated per reply
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Sample tokens; greedy decoding when false
    #[serde(default = "super::default_true")]
    pub do_sample: bool,

    /// Per-reply generation budget in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How long the model server keeps weights resident between calls
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
}

const fn default_max_new_tokens() -> u32 {
    128
}

const fn default_timeout_ms() -> u64 {
    60_000
}

fn default_keep_alive() -> String {
    "5m".to_string()
}

impl Default for InferenceAppConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_new_tokens(),
            do_sample: true,
            timeout_ms: default_timeout_ms(),
            keep_alive: default_keep_alive(),
        }
    }
}

/// Conversation configuration (`conversation` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Exchanges retained and replayed into the prompt
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Instruction placed before the transcript
    #[serde(default)]
    pub system_prompt: Option<String>,
}

const fn default_max_history() -> usize {
    domain::DEFAULT_MAX_EXCHANGES
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            system_prompt: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::Device;

    use super::*;

    #[test]
    fn model_defaults() {
        let config = ModelAppConfig::default();
        assert_eq!(config.name, "llama3.2:1b");
        assert_eq!(config.device, DevicePreference::Auto);
        assert!((config.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.max_length, 1024);
    }

    #[test]
    fn model_device_parses_from_string() {
        let config: ModelAppConfig = serde_json::from_str(r#"{"device": "cpu"}"#).unwrap();
        assert_eq!(config.device, DevicePreference::Fixed(Device::Cpu));
    }

    #[test]
    fn inference_defaults() {
        let config: InferenceAppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_new_tokens, 128);
        assert!(config.do_sample);
        assert_eq!(config.timeout_ms, 60_000);
    }

    #[test]
    fn conversation_defaults() {
        let config = ConversationConfig::default();
        assert_eq!(config.max_history, 5);
        assert!(config.system_prompt.is_none());
    }
}
