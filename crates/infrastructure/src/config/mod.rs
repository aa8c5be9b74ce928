//! Application configuration
//!
//! Split into focused sub-modules:
//! - `model`: model, generation and conversation settings
//! - `server`: HTTP API settings
//! - `logging`: log output and filesystem paths
//! - `env`: environment variable overrides
//! - `manager`: loading, merging and key lookup

mod env;
mod error;
mod logging;
mod manager;
mod model;
mod server;

use std::time::Duration;

use ai_core::InferenceConfig;
use application::{EngineSettings, FallbackTable, GenerationParams, KeywordResponder};
use serde::{Deserialize, Serialize};

pub use env::{EnvSource, ProcessEnv, env_var_name, parse_bool};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig, PathsConfig};
pub use manager::ConfigManager;
pub use model::{ConversationConfig, InferenceAppConfig, ModelAppConfig};
pub use server::ApiConfig;

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Typed view of the whole configuration document
///
/// Every section is optional; missing keys take the built-in defaults.
/// Sections this program does not use (for example `training`) are ignored
/// but stay visible through [`ConfigManager::get`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelAppConfig,

    #[serde(default)]
    pub inference: InferenceAppConfig,

    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Keyword table used when no model is available
    #[serde(default)]
    pub fallback: FallbackTable,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    /// Privacy flags; never exposed over the API
    #[serde(default = "default_privacy")]
    pub privacy: serde_json::Value,
}

fn default_privacy() -> serde_json::Value {
    serde_json::json!({
        "local_processing": true,
        "data_encryption": true,
        "anonymize_logs": true,
        "retention_days": 30,
    })
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelAppConfig::default(),
            inference: InferenceAppConfig::default(),
            conversation: ConversationConfig::default(),
            fallback: FallbackTable::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
            paths: PathsConfig::default(),
            privacy: default_privacy(),
        }
    }
}

impl AppConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let temperature = self.model.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Invalid(format!(
                "model.temperature must be between 0.0 and 2.0, got {temperature}"
            )));
        }

        let top_p = self.model.top_p;
        if !(top_p > 0.0 && top_p <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "model.top_p must be in (0.0, 1.0], got {top_p}"
            )));
        }

        if self.api.port == 0 {
            return Err(ConfigError::Invalid("api.port must not be 0".to_string()));
        }

        if self.inference.max_new_tokens == 0 {
            return Err(ConfigError::Invalid(
                "inference.max_new_tokens must be greater than 0".to_string(),
            ));
        }

        if self.inference.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "inference.timeout_ms must be greater than 0".to_string(),
            ));
        }

        KeywordResponder::new(&self.fallback)
            .map_err(|e| ConfigError::Invalid(format!("fallback table: {e}")))?;

        Ok(())
    }

    /// Sampling parameters shared by the engine and the model client
    #[allow(clippy::cast_possible_truncation)]
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.inference.max_new_tokens,
            temperature: self.model.temperature as f32,
            top_p: self.model.top_p as f32,
            do_sample: self.inference.do_sample,
        }
    }

    /// Settings for the assistant engine
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            model_name: self.model.name.clone(),
            device: self.model.device,
            max_history: self.conversation.max_history,
            generation: self.generation_params(),
            timeout: Duration::from_millis(self.inference.timeout_ms),
            system_prompt: self
                .conversation
                .system_prompt
                .clone()
                .filter(|prompt| !prompt.trim().is_empty()),
            fallback: self.fallback.clone(),
        }
    }

    /// Settings for the model server client
    pub fn inference_config(&self) -> InferenceConfig {
        let params = self.generation_params();
        InferenceConfig {
            base_url: self.model.endpoint.clone(),
            model: self.model.name.clone(),
            timeout_ms: self.inference.timeout_ms,
            max_new_tokens: params.max_new_tokens,
            max_length: self.model.max_length,
            temperature: params.temperature,
            top_p: params.top_p,
            do_sample: params.do_sample,
            keep_alive: self.inference.keep_alive.clone(),
        }
    }
}
