//! Environment variable lookup for configuration overrides
//!
//! A dotted key maps to an upper-case variable with dots replaced by
//! underscores: `model.temperature` is overridden by `MODEL_TEMPERATURE`.

use std::collections::HashMap;

/// Source of environment variables
pub trait EnvSource: Send + Sync {
    /// Value of the variable, if set
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Environment variable that overrides a dotted configuration key
pub fn env_var_name(key: &str) -> String {
    key.replace('.', "_").to_ascii_uppercase()
}

/// Parse a boolean from common truthy and falsy words
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
