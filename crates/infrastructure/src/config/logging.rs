//! Logging and filesystem path configuration.

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration (`logging` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: TRACE, DEBUG, INFO, WARN or ERROR
    #[serde(default = "default_level")]
    pub level: String,

    /// Line format
    #[serde(default)]
    pub format: LogFormat,

    /// Log file name under `paths.logs_dir`; console only when unset
    #[serde(default)]
    pub file: Option<String>,
}

fn default_level() -> String {
    "INFO".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Level as a tracing filter directive
    pub fn filter_directive(&self) -> &'static str {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" | "warning" => "warn",
            "error" | "critical" => "error",
            "off" => "off",
            _ => "info",
        }
    }
}

/// Filesystem locations (`paths` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            model_dir: default_model_dir(),
            logs_dir: default_logs_dir(),
            cache_dir: default_cache_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_map_to_directives() {
        let mut config = LoggingConfig::default();
        assert_eq!(config.filter_directive(), "info");

        config.level = "WARNING".to_string();
        assert_eq!(config.filter_directive(), "warn");

        config.level = "Debug".to_string();
        assert_eq!(config.filter_directive(), "debug");

        config.level = "CRITICAL".to_string();
        assert_eq!(config.filter_directive(), "error");

        config.level = "loud".to_string();
        assert_eq!(config.filter_directive(), "info");
    }

    #[test]
    fn format_parses_lowercase() {
        let config: LoggingConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "INFO");
    }

    #[test]
    fn default_paths() {
        let paths = PathsConfig::default();
        assert_eq!(paths.logs_dir, PathBuf::from("./logs"));
        assert_eq!(paths.model_dir, PathBuf::from("./models"));
    }
}
