//! HTTP API server configuration.

use serde::{Deserialize, Serialize};

/// HTTP API server configuration (`api` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins (empty = allow any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Graceful shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Maximum number of live chat sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Sessions idle for longer than this are discarded
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// How often idle sessions are swept
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_shutdown_timeout_secs() -> u64 {
    30
}

const fn default_max_sessions() -> usize {
    application::DEFAULT_MAX_SESSIONS
}

const fn default_session_idle_secs() -> u64 {
    30 * 60
}

const fn default_cleanup_interval_secs() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl ApiConfig {
    /// `host:port` bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.session_idle_secs, 1800);
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config: ApiConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.max_sessions, 256);
    }
}
