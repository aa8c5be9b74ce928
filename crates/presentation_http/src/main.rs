//! Personal AI HTTP Server
//!
//! Main entry point for the HTTP API server.

use anyhow::Context;
use infrastructure::{ConfigManager, LoggingConfig, PathsConfig, init_logging};
use tracing::{error, info};

/// Used when `PERSONAL_AI_CONFIG` is not set
const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path =
        std::env::var("PERSONAL_AI_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = match ConfigManager::load(&path) {
        Ok(config) => config,
        Err(e) => {
            let _ = init_logging(&LoggingConfig::default(), &PathsConfig::default(), None);
            error!(error = %e, "Cannot start without a valid configuration");
            return Err(e).context("failed to load configuration");
        },
    };

    let settings = config.settings();
    init_logging(&settings.logging, &settings.paths, None)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Personal AI server starting");

    presentation_http::run(&config).await?;
    Ok(())
}
