//! Personal AI CLI
//!
//! Starts the assistant as a terminal chat or as the HTTP API.

use anyhow::Context;
use application::AssistantEngine;
use clap::Parser;
use infrastructure::{ConfigManager, LoggingConfig, PathsConfig, build_runtime, init_logging};
use presentation_cli::{Cli, Mode, log_filter_from_verbosity, run_repl};
use tokio::io::{BufReader, stdin, stdout};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = log_filter_from_verbosity(cli.verbose);

    let config = match ConfigManager::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            let _ = init_logging(&LoggingConfig::default(), &PathsConfig::default(), level);
            error!(error = %e, "Cannot start without a valid configuration");
            return Err(e).context("failed to load configuration");
        },
    };

    let settings = config.settings();
    init_logging(&settings.logging, &settings.paths, level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?cli.mode,
        config = %cli.config.display(),
        "Personal AI starting"
    );

    match cli.mode {
        Mode::Interactive => {
            let runtime = build_runtime(settings).await;
            let mut engine = AssistantEngine::new(runtime);
            let mut out = stdout();
            run_repl(&mut engine, BufReader::new(stdin()), &mut out).await?;
        },
        Mode::Api => presentation_http::run(&config).await?,
    }

    Ok(())
}
