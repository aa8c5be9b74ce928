//! Logging initialization
//!
//! Console output in text or JSON, plus an optional plain-text copy written
//! to a file under the configured logs directory.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingConfig, PathsConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Errors during logging initialization
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log file or its directory could not be created
    #[error("Failed to open log file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber is already installed
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

/// Filter directive for the subscriber
///
/// `RUST_LOG` wins when set; otherwise `level_override` (from the command
/// line) or the configured level applies.
pub fn resolve_filter(logging: &LoggingConfig, level_override: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_override.unwrap_or_else(|| logging.filter_directive());
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
    })
}

/// Install the global subscriber
///
/// Returns the log file path when file output is enabled.
pub fn init_logging(
    logging: &LoggingConfig,
    paths: &PathsConfig,
    level_override: Option<&str>,
) -> Result<Option<PathBuf>, LoggingError> {
    let filter = resolve_filter(logging, level_override);

    let mut layers: Vec<BoxedLayer> = vec![console_layer(logging.format)];

    let log_file = match &logging.file {
        Some(name) => {
            let path = paths.logs_dir.join(name);
            layers.push(file_layer(logging.format, &path)?);
            Some(path)
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    info!(
        format = %logging.format,
        file = ?log_file,
        "Logging initialized"
    );
    Ok(log_file)
}

fn console_layer(format: LogFormat) -> BoxedLayer {
    let layer = fmt::layer().with_target(true);
    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

fn file_layer(format: LogFormat, path: &Path) -> Result<BoxedLayer, LoggingError> {
    let file_error = |source| LoggingError::File {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(file_error)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(file_error)?;

    let layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));
    Ok(match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    })
}
