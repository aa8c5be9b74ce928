//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the model server
//! adapters and host device probe, plus configuration loading, logging and
//! startup wiring.

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use bootstrap::{build_runtime, build_runtime_with};
pub use config::{
    ApiConfig, AppConfig, ConfigError, ConfigManager, EnvSource, LogFormat, LoggingConfig,
    PathsConfig, ProcessEnv,
};
pub use telemetry::{LoggingError, init_logging};
