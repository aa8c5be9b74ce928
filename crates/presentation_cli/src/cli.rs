//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Personal AI Assistant
#[derive(Debug, Parser)]
#[command(name = "personal-ai")]
#[command(author, version, about = "Personal AI Assistant", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, env = "PERSONAL_AI_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Run mode
    #[arg(short, long, value_enum, default_value_t = Mode::Interactive)]
    pub mode: Mode,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// How the assistant is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Chat on the terminal
    Interactive,
    /// Serve the HTTP API
    Api,
}

/// Log filter for a verbosity count; `None` keeps the configured level
pub const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_verbosity_zero_keeps_config() {
        assert_eq!(log_filter_from_verbosity(0), None);
    }

    #[test]
    fn log_filter_verbosity_levels() {
        assert_eq!(log_filter_from_verbosity(1), Some("info"));
        assert_eq!(log_filter_from_verbosity(2), Some("debug"));
        assert_eq!(log_filter_from_verbosity(3), Some("trace"));
        assert_eq!(log_filter_from_verbosity(255), Some("trace"));
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
