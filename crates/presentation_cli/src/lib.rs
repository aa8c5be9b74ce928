//! Personal AI command-line front end
//!
//! Argument parsing and the interactive chat loop.

pub mod cli;
pub mod repl;

pub use cli::{Cli, DEFAULT_CONFIG_PATH, Mode, log_filter_from_verbosity};
pub use repl::{ReplCommand, parse_line, run_repl};
