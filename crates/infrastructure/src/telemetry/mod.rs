//! Logging infrastructure
//!
//! Installs the `tracing` subscriber used by both binaries.

mod logging;

pub use logging::{LoggingError, init_logging, resolve_filter};
