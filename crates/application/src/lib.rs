//! Application layer - Use cases and orchestration
//!
//! Contains the assistant engine, its fallback responder and the session
//! registry, plus the ports infrastructure adapters implement.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
