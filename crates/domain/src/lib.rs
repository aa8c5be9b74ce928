//! Domain layer for the personal assistant
//!
//! Contains the conversation model, session identity, compute devices and
//! domain errors. This layer has no knowledge of model servers or transports.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
