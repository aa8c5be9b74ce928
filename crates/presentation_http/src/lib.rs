//! Personal AI HTTP presentation layer
//!
//! Chat, session and model-management endpoints over the assistant engine.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod tasks;

pub use error::ApiError;
pub use routes::create_router;
pub use server::{build_app, run};
pub use state::AppState;
