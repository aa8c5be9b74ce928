//! Route definitions

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::health::health_check))
        // Chat API
        .route("/chat", post(handlers::chat::chat))
        .route("/sessions/{id}", delete(handlers::chat::reset_session))
        // Model management
        .route("/model/info", get(handlers::model::model_info))
        .route("/model/clear-cache", post(handlers::model::clear_cache))
        .route("/config", get(handlers::system::config))
        .fallback(handlers::system::not_found)
        // Attach state
        .with_state(state)
}
