//! Health check handler

use application::ModelStatus;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether a model is loaded or replies come from the keyword table
    pub model_status: ModelStatus,
    /// Whether the model server answers; always `false` in fallback mode
    pub model_reachable: bool,
    pub timestamp: DateTime<Utc>,
}

/// Liveness check; the server answers even in fallback mode
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let runtime = state.runtime();
    let model_reachable = runtime.is_healthy().await;
    if !model_reachable && !runtime.is_fallback() {
        warn!("Model server is not reachable");
    }

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_status: runtime.model_info().status,
        model_reachable,
        timestamp: Utc::now(),
    })
}
