//! Service description, configuration and fallback handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Routes served by this API
pub const ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /health",
    "POST /chat",
    "DELETE /sessions/{id}",
    "GET /model/info",
    "POST /model/clear-cache",
    "GET /config",
];

/// Service description
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<String>,
}

/// Describe the service
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "Personal AI Assistant".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Local conversational assistant API".to_string(),
        endpoints: endpoints(),
    })
}

/// Configuration without private sections
pub async fn config(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.config.as_ref().clone())
}

/// Unknown route body
#[derive(Debug, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub error: String,
    pub code: String,
    pub available_endpoints: Vec<String>,
}

/// Answer unknown routes with the list of known ones
pub async fn not_found() -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Endpoint not found".to_string(),
            code: "not_found".to_string(),
            available_endpoints: endpoints(),
        }),
    )
}

fn endpoints() -> Vec<String> {
    ENDPOINTS.iter().map(ToString::to_string).collect()
}
