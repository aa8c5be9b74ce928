//! Model status and maintenance handlers

use application::ModelInfo;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

/// Report the engine state
pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.runtime().model_info())
}

/// Cache clear outcome
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    /// Whether accelerator memory was released
    pub cleared: bool,
    pub message: String,
}

/// Release model weights held on the accelerator
#[instrument(skip(state))]
pub async fn clear_cache(
    State(state): State<AppState>,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    let cleared = state.runtime().clear_cache().await?;
    let message = if cleared {
        "Accelerator cache cleared"
    } else {
        "No accelerator cache to clear"
    };

    Ok(Json(ClearCacheResponse {
        cleared,
        message: message.to_string(),
    }))
}
