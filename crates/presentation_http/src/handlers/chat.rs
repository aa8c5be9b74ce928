//! Chat handlers

use application::{ModelInfo, ReplySource};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use domain::{ChatMessage, DomainError, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{error::ApiError, state::AppState};

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User message
    pub message: String,
    /// Prior turns; when present the request is answered without a session
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
    /// Session to continue; a new one is created when absent
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Chat response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply
    pub reply: String,
    /// Session the exchange was recorded in; absent for stateless requests
    pub session_id: Option<String>,
    /// How the reply was produced
    pub source: ReplySource,
    /// Engine status at reply time
    pub model_info: ModelInfo,
    pub timestamp: DateTime<Utc>,
}

/// Handle a chat request
#[instrument(
    skip(state, request),
    fields(message_len = request.message.len(), stateless = request.history.is_some())
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".to_string()));
    }

    let (reply, session_id) = match request.history {
        Some(history) => {
            let mut engine = state.sessions.ephemeral(history);
            (engine.chat(&request.message).await?, None)
        },
        None => {
            let requested = request
                .session_id
                .as_deref()
                .map(SessionId::parse)
                .transpose()?;
            let (id, engine) = state.sessions.get_or_create(requested);
            let reply = engine.lock().await.chat(&request.message).await?;
            (reply, Some(id))
        },
    };

    debug!(source = ?reply.source, "Chat reply ready");

    Ok(Json(ChatResponse {
        reply: reply.text().to_string(),
        session_id: session_id.map(|id| id.to_string()),
        source: reply.source,
        model_info: state.runtime().model_info(),
        timestamp: Utc::now(),
    }))
}

/// Discard a session and its history
#[instrument(skip(state))]
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::parse(&id)?;
    if state.sessions.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DomainError::not_found("Session", id.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use domain::MessageRole;

    use super::*;

    #[test]
    fn chat_request_minimal() {
        let request: ChatRequest = serde_json::from_str(r#"{"message": "Hello"}"#).unwrap();
        assert_eq!(request.message, "Hello");
        assert!(request.history.is_none());
        assert!(request.session_id.is_none());
    }

    #[test]
    fn chat_request_with_history() {
        let json = r#"{
            "message": "And tomorrow?",
            "history": [
                {"role": "user", "content": "Weather today?"},
                {"role": "assistant", "content": "Sunny."}
            ]
        }"#;
        let request: ChatRequest = serde_json::from_str(json).unwrap();
        let history = request.history.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, MessageRole::Assistant);
    }

    #[test]
    fn chat_request_requires_message() {
        let result: Result<ChatRequest, _> = serde_json::from_str(r#"{"session_id": "x"}"#);
        assert!(result.is_err());
    }
}
