//! Assistant engine - One conversation with bounded memory
//!
//! Each engine owns its history exclusively and shares the model runtime.

use std::{fmt, sync::Arc};

use domain::{ChatMessage, ConversationHistory, Device, DomainError};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::model_runtime::{EngineState, ModelInfo, ModelRuntime, reply_metadata};
use crate::{error::ApplicationError, ports::InferencePort};

/// Reply used when the model produces no text
pub const EMPTY_GENERATION_REPLY: &str = "I'm not sure how to respond to that.";

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    /// Generated by the loaded model
    Model,
    /// Keyword table, engine is in fallback mode
    Fallback,
    /// Keyword table after a failed or timed out generation
    Degraded,
}

/// A reply together with its provenance
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Assistant turn appended to the history
    pub message: ChatMessage,
    /// How the reply was produced
    pub source: ReplySource,
}

impl ChatReply {
    /// Reply text
    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Conversational engine for a single session
pub struct AssistantEngine {
    runtime: Arc<ModelRuntime>,
    history: ConversationHistory,
}

impl fmt::Debug for AssistantEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantEngine")
            .field("history_len", &self.history.len())
            .field("fallback", &self.runtime.is_fallback())
            .finish_non_exhaustive()
    }
}

impl AssistantEngine {
    /// Create an engine with empty history
    pub fn new(runtime: Arc<ModelRuntime>) -> Self {
        let history = ConversationHistory::new(runtime.settings().max_history);
        Self { runtime, history }
    }

    /// Reply to a user message and record the exchange.
    ///
    /// Only empty input is an error; generation failures degrade to a
    /// keyword reply.
    #[instrument(skip(self, message), fields(message_len = message.len(), history_len = self.history.len()))]
    pub async fn chat(&mut self, message: &str) -> Result<ChatReply, ApplicationError> {
        if message.trim().is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }

        let (reply, source) = match self.runtime.state() {
            EngineState::ModelLoaded { model, device } => {
                let model = Arc::clone(model);
                self.generate_reply(&model, *device, message).await
            },
            EngineState::FallbackMode { .. } => (
                ChatMessage::assistant(self.runtime.responder().respond(message)),
                ReplySource::Fallback,
            ),
        };

        self.history
            .record_exchange(ChatMessage::user(message), reply.clone());
        debug!(source = ?source, history_len = self.history.len(), "Reply recorded");

        Ok(ChatReply {
            message: reply,
            source,
        })
    }

    async fn generate_reply(
        &self,
        model: &Arc<dyn InferencePort>,
        device: Device,
        message: &str,
    ) -> (ChatMessage, ReplySource) {
        let prompt = self.runtime.prompts().build(self.history.turns(), message);

        let err = match self.runtime.generate_on(model, &prompt, device).await {
            Ok(result) => return (Self::model_reply(&result, device), ReplySource::Model),
            Err(err) => err,
        };

        if err.is_retryable() {
            if let Some(lower) = self.runtime.retry_device(device) {
                warn!(error = %err, device = %device, retry_device = %lower, "Generation failed, retrying on lower tier");
                match self.runtime.generate_on(model, &prompt, lower).await {
                    Ok(result) => return (Self::model_reply(&result, lower), ReplySource::Model),
                    Err(retry_err) => {
                        warn!(error = %retry_err, device = %lower, "Retry failed, using fallback reply");
                    },
                }
            } else {
                warn!(error = %err, device = %device, "Generation failed, using fallback reply");
            }
        } else {
            warn!(error = %err, device = %device, "Generation aborted, using fallback reply");
        }

        (
            ChatMessage::assistant(self.runtime.responder().respond(message)),
            ReplySource::Degraded,
        )
    }

    fn model_reply(result: &crate::ports::InferenceResult, device: Device) -> ChatMessage {
        let content = result.content.trim();
        let content = if content.is_empty() {
            EMPTY_GENERATION_REPLY
        } else {
            content
        };
        ChatMessage::assistant(content).with_metadata(reply_metadata(result, device))
    }

    /// Forget every turn
    pub fn clear(&mut self) {
        self.history.clear();
        debug!("Conversation history cleared");
    }

    /// Current history
    pub const fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Replace the history with caller-supplied turns
    pub fn seed_history(&mut self, turns: impl IntoIterator<Item = ChatMessage>) {
        self.history.seed(turns);
    }

    /// Model status
    pub fn model_info(&self) -> ModelInfo {
        self.runtime.model_info()
    }

    /// Shared runtime
    pub const fn runtime(&self) -> &Arc<ModelRuntime> {
        &self.runtime
    }
}
