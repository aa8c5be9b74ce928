//! Domain entities - Objects with identity and lifecycle

mod chat_message;
mod conversation_history;

pub use chat_message::{ChatMessage, MessageMetadata, MessageRole};
pub use conversation_history::{ConversationHistory, DEFAULT_MAX_EXCHANGES};
