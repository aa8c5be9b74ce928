//! Application services - Use case implementations

mod assistant_engine;
mod keyword_responder;
mod model_runtime;
mod prompt_builder;
mod session_registry;

pub use assistant_engine::{AssistantEngine, ChatReply, EMPTY_GENERATION_REPLY, ReplySource};
pub use keyword_responder::{CATCH_ALL, FallbackTable, KeywordResponder, KeywordRule};
pub use model_runtime::{
    EngineSettings, EngineState, ModelInfo, ModelRuntime, ModelStatus, select_device,
};
pub use prompt_builder::{PromptBuilder, USER_TURN_STOP};
pub use session_registry::{DEFAULT_MAX_SESSIONS, SessionHandle, SessionRegistry};
