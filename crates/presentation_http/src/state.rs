//! Application state shared across handlers

use std::sync::Arc;

use application::{ModelRuntime, SessionRegistry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Live chat sessions
    pub sessions: Arc<SessionRegistry>,
    /// Configuration document served by `/config`, already redacted
    pub config: Arc<serde_json::Value>,
}

impl AppState {
    /// Create state around a model runtime
    pub fn new(runtime: Arc<ModelRuntime>, max_sessions: usize, config: serde_json::Value) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new(runtime, max_sessions)),
            config: Arc::new(config),
        }
    }

    /// Shared model runtime
    pub fn runtime(&self) -> &Arc<ModelRuntime> {
        self.sessions.runtime()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}
