//! Session registry - One assistant engine per conversation session
//!
//! Requests for the same session are serialized through the engine's async
//! mutex; different sessions never share history.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use domain::{ChatMessage, SessionId};
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

use super::{assistant_engine::AssistantEngine, model_runtime::ModelRuntime};

/// Engine handle shared between requests of one session
pub type SessionHandle = Arc<AsyncMutex<AssistantEngine>>;

/// Default upper bound on live sessions
pub const DEFAULT_MAX_SESSIONS: usize = 256;

struct SessionEntry {
    engine: SessionHandle,
    last_used: Instant,
}

/// Registry of live sessions
pub struct SessionRegistry {
    runtime: Arc<ModelRuntime>,
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
    max_sessions: usize,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.len())
            .field("max_sessions", &self.max_sessions)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    /// Create an empty registry holding at most `max_sessions` sessions
    pub fn new(runtime: Arc<ModelRuntime>, max_sessions: usize) -> Self {
        Self {
            runtime,
            sessions: Mutex::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Shared model runtime
    pub const fn runtime(&self) -> &Arc<ModelRuntime> {
        &self.runtime
    }

    /// Look up a session, creating it when absent or when no id is given
    pub fn get_or_create(&self, id: Option<SessionId>) -> (SessionId, SessionHandle) {
        let id = id.unwrap_or_default();
        let mut sessions = self.sessions.lock();

        if let Some(entry) = sessions.get_mut(&id) {
            entry.last_used = Instant::now();
            return (id, Arc::clone(&entry.engine));
        }

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                debug!(session_id = %oldest, "Evicted least recently used session");
            }
        }

        let engine = Arc::new(AsyncMutex::new(AssistantEngine::new(Arc::clone(&self.runtime))));
        sessions.insert(
            id,
            SessionEntry {
                engine: Arc::clone(&engine),
                last_used: Instant::now(),
            },
        );
        debug!(session_id = %id, sessions = sessions.len(), "Created session");
        (id, engine)
    }

    /// Drop a session; returns whether it existed
    pub fn remove(&self, id: SessionId) -> bool {
        self.sessions.lock().remove(&id).is_some()
    }

    /// Drop sessions unused for longer than `max_idle`; returns how many
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_used.elapsed() <= max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Engine for a single stateless request carrying its own history
    pub fn ephemeral(&self, history: Vec<ChatMessage>) -> AssistantEngine {
        let mut engine = AssistantEngine::new(Arc::clone(&self.runtime));
        engine.seed_history(history);
        engine
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether there are no live sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
