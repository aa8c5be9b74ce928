//! Idle session cleanup task
//!
//! Periodically discards chat sessions nobody has used for a while.

use std::{sync::Arc, time::Duration};

use application::SessionRegistry;
use tracing::{debug, info};

/// Spawn a background task that evicts sessions idle for longer than `max_idle`.
///
/// Returns a `JoinHandle` that can be used to abort the task when shutting down.
pub fn spawn_session_cleanup_task(
    sessions: Arc<SessionRegistry>,
    max_idle: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    info!(
        max_idle_secs = max_idle.as_secs(),
        interval_secs = interval.as_secs(),
        "Starting session cleanup task"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Don't run immediately on startup
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let evicted = sessions.evict_idle(max_idle);
            debug!(evicted, remaining = sessions.len(), "Session cleanup pass");
        }
    })
}

#[cfg(test)]
mod tests {
    use application::{EngineSettings, ModelRuntime};

    use super::*;

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let runtime = Arc::new(ModelRuntime::fallback(EngineSettings::default(), "test"));
        let sessions = Arc::new(SessionRegistry::new(runtime, 8));
        sessions.get_or_create(None);
        sessions.get_or_create(None);

        let handle = spawn_session_cleanup_task(
            Arc::clone(&sessions),
            Duration::from_millis(1),
            Duration::from_millis(10),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn active_sessions_survive() {
        let runtime = Arc::new(ModelRuntime::fallback(EngineSettings::default(), "test"));
        let sessions = Arc::new(SessionRegistry::new(runtime, 8));
        sessions.get_or_create(None);

        let handle = spawn_session_cleanup_task(
            Arc::clone(&sessions),
            Duration::from_secs(3600),
            Duration::from_millis(10),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(sessions.len(), 1);
    }
}
