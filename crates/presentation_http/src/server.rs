//! Server assembly and lifecycle

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method},
};
use infrastructure::{ApiConfig, ConfigManager, build_runtime};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::{routes::create_router, state::AppState, tasks::spawn_session_cleanup_task};

/// CORS policy for the configured origins; empty allows any origin
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            },
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

/// Router with tracing and CORS layers applied
pub fn build_app(state: AppState, api: &ApiConfig) -> Router {
    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&api.cors_origins))
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(app: Router, api: &ApiConfig) -> std::io::Result<()> {
    let addr = api.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Duration::from_secs(api.shutdown_timeout_secs)))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Load the model, start background tasks and serve the API
pub async fn run(config: &ConfigManager) -> std::io::Result<()> {
    let settings = config.settings();
    let api = &settings.api;

    let runtime = build_runtime(settings).await;
    let state = AppState::new(runtime, api.max_sessions, config.redacted());

    let cleanup = spawn_session_cleanup_task(
        Arc::clone(&state.sessions),
        Duration::from_secs(api.session_idle_secs),
        Duration::from_secs(api.cleanup_interval_secs.max(1)),
    );

    let result = serve(build_app(state, api), api).await;
    cleanup.abort();
    result
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    info!(timeout = ?timeout, "Waiting for connections to close");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_skips_unparseable_origins() {
        let _layer = cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
    }

    #[test]
    fn empty_origins_allow_any() {
        let _layer = cors_layer(&[]);
    }
}
