//! HTTP server setup and routing

use super::handlers;
use crate::commentary::Announcer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::party::Party;
use crate::store::SaveHandle;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application context passed to all handlers
///
/// AppContext implements Clone, which gives us `FromRef<AppContext>` for
/// free via Axum's blanket implementation.
#[derive(Clone)]
pub struct AppContext {
    /// All mutable party state behind one lock. Every transition holds it
    /// for its full read-then-write, which is what keeps "at most one
    /// current" true and event order equal to transition order.
    pub party: Arc<Mutex<Party>>,
    pub events: EventBus,
    pub announcer: Arc<Announcer>,
    pub saver: SaveHandle,
    pub config: Arc<Config>,
}

/// Build the router with all routes
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health))
        // Queue and guests
        .route("/queue", get(handlers::get_queue))
        .route("/guest/:device_id", get(handlers::get_guest))
        .route("/guest/register", post(handlers::register_guest))
        // Song submission and crowd reactions
        .route("/songs", post(handlers::submit_song))
        .route("/reaction", post(handlers::send_reaction))
        .route("/personas", get(handlers::list_personas))
        // KJ controls
        .route("/kj/start", post(handlers::kj_start))
        .route("/kj/advance", post(handlers::kj_advance))
        .route("/kj/skip", post(handlers::kj_skip))
        .route("/kj/pause", post(handlers::kj_pause))
        .route("/kj/reset", post(handlers::kj_reset))
        .route("/kj/remove/:song_id", post(handlers::kj_remove))
        .route("/kj/move", post(handlers::kj_move))
        // Guest self-service
        .route("/song/start", post(handlers::self_start))
        .route("/song/done", post(handlers::self_done))
        // VIP powers
        .route("/vip/skip", post(handlers::vip_skip))
        // SSE event stream
        .route("/events", get(super::sse::event_stream))
        // Attach application context
        .with_state(ctx)
        // Enable CORS so phones on the party Wi-Fi can hit any surface
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server until a shutdown signal arrives
pub async fn run(ctx: AppContext) -> Result<()> {
    let port = ctx.config.port;
    let app = build_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM. An arm whose handler cannot be
/// installed parks forever rather than resolving and stopping the server.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}
