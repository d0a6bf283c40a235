//! HTTP+SSE boundary over [`boxedin_agent::AgentLoop`] — spec.md §6.
//!
//! `GET /api/status`, `GET /api/tools`, `GET /api/run-stream` (SSE),
//! `POST /api/run`. Grounded on the pack's axum router layout, adapted
//! from its WebSocket transport to Server-Sent Events: there's exactly
//! one request/response exchange per goal, not a bidirectional session,
//! so SSE is the better fit than a persistent socket.

mod channel_reporter;
mod run;
mod state;
mod status;
mod stream;
mod tools;

pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full router over one shared [`AppState`].
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status::handler))
        .route("/api/tools", get(tools::handler))
        .route("/api/run-stream", get(stream::handler))
        .route("/api/run", post(run::handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
