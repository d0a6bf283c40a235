//! `GET /api/status` — the same shape the CLI's `status` command prints.

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use boxedin_core::status::StatusSnapshot;
use std::sync::Arc;

pub async fn handler(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    let snapshot = state.memory.snapshot().await;
    Json(boxedin_core::status::snapshot(&snapshot))
}
