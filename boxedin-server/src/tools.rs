//! `GET /api/tools` — the current catalog, manifest fields only.

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use boxedin_core::ToolSummary;
use std::sync::Arc;

pub async fn handler(State(state): State<Arc<AppState>>) -> Json<Vec<ToolSummary>> {
    let snapshot = state.memory.snapshot().await;
    Json(snapshot.tools.into_values().collect())
}
