//! `POST /api/run` — run one goal to completion, return `{final, logs}`.

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use boxedin_agent::AgentLoop;
use boxedin_core::ReporterEvent;
use boxedin_reporter::CollectingReporter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub goal: String,
    #[serde(default)]
    pub network: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    #[serde(rename = "final")]
    pub final_answer: Option<String>,
    pub logs: Vec<ReporterEvent>,
}

pub async fn handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Json<RunResponse> {
    let mut config = state.agent_config.clone();
    if let Some(network) = request.network {
        config.network_allowed = network;
        config.sandbox.network_allowed = network;
    }

    let collector = Arc::new(CollectingReporter::new());
    let reporter: Arc<dyn boxedin_core::Reporter> = collector.clone();
    let agent = AgentLoop::new(
        config,
        state.sandbox.clone(),
        state.planner.clone(),
        reporter,
        state.system_prompt.clone(),
    );

    let result = agent.run(&request.goal, &state.memory).await;
    let logs = collector.events().await;

    Json(RunResponse {
        final_answer: result.answer,
        logs,
    })
}
