//! `GET /api/run-stream` — the same run, as Server-Sent Events:
//! `plan`/`createTools`/`runStart`/`runChunk`/`runEnd`/`result`/
//! `complete`/`error`, one per [`ReporterEvent`] (spec.md §6).

use crate::channel_reporter::ChannelReporter;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use boxedin_agent::AgentLoop;
use boxedin_core::ReporterEvent;
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Deserialize)]
pub struct RunStreamQuery {
    pub goal: String,
    #[serde(default)]
    pub network: Option<bool>,
}

fn event_name(event: &ReporterEvent) -> &'static str {
    match event {
        ReporterEvent::Plan { .. } => "plan",
        ReporterEvent::CreateTools { .. } => "createTools",
        ReporterEvent::RunStart { .. } => "runStart",
        ReporterEvent::RunChunk { .. } => "runChunk",
        ReporterEvent::RunEnd { .. } => "runEnd",
        ReporterEvent::Result { .. } => "result",
        ReporterEvent::Done { .. } => "complete",
        ReporterEvent::Error { .. } => "error",
    }
}

fn to_sse_event(event: ReporterEvent, connection_id: uuid::Uuid, seq: u64) -> Event {
    let name = event_name(&event);
    let data = serde_json::to_string(&event).unwrap_or_default();
    Event::default()
        .id(format!("{connection_id}-{seq}"))
        .event(name)
        .data(data)
}

pub async fn handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RunStreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut config = state.agent_config.clone();
    if let Some(network) = query.network {
        config.network_allowed = network;
        config.sandbox.network_allowed = network;
    }

    let connection_id = uuid::Uuid::new_v4();
    tracing::info!(%connection_id, goal = %query.goal, "run-stream connection opened");

    let (tx, rx) = mpsc::unbounded_channel();
    let reporter: Arc<dyn boxedin_core::Reporter> = Arc::new(ChannelReporter(tx));
    let agent = AgentLoop::new(
        config,
        state.sandbox.clone(),
        state.planner.clone(),
        reporter,
        state.system_prompt.clone(),
    );

    let memory = state.memory.clone();
    tokio::spawn(async move {
        agent.run(&query.goal, &memory).await;
    });

    let events = stream::unfold((rx, connection_id, 0u64), |(mut rx, id, seq)| async move {
        rx.recv()
            .await
            .map(|event| (Ok(to_sse_event(event, id, seq)), (rx, id, seq + 1)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
