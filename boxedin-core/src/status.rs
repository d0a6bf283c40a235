//! The status view both front-ends share — spec.md §6: "the CLI
//! `status` command and `GET /api/status` serve the same shape."

use crate::memory::MemoryState;
use serde::Serialize;

/// `{conversations, tools, lastRun}`.
#[non_exhaustive]
#[derive(Debug, Serialize)]
pub struct StatusSnapshot {
    /// Number of recorded history entries.
    pub conversations: usize,
    /// Tool ids currently in the catalog.
    pub tools: Vec<String>,
    /// The goal of the most recently completed run, if any.
    #[serde(rename = "lastRun")]
    pub last_run: Option<String>,
}

/// Build a [`StatusSnapshot`] from a memory snapshot.
pub fn snapshot(state: &MemoryState) -> StatusSnapshot {
    StatusSnapshot {
        conversations: state.history.len(),
        tools: state.tools.keys().cloned().collect(),
        last_run: state.runs.last().map(|r| r.goal.clone()),
    }
}
