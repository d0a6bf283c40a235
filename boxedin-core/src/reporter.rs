//! The Reporter interface — best-effort progress events.

use crate::plan::{Plan, RunResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One progress event an [`AgentLoop`](crate) implementation emits.
///
/// Reporter events are strictly ordered within one goal: `RunStart(id)`
/// precedes any `RunChunk(id, ..)`, all of which precede `RunEnd(id)`.
/// A single call may emit a second
/// `RunStart`/`RunEnd` pair for its AutoFix retry.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReporterEvent {
    /// A plan was produced (after `PlanParser` succeeds).
    Plan {
        /// The parsed plan.
        plan: Plan,
    },
    /// Tools were materialized for this goal.
    CreateTools {
        /// Ids of the tools that were created.
        created: Vec<String>,
    },
    /// A sandboxed run started.
    RunStart {
        /// The tool id.
        id: String,
    },
    /// A chunk of output arrived for a running tool.
    RunChunk {
        /// The tool id.
        id: String,
        /// `"stdout"` or `"stderr"`.
        stream: String,
        /// The chunk, lossily decoded as UTF-8.
        data: String,
    },
    /// A sandboxed run ended.
    RunEnd {
        /// The tool id.
        id: String,
        /// Exit code.
        code: i32,
    },
    /// One call's final recorded [`RunResult`].
    Result {
        /// The result.
        result: RunResult,
    },
    /// The goal finished; `answer` is the natural-language response.
    Done {
        /// The final answer, if one was produced.
        answer: Option<String>,
    },
    /// A non-fatal error surfaced during the run (e.g. a
    /// `PersistenceError`).
    Error {
        /// The error message.
        message: String,
    },
}

/// A capability that receives [`ReporterEvent`]s. All methods are
/// best-effort: a `Reporter` must never be required for correctness —
/// `AgentLoop` runs identically with no reporter attached at all.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Handle one event. Errors are swallowed by the caller — a
    /// misbehaving reporter never interrupts the agent loop.
    async fn on_event(&self, event: ReporterEvent);
}

/// A [`Reporter`] that does nothing. The zero value for "no observer
/// attached".
pub struct NullReporter;

#[async_trait]
impl Reporter for NullReporter {
    async fn on_event(&self, _event: ReporterEvent) {}
}
