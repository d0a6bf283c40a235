//! Durable conversation/run state.

use crate::plan::RunResult;
use crate::tool::ToolSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who authored a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    User,
    /// The agent itself.
    Assistant,
    /// Internal bookkeeping (e.g. summarization markers).
    System,
}

/// One turn of conversation history. Append-only.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Who said it.
    pub role: Role,
    /// What was said.
    pub content: String,
    /// Epoch milliseconds.
    pub ts: i64,
}

impl HistoryEntry {
    /// Create a new history entry stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            ts: crate::util::now_ms(),
        }
    }
}

/// One completed agent run, recorded after `AgentLoop::Persist`.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// The natural-language goal the run was for.
    pub goal: String,
    /// The plan's step descriptions (as produced by the planner).
    pub steps: Vec<String>,
    /// Every recorded [`RunResult`] for this run's tool calls.
    pub result: Vec<RunResult>,
    /// Epoch milliseconds.
    pub ts: i64,
}

/// Process-wide durable state: the tool catalog summary, conversation
/// history, and run log. The sole writer is `AgentLoop`.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryState {
    /// Manifest-level tool summaries, keyed by tool id. Refreshed from
    /// disk on every load — the on-disk catalog is authoritative.
    #[serde(default)]
    pub tools: BTreeMap<String, ToolSummary>,
    /// Ordered conversation history.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Ordered run log.
    #[serde(default)]
    pub runs: Vec<RunRecord>,
}

impl MemoryState {
    /// Append a history entry.
    pub fn add_history(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(HistoryEntry::new(role, content));
    }

    /// Non-mutating summary of `history`: if it fits within `max`
    /// entries, return it verbatim; otherwise synthesize one system
    /// entry noting how many earlier turns were omitted, followed by
    /// the last `max` entries.
    pub fn summarize_history(&self, max: usize) -> Vec<HistoryEntry> {
        if self.history.len() <= max {
            return self.history.clone();
        }
        let omitted = self.history.len() - max;
        let mut out = Vec::with_capacity(max + 1);
        out.push(HistoryEntry {
            role: Role::System,
            content: format!("{omitted} earlier turns omitted"),
            ts: self.history[self.history.len() - max - 1].ts,
        });
        out.extend(self.history[self.history.len() - max..].iter().cloned());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_under_max_is_identity() {
        let mut mem = MemoryState::default();
        for i in 0..5 {
            mem.add_history(Role::User, format!("turn {i}"));
        }
        let summary = mem.summarize_history(40);
        assert_eq!(summary.len(), 5);
    }

    #[test]
    fn summarize_over_max_prepends_marker() {
        let mut mem = MemoryState::default();
        for i in 0..50 {
            mem.add_history(Role::User, format!("turn {i}"));
        }
        let summary = mem.summarize_history(40);
        assert_eq!(summary.len(), 41);
        assert_eq!(summary[0].role, Role::System);
        assert!(summary[0].content.contains("10 earlier turns omitted"));
        assert_eq!(summary[1].content, "turn 10");
        assert_eq!(summary.last().unwrap().content, "turn 49");
    }

    #[test]
    fn summarize_is_non_mutating() {
        let mut mem = MemoryState::default();
        for i in 0..50 {
            mem.add_history(Role::User, format!("turn {i}"));
        }
        let before = mem.history.len();
        let _ = mem.summarize_history(40);
        assert_eq!(mem.history.len(), before);
    }

    #[test]
    fn summarize_exact_boundary() {
        let mut mem = MemoryState::default();
        for i in 0..40 {
            mem.add_history(Role::User, format!("turn {i}"));
        }
        assert_eq!(mem.summarize_history(40).len(), 40);
    }
}
