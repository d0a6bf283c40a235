//! Plan/RunResult types.

use crate::tool::{Language, Param};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A new tool the planner wants materialized before the run chain
/// executes.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Caller-supplied id. If absent, `AgentLoop::MaterializeTools`
    /// derives one from `name`.
    #[serde(default)]
    pub id: Option<String>,
    /// Human-facing name.
    pub name: String,
    /// Implementation language.
    pub language: Language,
    /// Entry file path, relative to the tool directory. If absent,
    /// defaults per [`Language::default_entry`].
    #[serde(default)]
    pub entry: Option<String>,
    /// What the tool is for.
    #[serde(default)]
    pub purpose: String,
    /// Source files to write, keyed by path relative to the tool
    /// directory.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    /// Declared inputs.
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// Declared outputs.
    #[serde(default)]
    pub outputs: Vec<Param>,
    /// Free-form usage notes.
    #[serde(default)]
    pub usage: String,
}

/// One ordered call in the run chain.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCall {
    /// The tool id to invoke.
    pub id: String,
    /// Templated argv, expanded before the run.
    #[serde(default)]
    pub args: Vec<String>,
    /// Templated stdin. `None` means "pipe the previous successful
    /// run's stdout"; `Some(String::new())` means "pass empty stdin
    /// explicitly".
    #[serde(default)]
    pub stdin: Option<String>,
}

/// The duck-typed plan produced by the planner for one goal.
///
/// `plan` is treated as an opaque value for display — implementers only
/// branch on the presence of `create_tools`/`run`.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Opaque description, string or nested object.
    #[serde(default)]
    pub plan: serde_json::Value,
    /// Human-readable step descriptions.
    #[serde(default)]
    pub steps: Vec<String>,
    /// New tools to materialize before the run chain.
    #[serde(default, rename = "createTools")]
    pub create_tools: Vec<ToolSpec>,
    /// Ordered tool invocations.
    #[serde(default)]
    pub run: Vec<RunCall>,
}

impl Plan {
    /// True when both `create_tools` and `run` are empty — the
    /// condition that triggers `AgentLoop::RefinePlan`.
    pub fn is_empty_plan(&self) -> bool {
        self.create_tools.is_empty() && self.run.is_empty()
    }

    /// The fallback plan substituted when the planner produced no
    /// parseable output at all.
    pub fn fallback() -> Self {
        Plan {
            plan: serde_json::Value::String("no plan produced".into()),
            steps: Vec::new(),
            create_tools: Vec::new(),
            run: Vec::new(),
        }
    }
}

/// The result of one sandboxed tool invocation.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// The tool id that was invoked.
    pub id: String,
    /// The expanded argv actually passed to the tool.
    #[serde(default)]
    pub args: Vec<String>,
    /// Exit code, or `-1` if the process failed to start.
    pub code: i32,
    /// Captured stdout.
    #[serde(default)]
    pub stdout: String,
    /// Captured stderr.
    #[serde(default)]
    pub stderr: String,
    /// Path to the per-run log file.
    #[serde(default)]
    pub log_file: String,
    /// Set when this result came from an AutoFix retry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<bool>,
    /// Why a retry happened (e.g. `"auto-install-python"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set when the referenced tool id could not be found — the call
    /// is still recorded, the overall run still succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    /// Build a "tool not found" placeholder result.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            args: Vec::new(),
            code: -1,
            stdout: String::new(),
            stderr: String::new(),
            log_file: String::new(),
            retry: None,
            reason: None,
            error: Some("Tool not found".to_string()),
        }
    }
}
