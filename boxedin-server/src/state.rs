//! Shared process state handed to every axum handler.

use boxedin_agent::AgentConfig;
use boxedin_core::{PlanGenerator, Sandbox};
use boxedin_memory::Memory;
use std::sync::Arc;

/// State shared across every connection. One `Memory` per process
/// (spec.md §4.2); each inbound request gets its own `Reporter`
/// subscription rather than a shared broadcast channel (`SPEC_FULL.md`
/// §9 Open Question: per-connection reporters, not process-wide).
pub struct AppState {
    /// Durable state, shared by every handler.
    pub memory: Arc<Memory>,
    /// Sandboxed execution backend.
    pub sandbox: Arc<dyn Sandbox>,
    /// The plan-generating transport.
    pub planner: Arc<dyn PlanGenerator>,
    /// Resource limits and prompt tunables applied to every goal.
    pub agent_config: AgentConfig,
    /// System prompt handed to the planner.
    pub system_prompt: String,
}
