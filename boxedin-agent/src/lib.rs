#![deny(missing_docs)]
//! `AgentLoop` — the agent orchestration state machine, spec.md §4.6.
//!
//! ```text
//! Init -> Plan -> [RefinePlan?] -> MaterializeTools -> RunChain -> (AutoFix?)* -> Answer -> Persist -> Done
//! ```
//!
//! `AgentLoop` never returns `Err` (spec.md §7, Propagation policy): every
//! failure mode short-circuits into an [`AgentResult`] field (an empty
//! plan, a `"Tool not found"` result, a swallowed answer) rather than a
//! `Result::Err`. Boundary adapters (`boxedin-cli`, `boxedin-server`)
//! translate `PersistenceError`s surfaced via [`boxedin_core::ReporterEvent::Error`]
//! into their own transports.

mod autofix;
mod exec;
mod materialize;
mod run_chain;
mod template;

pub use template::expand as expand_template;

use boxedin_core::plan::{Plan, RunResult};
use boxedin_core::provider::{PlanGenerator, PlanMessage, PlanRequest};
use boxedin_core::reporter::{Reporter, ReporterEvent};
use boxedin_core::sandbox::{Sandbox, SandboxConfig};
use boxedin_core::{util, Role, RunRecord};
use boxedin_memory::Memory;
use std::sync::Arc;

/// The last `N` history entries embedded in the Plan step's prompt
/// (spec.md §4.6, "the last 20 summarized history entries").
pub const PLAN_HISTORY_ENTRIES: usize = 20;
/// Each history entry's content is truncated to this many characters
/// before being embedded in the Plan prompt (spec.md §4.6).
pub const PLAN_HISTORY_TRUNCATE_CHARS: usize = 500;
/// `Memory::SummarizeHistory`'s default cutoff (spec.md §4.2).
pub const SUMMARIZE_MAX: usize = 40;
/// Temperature for the initial Plan call (spec.md §4.6).
pub const PLAN_TEMPERATURE: f32 = 0.2;
/// Temperature for the RefinePlan call (spec.md §4.6).
pub const REFINE_TEMPERATURE: f32 = 0.3;
/// `stdout` excerpt length fed to the Answer step (spec.md §4.6).
pub const ANSWER_STDOUT_CHARS: usize = 2_000;
/// `stderr` excerpt length fed to the Answer step (spec.md §4.6).
pub const ANSWER_STDERR_CHARS: usize = 1_000;

/// System prompt handed to the planner when the caller doesn't supply
/// one of its own. A reference default — callers are free to override
/// it entirely; `AgentLoop` treats it as an opaque string.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are boxedin, an autonomous agent. Given a goal, decide which small python or node tools to create and in what order to run them, then respond with exactly one fenced ```json code block containing the plan.";

/// Tunables named in `SPEC_FULL.md` §4.6 — every magic number spec.md
/// calls out by value ("20", "500", "40", "0.2/0.3", "2,000", "1,000")
/// is a named field here, never a bare literal in the loop body.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Resource limits and network policy applied to every sandboxed run.
    pub sandbox: SandboxConfig,
    /// Context window, in tokens, handed to the `PlanGenerator` transport
    /// for its own prompt-trimming (spec.md §4.4). `AgentLoop` itself
    /// never trims; this is forwarded for the transport's use.
    pub context_window: usize,
    /// History entries embedded in the Plan prompt. Defaults to
    /// [`PLAN_HISTORY_ENTRIES`].
    pub max_history_for_prompt: usize,
    /// Per-entry truncation applied before embedding history in the
    /// Plan prompt. Defaults to [`PLAN_HISTORY_TRUNCATE_CHARS`].
    pub history_truncate_chars: usize,
    /// Cutoff used by `Memory::SummarizeHistory` elsewhere in the
    /// workspace (status views, etc). Defaults to [`SUMMARIZE_MAX`].
    pub summarize_max: usize,
    /// Whether outbound network access is permitted for this goal —
    /// gates the AutoFix dependency heuristic and dependency bootstrap.
    pub network_allowed: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            sandbox: SandboxConfig::default(),
            context_window: 8_192,
            max_history_for_prompt: PLAN_HISTORY_ENTRIES,
            history_truncate_chars: PLAN_HISTORY_TRUNCATE_CHARS,
            summarize_max: SUMMARIZE_MAX,
            network_allowed: false,
        }
    }
}

/// What one call to [`AgentLoop::run`] produced — the "Result object
/// containing per-run statuses and an optional answer" spec.md §7
/// describes. `AgentLoop` never throws; every failure mode is folded
/// into one of these fields instead of an `Err`.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct AgentResult {
    /// The plan that was executed (possibly [`Plan::fallback`]).
    pub plan: Plan,
    /// Ids of tools materialized for this goal.
    pub created: Vec<String>,
    /// Every recorded run result, in `plan.run` order.
    pub results: Vec<RunResult>,
    /// The natural-language answer, if the Answer step produced one.
    pub answer: Option<String>,
}

/// The orchestration loop: one instance per process, `run` once per goal.
///
/// Constructed from `Arc<dyn Trait>` protocol objects and no other
/// global state, so a test can swap in a scripted `PlanGenerator` and
/// the local `Sandbox` backend without touching any of this crate's
/// internals.
pub struct AgentLoop {
    config: AgentConfig,
    sandbox: Arc<dyn Sandbox>,
    planner: Arc<dyn PlanGenerator>,
    reporter: Arc<dyn Reporter>,
    system_prompt: String,
}

impl AgentLoop {
    /// Construct a loop over the given protocol objects.
    pub fn new(
        config: AgentConfig,
        sandbox: Arc<dyn Sandbox>,
        planner: Arc<dyn PlanGenerator>,
        reporter: Arc<dyn Reporter>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            config,
            sandbox,
            planner,
            reporter,
            system_prompt: system_prompt.into(),
        }
    }

    /// Run one goal to completion: Init -> Plan -> RefinePlan? ->
    /// MaterializeTools -> RunChain -> Answer -> Persist.
    pub async fn run(&self, goal: &str, memory: &Memory) -> AgentResult {
        memory.add_history(Role::User, goal).await;

        let mut catalog = memory.tool_store().load().await.unwrap_or_default();
        let tools_description = boxedin_tools::ToolStore::to_prompt(&catalog);
        let history = memory.summarize_history(self.config.max_history_for_prompt).await;

        let plan_request = PlanRequest {
            system_prompt: self.system_prompt.clone(),
            messages: vec![PlanMessage::new(
                "user",
                self.planning_message(goal, &history),
            )],
            temperature: PLAN_TEMPERATURE,
            tools_description: Some(tools_description.clone()),
        };

        let mut plan = match self.planner.complete(plan_request).await {
            Ok(text) => boxedin_planner::extract(&text).unwrap_or_else(Plan::fallback),
            Err(_) => Plan::fallback(),
        };

        if plan.is_empty_plan() {
            let refine_request = PlanRequest {
                system_prompt: self.system_prompt.clone(),
                messages: vec![PlanMessage::new("user", self.refine_message(goal, &history))],
                temperature: REFINE_TEMPERATURE,
                tools_description: Some(tools_description),
            };
            if let Ok(text) = self.planner.complete(refine_request).await {
                if let Some(refined) = boxedin_planner::extract(&text) {
                    plan = refined;
                }
            }
        }

        self.reporter
            .on_event(ReporterEvent::Plan { plan: plan.clone() })
            .await;

        let created = materialize::materialize_tools(
            memory.tool_store(),
            memory,
            &mut catalog,
            &plan.create_tools,
        )
        .await;
        self.reporter
            .on_event(ReporterEvent::CreateTools {
                created: created.clone(),
            })
            .await;

        let results = run_chain::run_chain(
            &self.config,
            &self.sandbox,
            &self.reporter,
            &self.planner,
            memory.tool_store(),
            &self.system_prompt,
            &catalog,
            &plan.run,
        )
        .await;

        let answer = self.produce_answer(goal, &plan, results.last()).await;
        self.reporter
            .on_event(ReporterEvent::Done {
                answer: answer.clone(),
            })
            .await;

        let result_json = serde_json::to_string(&results).unwrap_or_default();
        memory.add_history(Role::Assistant, result_json).await;
        memory
            .add_run(RunRecord {
                goal: goal.to_string(),
                steps: plan.steps.clone(),
                result: results.clone(),
                ts: util::now_ms(),
            })
            .await;

        if let Err(e) = memory.save().await {
            self.reporter
                .on_event(ReporterEvent::Error {
                    message: e.to_string(),
                })
                .await;
        }

        AgentResult {
            plan,
            created,
            results,
            answer,
        }
    }

    fn planning_message(&self, goal: &str, history: &[boxedin_core::HistoryEntry]) -> String {
        let mut out = format!("Goal: {goal}\n\nRecent history:\n");
        for entry in history {
            out.push_str(&format!(
                "{:?}: {}\n",
                entry.role,
                truncate_chars(&entry.content, self.config.history_truncate_chars)
            ));
        }
        out.push_str(&format!(
            "\nNetwork allowed: {}\n\n\
            Respond with exactly one fenced ```json code block containing an object shaped like:\n\
            {{\"plan\": <string or object>, \"steps\": [\"...\"], \
            \"createTools\": [{{\"name\", \"language\": \"python\"|\"node\", \"purpose\", \
            \"files\": {{\"relPath\": \"content\"}}}}], \
            \"run\": [{{\"id\", \"args\": [\"...\"], \"stdin\"?}}]}}\n",
            self.config.network_allowed
        ));
        out
    }

    fn refine_message(&self, goal: &str, history: &[boxedin_core::HistoryEntry]) -> String {
        let mut out = self.planning_message(goal, history);
        out.push_str(
            "\nThe previous plan had no tools to create and no run calls. \
            Propose at least one tool to create and a run plan that achieves the goal.\n",
        );
        out
    }

    async fn produce_answer(
        &self,
        goal: &str,
        plan: &Plan,
        last_result: Option<&RunResult>,
    ) -> Option<String> {
        let plan_description = match &plan.plan {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let mut context = format!("Goal: {goal}\nPlan: {plan_description}\n");
        if let Some(result) = last_result {
            context.push_str(&format!(
                "Last run `{}` exited with code {}.\nstdout:\n{}\nstderr:\n{}\n",
                result.id,
                result.code,
                truncate_chars(&result.stdout, ANSWER_STDOUT_CHARS),
                truncate_chars(&result.stderr, ANSWER_STDERR_CHARS),
            ));
        }

        let request = PlanRequest {
            system_prompt: self.system_prompt.clone(),
            messages: vec![PlanMessage::new(
                "user",
                format!("Give a short final answer to the goal based on this context.\n\n{context}"),
            )],
            temperature: PLAN_TEMPERATURE,
            tools_description: None,
        };

        self.planner.complete(request).await.ok()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((boundary, _)) => s[..boundary].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_respects_char_boundaries_not_bytes() {
        let s = "é".repeat(10); // 2 bytes/char, 10 chars
        let out = truncate_chars(&s, 3);
        assert_eq!(out.chars().count(), 3);
    }

    #[test]
    fn truncate_chars_is_identity_under_the_limit() {
        assert_eq!(truncate_chars("short", 500), "short");
    }
}
