//! RunChain.
//!
//! Executes `plan.run` in order against the materialized catalog,
//! expanding template placeholders, pipe-chaining stdin from the
//! previous successful run, and handing any non-zero exit to
//! [`crate::autofix::recover`].

use crate::autofix;
use crate::exec::execute;
use crate::template;
use crate::AgentConfig;
use boxedin_core::plan::RunCall;
use boxedin_core::provider::PlanGenerator;
use boxedin_core::reporter::{Reporter, ReporterEvent};
use boxedin_core::sandbox::{Sandbox, SandboxOutcome, SandboxRequest};
use boxedin_core::RunResult;
use boxedin_tools::{ToolRecord, ToolStore};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

/// Run every call in `calls` against `catalog`, in order, returning the
/// final recorded [`RunResult`] for each — including a `"Tool not
/// found"` placeholder for calls that reference an unmaterialized id.
#[allow(clippy::too_many_arguments)]
pub async fn run_chain(
    config: &AgentConfig,
    sandbox: &Arc<dyn Sandbox>,
    reporter: &Arc<dyn Reporter>,
    planner: &Arc<dyn PlanGenerator>,
    tool_store: &ToolStore,
    system_prompt: &str,
    catalog: &BTreeMap<String, ToolRecord>,
    calls: &[RunCall],
) -> Vec<RunResult> {
    let mut results = Vec::with_capacity(calls.len());
    let mut runs: HashMap<String, RunResult> = HashMap::new();
    let mut last_run: Option<RunResult> = None;
    let mut last_success_stdout: Option<String> = None;

    for call in calls {
        let Some(record) = catalog.get(&call.id) else {
            let result = RunResult::not_found(call.id.clone());
            reporter
                .on_event(ReporterEvent::Result {
                    result: result.clone(),
                })
                .await;
            runs.insert(call.id.clone(), result.clone());
            last_run = Some(result.clone());
            results.push(result);
            continue;
        };

        let args: Vec<String> = call
            .args
            .iter()
            .map(|a| template::expand(a, last_run.as_ref(), &runs))
            .collect();
        let stdin = match &call.stdin {
            Some(s) => Some(template::expand(s, last_run.as_ref(), &runs)),
            None => last_success_stdout.clone(),
        };

        let run_id = format!("{}-{}", call.id, uuid::Uuid::new_v4());
        let request = SandboxRequest {
            language: record.manifest.language,
            entry: format!("tools/{}/{}", record.manifest.id, record.manifest.entry),
            args: args.clone(),
            stdin: stdin.clone(),
            run_id,
            tool_dir: PathBuf::from(format!("tools/{}", record.manifest.id)),
        };

        let outcome = execute(sandbox, reporter, &call.id, request).await;
        let mut result = result_from_outcome(&call.id, &args, outcome);

        if result.code != 0 {
            result = autofix::recover(
                config,
                sandbox,
                reporter,
                planner,
                tool_store,
                system_prompt,
                record,
                call,
                &args,
                stdin,
                &result,
            )
            .await;
        }

        if result.code == 0 {
            last_success_stdout = Some(result.stdout.clone());
        }
        reporter
            .on_event(ReporterEvent::Result {
                result: result.clone(),
            })
            .await;
        runs.insert(call.id.clone(), result.clone());
        last_run = Some(result.clone());
        results.push(result);
    }

    results
}

fn result_from_outcome(id: &str, args: &[String], outcome: SandboxOutcome) -> RunResult {
    RunResult {
        id: id.to_string(),
        args: args.to_vec(),
        code: outcome.code,
        stdout: outcome.stdout,
        stderr: outcome.stderr,
        log_file: outcome.log_file,
        retry: None,
        reason: None,
        error: None,
    }
}
