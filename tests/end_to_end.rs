//! Whole-workspace composability checks, grounded on the teacher's
//! `tests/poc.rs` ("composability patterns without live API keys").
//!
//! Demonstrates that every protocol object in `boxedin-core` is swappable
//! independently of `AgentLoop`:
//!
//! 1. **Sandbox swap** — the same plan runs against a fresh local sandbox.
//! 2. **Reporter swap** — `ConsoleReporter` and `CollectingReporter`
//!    both observe the same run without `AgentLoop` knowing which is
//!    attached, including `reporter = None`-equivalent (a `NullReporter`).
//! 3. **Planner swap** — a scripted `PlanGenerator` stands in for a real
//!    model; any other implementation plugs in unchanged.
//! 4. **Template expansion across a full goal** — `${last.stdout}` and
//!    `${runs.<id>.*}` resolve correctly once real sandboxed runs have
//!    produced output, not just in `boxedin-agent`'s unit tests.
//!
//! All scenarios run without network access or an LLM API key.

use async_trait::async_trait;
use boxedin_agent::{AgentConfig, AgentLoop};
use boxedin_core::provider::{PlanGenerator, PlanGeneratorError, PlanRequest};
use boxedin_core::sandbox::SandboxConfig;
use boxedin_core::{NullReporter, Reporter};
use boxedin_memory::Memory;
use boxedin_reporter::{CollectingReporter, ConsoleReporter, ReporterRegistry};
use boxedin_sandbox::ProcessSandbox;
use std::sync::Arc;

fn python3_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

struct ScriptedPlanner(String);

#[async_trait]
impl PlanGenerator for ScriptedPlanner {
    async fn complete(&self, _request: PlanRequest) -> Result<String, PlanGeneratorError> {
        Ok(self.0.clone())
    }
}

const WORD_COUNT_PLAN: &str = r#"```json
{"plan":"count words then uppercase the count","steps":["wordcount","upper"],
"createTools":[
  {"id":"wordcount","name":"wordcount","language":"python","entry":"main.py","purpose":"count words on stdin","files":{"main.py":"import sys; print(len(sys.stdin.read().split()))"}},
  {"id":"upper","name":"upper","language":"python","entry":"main.py","purpose":"uppercase stdin","files":{"main.py":"import sys; print(sys.stdin.read().strip().upper())"}}
],
"run":[{"id":"wordcount","stdin":"one two three"},{"id":"upper","args":["${runs.wordcount.stdout}"],"stdin":"${last.stdout}"}]}
```"#;

async fn build_memory() -> (tempfile::TempDir, tempfile::TempDir, Memory) {
    let data = tempfile::tempdir().unwrap();
    let sandbox_dir = tempfile::tempdir().unwrap();
    let memory = Memory::load(data.path(), sandbox_dir.path()).await.unwrap();
    (data, sandbox_dir, memory)
}

fn local_sandbox(sandbox_dir: &std::path::Path) -> Arc<dyn boxedin_core::Sandbox> {
    Arc::new(ProcessSandbox::new(
        sandbox_dir,
        SandboxConfig {
            force_local: true,
            timeout_ms: 5_000,
            ..SandboxConfig::default()
        },
    ))
}

#[tokio::test]
async fn sandbox_and_reporter_are_independently_swappable() {
    if !python3_available() {
        eprintln!("skipping: python3 not available in this environment");
        return;
    }

    let (_data, sandbox_dir, memory) = build_memory().await;
    let planner: Arc<dyn PlanGenerator> = Arc::new(ScriptedPlanner(WORD_COUNT_PLAN.to_string()));

    // Fan the same event stream out to a console reporter and a
    // collecting reporter at once, via the registry.
    let mut registry = ReporterRegistry::new();
    let collector = Arc::new(CollectingReporter::new());
    registry.add(Arc::new(ConsoleReporter));
    registry.add(collector.clone());

    let agent = AgentLoop::new(
        AgentConfig::default(),
        local_sandbox(sandbox_dir.path()),
        planner,
        Arc::new(registry),
        boxedin_agent::DEFAULT_SYSTEM_PROMPT,
    );

    let result = agent.run("count then uppercase", &memory).await;
    assert_eq!(result.created.len(), 2);
    assert_eq!(result.results.len(), 2);
    assert_eq!(result.results[0].stdout, "3\n");
    // `${runs.wordcount.stdout}` as an arg and `${last.stdout}` as stdin
    // both resolve to "3\n" -> uppercased is still "3\n".
    assert_eq!(result.results[1].stdout, "3\n");
    assert_eq!(result.results[1].args, vec!["3\n".to_string()]);

    let events = collector.events().await;
    assert!(!events.is_empty());
}

#[tokio::test]
async fn agent_loop_runs_with_a_null_reporter_attached() {
    let (_data, sandbox_dir, memory) = build_memory().await;
    let planner: Arc<dyn PlanGenerator> =
        Arc::new(ScriptedPlanner("no plan, just chatting".to_string()));

    let agent = AgentLoop::new(
        AgentConfig::default(),
        local_sandbox(sandbox_dir.path()),
        planner,
        Arc::new(NullReporter) as Arc<dyn Reporter>,
        boxedin_agent::DEFAULT_SYSTEM_PROMPT,
    );

    let result = agent.run("say hello", &memory).await;
    assert!(result.results.is_empty());
}

#[tokio::test]
async fn tool_catalog_survives_a_fresh_memory_load() {
    if !python3_available() {
        eprintln!("skipping: python3 not available in this environment");
        return;
    }

    let data = tempfile::tempdir().unwrap();
    let sandbox_dir = tempfile::tempdir().unwrap();

    {
        let memory = Memory::load(data.path(), sandbox_dir.path()).await.unwrap();
        let planner: Arc<dyn PlanGenerator> = Arc::new(ScriptedPlanner(
            r#"```json
{"plan":"make one reusable tool","steps":[],"createTools":[{"id":"greeter","name":"greeter","language":"python","entry":"main.py","purpose":"say hi","files":{"main.py":"print('hi')"}}],"run":[{"id":"greeter"}]}
```"#
                .to_string(),
        ));
        let agent = AgentLoop::new(
            AgentConfig::default(),
            local_sandbox(sandbox_dir.path()),
            planner,
            Arc::new(NullReporter) as Arc<dyn Reporter>,
            boxedin_agent::DEFAULT_SYSTEM_PROMPT,
        );
        agent.run("create a greeter", &memory).await;
    }

    // A brand new `Memory` over the same directories rediscovers the
    // tool from disk, not from any in-process state.
    let reloaded = Memory::load(data.path(), sandbox_dir.path()).await.unwrap();
    let snapshot = reloaded.snapshot().await;
    assert!(snapshot.tools.contains_key("greeter"));
}
