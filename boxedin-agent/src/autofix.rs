//! AutoFix — the bounded two-stage recovery policy run after a
//! non-zero exit: a stderr-pattern dependency heuristic, then at most
//! one model-guided patch retry.

use crate::exec::execute;
use crate::AgentConfig;
use boxedin_core::plan::RunCall;
use boxedin_core::provider::{PlanGenerator, PlanMessage, PlanRequest};
use boxedin_core::sandbox::{Sandbox, SandboxRequest};
use boxedin_core::tool::Language;
use boxedin_core::{Reporter, RunResult};
use boxedin_tools::{ToolRecord, ToolStore};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;

fn python_missing_module() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ModuleNotFoundError: No module named '([^']+)'").unwrap())
}

fn node_missing_module() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Cannot find module '([^']+)'").unwrap())
}

fn detect_missing_dependency(language: Language, stderr: &str) -> Option<String> {
    let re = match language {
        Language::Python => python_missing_module(),
        Language::Node => node_missing_module(),
    };
    re.captures(stderr).map(|c| c[1].to_string())
}

#[derive(Debug, Deserialize)]
struct Patch {
    #[serde(default)]
    files: BTreeMap<String, String>,
}

fn default_package_json(tool_id: &str) -> serde_json::Value {
    serde_json::json!({
        "name": tool_id,
        "version": "0.0.0",
        "private": true,
        "dependencies": {}
    })
}

/// Append `pkg` to `requirements.txt` (python) or insert it into
/// `dependencies` in `package.json` (node), creating either file if
/// absent. A no-op (but still `Ok`) if the package is already listed.
async fn apply_dependency_heuristic(
    tool_store: &ToolStore,
    tool_id: &str,
    language: Language,
    pkg: &str,
) -> Result<(), ()> {
    let dir = tool_store.tool_dir(tool_id);
    match language {
        Language::Python => {
            let path = dir.join("requirements.txt");
            let existing = tokio::fs::read_to_string(&path).await.unwrap_or_default();
            if existing.lines().any(|line| line.trim() == pkg) {
                return Ok(());
            }
            let mut updated = existing;
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(pkg);
            updated.push('\n');
            let mut files = BTreeMap::new();
            files.insert("requirements.txt".to_string(), updated);
            tool_store.write_code(tool_id, &files).await.map_err(|_| ())
        }
        Language::Node => {
            let path = dir.join("package.json");
            let raw = tokio::fs::read_to_string(&path).await.ok();
            let mut value = match raw.and_then(|r| serde_json::from_str::<serde_json::Value>(&r).ok()) {
                Some(v) => v,
                None => default_package_json(tool_id),
            };
            if !value["dependencies"].is_object() {
                value["dependencies"] = serde_json::json!({});
            }
            value["dependencies"][pkg] = serde_json::json!("*");
            let rendered = serde_json::to_string_pretty(&value).map_err(|_| ())?;
            let mut files = BTreeMap::new();
            files.insert("package.json".to_string(), rendered);
            tool_store.write_code(tool_id, &files).await.map_err(|_| ())
        }
    }
}

fn heuristic_reason(language: Language) -> &'static str {
    match language {
        Language::Python => "auto-install-python",
        Language::Node => "auto-install-node",
    }
}

async fn retry_run(
    sandbox: &Arc<dyn Sandbox>,
    reporter: &Arc<dyn Reporter>,
    record: &ToolRecord,
    call: &RunCall,
    args: &[String],
    stdin: Option<String>,
    reason: &str,
) -> RunResult {
    let run_id = format!("{}-{}", call.id, uuid::Uuid::new_v4());
    let request = SandboxRequest {
        language: record.manifest.language,
        entry: format!("tools/{}/{}", record.manifest.id, record.manifest.entry),
        args: args.to_vec(),
        stdin,
        run_id,
        tool_dir: PathBuf::from(format!("tools/{}", record.manifest.id)),
    };
    let outcome = execute(sandbox, reporter, &call.id, request).await;
    RunResult {
        id: call.id.clone(),
        args: args.to_vec(),
        code: outcome.code,
        stdout: outcome.stdout,
        stderr: outcome.stderr,
        log_file: outcome.log_file,
        retry: Some(true),
        reason: Some(reason.to_string()),
        error: None,
    }
}

/// Run the two-stage policy for one failing call. `first_stdin` is the
/// expanded/piped stdin actually used on the first attempt (reused
/// verbatim for the heuristic retry); `call.stdin` (unexpanded, as
/// written in the plan) is reused for the model-patch retry instead —
/// a deliberately preserved asymmetry, not an oversight.
pub async fn recover(
    config: &AgentConfig,
    sandbox: &Arc<dyn Sandbox>,
    reporter: &Arc<dyn Reporter>,
    planner: &Arc<dyn PlanGenerator>,
    tool_store: &ToolStore,
    system_prompt: &str,
    record: &ToolRecord,
    call: &RunCall,
    args: &[String],
    first_stdin: Option<String>,
    failing: &RunResult,
) -> RunResult {
    let mut current = failing.clone();

    if config.network_allowed {
        if let Some(pkg) = detect_missing_dependency(record.manifest.language, &current.stderr) {
            if apply_dependency_heuristic(tool_store, &record.manifest.id, record.manifest.language, &pkg)
                .await
                .is_ok()
            {
                let retried = retry_run(
                    sandbox,
                    reporter,
                    record,
                    call,
                    args,
                    first_stdin,
                    heuristic_reason(record.manifest.language),
                )
                .await;
                if retried.code == 0 {
                    return retried;
                }
                current = retried;
            }
        }
    }

    model_patch(planner, tool_store, system_prompt, sandbox, reporter, record, call, args, &current).await
}

async fn model_patch(
    planner: &Arc<dyn PlanGenerator>,
    tool_store: &ToolStore,
    system_prompt: &str,
    sandbox: &Arc<dyn Sandbox>,
    reporter: &Arc<dyn Reporter>,
    record: &ToolRecord,
    call: &RunCall,
    args: &[String],
    failing: &RunResult,
) -> RunResult {
    let request = PlanRequest {
        system_prompt: system_prompt.to_string(),
        messages: vec![PlanMessage::new(
            "user",
            format!(
                "Tool `{}` failed with exit code {}.\nstderr:\n{}\n\nReturn a JSON object of the shape {{\"files\": {{\"path\": \"content\"}}}} with the file contents needed to fix it.",
                record.manifest.id, failing.code, failing.stderr
            ),
        )],
        temperature: 0.2,
        tools_description: None,
    };

    let response = match planner.complete(request).await {
        Ok(text) => text,
        Err(_) => return failing.clone(),
    };

    let patch: Patch = match boxedin_planner::extract_json(&response) {
        Some(patch) => patch,
        None => return failing.clone(),
    };

    if patch.files.is_empty() {
        return failing.clone();
    }

    if tool_store.write_code(&record.manifest.id, &patch.files).await.is_err() {
        return failing.clone();
    }

    retry_run(sandbox, reporter, record, call, args, call.stdin.clone(), "model-patch").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_python_missing_module_from_stderr() {
        let stderr = "Traceback (most recent call last):\n  File \"main.py\", line 1, in <module>\nModuleNotFoundError: No module named 'requests'";
        assert_eq!(
            detect_missing_dependency(Language::Python, stderr),
            Some("requests".to_string())
        );
    }

    #[test]
    fn detects_node_missing_module_from_stderr() {
        let stderr = "Error: Cannot find module 'left-pad'\nRequire stack:\n- /app/tools/pad/index.js";
        assert_eq!(
            detect_missing_dependency(Language::Node, stderr),
            Some("left-pad".to_string())
        );
    }

    #[test]
    fn no_match_returns_none() {
        assert_eq!(detect_missing_dependency(Language::Python, "SyntaxError: invalid syntax"), None);
        assert_eq!(detect_missing_dependency(Language::Node, "TypeError: x is not a function"), None);
    }

    #[tokio::test]
    async fn python_heuristic_creates_requirements_txt_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ToolStore::new(dir.path());
        store.write_code("echo", &BTreeMap::new()).await.unwrap();

        apply_dependency_heuristic(&store, "echo", Language::Python, "requests")
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(store.tool_dir("echo").join("requirements.txt"))
            .await
            .unwrap();
        assert_eq!(contents, "requests\n");
    }

    #[tokio::test]
    async fn python_heuristic_appends_without_duplicating() {
        let dir = tempfile::tempdir().unwrap();
        let store = ToolStore::new(dir.path());
        let mut files = BTreeMap::new();
        files.insert("requirements.txt".to_string(), "requests\n".to_string());
        store.write_code("echo", &files).await.unwrap();

        apply_dependency_heuristic(&store, "echo", Language::Python, "requests")
            .await
            .unwrap();
        apply_dependency_heuristic(&store, "echo", Language::Python, "numpy")
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(store.tool_dir("echo").join("requirements.txt"))
            .await
            .unwrap();
        assert_eq!(contents, "requests\nnumpy\n");
    }

    #[tokio::test]
    async fn node_heuristic_creates_package_json_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ToolStore::new(dir.path());
        store.write_code("pad", &BTreeMap::new()).await.unwrap();

        apply_dependency_heuristic(&store, "pad", Language::Node, "left-pad")
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(store.tool_dir("pad").join("package.json"))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["name"], "pad");
        assert_eq!(value["dependencies"]["left-pad"], "*");
    }

    #[tokio::test]
    async fn node_heuristic_inserts_into_existing_package_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = ToolStore::new(dir.path());
        let mut files = BTreeMap::new();
        files.insert(
            "package.json".to_string(),
            serde_json::json!({"name": "pad", "version": "0.0.0", "dependencies": {"existing": "1.0.0"}})
                .to_string(),
        );
        store.write_code("pad", &files).await.unwrap();

        apply_dependency_heuristic(&store, "pad", Language::Node, "left-pad")
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(store.tool_dir("pad").join("package.json"))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["dependencies"]["existing"], "1.0.0");
        assert_eq!(value["dependencies"]["left-pad"], "*");
    }
}
