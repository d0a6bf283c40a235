//! Dependency bootstrap.
//!
//! Best-effort only: a failure here is logged and the run proceeds
//! regardless, surfacing whatever import/require error the missing
//! dependency causes (which AutoFix's dependency heuristic then acts
//! on).

use boxedin_core::tool::Language;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Install a tool's declared dependencies if network access is
/// permitted and a manifest is present. Returns the tool-relative path
/// to install into (e.g. `tools/<id>/.site`) for Python, so the caller
/// can export `PYTHONPATH`; `None` for Node (npm resolves `node_modules`
/// itself) or when nothing needed installing.
pub async fn bootstrap_dependencies(
    language: Language,
    sandbox_dir: &Path,
    tool_dir_rel: &Path,
) -> Option<PathBuf> {
    let tool_dir_abs = sandbox_dir.join(tool_dir_rel);
    match language {
        Language::Python => {
            let manifest = tool_dir_abs.join("requirements.txt");
            if !tokio::fs::try_exists(&manifest).await.unwrap_or(false) {
                return None;
            }
            let site_rel = tool_dir_rel.join(".site");
            let site_abs = sandbox_dir.join(&site_rel);
            if let Err(e) = tokio::fs::create_dir_all(&site_abs).await {
                tracing::warn!(error = %e, "failed to create .site directory");
                return Some(site_rel);
            }
            let result = Command::new("pip")
                .arg("install")
                .arg("-t")
                .arg(&site_abs)
                .arg("-r")
                .arg(&manifest)
                .current_dir(&tool_dir_abs)
                .output()
                .await;
            match result {
                Ok(output) if !output.status.success() => {
                    tracing::warn!(
                        stderr = %String::from_utf8_lossy(&output.stderr),
                        "pip install failed, proceeding without guaranteed dependencies"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to spawn pip");
                }
                _ => {}
            }
            Some(site_rel)
        }
        Language::Node => {
            let manifest = tool_dir_abs.join("package.json");
            if !tokio::fs::try_exists(&manifest).await.unwrap_or(false) {
                return None;
            }
            let result = Command::new("npm")
                .arg("install")
                .arg("--omit=dev")
                .current_dir(&tool_dir_abs)
                .output()
                .await;
            match result {
                Ok(output) if !output.status.success() => {
                    tracing::warn!(
                        stderr = %String::from_utf8_lossy(&output.stderr),
                        "npm install failed, proceeding without guaranteed dependencies"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to spawn npm");
                }
                _ => {}
            }
            None
        }
    }
}
