//! Command construction for the container and local backends.

use boxedin_core::sandbox::{SandboxConfig, SandboxRequest};
use std::path::Path;
use tokio::process::Command;

/// Build the local subprocess: `<interpreter> <entry> <args…>`, cwd
/// confined to the sandbox root.
pub fn local_command(
    sandbox_dir: &Path,
    request: &SandboxRequest,
    python_path: Option<&Path>,
) -> Command {
    let mut cmd = Command::new(request.language.interpreter());
    cmd.arg(&request.entry);
    cmd.args(&request.args);
    cmd.current_dir(sandbox_dir);
    if let Some(site) = python_path {
        cmd.env("PYTHONPATH", sandbox_dir.join(site));
    }
    cmd
}

/// Build the container invocation: bind-mount the sandbox root at
/// `/app`, apply resource limits, and run
/// `<container_interpreter> <entry> <args…>` with `/app` as the
/// working directory.
pub fn container_command(
    sandbox_dir: &Path,
    request: &SandboxRequest,
    config: &SandboxConfig,
    python_path: Option<&Path>,
) -> Command {
    let mut cmd = Command::new("docker");
    cmd.arg("run").arg("--rm").arg("-i");
    cmd.arg(format!("--memory={}m", config.memory_mb));
    cmd.arg(format!("--cpus={}", config.cpu));
    if !config.network_allowed {
        cmd.arg("--network=none");
    }
    cmd.arg("-v")
        .arg(format!("{}:/app", sandbox_dir.display()));
    cmd.arg("-w").arg("/app");
    if let Some(site) = python_path {
        cmd.arg("-e")
            .arg(format!("PYTHONPATH=/app/{}", site.display()));
    }
    cmd.arg(request.language.image());
    cmd.arg(request.language.container_interpreter());
    cmd.arg(&request.entry);
    cmd.args(&request.args);
    cmd
}
