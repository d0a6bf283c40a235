//! Container engine detection.

use tokio::process::Command;

/// Which backend a [`crate::ProcessSandbox`] will use for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// Run inside a `docker` container.
    Container,
    /// Run as a local subprocess confined to the sandbox directory.
    Local,
}

/// Probe whether `docker --version` succeeds. Run once per
/// [`crate::ProcessSandbox`] and memoized — spawning a probe process on
/// every tool call would double the process count for no benefit.
pub async fn probe_engine() -> Engine {
    match Command::new("docker").arg("--version").output().await {
        Ok(output) if output.status.success() => Engine::Container,
        _ => Engine::Local,
    }
}
