//! The Sandbox protocol — resource-bounded execution of a tool.
//!
//! Narrowed to what one sandboxed tool invocation actually needs: run
//! one tool's entry file, streaming output to zero
//! or more observers, inside a container when available and a local
//! confined process otherwise.

use crate::tool::Language;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resource and network configuration applied to every sandbox run.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Memory limit in megabytes (container backend only).
    pub memory_mb: u64,
    /// CPU limit, e.g. `"1"`, `"0.5"` (container backend only).
    pub cpu: String,
    /// Hard wall-clock timeout in milliseconds.
    pub timeout_ms: u64,
    /// Whether outbound network access is permitted.
    pub network_allowed: bool,
    /// Bypass the `docker --version` probe and always use the local
    /// backend. Used by tests that don't want a container dependency.
    #[serde(default)]
    pub force_local: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            memory_mb: 512,
            cpu: "1".to_string(),
            timeout_ms: 30_000,
            network_allowed: false,
            force_local: false,
        }
    }
}

/// One sandboxed invocation request.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct SandboxRequest {
    /// Implementation language, selects interpreter/image.
    pub language: Language,
    /// Entry file, relative to the sandbox root
    /// (`tools/<id>/<manifest.entry>`).
    pub entry: String,
    /// Argv passed after the entry file.
    pub args: Vec<String>,
    /// Stdin to write, if any. Empty string means "close stdin
    /// immediately with nothing written".
    pub stdin: Option<String>,
    /// A unique id for this run, used to name the log directory.
    pub run_id: String,
    /// The tool's own directory (for dependency bootstrap), relative to
    /// the sandbox root.
    pub tool_dir: PathBuf,
}

/// The outcome of a sandboxed run. Always returned — the sandbox never
/// propagates child failures as an `Err`.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct SandboxOutcome {
    /// Exit code, or `-1` if the process never started.
    pub code: i32,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// Path to the per-run log file.
    pub log_file: String,
}

/// A byte chunk observed while a sandboxed process runs, forwarded to
/// whoever is watching via [`Sandbox::run`]'s streaming callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// A chunk of stdout.
    Stdout,
    /// A chunk of stderr.
    Stderr,
}

/// Errors that can only occur as a programming/config error, never as
/// a consequence of the child process itself (which is folded into
/// [`SandboxOutcome::code`]/`stderr`).
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SandboxSetupError {
    /// The sandbox root or run-log directory couldn't be created.
    #[error("failed to prepare sandbox directories: {0}")]
    DirectorySetup(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Protocol — resource-bounded process execution, container-preferred.
///
/// Implementations: a docker-backed container runner, and a
/// subprocess-confined-to-cwd local runner. Both resolve this trait to
/// the same observable contract.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Execute one tool invocation. Streams stdout/stderr chunks to
    /// `on_chunk` in arrival order as they are produced, then resolves
    /// with the accumulated [`SandboxOutcome`]. Never returns `Err` for
    /// a child process failure — only for sandbox-internal setup
    /// failures that precede spawning any child.
    async fn run(
        &self,
        request: SandboxRequest,
        on_chunk: &(dyn Fn(StreamKind, &[u8]) + Send + Sync),
    ) -> Result<SandboxOutcome, SandboxSetupError>;
}
