//! Sandbox backend for boxedin.
//!
//! [`ProcessSandbox`] implements [`boxedin_core::Sandbox`]: probe once
//! whether `docker` is available, run each tool invocation in the
//! container or local backend accordingly, stream output as it
//! arrives, and enforce a hard wall-clock timeout.

mod bootstrap;
mod command;
mod engine;
mod exec;

pub use engine::Engine;

use async_trait::async_trait;
use boxedin_core::sandbox::{
    Sandbox, SandboxConfig, SandboxOutcome, SandboxRequest, SandboxSetupError, StreamKind,
};
use std::path::PathBuf;
use tokio::sync::OnceCell;

/// A [`Sandbox`] backed by real child processes, container-preferred.
pub struct ProcessSandbox {
    sandbox_dir: PathBuf,
    config: SandboxConfig,
    engine: OnceCell<Engine>,
}

impl ProcessSandbox {
    /// Create a sandbox rooted at `sandbox_dir`. The engine probe is
    /// deferred to the first call to [`Sandbox::run`].
    pub fn new(sandbox_dir: impl Into<PathBuf>, config: SandboxConfig) -> Self {
        Self {
            sandbox_dir: sandbox_dir.into(),
            config,
            engine: OnceCell::new(),
        }
    }

    async fn resolve_engine(&self) -> Engine {
        if self.config.force_local {
            return Engine::Local;
        }
        *self.engine.get_or_init(engine::probe_engine).await
    }
}

#[async_trait]
impl Sandbox for ProcessSandbox {
    async fn run(
        &self,
        request: SandboxRequest,
        on_chunk: &(dyn Fn(StreamKind, &[u8]) + Send + Sync),
    ) -> Result<SandboxOutcome, SandboxSetupError> {
        let run_dir = self.sandbox_dir.join("runs").join(&request.run_id);
        tokio::fs::create_dir_all(&run_dir)
            .await
            .map_err(|e| SandboxSetupError::DirectorySetup(e.to_string()))?;
        let log_path = run_dir.join("exec.log");

        let python_path = if self.config.network_allowed {
            bootstrap::bootstrap_dependencies(
                request.language,
                &self.sandbox_dir,
                &request.tool_dir,
            )
            .await
        } else {
            None
        };

        let cmd = match self.resolve_engine().await {
            Engine::Container => {
                command::container_command(&self.sandbox_dir, &request, &self.config, python_path.as_deref())
            }
            Engine::Local => command::local_command(&self.sandbox_dir, &request, python_path.as_deref()),
        };

        let outcome = exec::execute(
            cmd,
            request.stdin.as_deref(),
            self.config.timeout_ms,
            &log_path,
            on_chunk,
        )
        .await;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxedin_core::tool::Language;

    #[test]
    fn local_command_uses_interpreter_and_cwd() {
        let dir = std::path::Path::new("/tmp/example-sandbox");
        let request = SandboxRequest {
            language: Language::Python,
            entry: "tools/echo/main.py".to_string(),
            args: vec!["--flag".to_string()],
            stdin: None,
            run_id: "run-1".to_string(),
            tool_dir: std::path::PathBuf::from("tools/echo"),
        };
        let cmd = command::local_command(dir, &request, None);
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "python3");
        let args: Vec<_> = std_cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["tools/echo/main.py", "--flag"]);
    }

    #[test]
    fn container_command_applies_resource_limits_and_no_network() {
        let dir = std::path::Path::new("/tmp/example-sandbox");
        let request = SandboxRequest {
            language: Language::Node,
            entry: "tools/echo/index.js".to_string(),
            args: vec![],
            stdin: None,
            run_id: "run-1".to_string(),
            tool_dir: std::path::PathBuf::from("tools/echo"),
        };
        let config = SandboxConfig {
            memory_mb: 256,
            cpu: "0.5".to_string(),
            timeout_ms: 1000,
            ..SandboxConfig::default()
        };
        let cmd = command::container_command(dir, &request, &config, None);
        let std_cmd = cmd.as_std();
        let args: Vec<_> = std_cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert!(args.contains(&"--memory=256m".to_string()));
        assert!(args.contains(&"--cpus=0.5".to_string()));
        assert!(args.contains(&"--network=none".to_string()));
        assert!(args.contains(&"node:20-alpine".to_string()));
    }

    #[test]
    fn container_command_omits_network_none_when_allowed() {
        let dir = std::path::Path::new("/tmp/example-sandbox");
        let request = SandboxRequest {
            language: Language::Python,
            entry: "tools/echo/main.py".to_string(),
            args: vec![],
            stdin: None,
            run_id: "run-1".to_string(),
            tool_dir: std::path::PathBuf::from("tools/echo"),
        };
        let config = SandboxConfig {
            network_allowed: true,
            ..SandboxConfig::default()
        };
        let cmd = command::container_command(dir, &request, &config, None);
        let std_cmd = cmd.as_std();
        let args: Vec<_> = std_cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert!(!args.contains(&"--network=none".to_string()));
    }

    #[tokio::test]
    async fn force_local_skips_engine_probe() {
        let sandbox = ProcessSandbox::new(
            "/tmp/example-sandbox",
            SandboxConfig {
                force_local: true,
                ..SandboxConfig::default()
            },
        );
        assert_eq!(sandbox.resolve_engine().await, Engine::Local);
    }
}
