//! Configuration resolution: CLI flag > environment variable > default,
//! folded once into an [`AppConfig`] at startup (`SPEC_FULL.md` §6).

use boxedin_agent::AgentConfig;
use boxedin_core::error::ConfigError;
use boxedin_core::sandbox::SandboxConfig;
use clap::Parser;
use std::path::PathBuf;

/// Gemini's OpenAI-compatible chat-completions endpoint — the default
/// `PlanGenerator` transport target. Overridable for any other
/// OpenAI-shaped provider via `BOXEDIN_PROVIDER_URL`.
pub const DEFAULT_PROVIDER_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

/// Top-level CLI arguments, spec.md §6.
#[derive(Parser, Debug)]
#[command(name = "boxedin", about = "An autonomous agent that plans, builds, and runs its own tools")]
pub struct Cli {
    /// Durable state directory (memory.json, logs).
    #[arg(long, global = true, env = "BOXEDIN_DATA_DIR", default_value = "./boxedin-data")]
    pub data: PathBuf,

    /// Sandbox root directory (tool catalog, per-run logs).
    #[arg(long, global = true, env = "BOXEDIN_SANDBOX_DIR", default_value = "./boxedin-sandbox")]
    pub sandbox: PathBuf,

    /// Model name passed to the `PlanGenerator` transport.
    #[arg(long, global = true, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
    pub model: String,

    /// Sandboxed run timeout, in milliseconds.
    #[arg(long = "timeout-ms", global = true, env = "SANDBOX_TIMEOUT_MS", default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Sandboxed run memory limit, in megabytes (container backend only).
    #[arg(long = "memory-mb", global = true, env = "SANDBOX_MEMORY_MB", default_value_t = 512)]
    pub memory_mb: u64,

    /// Sandboxed run CPU limit (container backend only), e.g. "1" or "0.5".
    #[arg(long, global = true, env = "SANDBOX_CPU", default_value = "1")]
    pub cpu: String,

    /// Allow outbound network access from sandboxed tools (also enabled by
    /// `SANDBOX_NETWORK=1|true`).
    #[arg(long = "allow-network", global = true)]
    pub allow_network: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands, spec.md §6.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Run one goal, or start the interactive REPL.
    Run(RunArgs),
    /// Print `{conversations, tools, lastRun}` as JSON.
    Status,
    /// Write a tar.gz of `<dataDir>` and `<sandboxDir>` to stdout.
    Export,
    /// Extract a previously-exported archive over the configured directories.
    Import {
        /// Path to the `.tgz` archive to import.
        file: PathBuf,
    },
}

/// Arguments to `run`.
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// One-shot goal. If absent and stdin isn't piped, starts the REPL.
    #[arg(long)]
    pub goal: Option<String>,
    /// Force non-interactive mode even without `--goal` (reads one goal
    /// from stdin, then exits).
    #[arg(long = "no-interactive")]
    pub no_interactive: bool,
}

/// Every resource/network knob resolved into `AgentConfig` plus the
/// model name the provider transport needs.
pub struct AppConfig {
    /// Resolved `AgentConfig` for `AgentLoop`.
    pub agent: AgentConfig,
    /// Model name for the `PlanGenerator` transport.
    pub model: String,
    /// Durable state directory.
    pub data_dir: PathBuf,
    /// Sandbox root directory.
    pub sandbox_dir: PathBuf,
}

fn network_allowed(flag: bool) -> bool {
    flag || matches!(
        std::env::var("SANDBOX_NETWORK").as_deref(),
        Ok("1") | Ok("true")
    )
}

/// Fold CLI flags (already layered over their env vars by clap) into one
/// `AppConfig`. Pure — never touches `GEMINI_API_KEY` (see
/// [`resolve_api_key`]), so `status`/`export`/`import` never require it.
pub fn resolve(cli: &Cli) -> AppConfig {
    AppConfig {
        agent: AgentConfig {
            sandbox: SandboxConfig {
                memory_mb: cli.memory_mb,
                cpu: cli.cpu.clone(),
                timeout_ms: cli.timeout_ms,
                network_allowed: network_allowed(cli.allow_network),
                ..SandboxConfig::default()
            },
            network_allowed: network_allowed(cli.allow_network),
            ..AgentConfig::default()
        },
        model: cli.model.clone(),
        data_dir: cli.data.clone(),
        sandbox_dir: cli.sandbox.clone(),
    }
}

/// Read `GEMINI_API_KEY`. Required before entering `AgentLoop` (`run` or
/// the REPL) — spec.md §6, "Missing API key -> exit 1".
pub fn resolve_api_key() -> Result<String, ConfigError> {
    std::env::var("GEMINI_API_KEY")
        .map_err(|_| ConfigError::Missing("GEMINI_API_KEY".to_string()))
}

/// Provider base URL, `BOXEDIN_PROVIDER_URL` or [`DEFAULT_PROVIDER_URL`].
pub fn resolve_provider_url() -> String {
    std::env::var("BOXEDIN_PROVIDER_URL").unwrap_or_else(|_| DEFAULT_PROVIDER_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_allowed_follows_the_explicit_flag() {
        assert!(network_allowed(true));
    }
}
