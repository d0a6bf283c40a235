//! The `boxedin-server` binary: the HTTP+SSE boundary over one shared
//! [`AgentLoop`] process, spec.md §6.

use boxedin_agent::AgentConfig;
use boxedin_core::sandbox::SandboxConfig;
use boxedin_provider_http::HttpPlanGenerator;
use boxedin_sandbox::ProcessSandbox;
use boxedin_server::AppState;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_PROVIDER_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

/// Global flags, mirroring `boxedin-cli`'s (`SPEC_FULL.md` §6: CLI flag
/// > environment variable > default, resolved once at startup).
#[derive(Parser, Debug)]
#[command(name = "boxedin-server")]
struct Args {
    #[arg(long, env = "BOXEDIN_DATA_DIR", default_value = "./boxedin-data")]
    data: PathBuf,
    #[arg(long, env = "BOXEDIN_SANDBOX_DIR", default_value = "./boxedin-sandbox")]
    sandbox: PathBuf,
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
    model: String,
    #[arg(long = "timeout-ms", env = "SANDBOX_TIMEOUT_MS", default_value_t = 30_000)]
    timeout_ms: u64,
    #[arg(long = "memory-mb", env = "SANDBOX_MEMORY_MB", default_value_t = 512)]
    memory_mb: u64,
    #[arg(long, env = "SANDBOX_CPU", default_value = "1")]
    cpu: String,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
}

fn network_allowed_default() -> bool {
    matches!(
        std::env::var("SANDBOX_NETWORK").as_deref(),
        Ok("1") | Ok("true")
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| "missing GEMINI_API_KEY")?;

    let memory = Arc::new(boxedin_memory::Memory::load(&args.data, &args.sandbox).await?);
    let network_allowed = network_allowed_default();
    let sandbox_config = SandboxConfig {
        memory_mb: args.memory_mb,
        cpu: args.cpu.clone(),
        timeout_ms: args.timeout_ms,
        network_allowed,
        ..SandboxConfig::default()
    };
    let sandbox: Arc<dyn boxedin_core::Sandbox> =
        Arc::new(ProcessSandbox::new(&args.sandbox, sandbox_config.clone()));
    let provider_url =
        std::env::var("BOXEDIN_PROVIDER_URL").unwrap_or_else(|_| DEFAULT_PROVIDER_URL.to_string());
    let planner: Arc<dyn boxedin_core::PlanGenerator> = Arc::new(
        HttpPlanGenerator::new(provider_url, &args.model).with_api_key(api_key),
    );

    let state = Arc::new(AppState {
        memory,
        sandbox,
        planner,
        agent_config: AgentConfig {
            sandbox: sandbox_config,
            network_allowed,
            ..AgentConfig::default()
        },
        system_prompt: boxedin_agent::DEFAULT_SYSTEM_PROMPT.to_string(),
    });

    let app = boxedin_server::router(state);
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "boxedin-server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
