//! The `boxedin` binary: `run`/`status`/`export`/`import` over one
//! [`boxedin_agent::AgentLoop`], spec.md §6.

mod archive;
mod config;
mod repl;
mod status;

use boxedin_agent::AgentLoop;
use boxedin_core::Reporter;
use boxedin_memory::Memory;
use boxedin_reporter::{ConsoleReporter, ReporterRegistry};
use boxedin_sandbox::ProcessSandbox;
use clap::Parser;
use config::Command;
use std::process::ExitCode;
use std::sync::Arc;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = config::Cli::parse();
    let app = config::resolve(&cli);

    match &cli.command {
        Command::Status => run_status(&app).await,
        Command::Export => run_export(&app),
        Command::Import { file } => run_import(&app, file),
        Command::Run(args) => run_agent(&app, args).await,
    }
}

async fn run_status(app: &config::AppConfig) -> ExitCode {
    let memory = match Memory::load(&app.data_dir, &app.sandbox_dir).await {
        Ok(m) => m,
        Err(e) => {
            eprintln!("failed to load memory: {e}");
            return ExitCode::FAILURE;
        }
    };
    let snapshot = memory.snapshot().await;
    let status = status::build(&snapshot);
    match serde_json::to_string_pretty(&status) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to serialize status: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_export(app: &config::AppConfig) -> ExitCode {
    let stdout = std::io::stdout();
    let lock = stdout.lock();
    match archive::export(&app.data_dir, &app.sandbox_dir, lock) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("export failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_import(app: &config::AppConfig, file: &std::path::Path) -> ExitCode {
    match archive::import(file, &app.data_dir, &app.sandbox_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("import failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_agent(app: &config::AppConfig, args: &config::RunArgs) -> ExitCode {
    let api_key = match config::resolve_api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let memory = match Memory::load(&app.data_dir, &app.sandbox_dir).await {
        Ok(m) => m,
        Err(e) => {
            eprintln!("failed to load memory: {e}");
            return ExitCode::FAILURE;
        }
    };

    let sandbox: Arc<dyn boxedin_core::Sandbox> = Arc::new(ProcessSandbox::new(
        &app.sandbox_dir,
        app.agent.sandbox.clone(),
    ));
    let planner: Arc<dyn boxedin_core::PlanGenerator> = Arc::new(
        boxedin_provider_http::HttpPlanGenerator::new(config::resolve_provider_url(), &app.model)
            .with_api_key(api_key)
            .with_context_window(app.agent.context_window),
    );

    let mut registry = ReporterRegistry::new();
    registry.add(Arc::new(ConsoleReporter));
    let reporter: Arc<dyn Reporter> = Arc::new(registry);

    let agent = AgentLoop::new(
        app.agent.clone(),
        sandbox,
        planner,
        reporter,
        boxedin_agent::DEFAULT_SYSTEM_PROMPT,
    );

    match &args.goal {
        Some(goal) => {
            let result = agent.run(goal, &memory).await;
            if let Some(answer) = result.answer {
                println!("{answer}");
            }
        }
        None if args.no_interactive => repl::run_one_from_stdin(&agent, &memory).await,
        None => repl::run(&agent, &memory).await,
    }

    ExitCode::SUCCESS
}
