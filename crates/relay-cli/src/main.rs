//! relay: prompt-driven coding agent with sandboxed tools

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use relay_cli::agent::{AgentConfig, AgentLoop};
use relay_cli::tools::builtin::create_default_registry;
use relay_cli::tools::{Dispatcher, ToolContext, WorkingRoot};
use relay_core::{GeminiClient, Settings};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "relay")]
#[command(about = "Relay a prompt to a hosted model and run its tool calls in a sandbox", version)]
struct Cli {
    /// The text prompt for the agent
    prompt: String,

    /// Print tool arguments, tool results and token usage
    #[arg(short, long)]
    verbose: bool,

    /// Settings file (default: relay.toml in this or a parent directory)
    #[arg(long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Sandbox root for every tool call (overrides settings)
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Model to use (overrides settings)
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum model rounds (overrides settings)
    #[arg(long)]
    max_rounds: Option<usize>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("warn,relay_cli=debug,relay_core=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.working_dir {
        settings.agent.working_dir = dir;
    }
    if let Some(model) = cli.model {
        settings.model.name = model;
    }
    if let Some(max) = cli.max_rounds {
        settings.agent.max_rounds = max;
    }

    let api_key = settings.api_key()?;
    let client = GeminiClient::new(
        api_key,
        &settings.model.name,
        &settings.model.base_url,
        Duration::from_secs(settings.model.request_timeout_secs),
    )?;

    let root = WorkingRoot::new(&settings.agent.working_dir)?;
    let ctx = ToolContext::new(root)
        .with_max_chars(settings.tools.max_chars)
        .with_script_timeout(Duration::from_secs(settings.tools.script_timeout_secs));
    let registry = create_default_registry(&settings.tools);
    debug!(tools = ?registry, root = %ctx.root, "Tools ready");

    let dispatcher = Dispatcher::new(registry, ctx).with_verbose(cli.verbose);
    let config = AgentConfig::default()
        .with_max_rounds(settings.agent.max_rounds)
        .with_verbose(cli.verbose);

    if cli.verbose {
        println!("User prompt: {}", cli.prompt);
    }

    let agent = AgentLoop::new(client, dispatcher, config);
    let state = agent.run(&cli.prompt).await?;

    match state.final_response() {
        Some(text) => println!("\nFinal response:\n{}", text),
        None => println!("\nCould not complete the task within {} rounds.", state.round),
    }
    Ok(())
}
