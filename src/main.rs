//! `simple-agent` binary entry point.

use clap::Parser;
use simple_agent::agent_loop::{AgentContext, ConversationLoop};
use simple_agent::cli::Cli;
use simple_agent::config::AgentConfig;
use simple_agent::console::TerminalConsole;
use simple_agent::error::Result;
use simple_agent::provider::create_provider;
use simple_agent::tools::{default_tools, ToolRegistry};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let conversation = match setup(&cli) {
        Ok(conversation) => conversation,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let code = tokio::select! {
        result = run(conversation) => match result {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!();
            tracing::info!("interrupted");
            0
        }
    };
    std::process::exit(code);
}

fn init_logging(verbose: bool) {
    // stdout belongs to the panels.
    let default_level = if verbose { "simple_agent=debug" } else { "warn" };
    let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_ansi(is_tty)
        .with_writer(std::io::stderr)
        .init();
}

fn setup(cli: &Cli) -> Result<ConversationLoop> {
    let mut config = AgentConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.overrides());
    config.validate()?;
    tracing::info!(model = %config.model, "starting");

    let provider = create_provider(&config)?;
    let registry = ToolRegistry::new(default_tools())?;
    let working_dir = std::env::current_dir()?;
    let ctx = AgentContext::from_config(
        &config,
        provider,
        Box::new(TerminalConsole::new()),
        registry,
        working_dir,
    );
    Ok(ConversationLoop::new(ctx))
}

async fn run(mut conversation: ConversationLoop) -> Result<()> {
    conversation.run().await
}
