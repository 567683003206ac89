//! CLI entrypoint for concierge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{bail, Result};
use clap::Parser;
use concierge_application::{HandleRequestUseCase, NoPipelineProgress, PipelineAnalytics};
use concierge_domain::{ChannelKind, SessionInfo};
use concierge_infrastructure::{
    default_graph, init_logging, ConfigLoader, FixtureAgentInvoker, InMemoryAgentRegistry,
    ScriptedLlmGateway,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "concierge",
    about = "Route a request through the capability pipeline",
    version
)]
struct Cli {
    /// The request to handle
    request: Option<String>,

    /// User identifier for the session
    #[arg(long, default_value = "local-user")]
    user: String,

    /// Session identifier
    #[arg(long, default_value = "local-session")]
    session: String,

    /// Treat the session as a group channel
    #[arg(long)]
    group: bool,

    /// Path to a config file (overrides discovered configs)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip config file discovery and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Print config file locations and exit
    #[arg(long)]
    show_config_sources: bool,

    /// Queue an embellished agent reply to demonstrate response correction
    #[arg(long)]
    embellish: bool,

    /// Print the step trace after the response
    #[arg(long)]
    trace: bool,

    /// Print the analytics snapshot as JSON after the response
    #[arg(long)]
    analytics: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config_sources {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    init_logging(cli.verbose, &config.logging.filter);
    info!("Starting concierge");

    let Some(request) = cli.request else {
        bail!("A request is required. Try: concierge \"list players\"");
    };

    // === Dependency Injection ===
    let graph = Arc::new(default_graph()?);
    let registry = Arc::new(InMemoryAgentRegistry::demo()?);
    let gateway = Arc::new(ScriptedLlmGateway::offline());
    let mut invoker = FixtureAgentInvoker::demo_dataset();
    if cli.embellish {
        invoker = invoker
            .with_scripted_text("Found 12 players and every single one is an active member.");
    }
    let analytics = Arc::new(PipelineAnalytics::new());

    let use_case = HandleRequestUseCase::new(
        gateway,
        Arc::new(invoker),
        registry,
        graph,
        config.execution.clone(),
        config.complexity.clone(),
        config.router.clone(),
        analytics.clone(),
        Arc::new(NoPipelineProgress),
    );

    // Ctrl-C cancels between pipeline steps
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });
    let use_case = use_case.with_cancellation(token);

    let channel = if cli.group {
        ChannelKind::Group
    } else {
        ChannelKind::Direct
    };
    let session = SessionInfo::new(cli.user, cli.session, channel);

    let response = use_case.handle(request, session).await?;

    println!("{}", response.text);

    if cli.trace {
        println!();
        println!("Step trace:");
        for record in &response.context.step_trace {
            println!(
                "  {:<22} {:>5}ms  {:?}{}",
                record.step.as_str(),
                record.duration_ms,
                record.outcome,
                record
                    .detail
                    .as_deref()
                    .map(|d| format!("  ({d})"))
                    .unwrap_or_default()
            );
        }
    }

    if cli.analytics {
        println!();
        println!("{}", serde_json::to_string_pretty(&analytics.snapshot())?);
    }

    Ok(())
}
