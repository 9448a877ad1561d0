//! Chimera CLI - command-line interface for the determinism engine.
//!
//! Wires the core use cases to in-memory port adapters for local
//! experimentation; production adapters are supplied by a separate wiring
//! crate, out of scope here.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod mcp_types;
mod output;

use chimera_core::ChimeraCore;
use chimera_eventbus::InProcessEventBus;
use chimera_observability::InMemoryMetricsRegistry;
use chimera_policy::PolicyEngineGate;
use chimera_ports::fakes::{FakeBuildPort, FakeRemoteExecutorPort, FakeSessionPort};
use chimera_ports::SessionPort;
use chimera_types::Policy;
use error::{CliError, CliResult};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "chimera")]
#[command(about = "Autonomous determinism engine for fleet configuration", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(long, env = "CHIMERA_CONFIG")]
    config: Option<String>,

    /// Subject identity used for policy checks and the audit trail
    #[arg(long, env = "CHIMERA_SUBJECT", default_value = "operator")]
    subject: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a config and run a command in a local session
    Run {
        #[arg(short, long, default_value = "./flake.nix")]
        config: String,
        #[arg(short, long, default_value = "default")]
        session: String,
        command: String,
    },

    /// Print the command to attach to a running session
    Attach { session_id: String },

    /// Build, sync, and run a command across a fleet
    Deploy {
        #[arg(short, long)]
        targets: String,
        #[arg(short, long, default_value = "./flake.nix")]
        config: String,
        #[arg(short, long, default_value = "default")]
        session: String,
        command: String,
    },

    /// Roll a fleet back to a prior generation
    Rollback {
        #[arg(short, long)]
        targets: String,
        #[arg(short, long)]
        generation: Option<u64>,
    },

    /// Run the autonomous healing loop against a fleet
    Watch {
        #[arg(short, long)]
        targets: String,
        #[arg(short, long, default_value = "./flake.nix")]
        config: String,
        #[arg(short, long, default_value_t = 30)]
        interval: u64,
        #[arg(short, long, default_value = "watch")]
        session: String,
        #[arg(long)]
        once: bool,
    },

    /// Show a read-only fingerprint snapshot of a fleet
    Dash {
        #[arg(short, long)]
        targets: String,
    },

    /// Serve the web dashboard (wire adapter, out of core scope)
    Web {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Serve the MCP surface (wire adapter, out of core scope)
    Mcp {
        #[arg(long, default_value_t = 8090)]
        port: u16,
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Run a single node's heartbeat/drift-report loop
    Agent {
        #[arg(long)]
        node_id: String,
        #[arg(long, default_value_t = 5)]
        heartbeat: u64,
        #[arg(long = "drift-interval", default_value_t = 60)]
        drift_interval: u64,
        #[arg(long = "no-auto-heal")]
        no_auto_heal: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            output::print_error(&err.to_string());
            err.exit_code()
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> CliResult<()> {
    let app_config = chimera_config::ChimeraConfig::load(cli.config.as_deref())?;

    let build = Arc::new(FakeBuildPort::new());
    let session = Arc::new(FakeSessionPort::new());
    let executor = Arc::new(FakeRemoteExecutorPort::new());
    let bus = Arc::new(InProcessEventBus::new());
    let policy_gate = Arc::new(PolicyEngineGate::new(Policy::with_builtin_roles()));
    let metrics = Arc::new(InMemoryMetricsRegistry::new());

    let core = Arc::new(ChimeraCore::new(
        build.clone(),
        session.clone(),
        executor.clone(),
        bus.clone(),
        policy_gate,
        metrics,
        app_config.agent.heartbeat_interval_seconds,
    ));

    match cli.command {
        Commands::Run { config, session: session_name, command } => {
            commands::run::execute(build.as_ref(), session.as_ref(), &config, &session_name, &command).await
        }
        Commands::Attach { session_id } => {
            let id = chimera_types::SessionId::new(session_id)
                .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
            let cmd = session.attach(&id).await?;
            println!("{cmd}");
            Ok(())
        }
        Commands::Deploy { targets, config, session: session_name, command } => {
            commands::deploy::execute(&core, &cli.subject, &config, &session_name, &targets, &command).await
        }
        Commands::Rollback { targets, generation } => {
            commands::rollback::execute(&core, &cli.subject, &targets, generation).await
        }
        Commands::Watch { targets, config, interval, session: session_name, once } => {
            commands::watch::execute(core.clone(), &cli.subject, &config, &session_name, &targets, interval, once)
                .await
        }
        Commands::Dash { targets } => {
            commands::dash::execute(executor.as_ref(), &targets, cli.output).await
        }
        Commands::Web { port, host } => {
            println!(
                "web dashboard is served by the wire-adapter crate; start it against {host}:{port}"
            );
            Ok(())
        }
        Commands::Mcp { port, host } => {
            println!("MCP surface is served by the wire-adapter crate; start it against {host}:{port}");
            Ok(())
        }
        Commands::Agent { node_id, heartbeat, drift_interval, no_auto_heal } => {
            commands::agent::execute(
                core.agents.as_ref(),
                executor.as_ref(),
                bus.as_ref(),
                &node_id,
                heartbeat,
                drift_interval,
                !no_auto_heal,
            )
            .await
        }
    }
}
