//! Troupe CLI: the main entry point.
//!
//! Commands:
//! - `ask`: One ReAct agent answers a question with tools
//! - `pipeline`: researcher → analyst → writer
//! - `orchestrate`: A planner splits the task across role agents
//! - `debate`: Two experts argue, a reviewer judges
//! - `roles`: List available roles
//! - `init`: Write a starter config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "troupe",
    about = "Troupe: ReAct agents and multi-agent collaboration",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.troupe/config.toml
    #[arg(short, long, global = true, env = "TROUPE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single agent a question
    Ask {
        query: String,

        /// Reasoning protocol: function_calling or text_parsing
        #[arg(short, long)]
        mode: Option<String>,

        /// Maximum model calls before giving up
        #[arg(long)]
        max_steps: Option<u32>,
    },

    /// Run the research → analysis → writing pipeline
    Pipeline { task: String },

    /// Let a planner split the task across role agents
    Orchestrate {
        task: String,

        /// Maximum replans after a failed step
        #[arg(long)]
        max_replan: Option<u32>,
    },

    /// Hold a debate between the Python and Go experts
    Debate {
        topic: String,

        /// Number of debate rounds before the verdict
        #[arg(short, long)]
        rounds: Option<u32>,
    },

    /// List built-in and configured roles
    Roles,

    /// Write a starter config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Ask {
            query,
            mode,
            max_steps,
        } => commands::ask::run(config_path, &query, mode, max_steps).await?,
        Commands::Pipeline { task } => commands::pipeline::run(config_path, &task).await?,
        Commands::Orchestrate { task, max_replan } => {
            commands::orchestrate::run(config_path, &task, max_replan).await?
        }
        Commands::Debate { topic, rounds } => {
            commands::debate::run(config_path, &topic, rounds).await?
        }
        Commands::Roles => commands::roles::run(config_path)?,
        Commands::Init { force } => commands::init::run(config_path, force)?,
    }

    Ok(())
}
