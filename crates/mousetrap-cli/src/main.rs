// Mousetrap CLI
// Trains a Q-learning mouse on the cheese grid

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{Overrides, RunConfig};

#[derive(Parser)]
#[command(name = "mousetrap")]
#[command(about = "Tabular Q-learning on the mouse-and-cheese grid", version)]
struct Cli {
    /// JSON config file with optional agent, training, grid and limits sections
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Number of training episodes
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Seed for the agent's random generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Steps before an episode is cut off
    #[arg(long)]
    max_steps: Option<usize>,

    /// Log progress every N episodes (0 disables)
    #[arg(long)]
    log_interval: Option<usize>,
}

impl From<&RunArgs> for Overrides {
    fn from(args: &RunArgs) -> Self {
        Self {
            episodes: args.episodes,
            seed: args.seed,
            max_steps: args.max_steps,
            log_interval: args.log_interval,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent and print the summary
    Train {
        #[command(flatten)]
        run: RunArgs,

        /// Print the learned greedy action for every tile
        #[arg(long)]
        show_policy: bool,
    },

    /// Train, then run episodes with learning switched off
    Evaluate {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Run a uniform random agent for comparison
    Baseline {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the starting grid
    ShowGrid,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let base = match cli.config.as_deref() {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => RunConfig::default(),
    };

    match cli.command {
        Commands::Train { run, show_policy } => {
            commands::train_command(base.apply(&Overrides::from(&run)), show_policy).await?;
        }

        Commands::Evaluate { run } => {
            commands::evaluate_command(base.apply(&Overrides::from(&run))).await?;
        }

        Commands::Baseline { run } => {
            commands::baseline_command(base.apply(&Overrides::from(&run))).await?;
        }

        Commands::ShowGrid => {
            commands::show_grid(&base)?;
        }
    }

    Ok(())
}
