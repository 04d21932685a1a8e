//! learnlab CLI - Toy learning algorithms from the terminal
//!
//! This CLI provides a unified interface for:
//! - Learning a banana ripeness window from labeled examples
//! - Clustering songs with k-means, one iteration at a time
//! - Training and inspecting a grid-world Q-learning agent

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use learnlab::cli::commands;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "learnlab")]
#[command(version, about = "Toy learning algorithms: thresholds, k-means and Q-learning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn a tasty ripeness window from labeled bananas
    Banana(commands::banana::BananaArgs),

    /// Cluster generated songs with k-means
    Music(commands::music::MusicArgs),

    /// Train a Q-learning agent on a grid world
    Robo(Box<commands::robo::RoboArgs>),

    /// Inspect a saved grid-world agent
    RoboInspect(commands::robo::RoboInspectArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Banana(args) => args.common.verbose,
            Commands::Music(args) => args.common.verbose,
            Commands::Robo(args) => args.common.verbose,
            Commands::RoboInspect(args) => args.verbose,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.verbose());

    match cli.command {
        Commands::Banana(args) => commands::banana::execute(args),
        Commands::Music(args) => commands::music::execute(args),
        Commands::Robo(args) => commands::robo::execute(*args),
        Commands::RoboInspect(args) => commands::robo::execute_inspect(args),
    }
}
