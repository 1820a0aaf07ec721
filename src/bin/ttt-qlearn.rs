//! ttt-qlearn - Train and evaluate tabular Q-learning agents for tic-tac-toe
//!
//! Logging is controlled through `RUST_LOG` (default `info`).

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ttt-qlearn")]
#[command(version, about = "Tabular Q-learning for tic-tac-toe", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent, resuming from its knowledge file when present
    Train(Box<ttt_qlearn::cli::commands::train::TrainArgs>),

    /// Evaluate a trained agent against a fixed opponent
    Evaluate(ttt_qlearn::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => ttt_qlearn::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => ttt_qlearn::cli::commands::evaluate::execute(args),
    }
}
