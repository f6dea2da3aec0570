//! Tic-Tac-Toe MDP CLI
//!
//! Train value iteration, policy iteration or Q-learning policies, evaluate
//! them against opponents, and query individual moves.

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tttmdp")]
#[command(version, about = "Solve Tic-Tac-Toe as a Markov Decision Process", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a policy (value iteration, policy iteration or Q-learning)
    Train(Box<tttmdp::cli::commands::train::TrainArgs>),

    /// Evaluate a saved policy against an opponent
    Evaluate(tttmdp::cli::commands::evaluate::EvaluateArgs),

    /// Show a saved policy's move for a board
    Query(tttmdp::cli::commands::query::QueryArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => tttmdp::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => tttmdp::cli::commands::evaluate::execute(args),
        Commands::Query(args) => tttmdp::cli::commands::query::execute(args),
    }
}
