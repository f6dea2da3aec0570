//! Evaluate command - play a saved policy against an opponent

use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::to_writer_pretty;

use crate::{
    cli::output::{format_number, format_share, print_kv, print_section, print_subsection},
    evaluation::evaluate_policy,
    serialization::SavedPolicy,
    tictactoe::OpponentKind,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a saved policy")]
pub struct EvaluateArgs {
    /// Path to a saved policy
    pub policy: PathBuf,

    /// Opponent to play against (uniform, defensive, minimax)
    #[arg(long, short = 'o', default_value = "minimax")]
    pub opponent: OpponentKind,

    /// Number of evaluation games
    #[arg(long, short = 'g', default_value_t = 1000)]
    pub games: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the summary as JSON
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let saved = SavedPolicy::load(&args.policy)
        .with_context(|| format!("Failed to load policy from {}", args.policy.display()))?;
    let policy = saved
        .to_policy()
        .with_context(|| format!("{} is not a valid policy", args.policy.display()))?;

    print_section("Loaded Policy");
    print_kv("Algorithm", saved.algorithm.label());
    print_kv("Trained against", saved.metadata.opponent.label());
    print_kv("Discount", &saved.metadata.discount.to_string());
    print_kv("States", &format_number(policy.len()));
    if let Some(report) = &saved.metadata.report {
        print_kv("Iterations", &format_number(report.iterations));
    }

    let summary = evaluate_policy(&policy, args.opponent, args.games, args.seed)
        .context("Evaluation failed")?;

    print_subsection(&format!(
        "{} games vs {}",
        format_number(summary.games),
        summary.opponent
    ));
    print_kv("Wins", &format_share(summary.wins, summary.win_rate()));
    print_kv("Draws", &format_share(summary.draws, summary.draw_rate()));
    print_kv("Losses", &format_share(summary.losses, summary.loss_rate()));

    if let Some(path) = &args.export {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        to_writer_pretty(BufWriter::new(file), &summary)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        println!("\nResults exported to {}", path.display());
    }

    Ok(())
}
