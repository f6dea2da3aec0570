//! Query command - look up a saved policy's move for one board

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output::{print_board, print_kv, print_section},
    serialization::SavedPolicy,
    tictactoe::{BoardState, Player},
};

#[derive(Parser, Debug)]
#[command(about = "Show the move a saved policy makes on a board")]
pub struct QueryArgs {
    /// Path to a saved policy
    pub policy: PathBuf,

    /// Board as a label (`X...O...._X`) or nine cells (`X...O....`)
    pub board: String,
}

pub fn execute(args: QueryArgs) -> Result<()> {
    let board = BoardState::from_string(&args.board)
        .with_context(|| format!("'{}' is not a board", args.board))?;
    let saved = SavedPolicy::load(&args.policy)
        .with_context(|| format!("Failed to load policy from {}", args.policy.display()))?;
    let policy = saved.to_policy()?;

    print_section(&format!("Board {}", board.encode()));
    if board.is_terminal() {
        print_board(&board, None);
        let outcome = match board.winner() {
            Some(Player::X) => "X has won",
            Some(Player::O) => "O has won",
            None => "draw",
        };
        print_kv("Game over", outcome);
        return Ok(());
    }

    let action = *policy
        .action(&board)
        .with_context(|| format!("{} policy has no move here", saved.algorithm.label()))?;
    print_board(&board, Some(action));
    print_kv("Move", &format!("{action} (row {}, column {})", action / 3, action % 3));
    Ok(())
}
