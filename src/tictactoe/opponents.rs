//! Opponent models folded into the Tic-Tac-Toe dynamics.
//!
//! The agent always plays X. After each non-final agent move the opponent
//! (O) replies, and the reply is described as a probability distribution over
//! empty cells so the transition model can expose it directly.

use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use super::{BoardState, Player};

/// Which opponent the MDP is built against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    /// Every legal reply is equally likely
    #[default]
    Uniform,
    /// Wins when it can, blocks when it must, otherwise plays uniformly
    Defensive,
    /// Perfect play by exhaustive minimax
    Minimax,
}

impl OpponentKind {
    pub fn label(self) -> &'static str {
        match self {
            OpponentKind::Uniform => "uniform",
            OpponentKind::Defensive => "defensive",
            OpponentKind::Minimax => "minimax",
        }
    }

    /// Build the model for this kind
    pub fn build(self) -> Arc<dyn OpponentModel> {
        match self {
            OpponentKind::Uniform => Arc::new(UniformOpponent),
            OpponentKind::Defensive => Arc::new(DefensiveOpponent),
            OpponentKind::Minimax => Arc::new(MinimaxOpponent::new()),
        }
    }
}

impl fmt::Display for OpponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OpponentKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uniform" | "random" => Ok(OpponentKind::Uniform),
            "defensive" => Ok(OpponentKind::Defensive),
            "minimax" | "optimal" => Ok(OpponentKind::Minimax),
            other => Err(crate::Error::invalid_config(format!(
                "unknown opponent '{other}' (expected uniform, defensive or minimax)"
            ))),
        }
    }
}

/// Distribution over the opponent's replies
pub trait OpponentModel: fmt::Debug + Send + Sync {
    fn kind(&self) -> OpponentKind;

    /// `(cell, probability)` pairs for the player to move on `board`.
    ///
    /// Only called on non-terminal boards. Cells appear in ascending order,
    /// probabilities are positive and sum to one.
    fn reply_distribution(&self, board: &BoardState) -> Vec<(usize, f64)>;
}

fn uniform_over(moves: &[usize]) -> Vec<(usize, f64)> {
    let p = 1.0 / moves.len() as f64;
    moves.iter().map(|&m| (m, p)).collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UniformOpponent;

impl OpponentModel for UniformOpponent {
    fn kind(&self) -> OpponentKind {
        OpponentKind::Uniform
    }

    fn reply_distribution(&self, board: &BoardState) -> Vec<(usize, f64)> {
        uniform_over(&board.legal_moves())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefensiveOpponent;

impl OpponentModel for DefensiveOpponent {
    fn kind(&self) -> OpponentKind {
        OpponentKind::Defensive
    }

    fn reply_distribution(&self, board: &BoardState) -> Vec<(usize, f64)> {
        let me = board.to_move;
        if let Some(&win) = board.winning_moves(me).first() {
            return vec![(win, 1.0)];
        }
        if let Some(&block) = board.winning_moves(me.opponent()).first() {
            return vec![(block, 1.0)];
        }
        uniform_over(&board.legal_moves())
    }
}

/// Perfect opponent.
///
/// Scores are from X's point of view and weighted by how many cells were
/// still open, so the opponent prefers quick wins and slow losses. Among
/// equally scored replies the lowest cell wins.
#[derive(Clone)]
pub struct MinimaxOpponent {
    scores: HashMap<BoardState, i32>,
}

impl MinimaxOpponent {
    pub fn new() -> Self {
        let mut scores = HashMap::new();
        score(BoardState::new(), &mut scores);
        Self { scores }
    }

    fn score_of(&self, board: BoardState) -> i32 {
        match self.scores.get(&board) {
            Some(&s) => s,
            None => score(board, &mut HashMap::new()),
        }
    }

    /// Best cell for the player to move, or `None` on a finished board
    pub fn best_move(&self, board: &BoardState) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;
        for mv in board.legal_moves() {
            let Ok(next) = board.make_move(mv) else {
                continue;
            };
            let s = self.score_of(next);
            let better = match (best, board.to_move) {
                (None, _) => true,
                (Some((_, b)), Player::X) => s > b,
                (Some((_, b)), Player::O) => s < b,
            };
            if better {
                best = Some((mv, s));
            }
        }
        best.map(|(mv, _)| mv)
    }
}

impl Default for MinimaxOpponent {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MinimaxOpponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinimaxOpponent")
            .field("positions", &self.scores.len())
            .finish()
    }
}

impl OpponentModel for MinimaxOpponent {
    fn kind(&self) -> OpponentKind {
        OpponentKind::Minimax
    }

    fn reply_distribution(&self, board: &BoardState) -> Vec<(usize, f64)> {
        self.best_move(board)
            .map(|mv| vec![(mv, 1.0)])
            .unwrap_or_default()
    }
}

fn score(board: BoardState, memo: &mut HashMap<BoardState, i32>) -> i32 {
    if let Some(&s) = memo.get(&board) {
        return s;
    }

    let open = board.empty_positions().len() as i32;
    let value = if let Some(winner) = board.winner() {
        match winner {
            Player::X => open + 1,
            Player::O => -(open + 1),
        }
    } else if open == 0 {
        0
    } else {
        let children = board
            .legal_moves()
            .into_iter()
            .filter_map(|mv| board.make_move(mv).ok())
            .map(|next| score(next, memo));
        match board.to_move {
            Player::X => children.max().unwrap_or(0),
            Player::O => children.min().unwrap_or(0),
        }
    };

    memo.insert(board, value);
    value
}
