//! Playing a trained policy against an opponent

use std::fmt;

use rand::{Rng, SeedableRng, distr::StandardUniform, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    policy::Policy,
    tictactoe::{BoardState, OpponentKind, OpponentModel, Player},
};

/// Result of one game from the agent's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Win,
    Draw,
    Loss,
}

/// Tally over a batch of games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub opponent: OpponentKind,
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl EvaluationSummary {
    fn rate(&self, count: usize) -> f64 {
        if self.games > 0 {
            count as f64 / self.games as f64
        } else {
            0.0
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.rate(self.wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }

    pub fn loss_rate(&self) -> f64 {
        self.rate(self.losses)
    }

    fn record(&mut self, outcome: GameOutcome) {
        self.games += 1;
        match outcome {
            GameOutcome::Win => self.wins += 1,
            GameOutcome::Draw => self.draws += 1,
            GameOutcome::Loss => self.losses += 1,
        }
    }
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games vs {}: {} wins ({:.1}%), {} draws ({:.1}%), {} losses ({:.1}%)",
            self.games,
            self.opponent,
            self.wins,
            self.win_rate() * 100.0,
            self.draws,
            self.draw_rate() * 100.0,
            self.losses,
            self.loss_rate() * 100.0
        )
    }
}

fn sample_reply(rng: &mut StdRng, replies: &[(usize, f64)]) -> Option<usize> {
    let mut threshold = rng.sample::<f64, _>(StandardUniform);
    for &(cell, p) in replies {
        if threshold < p {
            return Some(cell);
        }
        threshold -= p;
    }
    replies.last().map(|&(cell, _)| cell)
}

/// Play one game from `start`, X following `policy` and O sampling from
/// `opponent`.
///
/// # Errors
///
/// [`crate::Error::PolicyUnavailable`] if play reaches a state the policy
/// has no action for.
pub fn play_game(
    policy: &Policy<BoardState, usize>,
    opponent: &dyn OpponentModel,
    start: BoardState,
    rng: &mut StdRng,
) -> Result<GameOutcome> {
    let mut board = start;
    while !board.is_terminal() {
        let cell = match board.to_move {
            Player::X => *policy.action(&board)?,
            Player::O => sample_reply(rng, &opponent.reply_distribution(&board)).ok_or_else(
                || crate::Error::NoActionsAvailable {
                    state: format!("{board:?}"),
                },
            )?,
        };
        board = board.make_move(cell)?;
    }

    Ok(match board.winner() {
        Some(Player::X) => GameOutcome::Win,
        Some(Player::O) => GameOutcome::Loss,
        None => GameOutcome::Draw,
    })
}

/// Play `games` games from the empty board with X moving first
pub fn evaluate_policy(
    policy: &Policy<BoardState, usize>,
    opponent: OpponentKind,
    games: usize,
    seed: Option<u64>,
) -> Result<EvaluationSummary> {
    let model = opponent.build();
    let mut rng = match seed {
        Some(value) => StdRng::seed_from_u64(value),
        None => StdRng::seed_from_u64(rand::random::<u64>()),
    };

    let mut summary = EvaluationSummary {
        opponent,
        games: 0,
        wins: 0,
        draws: 0,
        losses: 0,
    };
    for _ in 0..games {
        let outcome = play_game(policy, model.as_ref(), BoardState::new(), &mut rng)?;
        summary.record(outcome);
    }

    log::info!("{summary}");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error,
        tictactoe::{DefensiveOpponent, MinimaxOpponent},
    };

    /// Plays the first empty cell everywhere
    fn first_cell_policy() -> Policy<BoardState, usize> {
        crate::tictactoe::reachable_states(Player::X)
            .into_iter()
            .filter(|s| !s.is_terminal())
            .map(|s| (s, s.legal_moves()[0]))
            .collect()
    }

    #[test]
    fn tallies_add_up() {
        let summary =
            evaluate_policy(&first_cell_policy(), OpponentKind::Uniform, 200, Some(1)).unwrap();
        assert_eq!(summary.games, 200);
        assert_eq!(summary.wins + summary.draws + summary.losses, 200);
        let total = summary.win_rate() + summary.draw_rate() + summary.loss_rate();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn naive_policy_loses_to_minimax() {
        let policy = first_cell_policy();
        let mut rng = StdRng::seed_from_u64(0);
        let outcome =
            play_game(&policy, &MinimaxOpponent::new(), BoardState::new(), &mut rng).unwrap();
        assert_eq!(outcome, GameOutcome::Loss);
    }

    #[test]
    fn starting_from_a_won_position() {
        let mut policy = Policy::new();
        let start = BoardState::from_label("XOO.X...._X").unwrap();
        policy.insert(start, 8);
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = play_game(&policy, &DefensiveOpponent, start, &mut rng).unwrap();
        assert_eq!(outcome, GameOutcome::Win);
    }

    #[test]
    fn missing_state_is_reported() {
        let policy = Policy::new();
        let err = evaluate_policy(&policy, OpponentKind::Uniform, 1, Some(0)).unwrap_err();
        assert!(matches!(err, Error::PolicyUnavailable { .. }));
    }
}
