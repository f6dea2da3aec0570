//! Tic-Tac-Toe as a Markov Decision Process.
//!
//! The agent plays X and moves first. A transition covers the agent's move
//! and, unless that move ends the game, the opponent's reply, so every
//! non-terminal state in the model has X to move.

use std::{collections::HashSet, sync::Arc};

use super::{
    BoardState, OpponentKind, Player, enumeration::reachable_states, opponents::OpponentModel,
};
use crate::{
    Error, Result,
    config::{GameConfig, RewardConfig},
    mdp::{StateSpace, Transition, TransitionModel},
};

#[derive(Debug, Clone)]
pub struct TicTacToeMdp {
    states: Vec<BoardState>,
    members: HashSet<BoardState>,
    rewards: RewardConfig,
    opponent: Arc<dyn OpponentModel>,
}

impl TicTacToeMdp {
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_opponent_model(config.rewards, config.opponent.build())
    }

    /// Build the model around a custom opponent
    pub fn with_opponent_model(
        rewards: RewardConfig,
        opponent: Arc<dyn OpponentModel>,
    ) -> Result<Self> {
        rewards.validate()?;
        let states = reachable_states(Player::X);
        let members = states.iter().copied().collect();
        log::debug!(
            "enumerated {} states against {} opponent",
            states.len(),
            opponent.kind()
        );
        Ok(Self {
            states,
            members,
            rewards,
            opponent,
        })
    }

    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }

    pub fn opponent(&self) -> OpponentKind {
        self.opponent.kind()
    }

    /// Empty board, X to move
    pub fn initial_state(&self) -> BoardState {
        BoardState::new()
    }

    /// Reward for a transition that lands on `board`
    fn reward_for(&self, board: &BoardState) -> f64 {
        match board.winner() {
            Some(Player::X) => self.rewards.win,
            Some(Player::O) => self.rewards.loss,
            None if board.is_draw() => self.rewards.draw,
            None => self.rewards.living,
        }
    }
}

impl StateSpace for TicTacToeMdp {
    type State = BoardState;
    type Action = usize;

    fn states(&self) -> &[BoardState] {
        &self.states
    }

    fn contains(&self, state: &BoardState) -> bool {
        self.members.contains(state)
    }

    fn is_terminal(&self, state: &BoardState) -> bool {
        state.is_terminal()
    }

    fn legal_actions(&self, state: &BoardState) -> Vec<usize> {
        state.legal_moves()
    }
}

impl TransitionModel for TicTacToeMdp {
    fn transitions(
        &self,
        state: &BoardState,
        action: &usize,
    ) -> Result<Vec<Transition<BoardState>>> {
        if !self.contains(state) {
            return Err(Error::invalid_state(state));
        }
        if state.is_terminal() {
            return Err(Error::terminal(state));
        }
        if *action >= 9 || !state.is_empty(*action) {
            return Err(Error::invalid_action(state, action));
        }

        let after_move = state.make_move(*action)?;
        if after_move.is_terminal() {
            return Ok(vec![Transition::new(
                1.0,
                self.reward_for(&after_move),
                after_move,
            )]);
        }

        self.opponent
            .reply_distribution(&after_move)
            .into_iter()
            .map(|(reply, probability)| -> Result<Transition<BoardState>> {
                let next = after_move.make_move(reply)?;
                Ok(Transition::new(probability, self.reward_for(&next), next))
            })
            .collect()
    }
}
