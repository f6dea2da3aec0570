//! Sample-based view of the Tic-Tac-Toe MDP

use rand::{Rng, SeedableRng, distr::StandardUniform, rngs::StdRng};

use super::{BoardState, mdp::TicTacToeMdp};
use crate::{
    Error, Result,
    mdp::{Environment, StateSpace, Step, Transition, TransitionModel},
};

/// Plays episodes against the model's opponent.
///
/// Each [`Environment::step`] draws one outcome from the model's transition
/// distribution, so the learner never sees the probabilities themselves.
#[derive(Debug, Clone)]
pub struct TicTacToeEnvironment {
    mdp: TicTacToeMdp,
    start: BoardState,
    current: BoardState,
    rng: StdRng,
}

impl TicTacToeEnvironment {
    pub fn new(mdp: TicTacToeMdp, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(value) => StdRng::seed_from_u64(value),
            None => StdRng::seed_from_u64(rand::random::<u64>()),
        };
        let start = mdp.initial_state();
        Self {
            mdp,
            start,
            current: start,
            rng,
        }
    }

    /// Begin every episode from `start` instead of the empty board.
    ///
    /// # Errors
    ///
    /// `start` must be a non-terminal member of the state space.
    pub fn with_start_state(mut self, start: BoardState) -> Result<Self> {
        if !self.mdp.contains(&start) {
            return Err(Error::invalid_state(&start));
        }
        if start.is_terminal() {
            return Err(Error::terminal(&start));
        }
        self.start = start;
        self.current = start;
        Ok(self)
    }

    pub fn start_state(&self) -> BoardState {
        self.start
    }

    pub fn model(&self) -> &TicTacToeMdp {
        &self.mdp
    }

    fn sample<'a>(
        &mut self,
        outcomes: &'a [Transition<BoardState>],
    ) -> Option<&'a Transition<BoardState>> {
        let mut threshold = self.rng.sample::<f64, _>(StandardUniform);
        for outcome in outcomes {
            if threshold < outcome.probability {
                return Some(outcome);
            }
            threshold -= outcome.probability;
        }
        // rounding can leave a sliver past the last outcome
        outcomes.last()
    }
}

impl StateSpace for TicTacToeEnvironment {
    type State = BoardState;
    type Action = usize;

    fn states(&self) -> &[BoardState] {
        self.mdp.states()
    }

    fn contains(&self, state: &BoardState) -> bool {
        self.mdp.contains(state)
    }

    fn is_terminal(&self, state: &BoardState) -> bool {
        self.mdp.is_terminal(state)
    }

    fn legal_actions(&self, state: &BoardState) -> Vec<usize> {
        self.mdp.legal_actions(state)
    }
}

impl Environment for TicTacToeEnvironment {
    fn current_state(&self) -> &BoardState {
        &self.current
    }

    fn is_done(&self) -> bool {
        self.current.is_terminal()
    }

    fn step(&mut self, action: &usize) -> Result<Step<BoardState, usize>> {
        let from_state = self.current;
        let outcomes = self.mdp.transitions(&from_state, action)?;
        let outcome = self
            .sample(&outcomes)
            .cloned()
            .ok_or_else(|| Error::InvalidDistribution {
                context: format!("{from_state:?}"),
                total: 0.0,
            })?;

        self.current = outcome.next_state;
        Ok(Step {
            from_state,
            action: *action,
            reward: outcome.reward,
            to_state: outcome.next_state,
        })
    }

    fn reset(&mut self) -> &BoardState {
        self.current = self.start;
        &self.current
    }
}
