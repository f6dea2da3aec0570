//! Common test utilities for the tttmdp test suite.
//!
//! Besides float helpers this provides a three-state MDP small enough to
//! solve by hand, so solvers can be checked against exact values.

#![allow(dead_code)]

use rand::{Rng, SeedableRng, distr::StandardUniform, rngs::StdRng};
use tttmdp::{
    Error, Result,
    mdp::{Environment, StateSpace, Step, Transition, TransitionModel},
};

pub const TOLERANCE: f64 = 1e-6;

pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Discount the chain's hand-computed values assume
pub const CHAIN_DISCOUNT: f64 = 0.9;

/// Optimal values of states 0 and 1 under [`CHAIN_DISCOUNT`]
pub const CHAIN_VALUES: [f64; 2] = [18.0, 20.0];

/// Three-state chain with a loop:
///
/// ```text
/// 0 --stay (r=1)--> 0
/// 0 --gamble------> 2 (p=0.5, r=16) | 0 (p=0.5, r=0)
/// 0 --go (r=0)----> 1
/// 1 --finish (r=20)-> 2
/// 1 --back (r=0)----> 0
/// ```
///
/// State 2 is terminal. With γ = 0.9 the optimal policy is `go` then
/// `finish`, giving V(0) = 18 and V(1) = 20.
#[derive(Debug, Clone)]
pub struct ChainMdp {
    states: Vec<u8>,
}

impl ChainMdp {
    pub const TERMINAL: u8 = 2;

    pub fn new() -> Self {
        Self {
            states: vec![0, 1, Self::TERMINAL],
        }
    }
}

impl Default for ChainMdp {
    fn default() -> Self {
        Self::new()
    }
}

impl StateSpace for ChainMdp {
    type State = u8;
    type Action = &'static str;

    fn states(&self) -> &[u8] {
        &self.states
    }

    fn contains(&self, state: &u8) -> bool {
        *state <= Self::TERMINAL
    }

    fn is_terminal(&self, state: &u8) -> bool {
        *state == Self::TERMINAL
    }

    fn legal_actions(&self, state: &u8) -> Vec<&'static str> {
        match state {
            0 => vec!["stay", "gamble", "go"],
            1 => vec!["finish", "back"],
            _ => Vec::new(),
        }
    }
}

impl TransitionModel for ChainMdp {
    fn transitions(&self, state: &u8, action: &&'static str) -> Result<Vec<Transition<u8>>> {
        if !self.contains(state) {
            return Err(Error::InvalidStateQuery {
                state: format!("{state:?}"),
            });
        }
        if self.is_terminal(state) {
            return Err(Error::TerminalState {
                state: format!("{state:?}"),
            });
        }
        let outcomes = match (*state, *action) {
            (0, "stay") => vec![Transition::new(1.0, 1.0, 0)],
            (0, "gamble") => vec![
                Transition::new(0.5, 16.0, Self::TERMINAL),
                Transition::new(0.5, 0.0, 0),
            ],
            (0, "go") => vec![Transition::new(1.0, 0.0, 1)],
            (1, "finish") => vec![Transition::new(1.0, 20.0, Self::TERMINAL)],
            (1, "back") => vec![Transition::new(1.0, 0.0, 0)],
            _ => {
                return Err(Error::InvalidAction {
                    state: format!("{state:?}"),
                    action: format!("{action:?}"),
                });
            }
        };
        Ok(outcomes)
    }
}

/// [`ChainMdp`] as a sampled environment, always starting from state 0
#[derive(Debug)]
pub struct ChainEnvironment {
    model: ChainMdp,
    current: u8,
    rng: StdRng,
}

impl ChainEnvironment {
    pub fn new(seed: u64) -> Self {
        Self {
            model: ChainMdp::new(),
            current: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl StateSpace for ChainEnvironment {
    type State = u8;
    type Action = &'static str;

    fn states(&self) -> &[u8] {
        self.model.states()
    }

    fn contains(&self, state: &u8) -> bool {
        self.model.contains(state)
    }

    fn is_terminal(&self, state: &u8) -> bool {
        self.model.is_terminal(state)
    }

    fn legal_actions(&self, state: &u8) -> Vec<&'static str> {
        self.model.legal_actions(state)
    }
}

impl Environment for ChainEnvironment {
    fn current_state(&self) -> &u8 {
        &self.current
    }

    fn is_done(&self) -> bool {
        self.model.is_terminal(&self.current)
    }

    fn step(&mut self, action: &&'static str) -> Result<Step<u8, &'static str>> {
        let outcomes = self.model.transitions(&self.current, action)?;
        let mut threshold = self.rng.sample::<f64, _>(StandardUniform);
        let mut chosen = outcomes.len() - 1;
        for (index, outcome) in outcomes.iter().enumerate() {
            if threshold < outcome.probability {
                chosen = index;
                break;
            }
            threshold -= outcome.probability;
        }
        let outcome = &outcomes[chosen];
        let step = Step {
            from_state: self.current,
            action: *action,
            reward: outcome.reward,
            to_state: outcome.next_state,
        };
        self.current = outcome.next_state;
        Ok(step)
    }

    fn reset(&mut self) -> &u8 {
        self.current = 0;
        &self.current
    }
}
