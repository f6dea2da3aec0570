//! Markov Decision Process abstractions shared by the solvers.
//!
//! The solvers never look at a concrete game. Value iteration and policy
//! iteration need a [`TransitionModel`] (full access to outcome
//! probabilities); Q-learning only needs an [`Environment`] that can be
//! stepped and reset. Both extend [`StateSpace`], which enumerates the finite
//! set of states and the legal actions in each.

use std::{fmt::Debug, hash::Hash};

use crate::Result;

/// Tolerance used when checking that outcome probabilities sum to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Finite, fully enumerable state space
pub trait StateSpace {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + Eq + Hash + Debug;

    /// Every valid state, in a fixed order.
    ///
    /// Solvers iterate in this order, so it determines which of several
    /// equally good actions ends up in a policy and how seeded random
    /// initialization is consumed.
    fn states(&self) -> &[Self::State];

    /// Whether `state` belongs to the enumerated set
    fn contains(&self, state: &Self::State) -> bool;

    /// Whether no further actions can be taken in `state`
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Legal actions in enumeration order; empty for terminal states
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;
}

/// One possible outcome of taking an action
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    pub probability: f64,
    pub reward: f64,
    pub next_state: S,
}

impl<S> Transition<S> {
    pub fn new(probability: f64, reward: f64, next_state: S) -> Self {
        Self {
            probability,
            reward,
            next_state,
        }
    }
}

/// Model with inspectable dynamics, used by the planning solvers
pub trait TransitionModel: StateSpace {
    /// All outcomes of taking `action` in `state`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidStateQuery`] if `state` is not enumerated
    /// - [`crate::Error::TerminalState`] if `state` is terminal
    /// - [`crate::Error::InvalidAction`] if `action` is not legal in `state`
    fn transitions(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<Vec<Transition<Self::State>>>;
}

/// A single `(s, a, r, s')` sample produced by an [`Environment`]
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S, A> {
    pub from_state: S,
    pub action: A,
    pub reward: f64,
    pub to_state: S,
}

/// Sample-based interface used by Q-learning.
///
/// An environment exposes no probabilities; it only moves from its current
/// state to a sampled successor.
pub trait Environment: StateSpace {
    /// State the next action will be taken from
    fn current_state(&self) -> &Self::State;

    /// Whether the current episode has ended
    fn is_done(&self) -> bool;

    /// Take `action` from the current state.
    ///
    /// # Errors
    ///
    /// Fails if the episode is over or `action` is not legal.
    fn step(&mut self, action: &Self::Action) -> Result<Step<Self::State, Self::Action>>;

    /// Start a fresh episode and return its initial state
    fn reset(&mut self) -> &Self::State;
}

/// Check that a transition list is a probability distribution
pub fn check_distribution<S: Debug>(
    state: &S,
    transitions: &[Transition<S>],
) -> Result<()> {
    let total: f64 = transitions.iter().map(|t| t.probability).sum();
    let valid = transitions
        .iter()
        .all(|t| t.probability >= 0.0 && t.probability.is_finite());
    if valid && (total - 1.0).abs() <= PROBABILITY_TOLERANCE {
        Ok(())
    } else {
        Err(crate::Error::InvalidDistribution {
            context: format!("{state:?}"),
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_must_sum_to_one() {
        let ok = vec![Transition::new(0.25, 0.0, 1), Transition::new(0.75, 1.0, 2)];
        assert!(check_distribution(&0, &ok).is_ok());

        let short = vec![Transition::new(0.5, 0.0, 1)];
        assert!(check_distribution(&0, &short).is_err());

        let negative = vec![Transition::new(1.5, 0.0, 1), Transition::new(-0.5, 0.0, 2)];
        assert!(check_distribution(&0, &negative).is_err());
    }
}
