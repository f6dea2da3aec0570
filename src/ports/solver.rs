//! Solver port - common surface of the three training algorithms

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, config::Algorithm, policy::Policy};

/// Summary of a finished training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub algorithm: Algorithm,
    /// Value iteration: sweeps. Policy iteration: evaluation/improvement
    /// rounds. Q-learning: episodes.
    pub iterations: usize,
    /// Bellman sweeps over the state space (zero for Q-learning)
    pub sweeps: usize,
    /// Largest value change in the last sweep, or the largest Q-value change
    /// in the last episode
    pub final_delta: f64,
    /// Whether the stopping criterion was met. Fixed budgets count as met.
    pub converged: bool,
    /// Number of states with an assigned action
    pub policy_size: usize,
    pub elapsed: Duration,
}

/// A training algorithm that produces a [`Policy`].
///
/// # Examples
///
/// ```no_run
/// use tttmdp::{
///     config::{GameConfig, ValueIterationConfig},
///     planning::ValueIterationSolver,
///     ports::Solver,
///     tictactoe::TicTacToeMdp,
/// };
///
/// fn run<S: Solver>(solver: &mut S) -> tttmdp::Result<usize>
/// where
///     S::State: Eq + std::hash::Hash + std::fmt::Debug,
/// {
///     solver.train()?;
///     Ok(solver.policy()?.len())
/// }
///
/// let mdp = TicTacToeMdp::new(GameConfig::default())?;
/// let mut solver = ValueIterationSolver::new(mdp, ValueIterationConfig::default())?;
/// run(&mut solver)?;
/// # Ok::<(), tttmdp::Error>(())
/// ```
pub trait Solver {
    type State;
    type Action;

    fn algorithm(&self) -> Algorithm;

    /// Run to completion.
    ///
    /// Calling `train` again starts from the current tables rather than
    /// from scratch.
    fn train(&mut self) -> Result<TrainingReport>;

    /// The trained policy.
    ///
    /// # Errors
    ///
    /// [`crate::Error::PolicyNotReady`] until [`Solver::train`] has completed.
    fn policy(&self) -> Result<&Policy<Self::State, Self::Action>>;

    fn is_trained(&self) -> bool {
        self.policy().is_ok()
    }
}
