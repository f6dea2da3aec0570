//! Value iteration

use std::time::Instant;

use crate::{
    Error, Result,
    config::{Algorithm, StoppingRule, ValueIterationConfig},
    mdp::TransitionModel,
    planning::{
        ValueTable,
        lookahead::{best_action, greedy_policy},
    },
    policy::Policy,
    ports::{Observer, Solver, TrainingReport, observer::notify_all},
};

/// Bellman optimality backups over the whole state space, followed by greedy
/// policy extraction.
///
/// # Examples
///
/// ```no_run
/// use tttmdp::{
///     config::{GameConfig, StoppingRule, ValueIterationConfig},
///     planning::ValueIterationSolver,
///     ports::Solver,
///     tictactoe::{BoardState, TicTacToeMdp},
/// };
///
/// let mdp = TicTacToeMdp::new(GameConfig::default())?;
/// let config = ValueIterationConfig::default().with_stopping_rule(StoppingRule::Sweeps(10));
/// let mut solver = ValueIterationSolver::new(mdp, config)?;
/// solver.train()?;
/// let first_move = solver.policy()?.action(&BoardState::new())?;
/// # Ok::<(), tttmdp::Error>(())
/// ```
pub struct ValueIterationSolver<M: TransitionModel> {
    model: M,
    config: ValueIterationConfig,
    values: ValueTable<M::State>,
    policy: Option<Policy<M::State, M::Action>>,
    sweeps: usize,
    observers: Vec<Box<dyn Observer>>,
}

impl<M: TransitionModel> ValueIterationSolver<M> {
    pub fn new(model: M, config: ValueIterationConfig) -> Result<Self> {
        config.validate()?;
        let values = ValueTable::new(model.states());
        Ok(Self {
            model,
            config,
            values,
            policy: None,
            sweeps: 0,
            observers: Vec::new(),
        })
    }

    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &ValueIterationConfig {
        &self.config
    }

    pub fn values(&self) -> &ValueTable<M::State> {
        &self.values
    }

    pub fn value(&self, state: &M::State) -> Result<f64> {
        self.values.get(state)
    }

    /// One synchronous backup of every non-terminal state.
    ///
    /// Returns the largest value change. Terminal states are never written
    /// and stay at zero.
    pub fn sweep(&mut self) -> Result<f64> {
        let discount = self.config.discount;
        let mut updates = Vec::with_capacity(self.model.states().len());
        for state in self.model.states() {
            if self.model.is_terminal(state) {
                continue;
            }
            let (_, value) = best_action(&self.model, &self.values, discount, state)?;
            updates.push((state.clone(), value));
        }

        let delta = self.values.commit(updates)?;
        self.sweeps += 1;
        log::debug!("value iteration sweep {}: max delta {delta:.3e}", self.sweeps);
        let sweep = self.sweeps;
        notify_all(&mut self.observers, |o| o.on_sweep(sweep, delta))?;
        Ok(delta)
    }

    /// Greedy policy for the current value table.
    ///
    /// Does not touch the table, so repeated calls agree.
    pub fn extract_policy(&self) -> Result<Policy<M::State, M::Action>> {
        greedy_policy(&self.model, &self.values, self.config.discount)
    }
}

impl<M: TransitionModel> Solver for ValueIterationSolver<M> {
    type State = M::State;
    type Action = M::Action;

    fn algorithm(&self) -> Algorithm {
        Algorithm::ValueIteration
    }

    fn train(&mut self) -> Result<TrainingReport> {
        let started = Instant::now();
        let (budget, threshold) = match self.config.stopping {
            StoppingRule::Sweeps(k) => (k, None),
            StoppingRule::Converged {
                threshold,
                max_sweeps,
            } => (max_sweeps, Some(threshold)),
        };
        log::info!(
            "value iteration over {} states (discount {}, {:?})",
            self.model.states().len(),
            self.config.discount,
            self.config.stopping
        );
        notify_all(&mut self.observers, |o| {
            o.on_training_start(Algorithm::ValueIteration, budget)
        })?;

        let first_sweep = self.sweeps;
        let mut delta = f64::INFINITY;
        let mut converged = threshold.is_none();
        for _ in 0..budget {
            delta = self.sweep()?;
            if threshold.is_some_and(|t| delta <= t) {
                converged = true;
                break;
            }
        }
        if !converged {
            log::warn!("value iteration stopped after {budget} sweeps with delta {delta:.3e}");
        }

        let policy = self.extract_policy()?;
        let sweeps = self.sweeps - first_sweep;
        let report = TrainingReport {
            algorithm: Algorithm::ValueIteration,
            iterations: sweeps,
            sweeps,
            final_delta: if sweeps == 0 { 0.0 } else { delta },
            converged,
            policy_size: policy.len(),
            elapsed: started.elapsed(),
        };
        self.policy = Some(policy);

        log::info!(
            "value iteration finished: {} sweeps, delta {:.3e}, {:.2?}",
            report.sweeps,
            report.final_delta,
            report.elapsed
        );
        notify_all(&mut self.observers, |o| o.on_training_end(&report))?;
        Ok(report)
    }

    fn policy(&self) -> Result<&Policy<M::State, M::Action>> {
        self.policy.as_ref().ok_or_else(|| Error::PolicyNotReady {
            solver: Algorithm::ValueIteration.to_string(),
        })
    }
}
