//! Policy iteration

use std::time::Instant;

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    Error, Result,
    config::{Algorithm, PolicyIterationConfig},
    mdp::TransitionModel,
    planning::{
        ValueTable,
        lookahead::{best_action, expected_return},
    },
    policy::Policy,
    ports::{Observer, Solver, TrainingReport, observer::notify_all},
};

/// A best action must beat the current one by more than this to replace it
pub const IMPROVEMENT_TOLERANCE: f64 = 1e-9;

/// Alternates policy evaluation and greedy improvement until the policy stops
/// changing.
///
/// The starting policy picks a uniformly random legal action in each
/// non-terminal state, drawn in state order from the configured seed.
pub struct PolicyIterationSolver<M: TransitionModel> {
    model: M,
    config: PolicyIterationConfig,
    values: ValueTable<M::State>,
    current: Policy<M::State, M::Action>,
    stable: bool,
    sweeps: usize,
    observers: Vec<Box<dyn Observer>>,
}

impl<M: TransitionModel> PolicyIterationSolver<M> {
    pub fn new(model: M, config: PolicyIterationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random::<u64>()),
        };

        let mut current = Policy::new();
        for state in model.states() {
            if model.is_terminal(state) {
                continue;
            }
            let action = model
                .legal_actions(state)
                .choose(&mut rng)
                .cloned()
                .ok_or_else(|| Error::NoActionsAvailable {
                    state: format!("{state:?}"),
                })?;
            current.insert(state.clone(), action);
        }

        let values = ValueTable::new(model.states());
        Ok(Self {
            model,
            config,
            values,
            current,
            stable: false,
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

    pub fn config(&self) -> &PolicyIterationConfig {
        &self.config
    }

    pub fn values(&self) -> &ValueTable<M::State> {
        &self.values
    }

    pub fn value(&self, state: &M::State) -> Result<f64> {
        self.values.get(state)
    }

    /// The policy being evaluated, available at any point
    pub fn current_policy(&self) -> &Policy<M::State, M::Action> {
        &self.current
    }

    /// Sweep the Bellman expectation backup for the current policy until the
    /// largest change is at most δ.
    ///
    /// Returns the number of sweeps and the final change.
    ///
    /// # Errors
    ///
    /// [`Error::NonConvergence`] after `max_evaluation_sweeps` sweeps.
    pub fn evaluate(&mut self) -> Result<(usize, f64)> {
        let discount = self.config.discount;
        for sweep in 1..=self.config.max_evaluation_sweeps {
            let mut updates = Vec::with_capacity(self.current.len());
            for state in self.model.states() {
                if self.model.is_terminal(state) {
                    continue;
                }
                let action = self.current.action(state)?;
                let value = expected_return(&self.model, &self.values, discount, state, action)?;
                updates.push((state.clone(), value));
            }

            let delta = self.values.commit(updates)?;
            self.sweeps += 1;
            let total = self.sweeps;
            notify_all(&mut self.observers, |o| o.on_sweep(total, delta))?;

            if delta <= self.config.delta {
                log::debug!("policy evaluation settled after {sweep} sweeps (delta {delta:.3e})");
                return Ok((sweep, delta));
            }
        }

        Err(Error::NonConvergence {
            phase: "policy evaluation".to_string(),
            limit: self.config.max_evaluation_sweeps,
        })
    }

    /// Switch each state to its greedy action where that is a strict
    /// improvement. Returns how many states changed.
    pub fn improve(&mut self) -> Result<usize> {
        let discount = self.config.discount;
        let mut switches = Vec::new();
        for state in self.model.states() {
            if self.model.is_terminal(state) {
                continue;
            }
            let action = self.current.action(state)?;
            let current_value =
                expected_return(&self.model, &self.values, discount, state, action)?;
            let (best, best_value) = best_action(&self.model, &self.values, discount, state)?;
            if best != *action && best_value > current_value + IMPROVEMENT_TOLERANCE {
                switches.push((state.clone(), best));
            }
        }

        let changed = switches.len();
        for (state, action) in switches {
            self.current.insert(state, action);
        }
        Ok(changed)
    }
}

impl<M: TransitionModel> Solver for PolicyIterationSolver<M> {
    type State = M::State;
    type Action = M::Action;

    fn algorithm(&self) -> Algorithm {
        Algorithm::PolicyIteration
    }

    fn train(&mut self) -> Result<TrainingReport> {
        let started = Instant::now();
        let limit = self.config.max_iterations;
        log::info!(
            "policy iteration over {} states (discount {}, delta {})",
            self.model.states().len(),
            self.config.discount,
            self.config.delta
        );
        notify_all(&mut self.observers, |o| {
            o.on_training_start(Algorithm::PolicyIteration, limit)
        })?;

        self.stable = false;
        let first_sweep = self.sweeps;
        for iteration in 1..=limit {
            let (_, delta) = self.evaluate()?;
            let changed = self.improve()?;
            log::debug!("policy iteration round {iteration}: {changed} states changed");
            notify_all(&mut self.observers, |o| {
                o.on_policy_improvement(iteration, changed)
            })?;

            if changed == 0 {
                self.stable = true;
                let report = TrainingReport {
                    algorithm: Algorithm::PolicyIteration,
                    iterations: iteration,
                    sweeps: self.sweeps - first_sweep,
                    final_delta: delta,
                    converged: true,
                    policy_size: self.current.len(),
                    elapsed: started.elapsed(),
                };
                log::info!(
                    "policy iteration finished: {} rounds, {} evaluation sweeps, {:.2?}",
                    report.iterations,
                    report.sweeps,
                    report.elapsed
                );
                notify_all(&mut self.observers, |o| o.on_training_end(&report))?;
                return Ok(report);
            }
        }

        Err(Error::NonConvergence {
            phase: "policy iteration".to_string(),
            limit,
        })
    }

    fn policy(&self) -> Result<&Policy<M::State, M::Action>> {
        if self.stable {
            Ok(&self.current)
        } else {
            Err(Error::PolicyNotReady {
                solver: Algorithm::PolicyIteration.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GameConfig,
        mdp::StateSpace,
        tictactoe::TicTacToeMdp,
    };

    fn solver(config: PolicyIterationConfig) -> PolicyIterationSolver<TicTacToeMdp> {
        let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
        PolicyIterationSolver::new(mdp, config).unwrap()
    }

    #[test]
    fn initial_policy_is_complete_and_seeded() {
        let a = solver(PolicyIterationConfig::default().with_seed(9));
        let b = solver(PolicyIterationConfig::default().with_seed(9));
        assert!(a.current_policy().is_complete_for(a.model()));
        assert_eq!(a.current_policy(), b.current_policy());
        assert!(matches!(a.policy(), Err(Error::PolicyNotReady { .. })));
    }

    #[test]
    fn terminates_with_a_stable_policy() {
        let mut solver = solver(PolicyIterationConfig::default().with_seed(1));
        let report = solver.train().unwrap();
        assert!(report.converged);
        assert!(report.iterations <= 20, "took {} rounds", report.iterations);

        // another improvement pass changes nothing
        assert_eq!(solver.improve().unwrap(), 0);
        assert!(solver.policy().unwrap().is_complete_for(solver.model()));

        for state in solver.model().states() {
            if solver.model().is_terminal(state) {
                assert_eq!(solver.value(state).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn evaluation_cap_is_reported() {
        let config = PolicyIterationConfig::default()
            .with_seed(2)
            .with_max_evaluation_sweeps(1);
        let mut solver = solver(config);
        match solver.train() {
            Err(Error::NonConvergence { phase, limit }) => {
                assert_eq!(phase, "policy evaluation");
                assert_eq!(limit, 1);
            }
            other => panic!("expected non-convergence, got {other:?}"),
        }
        assert!(!solver.is_trained());
    }

    #[test]
    fn iteration_cap_is_reported() {
        let config = PolicyIterationConfig::default()
            .with_seed(3)
            .with_max_iterations(1);
        let mut solver = solver(config);
        assert!(matches!(
            solver.train(),
            Err(Error::NonConvergence { limit: 1, .. })
        ));
    }
}
