//! Ready-made training observers

use std::sync::{Arc, Mutex, MutexGuard};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    config::Algorithm,
    ports::{Observer, TrainingReport},
};

/// Progress bar observer - shows sweeps or episodes as they complete
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    unit: &'static str,
    reward_sum: f64,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            unit: "steps",
            reward_sum: 0.0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, algorithm: Algorithm, budget: usize) -> Result<()> {
        self.unit = match algorithm {
            Algorithm::ValueIteration => "sweeps",
            Algorithm::PolicyIteration => "rounds",
            Algorithm::QLearning => "episodes",
        };
        let template = format!(
            "{algorithm} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {} ({{msg}})",
            self.unit
        );
        let pb = ProgressBar::new(budget as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&template)
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        self.reward_sum = 0.0;
        Ok(())
    }

    fn on_sweep(&mut self, sweep: usize, max_delta: f64) -> Result<()> {
        // policy iteration counts rounds on the bar, not evaluation sweeps
        if self.unit == "sweeps" {
            if let Some(pb) = &self.progress_bar {
                pb.set_position(sweep as u64);
                pb.set_message(format!("delta {max_delta:.2e}"));
            }
        }
        Ok(())
    }

    fn on_policy_improvement(&mut self, iteration: usize, changed: usize) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(iteration as u64);
            pb.set_message(format!("{changed} changed"));
        }
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, total_reward: f64) -> Result<()> {
        self.reward_sum += total_reward;
        if let Some(pb) = &self.progress_bar {
            if episode.is_multiple_of(100) {
                pb.set_position(episode as u64);
                pb.set_message(format!("mean reward {:.3}", self.reward_sum / episode as f64));
            }
        }
        Ok(())
    }

    fn on_training_end(&mut self, report: &TrainingReport) -> Result<()> {
        if let Some(pb) = self.progress_bar.take() {
            pb.set_length(report.iterations as u64);
            pb.set_position(report.iterations as u64);
            pb.finish_with_message(format!("done in {:.2?}", report.elapsed));
        }
        Ok(())
    }
}

/// Everything a [`HistoryObserver`] saw
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceHistory {
    /// Largest value change per sweep
    pub sweep_deltas: Vec<f64>,
    /// States changed per improvement round
    pub improvements: Vec<usize>,
    /// Total reward per episode
    pub episode_rewards: Vec<f64>,
    pub report: Option<TrainingReport>,
}

/// Records convergence data into a shared [`ConvergenceHistory`].
///
/// The observer is moved into a solver, so read the history through the
/// handle from [`HistoryObserver::history`].
#[derive(Debug, Clone, Default)]
pub struct HistoryObserver {
    history: Arc<Mutex<ConvergenceHistory>>,
}

impl HistoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Arc<Mutex<ConvergenceHistory>> {
        Arc::clone(&self.history)
    }

    fn lock(&self) -> MutexGuard<'_, ConvergenceHistory> {
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Observer for HistoryObserver {
    fn on_training_start(&mut self, _algorithm: Algorithm, _budget: usize) -> Result<()> {
        *self.lock() = ConvergenceHistory::default();
        Ok(())
    }

    fn on_sweep(&mut self, _sweep: usize, max_delta: f64) -> Result<()> {
        self.lock().sweep_deltas.push(max_delta);
        Ok(())
    }

    fn on_policy_improvement(&mut self, _iteration: usize, changed: usize) -> Result<()> {
        self.lock().improvements.push(changed);
        Ok(())
    }

    fn on_episode_end(&mut self, _episode: usize, total_reward: f64) -> Result<()> {
        self.lock().episode_rewards.push(total_reward);
        Ok(())
    }

    fn on_training_end(&mut self, report: &TrainingReport) -> Result<()> {
        self.lock().report = Some(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{GameConfig, PolicyIterationConfig, StoppingRule, ValueIterationConfig},
        planning::{PolicyIterationSolver, ValueIterationSolver},
        ports::Solver,
        tictactoe::TicTacToeMdp,
    };

    #[test]
    fn history_records_value_iteration_sweeps() {
        let observer = HistoryObserver::new();
        let history = observer.history();
        let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
        let config = ValueIterationConfig::default().with_stopping_rule(StoppingRule::Sweeps(4));
        let mut solver = ValueIterationSolver::new(mdp, config)
            .unwrap()
            .with_observer(Box::new(observer));
        solver.train().unwrap();

        let history = history.lock().unwrap();
        assert_eq!(history.sweep_deltas.len(), 4);
        assert!(history.sweep_deltas[0] > 0.0);
        assert!(history.improvements.is_empty());
        assert_eq!(history.report.as_ref().map(|r| r.sweeps), Some(4));
    }

    #[test]
    fn history_records_improvement_rounds() {
        let observer = HistoryObserver::new();
        let history = observer.history();
        let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
        let config = PolicyIterationConfig::default().with_seed(6);
        let mut solver = PolicyIterationSolver::new(mdp, config)
            .unwrap()
            .with_observer(Box::new(observer));
        let report = solver.train().unwrap();

        let history = history.lock().unwrap();
        assert_eq!(history.improvements.len(), report.iterations);
        assert_eq!(history.improvements.last(), Some(&0));
        assert_eq!(history.sweep_deltas.len(), report.sweeps);
    }

    #[test]
    fn progress_observer_survives_a_run() {
        let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
        let config = ValueIterationConfig::default().with_stopping_rule(StoppingRule::Sweeps(2));
        let mut solver = ValueIterationSolver::new(mdp, config)
            .unwrap()
            .with_observer(Box::new(ProgressObserver::new()));
        assert!(solver.train().is_ok());
    }
}
