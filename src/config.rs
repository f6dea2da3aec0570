//! Configuration types for the solvers.
//!
//! Every solver takes one of the algorithm configs below; the Tic-Tac-Toe
//! model itself is shaped by a [`GameConfig`]. They are plain serde values so
//! the CLI can read them from a JSON file, and they carry builder-style
//! `with_*` setters for use from code.
//!
//! # Examples
//!
//! ```
//! use tttmdp::config::{GameConfig, RewardConfig, StoppingRule, ValueIterationConfig};
//!
//! let game = GameConfig::default().with_rewards(RewardConfig::new(10.0, -10.0, -0.1, 0.0));
//! let config = ValueIterationConfig::default()
//!     .with_discount(0.9)
//!     .with_stopping_rule(StoppingRule::Sweeps(10));
//! assert!(game.validate().is_ok());
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, tictactoe::OpponentKind};

/// The three solving algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    ValueIteration,
    PolicyIteration,
    QLearning,
}

impl Algorithm {
    pub fn label(self) -> &'static str {
        match self {
            Algorithm::ValueIteration => "Value Iteration",
            Algorithm::PolicyIteration => "Policy Iteration",
            Algorithm::QLearning => "Q-Learning",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reward shaping constants for the Tic-Tac-Toe MDP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Reward when the agent completes a line
    pub win: f64,
    /// Reward when the opponent completes a line
    pub loss: f64,
    /// Reward for a move after which the game continues
    pub living: f64,
    /// Reward when the board fills up without a winner
    pub draw: f64,
}

impl RewardConfig {
    pub fn new(win: f64, loss: f64, living: f64, draw: f64) -> Self {
        Self {
            win,
            loss,
            living,
            draw,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("win", self.win),
            ("loss", self.loss),
            ("living", self.living),
            ("draw", self.draw),
        ] {
            if !value.is_finite() {
                return Err(Error::invalid_config(format!(
                    "{name} reward must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self::new(10.0, -10.0, 0.0, 0.0)
    }
}

/// Shape of the Tic-Tac-Toe MDP: rewards and the opponent folded into the dynamics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rewards: RewardConfig,
    pub opponent: OpponentKind,
}

impl GameConfig {
    pub fn with_rewards(mut self, rewards: RewardConfig) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_opponent(mut self, opponent: OpponentKind) -> Self {
        self.opponent = opponent;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.rewards.validate()
    }
}

/// When value iteration stops sweeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoppingRule {
    /// Run exactly this many sweeps
    Sweeps(usize),
    /// Sweep until the largest value change is at most `threshold`,
    /// giving up after `max_sweeps`
    Converged { threshold: f64, max_sweeps: usize },
}

impl StoppingRule {
    pub const DEFAULT_THRESHOLD: f64 = 1e-9;
    pub const DEFAULT_MAX_SWEEPS: usize = 1_000;
}

impl Default for StoppingRule {
    fn default() -> Self {
        StoppingRule::Converged {
            threshold: Self::DEFAULT_THRESHOLD,
            max_sweeps: Self::DEFAULT_MAX_SWEEPS,
        }
    }
}

fn validate_discount(discount: f64) -> Result<()> {
    if (0.0..=1.0).contains(&discount) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "discount must lie in [0, 1], got {discount}"
        )))
    }
}

/// Configuration for [`crate::planning::ValueIterationSolver`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueIterationConfig {
    pub discount: f64,
    pub stopping: StoppingRule,
}

impl ValueIterationConfig {
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_stopping_rule(mut self, stopping: StoppingRule) -> Self {
        self.stopping = stopping;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_discount(self.discount)?;
        match self.stopping {
            StoppingRule::Sweeps(_) => Ok(()),
            StoppingRule::Converged {
                threshold,
                max_sweeps,
            } => {
                if !(threshold > 0.0 && threshold.is_finite()) {
                    return Err(Error::invalid_config(format!(
                        "convergence threshold must be positive and finite, got {threshold}"
                    )));
                }
                if max_sweeps == 0 {
                    return Err(Error::invalid_config("max_sweeps must be at least 1"));
                }
                Ok(())
            }
        }
    }
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            stopping: StoppingRule::default(),
        }
    }
}

/// Configuration for [`crate::planning::PolicyIterationSolver`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyIterationConfig {
    pub discount: f64,
    /// Evaluation stops once the largest value change in a sweep is at most δ
    pub delta: f64,
    /// Cap on evaluation sweeps for a single policy
    pub max_evaluation_sweeps: usize,
    /// Cap on evaluation/improvement rounds
    pub max_iterations: usize,
    /// Seed for the random initial policy
    pub seed: Option<u64>,
}

impl PolicyIterationConfig {
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_evaluation_sweeps(mut self, sweeps: usize) -> Self {
        self.max_evaluation_sweeps = sweeps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_discount(self.discount)?;
        if !(self.delta > 0.0 && self.delta.is_finite()) {
            return Err(Error::invalid_config(format!(
                "delta must be positive and finite, got {}",
                self.delta
            )));
        }
        if self.max_evaluation_sweeps == 0 || self.max_iterations == 0 {
            return Err(Error::invalid_config("iteration caps must be at least 1"));
        }
        Ok(())
    }
}

impl Default for PolicyIterationConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            delta: 1e-6,
            max_evaluation_sweeps: 10_000,
            max_iterations: 1_000,
            seed: None,
        }
    }
}

/// Configuration for [`crate::q_learning::QLearningSolver`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    pub discount: f64,
    /// Learning rate α
    pub learning_rate: f64,
    /// Exploration rate ε
    pub epsilon: f64,
    /// Multiplicative ε decay applied after each episode
    pub epsilon_decay: f64,
    /// Floor for ε under decay
    pub min_epsilon: f64,
    pub episodes: usize,
    pub seed: Option<u64>,
}

impl QLearningConfig {
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_epsilon_decay(mut self, decay: f64, min_epsilon: f64) -> Self {
        self.epsilon_decay = decay;
        self.min_epsilon = min_epsilon;
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_discount(self.discount)?;
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::invalid_config(format!(
                "learning rate must lie in (0, 1], got {}",
                self.learning_rate
            )));
        }
        for (name, value) in [
            ("epsilon", self.epsilon),
            ("epsilon_decay", self.epsilon_decay),
            ("min_epsilon", self.min_epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::invalid_config(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }
        if self.min_epsilon > self.epsilon {
            return Err(Error::invalid_config(format!(
                "min_epsilon {} exceeds epsilon {}",
                self.min_epsilon, self.epsilon
            )));
        }
        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            learning_rate: 0.1,
            epsilon: 0.1,
            epsilon_decay: 1.0,
            min_epsilon: 0.0,
            episodes: 50_000,
            seed: None,
        }
    }
}
