//! Q-learning solver
//!
//! Learns from sampled play only. The environment hides its transition
//! probabilities; each step yields one `(s, a, r, s')` sample that drives a
//! temporal-difference update.

use std::time::Instant;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    Error, Result,
    config::{Algorithm, QLearningConfig},
    mdp::Environment,
    policy::Policy,
    ports::{Observer, Solver, TrainingReport, observer::notify_all},
    q_learning::q_table::QTable,
    tictactoe::{TicTacToeEnvironment, TicTacToeMdp},
};

const LOG_EVERY: usize = 5_000;

fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::random::<u64>()),
    }
}

/// What one episode produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub steps: usize,
    pub total_reward: f64,
    /// Largest absolute Q-value change made during the episode
    pub max_change: f64,
}

/// Tabular Q-learning with ε-greedy exploration.
///
/// # Examples
///
/// ```no_run
/// use tttmdp::{
///     config::{GameConfig, QLearningConfig},
///     ports::Solver,
///     q_learning::QLearningSolver,
///     tictactoe::TicTacToeMdp,
/// };
///
/// let mdp = TicTacToeMdp::new(GameConfig::default())?;
/// let config = QLearningConfig::default().with_seed(7);
/// let mut solver = QLearningSolver::tictactoe(mdp, config)?;
/// let report = solver.train()?;
/// assert_eq!(report.iterations, 50_000);
/// # Ok::<(), tttmdp::Error>(())
/// ```
pub struct QLearningSolver<E: Environment> {
    env: E,
    config: QLearningConfig,
    q_table: QTable<E::State, E::Action>,
    epsilon: f64,
    rng: StdRng,
    episodes: usize,
    policy: Option<Policy<E::State, E::Action>>,
    observers: Vec<Box<dyn Observer>>,
}

impl<E: Environment> QLearningSolver<E> {
    /// The agent's random source is seeded from `config.seed`; the
    /// environment keeps its own.
    pub fn new(env: E, config: QLearningConfig) -> Result<Self> {
        config.validate()?;
        let q_table = QTable::new(&env);
        Ok(Self {
            q_table,
            epsilon: config.epsilon,
            rng: build_rng(config.seed),
            env,
            config,
            episodes: 0,
            policy: None,
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

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable<E::State, E::Action> {
        &self.q_table
    }

    /// Current exploration rate, after any decay so far
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// ε-greedy choice among the legal actions of `state`
    pub fn select_action(&mut self, state: &E::State) -> Result<E::Action> {
        if self.rng.random::<f64>() < self.epsilon {
            let actions = self.env.legal_actions(state);
            actions
                .choose(&mut self.rng)
                .cloned()
                .ok_or_else(|| Error::NoActionsAvailable {
                    state: format!("{state:?}"),
                })
        } else {
            self.q_table.greedy_action(state).cloned()
        }
    }

    /// Play one episode from a fresh reset, updating after every step
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        self.env.reset();
        let mut summary = EpisodeSummary {
            steps: 0,
            total_reward: 0.0,
            max_change: 0.0,
        };

        while !self.env.is_done() {
            let state = self.env.current_state().clone();
            // a start state can already be over; nothing to learn from it
            if self.env.is_terminal(&state) {
                break;
            }
            let action = self.select_action(&state)?;
            let step = self.env.step(&action)?;
            let change = self.q_table.update(
                &step.from_state,
                &step.action,
                step.reward,
                &step.to_state,
                self.config.learning_rate,
                self.config.discount,
            )?;

            summary.steps += 1;
            summary.total_reward += step.reward;
            summary.max_change = summary.max_change.max(change);
        }

        self.episodes += 1;
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);
        Ok(summary)
    }
}

impl QLearningSolver<TicTacToeEnvironment> {
    /// Q-learning against the model's opponent.
    ///
    /// The environment's sampler is seeded with `seed + 1` so agent and
    /// opponent draw from independent streams.
    pub fn tictactoe(mdp: TicTacToeMdp, config: QLearningConfig) -> Result<Self> {
        let env = TicTacToeEnvironment::new(mdp, config.seed.map(|s| s.wrapping_add(1)));
        Self::new(env, config)
    }
}

impl<E: Environment> Solver for QLearningSolver<E> {
    type State = E::State;
    type Action = E::Action;

    fn algorithm(&self) -> Algorithm {
        Algorithm::QLearning
    }

    fn train(&mut self) -> Result<TrainingReport> {
        let started = Instant::now();
        let episodes = self.config.episodes;
        log::info!(
            "q-learning for {episodes} episodes (alpha {}, epsilon {}, discount {})",
            self.config.learning_rate,
            self.config.epsilon,
            self.config.discount
        );
        notify_all(&mut self.observers, |o| {
            o.on_training_start(Algorithm::QLearning, episodes)
        })?;

        let mut last = 0.0;
        let mut window_reward = 0.0;
        for episode in 1..=episodes {
            let summary = self.run_episode()?;
            last = summary.max_change;
            window_reward += summary.total_reward;
            notify_all(&mut self.observers, |o| {
                o.on_episode_end(episode, summary.total_reward)
            })?;

            if episode.is_multiple_of(LOG_EVERY) {
                log::trace!(
                    "episode {episode}: mean reward {:.3} over last {LOG_EVERY}, epsilon {:.4}",
                    window_reward / LOG_EVERY as f64,
                    self.epsilon
                );
                window_reward = 0.0;
            }
        }

        let policy = self.q_table.greedy_policy()?;
        let report = TrainingReport {
            algorithm: Algorithm::QLearning,
            iterations: episodes,
            sweeps: 0,
            final_delta: last,
            converged: true,
            policy_size: policy.len(),
            elapsed: started.elapsed(),
        };
        self.policy = Some(policy);

        log::info!(
            "q-learning finished: {} episodes, {} states in policy, {:.2?}",
            report.iterations,
            report.policy_size,
            report.elapsed
        );
        notify_all(&mut self.observers, |o| o.on_training_end(&report))?;
        Ok(report)
    }

    fn policy(&self) -> Result<&Policy<E::State, E::Action>> {
        self.policy.as_ref().ok_or_else(|| Error::PolicyNotReady {
            solver: Algorithm::QLearning.to_string(),
        })
    }
}
