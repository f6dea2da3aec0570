//! Tic-Tac-Toe as a Markov Decision Process
//!
//! This crate provides:
//! - Complete Tic-Tac-Toe rules, reachable-state enumeration and opponent models
//! - A transition model and an environment over the reachable state space
//! - Value iteration and policy iteration over the transition model
//! - Model-free Q-learning over the environment
//! - Policy evaluation, persistence and a command line front end
//!
//! ```no_run
//! use tttmdp::{
//!     GameConfig, TicTacToeMdp, ValueIterationConfig, ValueIterationSolver, ports::Solver,
//! };
//!
//! let mdp = TicTacToeMdp::new(GameConfig::default())?;
//! let start = mdp.initial_state();
//! let mut solver = ValueIterationSolver::new(mdp, ValueIterationConfig::default())?;
//! solver.train()?;
//! println!("opening move: {}", solver.policy()?.action(&start)?);
//! # Ok::<(), tttmdp::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod mdp;
pub mod observers;
pub mod planning;
pub mod policy;
pub mod ports;
pub mod q_learning;
pub mod serialization;
pub mod tictactoe;

pub use config::{
    Algorithm, GameConfig, PolicyIterationConfig, QLearningConfig, RewardConfig, StoppingRule,
    ValueIterationConfig,
};
pub use error::{Error, Result};
pub use evaluation::{EvaluationSummary, GameOutcome, evaluate_policy};
pub use mdp::{Environment, StateSpace, Step, Transition, TransitionModel};
pub use planning::{PolicyIterationSolver, ValueIterationSolver, ValueTable};
pub use policy::Policy;
pub use q_learning::{QLearningSolver, QTable};
pub use serialization::{PolicyMetadata, SavedPolicy};
pub use tictactoe::{BoardState, OpponentKind, Player, TicTacToeEnvironment, TicTacToeMdp};
