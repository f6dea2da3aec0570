//! Model-free Q-learning
//!
//! The solver only sees an [`Environment`](crate::mdp::Environment): it
//! steps, observes a reward and successor, and updates
//!
//! ```text
//! Q(s,a) ← (1 − α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))
//! ```
//!
//! with `max_a' Q(s',a') = 0` for terminal `s'`. Actions are chosen
//! ε-greedily. States never visited keep all-zero values, so their extracted
//! action is simply the first legal one.

pub mod agent;
pub mod q_table;

pub use agent::{EpisodeSummary, QLearningSolver};
pub use q_table::QTable;
