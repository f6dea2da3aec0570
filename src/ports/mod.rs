//! Ports (trait boundaries) between the solvers and their callers.
//!
//! [`Solver`] is what the CLI and tests drive; [`Observer`] is how progress
//! bars and history recorders watch a run without the solvers knowing about
//! either.

pub mod observer;
pub mod solver;

pub use observer::Observer;
pub use solver::{Solver, TrainingReport};
