//! Command line front end
//!
//! `train` runs one of the three solvers and optionally saves the policy,
//! `evaluate` plays a saved policy against an opponent, and `query` looks up
//! the move a saved policy makes on a given board.

pub mod commands;
pub mod config;
pub mod output;
