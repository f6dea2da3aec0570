//! Model-based planning: value iteration and policy iteration
//!
//! Both solvers need a [`TransitionModel`](crate::mdp::TransitionModel) and
//! share the same building blocks: a [`ValueTable`] updated one whole sweep
//! at a time, and a one-step lookahead that scores each legal action by its
//! expected discounted return.
//!
//! | | Value iteration | Policy iteration |
//! |---|---|---|
//! | Backup | max over actions | current policy's action |
//! | Stops | sweep budget or threshold | policy unchanged |
//! | Policy | extracted once at the end | improved every round |

pub mod lookahead;
pub mod policy_iteration;
pub mod value_iteration;
pub mod value_table;

pub use policy_iteration::PolicyIterationSolver;
pub use value_iteration::ValueIterationSolver;
pub use value_table::ValueTable;
