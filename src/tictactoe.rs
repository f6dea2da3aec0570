//! Tic-Tac-Toe game rules and the MDP built on them

pub mod board;
pub mod enumeration;
pub mod environment;
pub mod lines;
pub mod mdp;
pub mod opponents;

pub use board::{BoardState, Cell, Player};
pub use enumeration::reachable_states;
pub use environment::TicTacToeEnvironment;
pub use lines::{LineAnalyzer, WINNING_LINES};
pub use mdp::TicTacToeMdp;
pub use opponents::{
    DefensiveOpponent, MinimaxOpponent, OpponentKind, OpponentModel, UniformOpponent,
};
