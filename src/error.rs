//! Error types for the tttmdp crate

use thiserror::Error;

/// Main error type for the tttmdp crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid move: position {position} is out of bounds or already occupied")]
    InvalidMove { position: usize },

    #[error("board string too short: expected {expected} cells, got {got} in '{context}'")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("invalid piece counts: X={x_count}, O={o_count} (must be equal or X ahead by 1)")]
    InvalidPieceCounts { x_count: usize, o_count: usize },

    #[error("invalid label format '{label}' (expected format: '{expected}')")]
    InvalidLabelFormat { label: String, expected: String },

    #[error("missing {part} in label '{label}'")]
    MissingLabelPart { part: String, label: String },

    #[error("invalid player '{player}' in label '{label}' (expected 'X' or 'O')")]
    InvalidPlayerString { player: String, label: String },

    #[error("state {state} is not in the enumerated state space")]
    InvalidStateQuery { state: String },

    #[error("action {action} is not legal in state {state}")]
    InvalidAction { state: String, action: String },

    #[error("state {state} is terminal; no actions can be taken")]
    TerminalState { state: String },

    #[error("policy has no action assigned for state {state}")]
    PolicyUnavailable { state: String },

    #[error("{solver} has not finished training; no policy is available yet")]
    PolicyNotReady { solver: String },

    #[error("non-terminal state {state} has no available actions")]
    NoActionsAvailable { state: String },

    #[error("{phase} did not converge within {limit} iterations")]
    NonConvergence { phase: String, limit: usize },

    #[error("value for state {state} became non-finite ({value})")]
    NonFiniteValue { state: String, value: f64 },

    #[error("transition probabilities for {context} sum to {total}, expected 1")]
    InvalidDistribution { context: String, total: f64 },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },
}

impl Error {
    pub(crate) fn invalid_state<S: std::fmt::Debug>(state: &S) -> Self {
        Error::InvalidStateQuery {
            state: format!("{state:?}"),
        }
    }

    pub(crate) fn invalid_action<S: std::fmt::Debug, A: std::fmt::Debug>(
        state: &S,
        action: &A,
    ) -> Self {
        Error::InvalidAction {
            state: format!("{state:?}"),
            action: format!("{action:?}"),
        }
    }

    pub(crate) fn terminal<S: std::fmt::Debug>(state: &S) -> Self {
        Error::TerminalState {
            state: format!("{state:?}"),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
