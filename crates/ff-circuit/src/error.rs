//! Error types for circuit construction and solver sessions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CircuitError {
    #[error("Solver rejected '{command}': {message}")]
    Rejected { command: String, message: String },

    #[error("Solver protocol error: {message}")]
    Protocol { message: String },

    #[error("Phase mismatch on {element}: expected {expected} values, got {got}")]
    PhaseMismatch {
        element: String,
        expected: usize,
        got: usize,
    },

    #[error("Duplicate element {element}")]
    DuplicateElement { element: String },

    #[error("No profile assigned to load {load}")]
    MissingProfile { load: String },

    #[error("Solver process error: {message}")]
    Process { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CircuitResult<T> = Result<T, CircuitError>;

impl CircuitError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}
