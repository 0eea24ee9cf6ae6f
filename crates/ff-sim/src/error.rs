//! Error types for simulation runs.

use ff_circuit::CircuitError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid time of day '{input}': expected HH:MM")]
    InvalidTime { input: String },

    #[error("Network has no substation transformer")]
    NoSubstation,

    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

pub type SimResult<T> = Result<T, SimError>;
