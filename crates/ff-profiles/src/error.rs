use std::path::PathBuf;

use ff_core::CustomerClass;

pub type ProfileResult<T> = Result<T, ProfileError>;

#[derive(thiserror::Error, Debug)]
pub enum ProfileError {
    #[error("Missing data: profile pool not found at {}", path.display())]
    MissingPool { path: PathBuf },

    #[error("Malformed profile pool {file} line {line}: {reason}")]
    Malformed {
        file: String,
        line: u64,
        reason: String,
    },

    #[error("No {class} profile for day {day}")]
    NotFound { class: CustomerClass, day: u16 },

    #[error(
        "No {class} profile for load {load} on day {day} peaks below {limit_kw} kW after {attempts} draws"
    )]
    NoFeasibleSample {
        load: String,
        class: CustomerClass,
        day: u16,
        limit_kw: f64,
        attempts: usize,
    },

    #[error("Invalid day of year {day}: expected 1-365, or 0 for a random day")]
    InvalidDay { day: u16 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
