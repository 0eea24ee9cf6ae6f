//! Error types for the ff-app service layer.

use std::path::PathBuf;

use ff_circuit::CircuitError;
use ff_network::NetworkError;
use ff_profiles::ProfileError;
use ff_sim::SimError;

/// Application error type that folds the backend crates' errors into the
/// categories a front end reports on.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad network identifier, day or time. Callers may ask again.
    #[error("Invalid selection: {0}")]
    InputSelection(String),

    /// A sheet, network directory or profile pool is absent.
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Referential integrity: {0}")]
    ReferentialIntegrity(String),

    /// A rating needed for a metric is absent or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Solver protocol error: {0}")]
    SolverProtocol(String),

    #[error("Invalid network data: {0}")]
    Data(String),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ff-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<NetworkError> for AppError {
    fn from(err: NetworkError) -> Self {
        if err.is_referential() {
            return AppError::ReferentialIntegrity(err.to_string());
        }
        match err {
            NetworkError::InputSelection { .. } => AppError::InputSelection(err.to_string()),
            NetworkError::MissingData { .. } => AppError::MissingData(err.to_string()),
            NetworkError::Io(e) => AppError::Io(e),
            other => AppError::Data(other.to_string()),
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::MissingPool { .. } => AppError::MissingData(err.to_string()),
            ProfileError::InvalidDay { .. } => AppError::InputSelection(err.to_string()),
            ProfileError::NotFound { .. } | ProfileError::NoFeasibleSample { .. } => {
                AppError::ProfileNotFound(err.to_string())
            }
            ProfileError::Io(e) => AppError::Io(e),
            other => AppError::Data(other.to_string()),
        }
    }
}

impl From<CircuitError> for AppError {
    fn from(err: CircuitError) -> Self {
        match err {
            CircuitError::DuplicateElement { .. } => {
                AppError::ReferentialIntegrity(err.to_string())
            }
            CircuitError::MissingProfile { .. } => AppError::ProfileNotFound(err.to_string()),
            other => AppError::SolverProtocol(other.to_string()),
        }
    }
}

impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::InvalidTime { .. } => AppError::InputSelection(err.to_string()),
            SimError::NoSubstation => AppError::MissingData(err.to_string()),
            SimError::Circuit(e) => e.into(),
        }
    }
}

impl AppError {
    /// Selection errors are the only ones worth retrying with new input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::InputSelection(_))
    }
}
