//! Shared application service layer for feederflow.
//!
//! Both the CLI and any other front end go through this crate: it loads the
//! study configuration, selects and compiles a network, and runs the whole
//! compile, assign, build, solve and aggregate pipeline against a solver session.

pub mod circuit_service;
pub mod config;
pub mod error;
pub mod network_service;
pub mod progress;
pub mod query;
pub mod run_service;

pub use circuit_service::{PreparedCircuit, dry_run_script, prepare_circuit};
pub use config::{SolverConfig, StudyConfig, load_config};
pub use error::{AppError, AppResult};
pub use network_service::{
    DataInventory, LoadedNetwork, check_data, load_network, locate_network_dir, select_network,
};
pub use progress::{DailyProgress, RunProgressEvent, RunStage};
pub use query::{
    RunSummary, extract_series, get_run_summary, list_line_ids, list_load_ids,
    list_transformer_ids, most_utilized,
};
pub use run_service::{
    RunMode, RunRequest, RunResponse, RunTimingSummary, execute_run, execute_run_with_progress,
};
