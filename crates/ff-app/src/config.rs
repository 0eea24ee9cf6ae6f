//! Study configuration, loaded from YAML.

use std::path::{Path, PathBuf};

use ff_circuit::CircuitSettings;
use ff_profiles::AssignSettings;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// External power-flow solver launched for each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            program: "ff-solver".to_string(),
            args: Vec::new(),
        }
    }
}

/// Everything a run needs besides the network and the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Holds the `Network_<n>_*` directories and both profile pools.
    pub data_root: PathBuf,
    pub circuit: CircuitSettings,
    /// Seed for per-load sample draws.
    pub seed: u64,
    /// Commercial draws tried before a load is declared infeasible.
    pub max_redraws: usize,
    pub solver: SolverConfig,
}

impl Default for StudyConfig {
    fn default() -> Self {
        let assign = AssignSettings::default();
        Self {
            data_root: PathBuf::from("data"),
            circuit: CircuitSettings::default(),
            seed: assign.seed,
            max_redraws: assign.max_redraws,
            solver: SolverConfig::default(),
        }
    }
}

impl StudyConfig {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))
    }

    pub fn to_yaml_string(&self) -> AppResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn assign_settings(&self) -> AssignSettings {
        AssignSettings {
            seed: self.seed,
            max_redraws: self.max_redraws,
        }
    }
}

/// Load a study configuration from a YAML file.
pub fn load_config(path: &Path) -> AppResult<StudyConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    StudyConfig::from_yaml_str(&content)
}
