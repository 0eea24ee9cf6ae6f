//! Compiling, assigning and planning without a live solver.

use ff_circuit::{CircuitPlan, RecordingSession, Stage, apply, load_demands, plan};
use ff_network::NetworkId;
use ff_profiles::{DayAssignment, ProfilePool, assign_day};
use rand::Rng;
use tracing::info;

use crate::config::StudyConfig;
use crate::error::AppResult;
use crate::network_service::{self, LoadedNetwork};

/// A planned circuit for one network and day.
#[derive(Debug, Clone)]
pub struct PreparedCircuit {
    pub network: LoadedNetwork,
    pub assignment: DayAssignment,
    pub plan: CircuitPlan,
}

impl PreparedCircuit {
    /// Command count per build stage, empty stages included.
    pub fn stage_counts(&self) -> Vec<(Stage, usize)> {
        Stage::ALL
            .iter()
            .map(|&stage| (stage, self.plan.stage_count(stage)))
            .collect()
    }
}

/// Compile the network, assign profiles for `day` (0 for random) and plan the build.
pub fn prepare_circuit<R: Rng + ?Sized>(
    config: &StudyConfig,
    network: NetworkId,
    day: u16,
    rng: &mut R,
) -> AppResult<PreparedCircuit> {
    let network = network_service::load_network(&config.data_root, network)?;
    let pool = ProfilePool::from_dir(&config.data_root)?;
    let assignment = assign_day(
        &pool,
        &load_demands(&network.model),
        day,
        &config.assign_settings(),
        rng,
    )?;
    let plan = plan(&network.model, &assignment, &config.circuit)?;
    info!(
        network = %network.id,
        day = assignment.day.get(),
        commands = plan.len(),
        "circuit planned"
    );
    Ok(PreparedCircuit {
        network,
        assignment,
        plan,
    })
}

/// Apply the plan to a recording session and return what it received.
pub fn dry_run_script(prepared: &PreparedCircuit) -> AppResult<String> {
    let built = apply(&prepared.plan, RecordingSession::new())?;
    Ok(built.session().script())
}
