//! Run execution service.

use std::time::Instant;

use ff_circuit::{CircuitSettings, SolverSession, build, load_demands};
use ff_core::{HalfHour, INTERVALS_PER_DAY};
use ff_network::{NetworkId, NetworkSummary};
use ff_profiles::{DayOfYear, ProfilePool, assign_day, date_and_season};
use ff_results::{
    MetricIssue, RunManifest, RunType, SnapshotFrame, compute_run_id, timestamp_now,
};
use ff_sim::{DailyOutcome, Probes, solve_daily_with_progress, solve_snapshot};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::config::StudyConfig;
use crate::error::{AppError, AppResult};
use crate::network_service;
use crate::progress::{DailyProgress, RunProgressEvent, RunStage};

/// What a run solves.
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// One solve at `time` (`HH:MM`, rounded down to the half hour).
    Snapshot { time: String },
    /// Every half hour of the day.
    Daily,
}

impl RunMode {
    pub fn label(&self) -> &'static str {
        match self {
            RunMode::Snapshot { .. } => "snapshot",
            RunMode::Daily => "daily",
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub network: NetworkId,
    /// Day of year, or 0 to draw one at random.
    pub day: u16,
    pub mode: RunMode,
    pub config: &'a StudyConfig,
}

/// Concise timing and execution summary for a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub load_time_s: f64,
    pub assign_time_s: f64,
    pub build_time_s: f64,
    pub solve_time_s: f64,
    pub aggregate_time_s: f64,
    pub total_time_s: f64,
    pub commands_sent: usize,
    pub solve_steps: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub network_summary: NetworkSummary,
    pub snapshot: Option<SnapshotFrame>,
    pub daily: Option<DailyOutcome>,
    /// Assets whose utilization could not be computed.
    pub issues: Vec<MetricIssue>,
    pub timing: RunTimingSummary,
}

/// Settings folded into the run id.
#[derive(Serialize)]
struct RunSettings<'a> {
    circuit: &'a CircuitSettings,
    seed: u64,
    max_redraws: usize,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    mode: RunMode,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    daily: Option<DailyProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            mode,
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            daily,
        });
    }
}

/// Execute a run against `session`.
pub fn execute_run<S: SolverSession, R: Rng + ?Sized>(
    request: &RunRequest,
    session: S,
    rng: &mut R,
) -> AppResult<RunResponse> {
    execute_run_with_progress(request, session, rng, None)
}

/// Execute a run and stream progress events.
///
/// The session is consumed: it is closed when the run completes and dropped
/// if any stage fails.
pub fn execute_run_with_progress<S: SolverSession, R: Rng + ?Sized>(
    request: &RunRequest,
    session: S,
    rng: &mut R,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();
    let config = request.config;

    // Selections are checked before any data is read or command sent.
    let snapshot_time = match &request.mode {
        RunMode::Snapshot { time } => Some(HalfHour::parse_round_down(time).map_err(|_| {
            AppError::InputSelection(format!("invalid time of day '{}': expected HH:MM", time))
        })?),
        RunMode::Daily => None,
    };
    if request.day != 0 {
        DayOfYear::new(request.day)?;
    }

    emit_progress(
        &mut progress_cb,
        request.mode.clone(),
        RunStage::LoadingNetwork,
        started,
        Some(format!("Loading {}", request.network)),
        None,
    );

    let phase = Instant::now();
    let network = network_service::load_network(&config.data_root, request.network)?;
    let probes = Probes::from_model(&network.model)?;

    emit_progress(
        &mut progress_cb,
        request.mode.clone(),
        RunStage::LoadingProfiles,
        started,
        Some("Loading profile pool".to_string()),
        None,
    );

    let pool = ProfilePool::from_dir(&config.data_root)?;
    timing.load_time_s = phase.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        request.mode.clone(),
        RunStage::AssigningProfiles,
        started,
        None,
        None,
    );

    let phase = Instant::now();
    let assignment = assign_day(
        &pool,
        &load_demands(&network.model),
        request.day,
        &config.assign_settings(),
        rng,
    )?;
    let day = assignment.day;
    let (date, season) = date_and_season(day);
    timing.assign_time_s = phase.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        request.mode.clone(),
        RunStage::BuildingCircuit,
        started,
        Some(format!("{} on {} ({})", network.id, date, season)),
        None,
    );

    let phase = Instant::now();
    let mut circuit = build(&network.model, &assignment, &config.circuit, session)?;
    timing.commands_sent = circuit.commands_sent();
    timing.build_time_s = phase.elapsed().as_secs_f64();

    let phase = Instant::now();
    let (run_type, snapshot, daily) = match snapshot_time {
        Some(at) => {
            emit_progress(
                &mut progress_cb,
                request.mode.clone(),
                RunStage::SolvingSnapshot,
                started,
                Some(format!("Solving at {}", at)),
                None,
            );
            let frame = solve_snapshot(&mut circuit, &probes, &at.to_string())?;
            timing.solve_steps = 1;
            let run_type = RunType::Snapshot {
                time: frame.time.clone(),
            };
            (run_type, Some(frame), None)
        }
        None => {
            emit_progress(
                &mut progress_cb,
                request.mode.clone(),
                RunStage::SolvingDaily,
                started,
                None,
                Some(DailyProgress {
                    step: 0,
                    steps: INTERVALS_PER_DAY,
                    fraction_complete: 0.0,
                }),
            );
            let mut on_step = |done: usize| {
                emit_progress(
                    &mut progress_cb,
                    request.mode.clone(),
                    RunStage::SolvingDaily,
                    started,
                    None,
                    Some(DailyProgress {
                        step: done,
                        steps: INTERVALS_PER_DAY,
                        fraction_complete: done as f64 / INTERVALS_PER_DAY as f64,
                    }),
                );
            };
            let outcome = solve_daily_with_progress(&mut circuit, &probes, Some(&mut on_step))?;
            timing.solve_steps = outcome.frame.len();
            let run_type = RunType::Daily {
                steps: outcome.frame.len(),
            };
            (run_type, None, Some(outcome))
        }
    };
    timing.solve_time_s = phase.elapsed().as_secs_f64();
    circuit.close()?;

    emit_progress(
        &mut progress_cb,
        request.mode.clone(),
        RunStage::Aggregating,
        started,
        None,
        None,
    );

    let phase = Instant::now();
    let issues = match (&snapshot, &daily) {
        (Some(frame), _) => frame.issues.clone(),
        (None, Some(outcome)) => outcome.summary.issues.clone(),
        (None, None) => Vec::new(),
    };
    let settings = RunSettings {
        circuit: &config.circuit,
        seed: config.seed,
        max_redraws: config.max_redraws,
    };
    let run_id = compute_run_id(network.id.name(), day.get(), &run_type, &settings);
    let manifest = RunManifest {
        run_id: run_id.clone(),
        network: network.id.name().to_string(),
        timestamp: timestamp_now(),
        run_type,
        day: day.get(),
        date,
        season: season.to_string(),
    };
    timing.aggregate_time_s = phase.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        run_id = %run_id,
        network = %network.id,
        day = day.get(),
        mode = request.mode.label(),
        issues = issues.len(),
        total_s = timing.total_time_s,
        "run completed"
    );

    emit_progress(
        &mut progress_cb,
        request.mode.clone(),
        RunStage::Completed,
        started,
        Some("Run completed".to_string()),
        None,
    );

    Ok(RunResponse {
        run_id,
        manifest,
        network_summary: network.summary,
        snapshot,
        daily,
        issues,
        timing,
    })
}
