//! 48-step daily run.

use ff_circuit::{BuiltCircuit, SolverSession};
use ff_core::HalfHour;
use ff_results::{
    AssetValue, DailySummary, IntervalRecord, MeasurementFrame, summarize_daily,
};
use tracing::{debug, info};

use crate::error::SimResult;
use crate::probes::Probes;
use crate::snapshot::{daily_mode, set_time};

#[derive(Debug, Clone)]
pub struct DailyOutcome {
    pub frame: MeasurementFrame,
    pub summary: DailySummary,
}

pub fn solve_daily<S: SolverSession>(
    circuit: &mut BuiltCircuit<S>,
    probes: &Probes,
) -> SimResult<DailyOutcome> {
    solve_daily_with_progress(circuit, probes, None)
}

/// Solve every half hour from midnight, recording each step before the next solve.
/// `progress` receives the number of completed steps.
pub fn solve_daily_with_progress<S: SolverSession>(
    circuit: &mut BuiltCircuit<S>,
    probes: &Probes,
    mut progress: Option<&mut dyn FnMut(usize)>,
) -> SimResult<DailyOutcome> {
    let session = circuit.session_mut();
    daily_mode(session)?;

    let mut frame = MeasurementFrame::default();
    for at in HalfHour::all() {
        set_time(session, at)?;
        session.solve()?;

        let mut loads = Vec::with_capacity(probes.loads.len());
        for probe in &probes.loads {
            loads.push(probe.read(session)?);
        }
        let mut transformers = Vec::with_capacity(probes.transformers.len());
        for probe in &probes.transformers {
            transformers.push(AssetValue {
                id: probe.element.name.clone(),
                value: probe.read(session)?,
            });
        }
        let mut lines = Vec::with_capacity(probes.lines.len());
        for probe in &probes.lines {
            lines.push(AssetValue {
                id: probe.element.name.clone(),
                value: probe.read(session)?,
            });
        }
        let substation_kva = probes.substation.read(session)?;

        debug!(step = at.index(), time = %at, substation_kva, "daily step solved");
        frame.intervals.push(IntervalRecord {
            step: at.index(),
            time: at.to_string(),
            loads,
            transformers,
            lines,
            substation_kva,
        });
        if let Some(cb) = progress.as_deref_mut() {
            cb(at.index() + 1);
        }
    }

    let summary = summarize_daily(&frame, &probes.transformer_ratings(), &probes.line_ratings());
    info!(
        steps = frame.len(),
        substation_max_kva = summary.substation_max_kva.unwrap_or(0.0),
        issues = summary.issues.len(),
        "daily run complete"
    );
    Ok(DailyOutcome { frame, summary })
}
