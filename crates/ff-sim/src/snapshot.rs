//! Single-instant solve.

use ff_circuit::{BuiltCircuit, Command, SolverSession};
use ff_core::HalfHour;
use ff_results::{
    LineCurrentRecord, MetricIssue, NodeVoltageRecord, SnapshotFrame, TransformerPowerRecord,
    utilization,
};
use tracing::{info, warn};

use crate::error::{SimError, SimResult};
use crate::probes::Probes;

/// Put the solver in daily mode, one half-hour step per solve.
pub(crate) fn daily_mode<S: SolverSession>(session: &mut S) -> SimResult<()> {
    let mode = Command::set("mode", "daily")
        .with("stepsize", "30m")
        .with("number", 1);
    session.command(&mode.to_string())?;
    Ok(())
}

pub(crate) fn set_time<S: SolverSession>(session: &mut S, at: HalfHour) -> SimResult<()> {
    let time = Command::set("time", format!("({},{})", at.hour(), at.seconds_past_hour()));
    session.command(&time.to_string())?;
    Ok(())
}

fn rated(
    asset: &str,
    metric: &str,
    observed: f64,
    rating: Option<f64>,
    issues: &mut Vec<MetricIssue>,
) -> Option<f64> {
    match utilization(observed, rating) {
        Ok(u) => Some(u),
        Err(e) => {
            warn!(asset, metric, "{e}");
            issues.push(MetricIssue {
                asset: asset.to_string(),
                metric: metric.to_string(),
                message: e.to_string(),
            });
            None
        }
    }
}

/// Solve once at `time` (`HH:MM`, rounded down to the half hour) and record
/// node voltages, MV line currents and distribution transformer loading.
pub fn solve_snapshot<S: SolverSession>(
    circuit: &mut BuiltCircuit<S>,
    probes: &Probes,
    time: &str,
) -> SimResult<SnapshotFrame> {
    let at = HalfHour::parse_round_down(time).map_err(|_| SimError::InvalidTime {
        input: time.to_string(),
    })?;
    let session = circuit.session_mut();
    daily_mode(session)?;
    set_time(session, at)?;
    session.solve()?;

    let nodes = session
        .node_voltages()?
        .into_iter()
        .map(|n| NodeVoltageRecord {
            node: n.node,
            voltage_pu: n.pu,
            distance_km: n.distance_km,
        })
        .collect();

    let mut issues = Vec::new();
    let mut lines = Vec::with_capacity(probes.lines.len());
    for probe in &probes.lines {
        let current = probe.read(session)?;
        let name = &probe.element.name;
        lines.push(LineCurrentRecord {
            line: name.clone(),
            current_a: current,
            ampacity_a: probe.ampacity,
            utilization_pct: rated(name, "line utilization", current, probe.ampacity, &mut issues),
        });
    }

    let mut transformers = Vec::with_capacity(probes.transformers.len());
    for probe in &probes.transformers {
        let kva = probe.read(session)?;
        let name = &probe.element.name;
        transformers.push(TransformerPowerRecord {
            transformer: name.clone(),
            apparent_kva: kva,
            rating_kva: probe.rated_kva,
            utilization_pct: rated(
                name,
                "transformer utilization",
                kva,
                probe.rated_kva,
                &mut issues,
            ),
        });
    }

    info!(time = %at, lines = lines.len(), transformers = transformers.len(), "snapshot solved");
    Ok(SnapshotFrame {
        time: at.to_string(),
        nodes,
        lines,
        transformers,
        issues,
    })
}
