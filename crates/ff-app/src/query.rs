//! Query helpers for extracting data from completed runs.

use std::cmp::Ordering;

use ff_results::{DailyPeak, MeasurementFrame};

use crate::error::{AppError, AppResult};
use crate::run_service::RunResponse;

/// Summary of a run's day and recorded data.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub network: String,
    pub day: u16,
    pub date: String,
    pub season: String,
    pub intervals: usize,
    pub load_count: usize,
    pub transformer_count: usize,
    pub line_count: usize,
    pub issue_count: usize,
    pub substation_max_kva: Option<f64>,
}

/// Get run summary from a response.
pub fn get_run_summary(response: &RunResponse) -> RunSummary {
    let manifest = &response.manifest;
    let mut summary = RunSummary {
        network: manifest.network.clone(),
        day: manifest.day,
        date: manifest.date.clone(),
        season: manifest.season.clone(),
        intervals: 0,
        load_count: 0,
        transformer_count: 0,
        line_count: 0,
        issue_count: response.issues.len(),
        substation_max_kva: None,
    };

    if let Some(frame) = &response.snapshot {
        summary.intervals = 1;
        summary.transformer_count = frame.transformers.len();
        summary.line_count = frame.lines.len();
    }
    if let Some(outcome) = &response.daily {
        summary.intervals = outcome.frame.len();
        summary.load_count = list_load_ids(&outcome.frame).len();
        summary.transformer_count = list_transformer_ids(&outcome.frame).len();
        summary.line_count = list_line_ids(&outcome.frame).len();
        summary.substation_max_kva = outcome.summary.substation_max_kva;
    }
    summary
}

/// List all transformer IDs recorded in a frame.
pub fn list_transformer_ids(frame: &MeasurementFrame) -> Vec<String> {
    frame
        .intervals
        .first()
        .map(|r| r.transformers.iter().map(|v| v.id.clone()).collect())
        .unwrap_or_default()
}

pub fn list_line_ids(frame: &MeasurementFrame) -> Vec<String> {
    frame
        .intervals
        .first()
        .map(|r| r.lines.iter().map(|v| v.id.clone()).collect())
        .unwrap_or_default()
}

pub fn list_load_ids(frame: &MeasurementFrame) -> Vec<String> {
    frame
        .intervals
        .first()
        .map(|r| r.loads.iter().map(|l| l.load.clone()).collect())
        .unwrap_or_default()
}

/// Extract a `(time, value)` series for one asset variable.
///
/// Variables: `kva` (transformer), `current` (line), `p_kw` / `q_kvar` (load)
/// and `substation_kva`, which ignores `asset_id`.
pub fn extract_series(
    frame: &MeasurementFrame,
    asset_id: &str,
    variable: &str,
) -> AppResult<Vec<(String, f64)>> {
    let first = frame
        .intervals
        .first()
        .ok_or_else(|| AppError::InvalidInput("No intervals in run".to_string()))?;

    let known = match variable {
        "kva" | "apparent_power" => first.transformers.iter().any(|v| v.id == asset_id),
        "current" | "amps" => first.lines.iter().any(|v| v.id == asset_id),
        "p_kw" | "q_kvar" => first.loads.iter().any(|l| l.load == asset_id),
        "substation_kva" => true,
        _ => {
            return Err(AppError::InvalidInput(format!(
                "Unknown variable: {}",
                variable
            )));
        }
    };
    if !known {
        return Err(AppError::InvalidInput(format!(
            "No {} recorded for asset: {}",
            variable, asset_id
        )));
    }

    let mut series = Vec::with_capacity(frame.len());
    for record in &frame.intervals {
        let value = match variable {
            "kva" | "apparent_power" => record
                .transformers
                .iter()
                .find(|v| v.id == asset_id)
                .map(|v| v.value),
            "current" | "amps" => record.lines.iter().find(|v| v.id == asset_id).map(|v| v.value),
            "substation_kva" => Some(record.substation_kva),
            _ => record
                .loads
                .iter()
                .find(|l| l.load == asset_id)
                .map(|l| if variable == "p_kw" { l.p_kw } else { l.q_kvar }),
        };
        if let Some(value) = value {
            series.push((record.time.clone(), value));
        }
    }
    Ok(series)
}

/// The `n` peaks with the highest utilization; unrated assets sort last.
pub fn most_utilized(peaks: &[DailyPeak], n: usize) -> Vec<&DailyPeak> {
    let mut sorted: Vec<&DailyPeak> = peaks.iter().collect();
    sorted.sort_by(|a, b| match (a.peak_utilization_pct, b.peak_utilization_pct) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    sorted.truncate(n);
    sorted
}
