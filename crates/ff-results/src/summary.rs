//! Per-asset daily peaks.

use serde::{Deserialize, Serialize};

use crate::metrics::{daily_max, utilization};
use crate::types::{MeasurementFrame, MetricIssue};

#[derive(Debug, Clone, PartialEq)]
pub struct AssetRating {
    pub id: String,
    pub rating: Option<f64>,
}

impl AssetRating {
    pub fn new(id: impl Into<String>, rating: Option<f64>) -> Self {
        Self {
            id: id.into(),
            rating,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPeak {
    pub asset: String,
    pub daily_max: f64,
    pub rating: Option<f64>,
    pub peak_utilization_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailySummary {
    pub transformers: Vec<DailyPeak>,
    pub lines: Vec<DailyPeak>,
    pub substation_max_kva: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<MetricIssue>,
}

/// Peak value and peak utilization per transformer and line over the whole frame.
pub fn summarize_daily(
    frame: &MeasurementFrame,
    transformers: &[AssetRating],
    lines: &[AssetRating],
) -> DailySummary {
    let mut issues = Vec::new();
    let transformers = peaks(transformers, "transformer utilization", &mut issues, |id| {
        frame.transformer_series(id)
    });
    let lines = peaks(lines, "line utilization", &mut issues, |id| frame.line_series(id));
    DailySummary {
        transformers,
        lines,
        substation_max_kva: daily_max(&frame.substation_series()),
        issues,
    }
}

fn peaks(
    ratings: &[AssetRating],
    metric: &str,
    issues: &mut Vec<MetricIssue>,
    series: impl Fn(&str) -> Vec<f64>,
) -> Vec<DailyPeak> {
    ratings
        .iter()
        .filter_map(|asset| {
            let max = daily_max(&series(&asset.id))?;
            let peak_utilization_pct = match utilization(max, asset.rating) {
                Ok(u) => Some(u),
                Err(e) => {
                    issues.push(MetricIssue {
                        asset: asset.id.clone(),
                        metric: metric.to_string(),
                        message: e.to_string(),
                    });
                    None
                }
            };
            Some(DailyPeak {
                asset: asset.id.clone(),
                daily_max: max,
                rating: asset.rating,
                peak_utilization_pct,
            })
        })
        .collect()
}
