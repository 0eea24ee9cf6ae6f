//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub network: String,
    pub timestamp: String,
    pub run_type: RunType,
    pub day: u16,
    pub date: String,
    pub season: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunType {
    Snapshot { time: String },
    Daily { steps: usize },
}

/// A rating that could not be turned into a utilization figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricIssue {
    pub asset: String,
    pub metric: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeVoltageRecord {
    pub node: String,
    pub voltage_pu: f64,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCurrentRecord {
    pub line: String,
    pub current_a: f64,
    pub ampacity_a: Option<f64>,
    pub utilization_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerPowerRecord {
    pub transformer: String,
    pub apparent_kva: f64,
    pub rating_kva: Option<f64>,
    pub utilization_pct: Option<f64>,
}

/// Everything recorded by a single-instant solve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFrame {
    pub time: String,
    pub nodes: Vec<NodeVoltageRecord>,
    pub lines: Vec<LineCurrentRecord>,
    pub transformers: Vec<TransformerPowerRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<MetricIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub load: String,
    pub bus: String,
    /// Voltage magnitude per phase of the load bus, volts.
    pub voltage_v: Vec<f64>,
    /// Net of co-located generation.
    pub p_kw: f64,
    pub q_kvar: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetValue {
    pub id: String,
    pub value: f64,
}

/// One half-hour step of a daily run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub step: usize,
    pub time: String,
    pub loads: Vec<LoadRecord>,
    /// Apparent power per MV/LV transformer, kVA.
    pub transformers: Vec<AssetValue>,
    /// Current per MV line, amps.
    pub lines: Vec<AssetValue>,
    pub substation_kva: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementFrame {
    pub intervals: Vec<IntervalRecord>,
}

impl MeasurementFrame {
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn transformer_series(&self, id: &str) -> Vec<f64> {
        self.intervals
            .iter()
            .filter_map(|r| find_value(&r.transformers, id))
            .collect()
    }

    pub fn line_series(&self, id: &str) -> Vec<f64> {
        self.intervals
            .iter()
            .filter_map(|r| find_value(&r.lines, id))
            .collect()
    }

    pub fn substation_series(&self) -> Vec<f64> {
        self.intervals.iter().map(|r| r.substation_kva).collect()
    }

    pub fn load_series(&self, load: &str) -> Vec<&LoadRecord> {
        self.intervals
            .iter()
            .filter_map(|r| r.loads.iter().find(|l| l.load == load))
            .collect()
    }
}

fn find_value(values: &[AssetValue], id: &str) -> Option<f64> {
    values.iter().find(|v| v.id == id).map(|v| v.value)
}
