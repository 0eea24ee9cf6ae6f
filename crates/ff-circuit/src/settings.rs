//! Solver-wide settings applied while building a circuit.

use serde::{Deserialize, Serialize};

/// Thevenin equivalent of the upstream grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub base_kv: f64,
    pub pu: f64,
    pub angle: f64,
    pub r1: f64,
    pub x1: f64,
    pub r0: f64,
    pub x0: f64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_kv: 66.0,
            pu: 1.0,
            angle: 0.0,
            r1: 0.52824,
            x1: 2.113,
            r0: 0.59157,
            x0: 1.7747,
        }
    }
}

/// Control set-points shared by every regulator unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulatorSettings {
    /// Regulated voltage on the PT secondary, volts.
    pub vreg: f64,
    pub band: f64,
    pub max_tap_change: u32,
    /// Reactance and resistance of the jumper reactors, ohms.
    pub jumper_impedance: f64,
}

impl Default for RegulatorSettings {
    fn default() -> Self {
        Self {
            vreg: 100.0,
            band: 3.0,
            max_tap_change: 1,
            jumper_impedance: 0.0001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitSettings {
    pub base_frequency: f64,
    pub source: SourceSettings,
    pub regulator: RegulatorSettings,
    pub voltage_bases: Vec<f64>,
    pub control_mode: String,
    pub max_control_iterations: u32,
}

impl Default for CircuitSettings {
    fn default() -> Self {
        Self {
            base_frequency: 50.0,
            source: SourceSettings::default(),
            regulator: RegulatorSettings::default(),
            voltage_bases: vec![66.0, 22.0, 12.7, 0.4, 0.2309],
            control_mode: "static".to_string(),
            max_control_iterations: 100,
        }
    }
}
