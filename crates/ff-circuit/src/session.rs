//! The solver session boundary.

use serde::{Deserialize, Serialize};

use crate::element::{BusRef, ElementRef};
use crate::error::CircuitResult;

/// Per-node reading after a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeVoltage {
    pub node: String,
    pub pu: f64,
    /// Electrical distance from the substation.
    pub distance_km: f64,
}

/// One live solver instance. Every query names its target explicitly.
///
/// Vectors are flat and ordered by conductor, first terminal first:
/// magnitude/angle pairs for voltages and currents, P/Q pairs (kW, kvar) for powers.
pub trait SolverSession {
    /// Send one element definition or setting.
    fn command(&mut self, text: &str) -> CircuitResult<()>;

    /// Blocking solve at the currently configured instant.
    fn solve(&mut self) -> CircuitResult<()>;

    fn node_voltages(&mut self) -> CircuitResult<Vec<NodeVoltage>>;

    /// Voltage magnitude/angle pairs (volts, degrees) by phase.
    fn bus_voltages(&mut self, bus: &BusRef) -> CircuitResult<Vec<f64>>;

    fn currents(&mut self, element: &ElementRef) -> CircuitResult<Vec<f64>>;

    fn powers(&mut self, element: &ElementRef) -> CircuitResult<Vec<f64>>;

    /// End the session and release the solver.
    fn close(self) -> CircuitResult<()>
    where
        Self: Sized;
}
