//! In-memory session: records commands and answers queries from scripted readings.

use std::collections::{HashMap, HashSet};

use crate::element::{BusRef, ElementRef};
use crate::error::{CircuitError, CircuitResult};
use crate::session::{NodeVoltage, SolverSession};

/// Scripted reading: one vector for every solve, or one per solve.
#[derive(Debug, Clone, PartialEq)]
enum Reading {
    Constant(Vec<f64>),
    /// Indexed by solve number; the last entry repeats.
    Series(Vec<Vec<f64>>),
}

impl Reading {
    fn at(&self, solve: usize) -> Vec<f64> {
        match self {
            Reading::Constant(values) => values.clone(),
            Reading::Series(series) => series
                .get(solve.saturating_sub(1))
                .or_else(|| series.last())
                .cloned()
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingSession {
    commands: Vec<String>,
    defined: HashSet<String>,
    phases: HashMap<String, usize>,
    solves: usize,
    nodes: Vec<NodeVoltage>,
    voltages: HashMap<String, Reading>,
    currents: HashMap<String, Reading>,
    powers: HashMap<String, Reading>,
    fallback: Option<f64>,
    closed: bool,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer unscripted queries with `value` on every conductor (angles and Q zero).
    pub fn with_fallback(mut self, value: f64) -> Self {
        self.fallback = Some(value);
        self
    }

    pub fn script_nodes(&mut self, nodes: Vec<NodeVoltage>) {
        self.nodes = nodes;
    }

    pub fn script_bus_voltages(&mut self, bus: &BusRef, values: Vec<f64>) {
        self.voltages
            .insert(bus.name().to_ascii_lowercase(), Reading::Constant(values));
    }

    pub fn script_currents(&mut self, element: &ElementRef, values: Vec<f64>) {
        self.currents.insert(element.key(), Reading::Constant(values));
    }

    pub fn script_current_series(&mut self, element: &ElementRef, series: Vec<Vec<f64>>) {
        self.currents.insert(element.key(), Reading::Series(series));
    }

    pub fn script_powers(&mut self, element: &ElementRef, values: Vec<f64>) {
        self.powers.insert(element.key(), Reading::Constant(values));
    }

    pub fn script_power_series(&mut self, element: &ElementRef, series: Vec<Vec<f64>>) {
        self.powers.insert(element.key(), Reading::Series(series));
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Every command received, one per line.
    pub fn script(&self) -> String {
        let mut out = self.commands.join("\n");
        out.push('\n');
        out
    }

    pub fn solve_count(&self) -> usize {
        self.solves
    }

    pub fn is_defined(&self, element: &ElementRef) -> bool {
        self.defined.contains(&element.key())
    }

    fn ensure_open(&self) -> CircuitResult<()> {
        if self.closed {
            return Err(CircuitError::protocol("session already closed"));
        }
        Ok(())
    }

    /// Conductor count of a defined element, from its `phases=` property.
    fn conductors(&self, key: &str) -> usize {
        self.phases.get(key).copied().unwrap_or(3)
    }

    fn fallback_pairs(&self, conductors: usize, what: &str) -> CircuitResult<Vec<f64>> {
        let value = self
            .fallback
            .ok_or_else(|| CircuitError::protocol(format!("no reading scripted for {what}")))?;
        Ok((0..conductors).flat_map(|_| [value, 0.0]).collect())
    }
}

impl SolverSession for RecordingSession {
    fn command(&mut self, text: &str) -> CircuitResult<()> {
        self.ensure_open()?;
        let mut tokens = text.split_whitespace();
        if tokens
            .next()
            .is_some_and(|verb| verb.eq_ignore_ascii_case("new"))
        {
            let element = tokens
                .next()
                .ok_or_else(|| CircuitError::Rejected {
                    command: text.to_string(),
                    message: "missing element name".to_string(),
                })?
                .to_ascii_lowercase();
            if !self.defined.insert(element.clone()) {
                return Err(CircuitError::DuplicateElement { element });
            }
            let phases = tokens
                .filter_map(|t| t.split_once('='))
                .find(|(k, _)| k.eq_ignore_ascii_case("phases"))
                .and_then(|(_, v)| v.parse().ok());
            if let Some(phases) = phases {
                self.phases.insert(element, phases);
            }
        }
        self.commands.push(text.to_string());
        Ok(())
    }

    fn solve(&mut self) -> CircuitResult<()> {
        self.ensure_open()?;
        self.solves += 1;
        Ok(())
    }

    fn node_voltages(&mut self) -> CircuitResult<Vec<NodeVoltage>> {
        self.ensure_open()?;
        Ok(self.nodes.clone())
    }

    fn bus_voltages(&mut self, bus: &BusRef) -> CircuitResult<Vec<f64>> {
        self.ensure_open()?;
        match self.voltages.get(&bus.name().to_ascii_lowercase()) {
            Some(reading) => Ok(reading.at(self.solves)),
            None => self.fallback_pairs(3, &format!("bus {bus}")),
        }
    }

    fn currents(&mut self, element: &ElementRef) -> CircuitResult<Vec<f64>> {
        self.ensure_open()?;
        let key = element.key();
        match self.currents.get(&key) {
            Some(reading) => Ok(reading.at(self.solves)),
            // Both terminals.
            None => self.fallback_pairs(2 * self.conductors(&key), &element.to_string()),
        }
    }

    fn powers(&mut self, element: &ElementRef) -> CircuitResult<Vec<f64>> {
        self.ensure_open()?;
        let key = element.key();
        match self.powers.get(&key) {
            Some(reading) => Ok(reading.at(self.solves)),
            None => self.fallback_pairs(2 * self.conductors(&key), &element.to_string()),
        }
    }

    fn close(mut self) -> CircuitResult<()> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }
}
