//! The compiled, immutable network model.

use core::fmt;
use std::collections::{HashMap, HashSet};

use ff_core::{
    BusId, CustomerClass, LengthUnit, LineId, Phase, PhaseConfig, PhaseSet, TransformerId, to_km,
};

use crate::catalog::{Capacitor, Generator, LinecodeCatalog, Load, Winding};
use crate::error::{NetworkError, NetworkResult};

/// One of the four study networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(u8);

impl NetworkId {
    pub const ALL: [NetworkId; 4] = [NetworkId(1), NetworkId(2), NetworkId(3), NetworkId(4)];

    pub fn new(number: u8) -> NetworkResult<Self> {
        match number {
            1..=4 => Ok(Self(number)),
            _ => Err(NetworkError::InputSelection {
                input: number.to_string(),
            }),
        }
    }

    /// Parse a user selection such as `"3"`.
    pub fn parse(input: &str) -> NetworkResult<Self> {
        let trimmed = input.trim();
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(|n| Self::new(n).ok())
            .ok_or_else(|| NetworkError::InputSelection {
                input: trimmed.to_string(),
            })
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Full dataset name, e.g. `Network_3_Urban_HPK11`.
    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "Network_1_Rural_SMR8",
            2 => "Network_2_Rural_KLO14",
            3 => "Network_3_Urban_HPK11",
            _ => "Network_4_Urban_CRE21",
        }
    }

    /// Directory-name prefix that identifies this network's data.
    pub fn prefix(self) -> String {
        format!("Network_{}_", self.0)
    }

    pub fn is_rural(self) -> bool {
        self.0 <= 2
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusLevel {
    Source,
    Mv,
    Lv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    pub level: BusLevel,
    pub coord: Option<(f64, f64)>,
    /// Nominal line-to-line kV, when a transformer winding feeds this bus.
    pub kv_base: Option<f64>,
    /// Union of the phases of every terminal attached here.
    pub phases: PhaseSet,
}

/// A connection of an element to a bus on a set of conductors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Terminal {
    pub bus: BusId,
    pub phases: PhaseSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineLevel {
    Mv,
    Lv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    pub level: LineLevel,
    pub from: Terminal,
    pub to: Terminal,
    /// Catalog id of the linecode (without solver prefix).
    pub linecode: String,
    pub length: f64,
    pub units: LengthUnit,
    pub config: PhaseConfig,
    /// Copied from the linecode's rated ampacity.
    pub ampacity: Option<f64>,
}

impl Line {
    pub fn length_km(&self) -> f64 {
        to_km(self.units.length(self.length))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionLayout {
    /// Three-phase two-winding.
    ThreePhase,
    /// Single-phase three-winding with a centre-tapped secondary.
    SwerCentreTap,
    /// Single-phase two-winding.
    SinglePhase,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformerKind {
    Substation,
    /// MV/MV isolating transformer feeding a SWER section.
    SwerIsolating,
    /// Three single-phase regulating autotransformers.
    Regulator { numtaps: u32, line_kv: f64 },
    Distribution {
        layout: DistributionLayout,
        tap: f64,
        class: Option<CustomerClass>,
        /// Loads reachable from the secondary busbar.
        customers: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transformer {
    pub id: TransformerId,
    pub name: String,
    pub kind: TransformerKind,
    pub primary: BusId,
    /// Primary conductors in winding order.
    pub primary_phases: Vec<Phase>,
    pub secondary: BusId,
    pub windings: Vec<Winding>,
    /// Nameplate kVA used for utilization; absent when the sheet leaves it blank.
    pub rated_kva: Option<f64>,
    pub xhl: f64,
    pub loadloss: f64,
    pub noloadloss: f64,
}

impl Transformer {
    pub fn is_distribution(&self) -> bool {
        matches!(self.kind, TransformerKind::Distribution { .. })
    }

    pub fn is_regulator(&self) -> bool {
        matches!(self.kind, TransformerKind::Regulator { .. })
    }

    /// Conductor count of the primary terminal as the solver reports it.
    pub fn primary_conductors(&self) -> usize {
        self.primary_phases.len()
    }
}

/// Validated network: every id below resolves inside this model.
#[derive(Debug, Clone)]
pub struct NetworkModel {
    pub id: NetworkId,
    pub buses: Vec<Bus>,
    pub(crate) bus_index: HashMap<String, BusId>,
    pub linecodes: LinecodeCatalog,
    pub lines: Vec<Line>,
    pub transformers: Vec<Transformer>,
    pub capacitors: Vec<Capacitor>,
    pub loads: Vec<Load>,
    pub generators: Vec<Generator>,
}

impl NetworkModel {
    /// Bus by id. Ids are only minted by the compiler for this model.
    pub fn bus(&self, id: BusId) -> &Bus {
        &self.buses[id.as_usize()]
    }

    pub fn bus_name(&self, id: BusId) -> &str {
        &self.bus(id).name
    }

    pub fn bus_id(&self, name: &str) -> Option<BusId> {
        self.bus_index.get(&name.trim().to_ascii_lowercase()).copied()
    }

    pub fn mv_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.level == LineLevel::Mv)
    }

    pub fn lv_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.level == LineLevel::Lv)
    }

    pub fn substations(&self) -> impl Iterator<Item = &Transformer> {
        self.transformers
            .iter()
            .filter(|t| t.kind == TransformerKind::Substation)
    }

    /// The first substation transformer; the feeder head.
    pub fn substation(&self) -> Option<&Transformer> {
        self.substations().next()
    }

    /// MV/MV elements: SWER isolating transformers and regulators.
    pub fn mv_transformers(&self) -> impl Iterator<Item = &Transformer> {
        self.transformers.iter().filter(|t| {
            matches!(
                t.kind,
                TransformerKind::SwerIsolating | TransformerKind::Regulator { .. }
            )
        })
    }

    pub fn regulators(&self) -> impl Iterator<Item = &Transformer> {
        self.transformers.iter().filter(|t| t.is_regulator())
    }

    pub fn distribution_transformers(&self) -> impl Iterator<Item = &Transformer> {
        self.transformers.iter().filter(|t| t.is_distribution())
    }

    pub fn has_regulators(&self) -> bool {
        self.regulators().next().is_some()
    }

    /// Distinct buses feeding at least one load, in load order.
    pub fn load_buses(&self) -> Vec<BusId> {
        let mut seen = HashSet::new();
        self.loads
            .iter()
            .map(|load| load.bus)
            .filter(|bus| seen.insert(*bus))
            .collect()
    }

    /// Generation attributed to each load, indexed like `loads`.
    ///
    /// A generator belongs to one load only: the first load at its bus on the
    /// same terminal, else the first load at its bus. Generators on a bus
    /// without loads are left out.
    pub fn generation_by_load(&self) -> Vec<Vec<&Generator>> {
        let mut at_bus: HashMap<BusId, Vec<usize>> = HashMap::new();
        for (i, load) in self.loads.iter().enumerate() {
            at_bus.entry(load.bus).or_default().push(i);
        }
        let mut owned = vec![Vec::new(); self.loads.len()];
        for generator in &self.generators {
            let Some(candidates) = at_bus.get(&generator.bus) else {
                continue;
            };
            let owner = candidates
                .iter()
                .copied()
                .find(|&i| {
                    generator.terminal.is_some() && self.loads[i].terminal == generator.terminal
                })
                .or_else(|| candidates.first().copied());
            if let Some(i) = owner {
                owned[i].push(generator);
            }
        }
        owned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_selection() {
        assert_eq!(NetworkId::parse(" 3 ").unwrap().name(), "Network_3_Urban_HPK11");
        assert_eq!(NetworkId::parse("1").unwrap().prefix(), "Network_1_");
        assert!(NetworkId::parse("1").unwrap().is_rural());
        assert!(!NetworkId::parse("4").unwrap().is_rural());
        for bad in ["0", "5", "three", ""] {
            assert!(matches!(
                NetworkId::parse(bad),
                Err(NetworkError::InputSelection { .. })
            ));
        }
    }
}
