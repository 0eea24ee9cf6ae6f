//! Phase sets and the terminal notation used by bus references.
//!
//! Buses are referenced as `name.n1.n2...` where each node number selects a
//! conductor: 1, 2 and 3 are phases A, B and C, 0 is the ground/neutral.
//! Distribution transformers describe their primary phases with colour codes
//! over {R, W, B} (red, white, blue), mapped to A, B and C.

use core::fmt;

use crate::{FfError, FfResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    A,
    B,
    C,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::A, Phase::B, Phase::C];

    pub fn node(self) -> u8 {
        match self {
            Phase::A => 1,
            Phase::B => 2,
            Phase::C => 3,
        }
    }

    pub fn from_node(node: u8) -> Option<Self> {
        match node {
            1 => Some(Phase::A),
            2 => Some(Phase::B),
            3 => Some(Phase::C),
            _ => None,
        }
    }

    pub fn from_colour(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(Phase::A),
            'W' => Some(Phase::B),
            'B' => Some(Phase::C),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << (self.node() - 1)
    }
}

/// Subset of {A, B, C}.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseSet(u8);

impl PhaseSet {
    pub const EMPTY: PhaseSet = PhaseSet(0);
    pub const ABC: PhaseSet = PhaseSet(0b111);

    pub fn from_phases(phases: &[Phase]) -> Self {
        phases.iter().fold(Self::EMPTY, |set, p| set.with(*p))
    }

    /// Default conductor assignment for an element given only its phase count.
    pub fn first_n(count: u8) -> FfResult<Self> {
        match count {
            1..=3 => Ok(Self::from_phases(&Phase::ALL[..count as usize])),
            _ => Err(FfError::InvalidArg {
                what: "phase count must be 1, 2 or 3",
            }),
        }
    }

    /// Parse a terminal suffix such as `1.2.3`, `1.0` or `3`.
    pub fn from_terminal_suffix(suffix: &str) -> FfResult<Self> {
        let mut set = Self::EMPTY;
        for part in suffix.split('.').filter(|p| !p.is_empty()) {
            let node: u8 = part.trim().parse().map_err(|_| FfError::Parse {
                what: "terminal node",
                value: suffix.to_string(),
            })?;
            match node {
                0 => {}
                n => {
                    let phase = Phase::from_node(n).ok_or_else(|| FfError::Parse {
                        what: "terminal node",
                        value: suffix.to_string(),
                    })?;
                    set = set.with(phase);
                }
            }
        }
        Ok(set)
    }

    pub fn with(self, phase: Phase) -> Self {
        Self(self.0 | phase.bit())
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(self, phase: Phase) -> bool {
        self.0 & phase.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u8 {
        self.0.count_ones() as u8
    }

    pub fn iter(self) -> impl Iterator<Item = Phase> {
        Phase::ALL.into_iter().filter(move |p| self.contains(*p))
    }

    /// Render as a terminal suffix including the leading dot (`.1.2.3`).
    pub fn terminal_suffix(self) -> String {
        self.iter().map(|p| format!(".{}", p.node())).collect()
    }
}

impl fmt::Debug for PhaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhaseSet({self})")
    }
}

impl fmt::Display for PhaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for p in self.iter() {
            write!(f, "{p:?}")?;
        }
        Ok(())
    }
}

/// Ordered primary phases from an R/W/B colour code; order is kept because it
/// fixes which conductors the winding spans.
pub fn phases_from_colour_code(code: &str) -> FfResult<Vec<Phase>> {
    let code = code.trim();
    let mut phases = Vec::with_capacity(3);
    for c in code.chars() {
        let phase = Phase::from_colour(c).ok_or_else(|| FfError::Parse {
            what: "connection colour code",
            value: code.to_string(),
        })?;
        if phases.contains(&phase) {
            return Err(FfError::Parse {
                what: "connection colour code",
                value: code.to_string(),
            });
        }
        phases.push(phase);
    }
    if phases.is_empty() {
        return Err(FfError::Parse {
            what: "connection colour code",
            value: code.to_string(),
        });
    }
    Ok(phases)
}

/// Render ordered phases as a node list without leading dot (`3.1`).
pub fn node_list(phases: &[Phase]) -> String {
    phases
        .iter()
        .map(|p| p.node().to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Split `bus.1.2` into the bare bus name and its optional terminal suffix.
pub fn split_bus_ref(reference: &str) -> (&str, Option<&str>) {
    let reference = reference.trim();
    match reference.split_once('.') {
        Some((bus, suffix)) => (bus, Some(suffix)),
        None => (reference, None),
    }
}

/// Conductor arrangement of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhaseConfig {
    Single,
    /// Two-conductor equivalent single-wire-earth-return.
    Swer,
    Three,
}

impl PhaseConfig {
    pub fn from_count(count: u8) -> FfResult<Self> {
        match count {
            1 => Ok(Self::Single),
            2 => Ok(Self::Swer),
            3 => Ok(Self::Three),
            _ => Err(FfError::InvalidArg {
                what: "phase count must be 1, 2 or 3",
            }),
        }
    }

    pub fn phase_count(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Swer => 2,
            Self::Three => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_suffix_parsing() {
        let set = PhaseSet::from_terminal_suffix("1.2.3").unwrap();
        assert_eq!(set, PhaseSet::ABC);
        let set = PhaseSet::from_terminal_suffix("1.0").unwrap();
        assert_eq!(set, PhaseSet::from_phases(&[Phase::A]));
        assert!(PhaseSet::from_terminal_suffix("4").is_err());
        assert!(PhaseSet::from_terminal_suffix("x").is_err());
    }

    #[test]
    fn suffix_render() {
        assert_eq!(PhaseSet::ABC.terminal_suffix(), ".1.2.3");
        assert_eq!(PhaseSet::first_n(1).unwrap().terminal_suffix(), ".1");
        assert!(PhaseSet::first_n(0).is_err());
    }

    #[test]
    fn colour_codes_keep_order() {
        let phases = phases_from_colour_code("BR").unwrap();
        assert_eq!(phases, vec![Phase::C, Phase::A]);
        assert_eq!(node_list(&phases), "3.1");
        assert_eq!(node_list(&phases_from_colour_code("RWB").unwrap()), "1.2.3");
        assert!(phases_from_colour_code("RR").is_err());
        assert!(phases_from_colour_code("").is_err());
        assert!(phases_from_colour_code("RX").is_err());
    }

    #[test]
    fn split_bus_reference() {
        assert_eq!(split_bus_ref("lv_bus7.1"), ("lv_bus7", Some("1")));
        assert_eq!(split_bus_ref("lv_bus7"), ("lv_bus7", None));
    }

    #[test]
    fn phase_config_counts() {
        assert_eq!(PhaseConfig::from_count(2).unwrap(), PhaseConfig::Swer);
        assert_eq!(PhaseConfig::Three.phase_count(), 3);
        assert!(PhaseConfig::from_count(4).is_err());
    }
}
