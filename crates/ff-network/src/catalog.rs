//! Typed entity records: conductors, windings, capacitors, loads, generators.

use std::collections::HashMap;

use ff_core::{BusId, CustomerClass, LengthUnit, PhaseSet};

use crate::error::{NetworkError, NetworkResult};
use crate::schema::LinecodeRow;

/// Prefix the solver namespace puts in front of linecode ids.
pub const LINECODE_PREFIX: &str = "lc_";

#[derive(Debug, Clone, PartialEq)]
pub struct Linecode {
    pub id: String,
    pub phases: u8,
    pub r1: f64,
    pub x1: f64,
    pub b1: f64,
    pub r0: f64,
    pub x0: f64,
    pub b0: f64,
    pub units: LengthUnit,
    /// Rated ampacity; the reference for utilization.
    pub ampacity: Option<f64>,
    /// Emergency ampacity.
    pub emergency_ampacity: Option<f64>,
}

impl Linecode {
    pub fn solver_name(&self) -> String {
        format!("{LINECODE_PREFIX}{}", self.id)
    }

    /// Normal ampacity handed to the solver: the lower of the two ratings.
    pub fn normamps(&self) -> Option<f64> {
        match (self.ampacity, self.emergency_ampacity) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn from_row(row: &LinecodeRow) -> NetworkResult<Self> {
        let units = row.units.parse().map_err(|_| {
            NetworkError::invalid(
                format!("linecode {} Units", row.linecode_id),
                &row.units,
                "unknown length unit",
            )
        })?;
        if !(1..=3).contains(&row.phases) {
            return Err(NetworkError::invalid(
                format!("linecode {} Phases", row.linecode_id),
                row.phases,
                "expected 1, 2 or 3",
            ));
        }
        Ok(Self {
            id: row.linecode_id.clone(),
            phases: row.phases,
            r1: row.r1,
            x1: row.x1,
            b1: row.b1,
            r0: row.r0,
            x0: row.x0,
            b0: row.b0,
            units,
            ampacity: row.ampacity1,
            emergency_ampacity: row.ampacity2,
        })
    }
}

/// Linecodes by id, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct LinecodeCatalog {
    codes: Vec<Linecode>,
    index: HashMap<String, usize>,
}

impl LinecodeCatalog {
    pub fn from_rows(rows: &[LinecodeRow]) -> NetworkResult<Self> {
        let mut catalog = Self::default();
        for row in rows {
            let code = Linecode::from_row(row)?;
            if catalog.index.contains_key(&code.id) {
                return Err(NetworkError::DuplicateId {
                    id: code.id,
                    context: "linecodes",
                });
            }
            catalog.index.insert(code.id.clone(), catalog.codes.len());
            catalog.codes.push(code);
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Linecode> {
        self.index.get(id).map(|&i| &self.codes[i])
    }

    /// Resolve a reference that may carry the solver `lc_` prefix.
    pub fn resolve(&self, reference: &str) -> Option<&Linecode> {
        let reference = reference.trim();
        self.get(reference).or_else(|| {
            let bare = reference
                .get(..LINECODE_PREFIX.len())
                .filter(|p| p.eq_ignore_ascii_case(LINECODE_PREFIX))
                .map(|_| &reference[LINECODE_PREFIX.len()..])?;
            self.get(bare)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Linecode> {
        self.codes.iter()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// One transformer winding.
#[derive(Debug, Clone, PartialEq)]
pub struct Winding {
    /// Connection keyword (`Delta`, `Wye`).
    pub conn: String,
    pub kv: f64,
    pub kva: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Capacitor {
    pub name: String,
    pub bus: BusId,
    pub phases: u8,
    pub kvar: f64,
    pub kv: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Load {
    pub name: String,
    pub bus: BusId,
    /// Conductors named in the connection reference, when it carries a suffix.
    pub terminal: Option<PhaseSet>,
    pub phases: u8,
    pub kv: f64,
    pub pf: f64,
    pub status: String,
    pub class: CustomerClass,
    /// Capacity of the hosting transformer, bounding commercial profile peaks.
    pub tx_cap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub name: String,
    pub bus: BusId,
    pub terminal: Option<PhaseSet>,
    pub phases: u8,
    pub kv: f64,
    pub kw: f64,
    pub pf: f64,
}
