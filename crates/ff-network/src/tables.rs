//! Reading the per-network sheets from disk.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{NetworkError, NetworkResult};
use crate::schema::*;

/// The sheets a network directory may carry, one `<name>.csv` each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    BusCoords,
    Connections,
    MvCaps,
    MvTx,
    Lines,
    LvTx,
    MvNetTxs,
    Linecodes,
    LvLines,
    LvLoads,
    LvGeneration,
}

impl Sheet {
    pub const ALL: [Sheet; 11] = [
        Sheet::BusCoords,
        Sheet::Connections,
        Sheet::MvCaps,
        Sheet::MvTx,
        Sheet::Lines,
        Sheet::LvTx,
        Sheet::MvNetTxs,
        Sheet::Linecodes,
        Sheet::LvLines,
        Sheet::LvLoads,
        Sheet::LvGeneration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Sheet::BusCoords => "buscoords",
            Sheet::Connections => "connections",
            Sheet::MvCaps => "mvcaps",
            Sheet::MvTx => "mvtx",
            Sheet::Lines => "lines",
            Sheet::LvTx => "lvtx",
            Sheet::MvNetTxs => "mv_net_txs",
            Sheet::Linecodes => "linecodes",
            Sheet::LvLines => "lv_lines",
            Sheet::LvLoads => "lv_loads",
            Sheet::LvGeneration => "lv_generation",
        }
    }

    /// Optional sheets may be absent; they compile to empty collections.
    pub fn is_required(self) -> bool {
        !matches!(
            self,
            Sheet::Connections | Sheet::MvCaps | Sheet::MvTx | Sheet::LvGeneration
        )
    }

    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.csv", self.name()))
    }
}

/// Raw rows of one network, before any reference is resolved.
#[derive(Debug, Clone, Default)]
pub struct NetworkTables {
    pub buscoords: Vec<BusCoordRow>,
    pub lines: Vec<LineRow>,
    pub linecodes: Vec<LinecodeRow>,
    pub mv_net_txs: Vec<SubstationTxRow>,
    pub mvtx: Vec<MvTxRow>,
    pub mvcaps: Vec<MvCapRow>,
    pub lvtx: Vec<LvTxRow>,
    pub lv_lines: Vec<LvLineRow>,
    pub lv_loads: Vec<LvLoadRow>,
    pub lv_generation: Vec<GenerationRow>,
}

/// Load every sheet of a network directory.
///
/// Fails with `MissingData` on the first absent required sheet. The
/// `connections` sheet is accepted but carries nothing the compiler uses.
pub fn load_tables(dir: &Path) -> NetworkResult<NetworkTables> {
    for sheet in Sheet::ALL {
        if sheet.is_required() && !sheet.path_in(dir).is_file() {
            return Err(NetworkError::MissingData {
                sheet: sheet.name(),
                path: sheet.path_in(dir),
            });
        }
    }

    let tables = NetworkTables {
        buscoords: read_sheet(dir, Sheet::BusCoords)?,
        lines: read_sheet(dir, Sheet::Lines)?,
        linecodes: read_sheet(dir, Sheet::Linecodes)?,
        mv_net_txs: read_sheet(dir, Sheet::MvNetTxs)?,
        mvtx: read_sheet(dir, Sheet::MvTx)?,
        mvcaps: read_sheet(dir, Sheet::MvCaps)?,
        lvtx: read_sheet(dir, Sheet::LvTx)?,
        lv_lines: read_sheet(dir, Sheet::LvLines)?,
        lv_loads: read_sheet(dir, Sheet::LvLoads)?,
        lv_generation: read_sheet(dir, Sheet::LvGeneration)?,
    };

    info!(
        dir = %dir.display(),
        buses = tables.buscoords.len(),
        mv_lines = tables.lines.len(),
        lv_lines = tables.lv_lines.len(),
        loads = tables.lv_loads.len(),
        "loaded network tables"
    );
    Ok(tables)
}

/// Read one sheet; an absent optional sheet reads as no rows.
pub fn read_sheet<T: DeserializeOwned>(dir: &Path, sheet: Sheet) -> NetworkResult<Vec<T>> {
    let path = sheet.path_in(dir);
    if !path.is_file() {
        if sheet.is_required() {
            return Err(NetworkError::MissingData {
                sheet: sheet.name(),
                path,
            });
        }
        debug!(sheet = sheet.name(), "optional sheet absent");
        return Ok(Vec::new());
    }
    let file = File::open(&path)?;
    read_rows(file, sheet)
}

/// Deserialize rows from any reader carrying a header line.
pub fn read_rows<T: DeserializeOwned, R: std::io::Read>(
    reader: R,
    sheet: Sheet,
) -> NetworkResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for (index, record) in reader.deserialize().enumerate() {
        let row: T = record.map_err(|e| NetworkError::Row {
            sheet: sheet.name(),
            row: index as u64 + 1,
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_sheets() {
        assert!(!Sheet::MvCaps.is_required());
        assert!(!Sheet::MvTx.is_required());
        assert!(!Sheet::Connections.is_required());
        assert!(Sheet::Linecodes.is_required());
        assert!(Sheet::LvLoads.is_required());
    }

    #[test]
    fn rows_with_blank_optional_columns() {
        let csv = "load_name,bus1,phases,kv,pf,model,tx_cap\n\
                   ld_1,lv_b1.1,1,0.23,0.95,variable,\n";
        let rows: Vec<LvLoadRow> = read_rows(csv.as_bytes(), Sheet::LvLoads).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tx_cap, None);
        assert_eq!(rows[0].status, "variable");
    }

    #[test]
    fn malformed_row_names_sheet_and_row() {
        let csv = "Node_ID,NodeStartX,NodeStartY\n1,0.0,0.0\n2,abc,0.0\n";
        let err = read_rows::<BusCoordRow, _>(csv.as_bytes(), Sheet::BusCoords).unwrap_err();
        match err {
            NetworkError::Row { sheet, row, .. } => {
                assert_eq!(sheet, "buscoords");
                assert_eq!(row, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
