//! Small networks in the four shapes of the study set, for tests downstream.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::NetworkResult;
use crate::schema::*;
use crate::tables::{NetworkTables, Sheet};

fn node(id: u32, x: f64, y: f64) -> BusCoordRow {
    BusCoordRow {
        node_id: id.to_string(),
        x: Some(x),
        y: Some(y),
    }
}

fn mv_line(number: u32, from: u32, to: u32, phases: u8, linecode: &str) -> LineRow {
    let terminal = if phases == 3 { "1.2.3" } else { "1" };
    LineRow {
        element_name: format!("line{number}"),
        line_number: number.to_string(),
        start_node: from.to_string(),
        start_node_phase: terminal.to_string(),
        end_node: to.to_string(),
        end_node_phase: terminal.to_string(),
        phases,
        length: 1.5,
        units: "km".to_string(),
        linecode: linecode.to_string(),
    }
}

fn linecode(id: &str, phases: u8, a1: f64, a2: f64, units: &str) -> LinecodeRow {
    LinecodeRow {
        linecode_id: id.to_string(),
        phases,
        r1: 0.2,
        x1: 0.35,
        b1: 0.0,
        r0: 0.5,
        x0: 1.2,
        b0: 0.0,
        units: units.to_string(),
        ampacity1: Some(a1),
        ampacity2: Some(a2),
    }
}

fn lvtx(id: &str, bus: u32, conn: &str, kv1: f64, kv2: f64, kva: f64, kind: &str) -> LvTxRow {
    LvTxRow {
        substation_id: id.to_string(),
        bus1: bus.to_string(),
        conn_type: conn.to_string(),
        connection_primary: "Delta".to_string(),
        connection_secondary: "Wye".to_string(),
        kvs_primary: kv1,
        kvs_secondary: kv2,
        kvas_primary: Some(kva),
        kvas_secondary: kva,
        xhl: 4.0,
        noloadloss: 0.1,
        loadloss: 1.2,
        wdg1_tap: 1.05,
        kind: kind.to_string(),
    }
}

fn lv_line(name: &str, bus1: &str, bus2: &str, phases: u8, linecode: &str) -> LvLineRow {
    LvLineRow {
        line_name: name.to_string(),
        bus1: bus1.to_string(),
        bus2: bus2.to_string(),
        phases,
        length: 40.0,
        units: "m".to_string(),
        linecode: linecode.to_string(),
    }
}

pub fn load(name: &str, bus: &str, phases: u8, kv: f64, tx_cap: Option<f64>) -> LvLoadRow {
    LvLoadRow {
        load_name: name.to_string(),
        bus1: bus.to_string(),
        phases,
        kv,
        pf: 0.95,
        status: "variable".to_string(),
        tx_cap,
    }
}

/// Urban shape without optional sheets.
pub fn urban_plain() -> NetworkTables {
    let mut lines = vec![
        mv_line(1, 1, 2, 3, "Mink"),
        mv_line(2, 2, 3, 3, "Mink"),
        mv_line(3, 3, 4, 3, "Mink"),
    ];
    let mut deleted = mv_line(9, 4, 99, 3, "Ghost");
    deleted.element_name = "DELETE".to_string();
    lines.push(deleted);

    NetworkTables {
        buscoords: vec![
            node(1, 0.0, 0.0),
            node(2, 1.0, 0.0),
            node(3, 2.0, 0.0),
            node(4, 3.0, 0.0),
            node(5, 4.0, 0.0),
        ],
        lines,
        linecodes: vec![
            linecode("Mink-3ph", 3, 200.0, 250.0, "km"),
            linecode("Mink-1ph", 1, 120.0, 150.0, "km"),
            linecode("lv_abc", 3, 300.0, 350.0, "km"),
            linecode("lv_a", 1, 150.0, 180.0, "km"),
        ],
        mv_net_txs: vec![SubstationTxRow {
            substation_id: "SUB1".to_string(),
            bus1: "sourcebus".to_string(),
            bus2: "1".to_string(),
            connection_primary: "Delta".to_string(),
            connection_secondary: "Wye".to_string(),
            kvs_primary: 66.0,
            kvs_secondary: 22.0,
            kvas_primary: Some(10_000.0),
            kvas_secondary: 10_000.0,
            loadloss: 0.5,
            noloadloss: 0.05,
            xhl: 8.0,
        }],
        mvtx: Vec::new(),
        mvcaps: Vec::new(),
        lvtx: vec![
            lvtx("T1", 3, "RWB", 22.0, 0.4, 500.0, "RES"),
            lvtx("T2", 4, "RWB", 22.0, 0.4, 315.0, "COM"),
        ],
        lv_lines: vec![
            lv_line("lv_l1", "mv_f0_lv0_busbar", "lvb1", 3, "lc_lv_abc"),
            lv_line("lv_l2", "lvb1", "lvb2", 1, "lv_a"),
            lv_line("lv_l3", "mv_f0_lv1_busbar", "lvc1", 3, "lv_abc"),
        ],
        lv_loads: vec![
            load("res1", "lvb1.1", 1, 0.23, Some(500.0)),
            load("res2", "lvb2.1", 1, 0.23, Some(500.0)),
            load("com1", "lvc1", 3, 0.4, Some(315.0)),
        ],
        lv_generation: Vec::new(),
    }
}

pub fn capacitor(id: &str, bus: u32) -> MvCapRow {
    MvCapRow {
        element_id: id.to_string(),
        bus1: bus.to_string(),
        phases: 3,
        kvar: 600.0,
        kvs: 22.0,
    }
}

/// Urban shape with a capacitor bank.
pub fn urban_with_caps() -> NetworkTables {
    let mut tables = urban_plain();
    tables.mvcaps.push(capacitor("1", 2));
    tables
}

/// Rural shape with a regulator and capacitors.
pub fn rural_with_regulator() -> NetworkTables {
    let mut tables = urban_plain();
    tables.mvcaps.push(capacitor("1", 2));
    tables.mvtx.push(MvTxRow {
        substation_id: "R1_REG".to_string(),
        bus1: "4".to_string(),
        bus2: "5".to_string(),
        conn_type: "RWB".to_string(),
        kvs_primary: 22.0,
        kvs_secondary: 22.0,
        kvas_primary: Some(5_000.0),
        kvas_secondary: 5_000.0,
        xhl: 1.0,
        noloadloss: 0.01,
        loadloss: 0.01,
        wdg1_numtaps: Some(33),
    });
    tables
}

/// Rural shape with a SWER section behind an isolating transformer.
pub fn rural_swer() -> NetworkTables {
    let mut tables = urban_plain();
    tables.buscoords.push(node(6, 5.0, 0.0));
    tables.mvtx.push(MvTxRow {
        substation_id: "ISO1".to_string(),
        bus1: "4".to_string(),
        bus2: "5".to_string(),
        conn_type: "RW".to_string(),
        kvs_primary: 22.0,
        kvs_secondary: 12.7,
        kvas_primary: Some(200.0),
        kvas_secondary: 200.0,
        xhl: 2.0,
        noloadloss: 0.1,
        loadloss: 1.0,
        wdg1_numtaps: None,
    });
    tables.lines.push(mv_line(10, 5, 6, 1, "Mink"));
    tables.lvtx.push(lvtx("T3", 6, "R", 12.7, 0.25, 25.0, "RES"));
    tables
        .lv_lines
        .push(lv_line("lv_s1", "mv_f0_lv2_busbar", "lvs1", 1, "lv_a"));
    tables
        .lv_loads
        .push(load("res3", "lvs1.1", 1, 0.25, Some(25.0)));
    tables
}

/// Fresh directory under the system temp dir.
pub fn unique_temp_dir(prefix: &str) -> std::io::Result<PathBuf> {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("{prefix}_{}_{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn write_sheet<T: Serialize>(dir: &Path, sheet: Sheet, rows: &[T]) -> NetworkResult<()> {
    if rows.is_empty() && !sheet.is_required() {
        return Ok(());
    }
    let path = sheet.path_in(dir);
    let csv_error = |e: csv::Error| crate::error::NetworkError::Row {
        sheet: sheet.name(),
        row: 0,
        reason: e.to_string(),
    };
    let mut writer = csv::Writer::from_path(&path).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every non-empty sheet as `<sheet>.csv`.
pub fn write_tables(dir: &Path, tables: &NetworkTables) -> NetworkResult<()> {
    write_sheet(dir, Sheet::BusCoords, &tables.buscoords)?;
    write_sheet(dir, Sheet::Lines, &tables.lines)?;
    write_sheet(dir, Sheet::Linecodes, &tables.linecodes)?;
    write_sheet(dir, Sheet::MvNetTxs, &tables.mv_net_txs)?;
    write_sheet(dir, Sheet::MvTx, &tables.mvtx)?;
    write_sheet(dir, Sheet::MvCaps, &tables.mvcaps)?;
    write_sheet(dir, Sheet::LvTx, &tables.lvtx)?;
    write_sheet(dir, Sheet::LvLines, &tables.lv_lines)?;
    write_sheet(dir, Sheet::LvLoads, &tables.lv_loads)?;
    write_sheet(dir, Sheet::LvGeneration, &tables.lv_generation)
}
