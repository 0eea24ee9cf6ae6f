//! Compile raw tables into a `NetworkModel`.
//!
//! Naming follows the solver namespace the circuit is later built in:
//! MV nodes are `mv_f0_n<Node_ID>`, MV lines `mv_f0_l<Line_Number>`,
//! distribution transformers `mv_f0_lv_<Substation_ID>` with secondary busbar
//! `mv_f0_lv<row>_busbar`. LV buses are declared by the LV lines that reach them.

use std::collections::HashMap;

use ff_core::phases::{phases_from_colour_code, split_bus_ref};
use ff_core::{
    BusId, CustomerClass, LengthUnit, LineId, Phase, PhaseConfig, PhaseSet, TransformerId, round_to,
};
use tracing::{debug, info};

use crate::catalog::{Capacitor, Generator, LinecodeCatalog, Load, Winding};
use crate::error::{NetworkError, NetworkResult};
use crate::model::{
    Bus, BusLevel, DistributionLayout, Line, LineLevel, NetworkId, NetworkModel, Terminal,
    Transformer, TransformerKind,
};
use crate::schema::{LvTxRow, MvTxRow, SubstationTxRow};
use crate::tables::NetworkTables;
use crate::topology::Zones;
use crate::validate;

/// Regulation range of the MV regulators (+/-10%).
const REGULATOR_RANGE: f64 = 0.10;

pub fn mv_node_name(node_id: &str) -> String {
    format!("mv_f0_n{}", node_id.trim())
}

pub fn mv_line_name(line_number: &str) -> String {
    format!("mv_f0_l{}", line_number.trim())
}

pub fn busbar_name(row: usize) -> String {
    format!("mv_f0_lv{row}_busbar")
}

pub fn distribution_name(substation_id: &str) -> String {
    format!("mv_f0_lv_{}", substation_id.trim())
}

pub fn capacitor_name(element_id: &str) -> String {
    format!("mv_f0_c{}", element_id.trim())
}

/// Bus registry used while compiling; lookup is case-insensitive.
#[derive(Default)]
struct BusRegistry {
    buses: Vec<Bus>,
    index: HashMap<String, BusId>,
}

impl BusRegistry {
    fn declare(
        &mut self,
        name: &str,
        level: BusLevel,
        coord: Option<(f64, f64)>,
    ) -> NetworkResult<BusId> {
        let key = name.trim().to_ascii_lowercase();
        if self.index.contains_key(&key) {
            return Err(NetworkError::DuplicateId {
                id: name.to_string(),
                context: "buses",
            });
        }
        Ok(self.insert(key, level, coord))
    }

    fn get_or_declare(&mut self, name: &str, level: BusLevel) -> BusId {
        let key = name.trim().to_ascii_lowercase();
        match self.index.get(&key) {
            Some(id) => *id,
            None => self.insert(key, level, None),
        }
    }

    fn insert(&mut self, key: String, level: BusLevel, coord: Option<(f64, f64)>) -> BusId {
        let id = BusId::from_index(self.buses.len() as u32);
        self.buses.push(Bus {
            id,
            name: key.clone(),
            level,
            coord,
            kv_base: None,
            phases: PhaseSet::EMPTY,
        });
        self.index.insert(key, id);
        id
    }

    fn resolve(&self, name: &str, element: &str, field: &'static str) -> NetworkResult<BusId> {
        self.index
            .get(&name.trim().to_ascii_lowercase())
            .copied()
            .ok_or_else(|| NetworkError::ReferentialIntegrity {
                element: element.to_string(),
                field,
                id: name.trim().to_string(),
            })
    }

    fn touch(&mut self, bus: BusId, phases: PhaseSet) {
        if let Some(b) = self.buses.get_mut(bus.as_usize()) {
            b.phases = b.phases.union(phases);
        }
    }
}

fn terminal_phases(suffix: &str, element: &str) -> NetworkResult<PhaseSet> {
    PhaseSet::from_terminal_suffix(suffix).map_err(|_| {
        NetworkError::invalid(format!("{element} terminal"), suffix, "bad node list")
    })
}

fn count_phases(element: &str, phases: u8) -> NetworkResult<PhaseSet> {
    PhaseSet::first_n(phases).map_err(|_| {
        NetworkError::invalid(format!("{element} phases"), phases, "expected 1, 2 or 3")
    })
}

fn phase_config(element: &str, phases: u8) -> NetworkResult<PhaseConfig> {
    PhaseConfig::from_count(phases).map_err(|_| {
        NetworkError::invalid(format!("{element} phases"), phases, "expected 1, 2 or 3")
    })
}

fn colour_code(element: &str, code: &str) -> NetworkResult<Vec<Phase>> {
    phases_from_colour_code(code).map_err(|_| {
        NetworkError::invalid(format!("{element} Conn_Type"), code, "expected an R/W/B code")
    })
}

fn length_unit(element: &str, units: &str) -> NetworkResult<LengthUnit> {
    units.parse().map_err(|_| {
        NetworkError::invalid(format!("{element} units"), units, "unknown length unit")
    })
}

/// Resolve and validate every reference of `tables` into a frozen model.
pub fn compile(id: NetworkId, tables: &NetworkTables) -> NetworkResult<NetworkModel> {
    let linecodes = LinecodeCatalog::from_rows(&tables.linecodes)?;
    let mut registry = BusRegistry::default();

    if tables.mv_net_txs.is_empty() {
        return Err(NetworkError::invalid(
            "mv_net_txs",
            "0 rows",
            "a substation transformer is required",
        ));
    }
    for row in &tables.mv_net_txs {
        registry.get_or_declare(&row.bus1, BusLevel::Source);
    }
    for row in &tables.buscoords {
        let coord = match (row.x, row.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        };
        registry.declare(&mv_node_name(&row.node_id), BusLevel::Mv, coord)?;
    }
    for (index, _) in tables.lvtx.iter().enumerate() {
        registry.declare(&busbar_name(index), BusLevel::Lv, None)?;
    }

    let mut lines = Vec::new();
    compile_mv_lines(tables, &linecodes, &mut registry, &mut lines)?;
    compile_lv_lines(tables, &linecodes, &mut registry, &mut lines)?;

    let mut transformers = Vec::new();
    for row in &tables.mv_net_txs {
        let tx = substation_transformer(row, &registry, transformers.len())?;
        transformers.push(tx);
    }
    for row in &tables.mvtx {
        let tx = mv_transformer(row, &registry, transformers.len())?;
        transformers.push(tx);
    }
    for (index, row) in tables.lvtx.iter().enumerate() {
        let tx = distribution_transformer(index, row, &registry, transformers.len())?;
        transformers.push(tx);
    }
    for tx in &transformers {
        registry.touch(tx.primary, PhaseSet::from_phases(&tx.primary_phases));
    }

    let capacitors = compile_capacitors(tables, &mut registry)?;
    let loads = compile_loads(tables, &mut registry)?;
    let generators = compile_generators(tables, &mut registry)?;

    let zones = Zones::from_lines(registry.buses.len(), &lines);
    check_lv_connectivity(&lines, &registry, &zones)?;

    let mut feeds: Vec<(BusId, f64)> = Vec::new();
    for tx in &transformers {
        if let Some(primary) = tx.windings.first() {
            if tx.kind == TransformerKind::Substation {
                feeds.push((tx.primary, primary.kv));
            }
        }
        match tx.kind {
            TransformerKind::Regulator { line_kv, .. } => feeds.push((tx.secondary, line_kv)),
            _ => {
                if let Some(secondary) = tx.windings.get(1) {
                    feeds.push((tx.secondary, secondary.kv));
                }
            }
        }
    }
    zones.propagate_kv(&mut registry.buses, &feeds);

    // Busbars tied together by LV conductors share one zone; its customers
    // belong to the first distribution transformer feeding it.
    let mut zone_customers: HashMap<usize, usize> = HashMap::new();
    for load in &loads {
        *zone_customers.entry(zones.zone(load.bus)).or_default() += 1;
    }
    for tx in transformers.iter_mut() {
        let zone = zones.zone(tx.secondary);
        if let TransformerKind::Distribution { customers, .. } = &mut tx.kind {
            *customers = zone_customers.remove(&zone).unwrap_or(0);
        }
    }

    let model = NetworkModel {
        id,
        buses: registry.buses,
        bus_index: registry.index,
        linecodes,
        lines,
        transformers,
        capacitors,
        loads,
        generators,
    };
    validate::validate_model(&model)?;

    info!(
        network = %id,
        buses = model.buses.len(),
        lines = model.lines.len(),
        transformers = model.transformers.len(),
        capacitors = model.capacitors.len(),
        regulators = model.regulators().count(),
        loads = model.loads.len(),
        generators = model.generators.len(),
        "compiled network model"
    );
    Ok(model)
}

fn compile_mv_lines(
    tables: &NetworkTables,
    linecodes: &LinecodeCatalog,
    registry: &mut BusRegistry,
    lines: &mut Vec<Line>,
) -> NetworkResult<()> {
    for row in &tables.lines {
        if row.element_name.trim().eq_ignore_ascii_case("delete") {
            debug!(line = %row.line_number, "skipping line marked for deletion");
            continue;
        }
        let name = mv_line_name(&row.line_number);
        let from = registry.resolve(&mv_node_name(&row.start_node), &name, "Start_Node")?;
        let to = registry.resolve(&mv_node_name(&row.end_node), &name, "End_Node")?;
        let config = phase_config(&name, row.phases)?;

        let linecode_ref = format!("{}-{}ph", row.linecode.trim(), row.phases);
        let linecode = linecodes.resolve(&linecode_ref).ok_or_else(|| {
            NetworkError::ReferentialIntegrity {
                element: name.clone(),
                field: "Linecode",
                id: linecode_ref.clone(),
            }
        })?;

        let from_phases = terminal_phases(&row.start_node_phase, &name)?;
        let to_phases = terminal_phases(&row.end_node_phase, &name)?;
        registry.touch(from, from_phases);
        registry.touch(to, to_phases);

        lines.push(Line {
            id: LineId::from_index(lines.len() as u32),
            name: name.clone(),
            level: LineLevel::Mv,
            from: Terminal {
                bus: from,
                phases: from_phases,
            },
            to: Terminal {
                bus: to,
                phases: to_phases,
            },
            linecode: linecode.id.clone(),
            length: validate::non_negative(format!("{name} Length"), row.length)?,
            units: length_unit(&name, &row.units)?,
            config,
            ampacity: linecode.ampacity,
        });
    }
    Ok(())
}

fn compile_lv_lines(
    tables: &NetworkTables,
    linecodes: &LinecodeCatalog,
    registry: &mut BusRegistry,
    lines: &mut Vec<Line>,
) -> NetworkResult<()> {
    for row in &tables.lv_lines {
        let name = row.line_name.trim().to_string();
        let phases = if row.phases == 3 {
            PhaseSet::ABC
        } else {
            validate::phase_count(format!("{name} phases"), row.phases)?;
            PhaseSet::from_phases(&[Phase::A])
        };
        let config = phase_config(&name, row.phases)?;
        let linecode = linecodes.resolve(&row.linecode).ok_or_else(|| {
            NetworkError::ReferentialIntegrity {
                element: name.clone(),
                field: "linecode",
                id: row.linecode.trim().to_string(),
            }
        })?;
        let (bus1, _) = split_bus_ref(&row.bus1);
        let (bus2, _) = split_bus_ref(&row.bus2);
        let from = registry.get_or_declare(bus1, BusLevel::Lv);
        let to = registry.get_or_declare(bus2, BusLevel::Lv);
        registry.touch(from, phases);
        registry.touch(to, phases);

        lines.push(Line {
            id: LineId::from_index(lines.len() as u32),
            name: name.clone(),
            level: LineLevel::Lv,
            from: Terminal { bus: from, phases },
            to: Terminal { bus: to, phases },
            linecode: linecode.id.clone(),
            length: validate::non_negative(format!("{name} length"), row.length)?,
            units: length_unit(&name, &row.units)?,
            config,
            ampacity: linecode.ampacity,
        });
    }
    Ok(())
}

fn substation_transformer(
    row: &SubstationTxRow,
    registry: &BusRegistry,
    index: usize,
) -> NetworkResult<Transformer> {
    let name = row.substation_id.trim().to_string();
    let primary = registry.resolve(&row.bus1, &name, "Bus1")?;
    let secondary = registry.resolve(&mv_node_name(&row.bus2), &name, "Bus2")?;
    let solver_kva = row.kvas_primary.unwrap_or(row.kvas_secondary);
    Ok(Transformer {
        id: TransformerId::from_index(index as u32),
        name: name.clone(),
        kind: TransformerKind::Substation,
        primary,
        primary_phases: Phase::ALL.to_vec(),
        secondary,
        windings: vec![
            Winding {
                conn: row.connection_primary.trim().to_string(),
                kv: validate::positive(format!("{name} kvs_primary"), row.kvs_primary)?,
                kva: solver_kva,
            },
            Winding {
                conn: row.connection_secondary.trim().to_string(),
                kv: validate::positive(format!("{name} kvs_secondary"), row.kvs_secondary)?,
                kva: row.kvas_secondary,
            },
        ],
        rated_kva: row.kvas_primary,
        xhl: validate::finite(format!("{name} xhl"), row.xhl)?,
        loadloss: validate::non_negative(format!("{name} loadloss"), row.loadloss)?,
        noloadloss: validate::non_negative(format!("{name} noloadloss"), row.noloadloss)?,
    })
}

fn mv_transformer(
    row: &MvTxRow,
    registry: &BusRegistry,
    index: usize,
) -> NetworkResult<Transformer> {
    let name = row.substation_id.trim().to_string();
    let primary = registry.resolve(&mv_node_name(&row.bus1), &name, "Bus1")?;
    let secondary = registry.resolve(&mv_node_name(&row.bus2), &name, "Bus2")?;
    let solver_kva = row.kvas_primary.unwrap_or(row.kvas_secondary);

    let (kind, primary_phases, windings) = if (row.kvs_primary - row.kvs_secondary).abs() > 1e-9 {
        let phases = colour_code(&name, &row.conn_type)?;
        let windings = vec![
            Winding {
                conn: "Delta".to_string(),
                kv: validate::positive(format!("{name} kvs_primary"), row.kvs_primary)?,
                kva: solver_kva,
            },
            Winding {
                conn: "Wye".to_string(),
                kv: validate::positive(format!("{name} kvs_secondary"), row.kvs_secondary)?,
                kva: row.kvas_secondary,
            },
            Winding {
                conn: "Wye".to_string(),
                kv: row.kvs_secondary,
                kva: row.kvas_secondary,
            },
        ];
        (TransformerKind::SwerIsolating, phases, windings)
    } else {
        let numtaps = row.wdg1_numtaps.ok_or_else(|| {
            NetworkError::invalid(
                format!("{name} wdg1_numtaps"),
                "blank",
                "regulators need a tap count",
            )
        })?;
        if numtaps < 2 {
            return Err(NetworkError::invalid(
                format!("{name} wdg1_numtaps"),
                numtaps,
                "regulators need at least two tap positions",
            ));
        }
        // Single-phase units between line and neutral, rated as autotransformers:
        // the series winding only carries the regulation range.
        let unit_kv = round_to(row.kvs_primary / 3f64.sqrt(), 2);
        let unit_kva = round_to(
            REGULATOR_RANGE * solver_kva / (1.0 + REGULATOR_RANGE),
            2,
        );
        let windings = vec![
            Winding {
                conn: "Wye".to_string(),
                kv: unit_kv,
                kva: unit_kva,
            },
            Winding {
                conn: "Wye".to_string(),
                kv: round_to(unit_kv * REGULATOR_RANGE, 3),
                kva: unit_kva,
            },
        ];
        (
            TransformerKind::Regulator {
                numtaps,
                line_kv: validate::positive(format!("{name} kvs_secondary"), row.kvs_secondary)?,
            },
            Phase::ALL.to_vec(),
            windings,
        )
    };

    Ok(Transformer {
        id: TransformerId::from_index(index as u32),
        name: name.clone(),
        kind,
        primary,
        primary_phases,
        secondary,
        windings,
        rated_kva: row.kvas_primary,
        xhl: validate::finite(format!("{name} xhl"), row.xhl)?,
        loadloss: validate::non_negative(format!("{name} loadloss"), row.loadloss)?,
        noloadloss: validate::non_negative(format!("{name} noloadloss"), row.noloadloss)?,
    })
}

fn distribution_transformer(
    row_index: usize,
    row: &LvTxRow,
    registry: &BusRegistry,
    index: usize,
) -> NetworkResult<Transformer> {
    let name = distribution_name(&row.substation_id);
    let primary = registry.resolve(&mv_node_name(&row.bus1), &name, "Bus1")?;
    let secondary = registry.resolve(&busbar_name(row_index), &name, "busbar")?;
    let phases = colour_code(&name, &row.conn_type)?;
    let solver_kva = row.kvas_primary.unwrap_or(row.kvas_secondary);
    let primary_kv = validate::positive(format!("{name} kvs_primary"), row.kvs_primary)?;
    let secondary_kv = validate::positive(format!("{name} kvs_secondary"), row.kvs_secondary)?;

    let (layout, windings) = match phases.len() {
        3 => (
            DistributionLayout::ThreePhase,
            vec![
                Winding {
                    conn: row.connection_primary.trim().to_string(),
                    kv: primary_kv,
                    kva: solver_kva,
                },
                Winding {
                    conn: row.connection_secondary.trim().to_string(),
                    kv: secondary_kv,
                    kva: row.kvas_secondary,
                },
            ],
        ),
        2 => (
            DistributionLayout::SwerCentreTap,
            vec![
                Winding {
                    conn: "Delta".to_string(),
                    kv: primary_kv,
                    kva: solver_kva,
                },
                Winding {
                    conn: "Wye".to_string(),
                    kv: secondary_kv,
                    kva: row.kvas_secondary,
                },
                Winding {
                    conn: "Wye".to_string(),
                    kv: secondary_kv,
                    kva: row.kvas_secondary,
                },
            ],
        ),
        _ => (
            DistributionLayout::SinglePhase,
            vec![
                Winding {
                    conn: "Wye".to_string(),
                    kv: primary_kv,
                    kva: solver_kva,
                },
                Winding {
                    conn: "Wye".to_string(),
                    kv: secondary_kv,
                    kva: row.kvas_secondary,
                },
            ],
        ),
    };

    Ok(Transformer {
        id: TransformerId::from_index(index as u32),
        name: name.clone(),
        kind: TransformerKind::Distribution {
            layout,
            tap: validate::finite(format!("{name} wdg1_tap"), row.wdg1_tap)?,
            class: CustomerClass::from_code(&row.kind),
            customers: 0,
        },
        primary,
        primary_phases: phases,
        secondary,
        windings,
        rated_kva: row.kvas_primary,
        xhl: validate::finite(format!("{name} xhl"), row.xhl)?,
        loadloss: validate::non_negative(format!("{name} loadloss"), row.loadloss)?,
        noloadloss: validate::non_negative(format!("{name} noloadloss"), row.noloadloss)?,
    })
}

fn compile_capacitors(
    tables: &NetworkTables,
    registry: &mut BusRegistry,
) -> NetworkResult<Vec<Capacitor>> {
    let mut capacitors = Vec::with_capacity(tables.mvcaps.len());
    for row in &tables.mvcaps {
        let name = capacitor_name(&row.element_id);
        let bus = registry.resolve(&mv_node_name(&row.bus1), &name, "Bus1")?;
        let phases = count_phases(&name, row.phases)?;
        registry.touch(bus, phases);
        capacitors.push(Capacitor {
            name: name.clone(),
            bus,
            phases: row.phases,
            kvar: validate::finite(format!("{name} kvar"), row.kvar)?,
            kv: validate::positive(format!("{name} kvs"), row.kvs)?,
        });
    }
    Ok(capacitors)
}

fn compile_loads(tables: &NetworkTables, registry: &mut BusRegistry) -> NetworkResult<Vec<Load>> {
    let mut loads = Vec::with_capacity(tables.lv_loads.len());
    for row in &tables.lv_loads {
        let name = row.load_name.trim().to_string();
        let (bus_name, suffix) = split_bus_ref(&row.bus1);
        let bus = registry.resolve(bus_name, &name, "bus1")?;
        let terminal = suffix.map(|s| terminal_phases(s, &name)).transpose()?;
        let phases = validate::phase_count(format!("{name} phases"), row.phases)?;
        registry.touch(bus, terminal.unwrap_or(count_phases(&name, phases)?));
        loads.push(Load {
            name: name.clone(),
            bus,
            terminal,
            phases,
            kv: validate::positive(format!("{name} kv"), row.kv)?,
            pf: validate::power_factor(format!("{name} pf"), row.pf)?,
            status: match row.status.trim() {
                "" => "variable".to_string(),
                s => s.to_string(),
            },
            class: CustomerClass::from_phase_count(phases),
            tx_cap: row.tx_cap,
        });
    }
    Ok(loads)
}

fn compile_generators(
    tables: &NetworkTables,
    registry: &mut BusRegistry,
) -> NetworkResult<Vec<Generator>> {
    let mut generators = Vec::with_capacity(tables.lv_generation.len());
    for row in &tables.lv_generation {
        let name = row.gen_name.trim().to_string();
        let (bus_name, suffix) = split_bus_ref(&row.bus1);
        let bus = registry.resolve(bus_name, &name, "bus1")?;
        let terminal = suffix.map(|s| terminal_phases(s, &name)).transpose()?;
        let phases = validate::phase_count(format!("{name} phases"), row.phases)?;
        registry.touch(bus, terminal.unwrap_or(count_phases(&name, phases)?));
        generators.push(Generator {
            name: name.clone(),
            bus,
            terminal,
            phases,
            kv: validate::positive(format!("{name} kv"), row.kv)?,
            kw: validate::non_negative(format!("{name} kw"), row.kw)?,
            pf: validate::power_factor(format!("{name} pf"), row.pf)?,
        });
    }
    Ok(generators)
}

/// Every LV conductor must share a zone with some transformer busbar.
fn check_lv_connectivity(
    lines: &[Line],
    registry: &BusRegistry,
    zones: &Zones,
) -> NetworkResult<()> {
    let busbar_zones: Vec<usize> = registry
        .buses
        .iter()
        .filter(|b| b.name.ends_with("_busbar"))
        .map(|b| zones.zone(b.id))
        .collect();
    for line in lines.iter().filter(|l| l.level == LineLevel::Lv) {
        if !busbar_zones.contains(&zones.zone(line.from.bus)) {
            return Err(NetworkError::Islanded {
                line: line.name.clone(),
            });
        }
    }
    Ok(())
}
