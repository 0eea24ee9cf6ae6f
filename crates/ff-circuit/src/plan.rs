//! Pure construction plan: the ordered, staged commands for one circuit.

use std::collections::HashSet;

use ff_core::phases::node_list;
use ff_core::{INTERVAL_MINUTES, INTERVALS_PER_DAY, Phase, PhaseSet, round_to};
use ff_network::{DistributionLayout, Line, NetworkModel, Transformer, TransformerKind};
use ff_profiles::{DayAssignment, LoadDemand};
use tracing::debug;

use crate::command::{Command, Stage, list};
use crate::element::{ElementClass, ElementRef};
use crate::error::{CircuitError, CircuitResult};
use crate::settings::CircuitSettings;

/// Tap positions of the distribution transformers' primary winding.
const DISTRIBUTION_NUMTAPS: u32 = 4;
const DISTRIBUTION_MAXTAP: f64 = 1.137;
const DISTRIBUTION_MINTAP: f64 = 1.028;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCommand {
    pub stage: Stage,
    pub command: Command,
}

#[derive(Debug, Clone, Default)]
pub struct CircuitPlan {
    commands: Vec<PlannedCommand>,
}

impl CircuitPlan {
    pub fn commands(&self) -> &[PlannedCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn stage(&self, stage: Stage) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(move |c| c.stage == stage)
            .map(|c| &c.command)
    }

    pub fn stage_count(&self, stage: Stage) -> usize {
        self.stage(stage).count()
    }

    /// Index of the command that defines `element`.
    pub fn position(&self, element: &ElementRef) -> Option<usize> {
        let key = element.key();
        self.commands
            .iter()
            .position(|c| c.command.defines().is_some_and(|e| e.key() == key))
    }

    /// One command per line, in application order.
    pub fn script(&self) -> String {
        let mut out = String::new();
        for planned in &self.commands {
            out.push_str(&planned.command.to_string());
            out.push('\n');
        }
        out
    }
}

struct Planner {
    commands: Vec<PlannedCommand>,
    defined: HashSet<String>,
}

impl Planner {
    fn push(&mut self, stage: Stage, command: Command) -> CircuitResult<()> {
        if let Some(element) = command.defines() {
            if !self.defined.insert(element.key()) {
                return Err(CircuitError::DuplicateElement {
                    element: element.to_string(),
                });
            }
        }
        self.commands.push(PlannedCommand { stage, command });
        Ok(())
    }
}

/// What the profile assigner needs to know about each load, in model order.
pub fn load_demands(model: &NetworkModel) -> Vec<LoadDemand> {
    model
        .loads
        .iter()
        .map(|load| LoadDemand {
            name: load.name.clone(),
            class: load.class,
            tx_cap: load.tx_cap,
        })
        .collect()
}

/// Plan every command needed to build `model` with the profiles in `assignment`.
pub fn plan(
    model: &NetworkModel,
    assignment: &DayAssignment,
    settings: &CircuitSettings,
) -> CircuitResult<CircuitPlan> {
    let mut p = Planner {
        commands: Vec::new(),
        defined: HashSet::new(),
    };

    p.push(Stage::Preamble, Command::Clear)?;
    p.push(
        Stage::Preamble,
        Command::set("DefaultBaseFrequency", settings.base_frequency),
    )?;

    source(&mut p, model, settings)?;

    for tx in model.substations() {
        p.push(Stage::SubstationTransformer, two_winding(model, tx, 3))?;
    }

    for code in model.linecodes.iter() {
        let cmd = Command::define(ElementClass::Linecode, code.solver_name())
            .with("nphases", code.phases)
            .with("r1", code.r1)
            .with("x1", code.x1)
            .with("b1", code.b1)
            .with("r0", code.r0)
            .with("x0", code.x0)
            .with("b0", code.b0)
            .with("units", code.units.keyword())
            .with_opt("normamps", code.normamps());
        p.push(Stage::Linecodes, cmd)?;
    }

    for line in model.mv_lines() {
        p.push(Stage::MvLines, line_command(model, line))?;
    }

    for cap in &model.capacitors {
        let terminal = PhaseSet::first_n(cap.phases).unwrap_or(PhaseSet::ABC);
        let cmd = Command::define(ElementClass::Capacitor, &cap.name)
            .with("bus1", format!("{}{}", model.bus_name(cap.bus), terminal.terminal_suffix()))
            .with("phases", cap.phases)
            .with("kvar", cap.kvar)
            .with("kV", cap.kv);
        p.push(Stage::Capacitors, cmd)?;
    }

    for tx in model.mv_transformers() {
        match tx.kind {
            TransformerKind::Regulator { numtaps, .. } => {
                regulator(&mut p, model, tx, numtaps, settings)?;
            }
            _ => p.push(Stage::MvTransformers, swer_isolating(model, tx))?,
        }
    }

    for tx in model.distribution_transformers() {
        p.push(Stage::LvTransformers, distribution(model, tx))?;
    }

    for line in model.lv_lines() {
        p.push(Stage::LvLines, line_command(model, line))?;
    }

    loads(&mut p, model, assignment)?;

    for generator in &model.generators {
        let cmd = Command::define(ElementClass::Generator, &generator.name)
            .with("phases", generator.phases)
            .with("bus1", terminal_ref(model, generator.bus, generator.terminal))
            .with("kv", generator.kv)
            .with("kW", generator.kw)
            .with("pf", generator.pf);
        p.push(Stage::Generation, cmd)?;
    }

    p.push(
        Stage::Settings,
        Command::set("VoltageBases", list(&settings.voltage_bases)),
    )?;
    p.push(Stage::Settings, Command::set("ControlMode", &settings.control_mode))?;
    p.push(
        Stage::Settings,
        Command::set("MaxControlIter", settings.max_control_iterations),
    )?;
    p.push(Stage::Settings, Command::CalcVoltageBases)?;

    debug!(commands = p.commands.len(), "planned circuit");
    Ok(CircuitPlan {
        commands: p.commands,
    })
}

fn source(p: &mut Planner, model: &NetworkModel, settings: &CircuitSettings) -> CircuitResult<()> {
    let s = &settings.source;
    let bus = model
        .substation()
        .map(|tx| model.bus_name(tx.primary))
        .unwrap_or("sourcebus");
    let circuit = Command::define(ElementClass::Circuit, "circuit")
        .with("basekv", s.base_kv)
        .with("pu", s.pu)
        .with("angle", s.angle)
        .with("phases", 3)
        .with("R1", s.r1)
        .with("X1", s.x1)
        .with("R0", s.r0)
        .with("X0", s.x0);
    p.push(Stage::Source, circuit)?;
    p.push(
        Stage::Source,
        Command::edit(ElementClass::Vsource, "source").with("bus1", bus),
    )
}

fn terminal_ref(model: &NetworkModel, bus: ff_core::BusId, terminal: Option<PhaseSet>) -> String {
    let suffix = terminal.map(PhaseSet::terminal_suffix).unwrap_or_default();
    format!("{}{suffix}", model.bus_name(bus))
}

fn line_command(model: &NetworkModel, line: &Line) -> Command {
    Command::define(ElementClass::Line, &line.name)
        .with("bus1", terminal_ref(model, line.from.bus, Some(line.from.phases)))
        .with("bus2", terminal_ref(model, line.to.bus, Some(line.to.phases)))
        .with("phases", line.config.phase_count())
        .with("length", line.length)
        .with("units", line.units.keyword())
        .with("linecode", format!("{}{}", ff_network::catalog::LINECODE_PREFIX, line.linecode))
}

fn with_losses(cmd: Command, tx: &Transformer) -> Command {
    cmd.with("%loadloss", tx.loadloss)
        .with("%noloadloss", tx.noloadloss)
        .with("xhl", tx.xhl)
}

fn with_windings(cmd: Command, tx: &Transformer, buses: &[String]) -> Command {
    let conns: Vec<&str> = tx.windings.iter().map(|w| w.conn.as_str()).collect();
    let kvs: Vec<f64> = tx.windings.iter().map(|w| w.kv).collect();
    let kvas: Vec<f64> = tx.windings.iter().map(|w| w.kva).collect();
    cmd.with("windings", tx.windings.len())
        .with("buses", list(buses))
        .with("conns", list(&conns))
        .with("kVs", list(&kvs))
        .with("kVAs", list(&kvas))
}

fn two_winding(model: &NetworkModel, tx: &Transformer, phases: u8) -> Command {
    let buses = [
        model.bus_name(tx.primary).to_string(),
        model.bus_name(tx.secondary).to_string(),
    ];
    let cmd = Command::define(ElementClass::Transformer, &tx.name).with("phases", phases);
    with_losses(with_windings(cmd, tx, &buses), tx).with("enabled", true)
}

/// Single-phase three-winding unit with a centre-tapped secondary.
fn centre_tapped_buses(model: &NetworkModel, tx: &Transformer) -> Vec<String> {
    let secondary = model.bus_name(tx.secondary);
    vec![
        format!("{}.{}", model.bus_name(tx.primary), node_list(&tx.primary_phases)),
        format!("{secondary}.1.0"),
        format!("{secondary}.0.2"),
    ]
}

fn swer_isolating(model: &NetworkModel, tx: &Transformer) -> Command {
    let cmd = Command::define(ElementClass::Transformer, &tx.name).with("phases", 1);
    let buses = centre_tapped_buses(model, tx);
    with_losses(with_windings(cmd, tx, &buses), tx).with("enabled", true)
}

fn regulator(
    p: &mut Planner,
    model: &NetworkModel,
    tx: &Transformer,
    numtaps: u32,
    settings: &CircuitSettings,
) -> CircuitResult<()> {
    let reg = &settings.regulator;
    let (Some(common), Some(series)) = (tx.windings.first(), tx.windings.get(1)) else {
        return Err(CircuitError::protocol(format!(
            "regulator {} has no winding data",
            tx.name
        )));
    };
    let primary = model.bus_name(tx.primary);
    let secondary = model.bus_name(tx.secondary);

    for phase in Phase::ALL {
        let node = phase.node();
        let unit = format!("{}_{phase:?}", tx.name);
        let jumper = format!("Jumper_{unit}");

        for (suffix, bus1, bus2) in [
            ("E", format!("{primary}.{node}"), format!("{jumper}.2")),
            ("O", format!("{jumper}.1"), format!("{secondary}.{node}")),
        ] {
            let cmd = Command::define(ElementClass::Reactor, format!("{jumper}_{suffix}"))
                .with("phases", 1)
                .with("bus1", bus1)
                .with("bus2", bus2)
                .with("X", reg.jumper_impedance)
                .with("R", reg.jumper_impedance);
            p.push(Stage::MvTransformers, cmd)?;
        }

        let unit_cmd = Command::define(ElementClass::Transformer, &unit)
            .with("phases", 1)
            .with("windings", 2)
            .with("xhl", tx.xhl)
            .with("%noloadloss", tx.noloadloss)
            .with("%loadloss", tx.loadloss)
            .with("wdg", 1)
            .with("Bus", format!("{jumper}.1.0"))
            .with("kV", common.kv)
            .with("kVA", common.kva)
            .with("wdg", 2)
            .with("Bus", format!("{jumper}.1.2"))
            .with("kV", series.kv)
            .with("kVA", series.kva)
            .with("Maxtap", 1.0)
            .with("Mintap", -1.0)
            .with("tap", 0.0)
            .with("numtaps", numtaps.saturating_sub(1));
        p.push(Stage::MvTransformers, unit_cmd)?;

        let control = Command::define(ElementClass::RegControl, format!("Reg_{unit}"))
            .with("transformer", &unit)
            .with("winding", 2)
            .with("bus", format!("{jumper}.1"))
            .with("vreg", reg.vreg)
            .with("band", reg.band)
            .with("ptratio", round_to(common.kv * 1000.0 / reg.vreg, 3))
            .with("maxtapchange", reg.max_tap_change);
        p.push(Stage::MvTransformers, control)?;
    }
    Ok(())
}

fn distribution(model: &NetworkModel, tx: &Transformer) -> Command {
    let (layout, tap) = match tx.kind {
        TransformerKind::Distribution { layout, tap, .. } => (layout, tap),
        _ => (DistributionLayout::ThreePhase, 1.0),
    };
    let cmd = match layout {
        DistributionLayout::ThreePhase => {
            let buses = [
                model.bus_name(tx.primary).to_string(),
                model.bus_name(tx.secondary).to_string(),
            ];
            with_windings(
                Command::define(ElementClass::Transformer, &tx.name).with("phases", 3),
                tx,
                &buses,
            )
        }
        DistributionLayout::SwerCentreTap => with_windings(
            Command::define(ElementClass::Transformer, &tx.name).with("phases", 1),
            tx,
            &centre_tapped_buses(model, tx),
        ),
        DistributionLayout::SinglePhase => {
            let buses = [
                format!("{}.{}", model.bus_name(tx.primary), node_list(&tx.primary_phases)),
                format!("{}.1", model.bus_name(tx.secondary)),
            ];
            with_windings(
                Command::define(ElementClass::Transformer, &tx.name).with("phases", 1),
                tx,
                &buses,
            )
        }
    };
    with_losses(cmd, tx)
        .with("enabled", true)
        .with("wdg", 1)
        .with("numtaps", DISTRIBUTION_NUMTAPS)
        .with("tap", tap)
        .with("maxtap", DISTRIBUTION_MAXTAP)
        .with("mintap", DISTRIBUTION_MINTAP)
}

/// Each load's shape is defined right before the load that references it.
fn loads(p: &mut Planner, model: &NetworkModel, assignment: &DayAssignment) -> CircuitResult<()> {
    for (index, load) in model.loads.iter().enumerate() {
        let assigned = assignment
            .get(&load.name)
            .ok_or_else(|| CircuitError::MissingProfile {
                load: load.name.clone(),
            })?;
        let shape = format!("Load_shape_{}_{index}", load.class.tag());
        let pmult = assigned
            .profile
            .values()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let shape_cmd = Command::define(ElementClass::Loadshape, &shape)
            .with("npts", INTERVALS_PER_DAY)
            .with("minterval", INTERVAL_MINUTES)
            .with("Pmult", format!("[{pmult}]"))
            .with("useactual", "no");
        p.push(Stage::Loads, shape_cmd)?;

        let load_cmd = Command::define(ElementClass::Load, &load.name)
            .with("phases", load.phases)
            .with("bus1", terminal_ref(model, load.bus, load.terminal))
            .with("kw", 1)
            .with("conn", "wye")
            .with("kv", load.kv)
            .with("pf", load.pf)
            .with("model", 1)
            .with("vminpu", "0.0")
            .with("vmaxpu", 2)
            .with("status", &load.status)
            .with("daily", &shape)
            .with("enabled", true);
        p.push(Stage::Loads, load_cmd)?;
    }
    Ok(())
}
