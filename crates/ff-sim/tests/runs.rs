//! Snapshot and daily runs against a recording session.

use ff_circuit::{
    BuiltCircuit, CircuitError, CircuitSettings, ElementClass, ElementRef, RecordingSession,
    SolverSession, build, load_demands,
};
use ff_core::{CustomerClass, INTERVALS_PER_DAY};
use ff_network::fixtures;
use ff_network::schema::GenerationRow;
use ff_network::{NetworkId, NetworkModel, NetworkTables, compile};
use ff_profiles::{AssignSettings, Profile, ProfilePool, assign_day};
use ff_sim::{Probes, SimError, solve_daily, solve_daily_with_progress, solve_snapshot};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn built(
    tables: &NetworkTables,
    session: RecordingSession,
) -> (NetworkModel, BuiltCircuit<RecordingSession>, Probes) {
    let model = compile(NetworkId::new(3).expect("id"), tables).expect("compile");
    let mut pool = ProfilePool::new();
    for class in [CustomerClass::Residential, CustomerClass::Commercial] {
        pool.insert(class, 10, 1, Profile::new(vec![1.0; INTERVALS_PER_DAY]).expect("profile"));
    }
    let mut rng = StdRng::seed_from_u64(0);
    let assignment = assign_day(&pool, &load_demands(&model), 10, &AssignSettings::default(), &mut rng)
        .expect("assign");
    let circuit = build(&model, &assignment, &CircuitSettings::default(), session).expect("build");
    let probes = Probes::from_model(&model).expect("probes");
    (model, circuit, probes)
}

fn line(name: &str) -> ElementRef {
    ElementRef::new(ElementClass::Line, name)
}

fn transformer(name: &str) -> ElementRef {
    ElementRef::new(ElementClass::Transformer, name)
}

#[test]
fn urban_network_daily_run_has_48_rows() {
    let (model, mut circuit, probes) =
        built(&fixtures::urban_plain(), RecordingSession::new().with_fallback(10.0));
    assert!(model.capacitors.is_empty());
    assert!(!model.has_regulators());

    let mut steps_seen = Vec::new();
    let mut on_step = |done: usize| steps_seen.push(done);
    let outcome =
        solve_daily_with_progress(&mut circuit, &probes, Some(&mut on_step)).expect("daily");

    assert_eq!(outcome.frame.len(), 48);
    assert_eq!(circuit.session().solve_count(), 48);
    assert_eq!(steps_seen.len(), 48);
    assert_eq!(steps_seen.last(), Some(&48));

    let first = &outcome.frame.intervals[0];
    let last = &outcome.frame.intervals[47];
    assert_eq!(first.time, "00:00");
    assert_eq!(last.time, "23:30");
    assert_eq!(last.step, 47);
    assert_eq!(first.loads.len(), 3);
    assert_eq!(first.lines.len(), 3);
    assert_eq!(first.transformers.len(), 2);
    assert_eq!(first.loads[0].voltage_v, vec![10.0, 10.0, 10.0]);
    assert_eq!(first.lines[0].value, 10.0);

    let commands = circuit.session().commands();
    assert!(commands.contains(&"Set mode=daily stepsize=30m number=1".to_string()));
    assert!(commands.contains(&"Set time=(0,0)".to_string()));
    assert!(commands.contains(&"Set time=(23,1800)".to_string()));
}

#[test]
fn substation_apparent_power_uses_reactive_power() {
    let (_, mut circuit, probes) =
        built(&fixtures::urban_plain(), RecordingSession::new().with_fallback(1.0));
    circuit.session_mut().script_powers(
        &transformer("SUB1"),
        vec![30.0, 40.0, 0.0, 0.0, 0.0, 0.0, -30.0, -40.0, 0.0, 0.0, 0.0, 0.0],
    );
    let outcome = solve_daily(&mut circuit, &probes).expect("daily");
    for interval in &outcome.frame.intervals {
        assert!((interval.substation_kva - 50.0).abs() < 1e-9);
    }
    assert_eq!(outcome.summary.substation_max_kva, Some(50.0));
}

#[test]
fn daily_max_is_the_largest_of_the_48_values() {
    let (_, mut circuit, probes) =
        built(&fixtures::urban_plain(), RecordingSession::new().with_fallback(1.0));
    let per_step: Vec<f64> = (0..48).map(|i| ((i * 11) % 48) as f64 * 5.0).collect();
    let series = per_step
        .iter()
        .map(|&p| vec![p, 0.0, 0.0, 0.0, 0.0, 0.0])
        .collect();
    circuit
        .session_mut()
        .script_power_series(&transformer("mv_f0_lv_T1"), series);

    let outcome = solve_daily(&mut circuit, &probes).expect("daily");
    let recorded = outcome.frame.transformer_series("mv_f0_lv_T1");
    assert_eq!(recorded, per_step);

    let peak = &outcome.summary.transformers[0];
    assert_eq!(peak.asset, "mv_f0_lv_T1");
    assert_eq!(peak.daily_max, 235.0);
    assert_eq!(peak.peak_utilization_pct, Some(47.0));
}

#[test]
fn snapshot_rounds_time_down_and_averages_phase_currents() {
    let (_, mut circuit, probes) =
        built(&fixtures::urban_plain(), RecordingSession::new().with_fallback(1.0));
    circuit
        .session_mut()
        .script_currents(&line("mv_f0_l1"), vec![10.0, 0.0, 12.0, -120.0, 11.0, 120.0]);

    let frame = solve_snapshot(&mut circuit, &probes, "15:43").expect("snapshot");
    assert_eq!(frame.time, "15:30");
    assert!(circuit
        .session()
        .commands()
        .contains(&"Set time=(15,1800)".to_string()));

    let l1 = frame.lines.iter().find(|l| l.line == "mv_f0_l1").expect("line");
    assert_eq!(l1.current_a, 11.0);
    assert_eq!(l1.ampacity_a, Some(200.0));
    assert_eq!(l1.utilization_pct, Some(5.5));
    assert!(frame.issues.is_empty());

    let early = solve_snapshot(&mut circuit, &probes, "00:07").expect("snapshot");
    assert_eq!(early.time, "00:00");
}

#[test]
fn short_current_vector_is_a_phase_mismatch() {
    let (_, mut circuit, probes) =
        built(&fixtures::urban_plain(), RecordingSession::new().with_fallback(1.0));
    circuit
        .session_mut()
        .script_currents(&line("mv_f0_l2"), vec![10.0, 0.0]);
    let err = solve_snapshot(&mut circuit, &probes, "12:00").unwrap_err();
    assert!(matches!(
        err,
        SimError::Circuit(CircuitError::PhaseMismatch { expected: 6, got: 2, .. })
    ));
}

#[test]
fn missing_rating_is_reported_without_stopping_the_run() {
    let (_, mut circuit, mut probes) =
        built(&fixtures::urban_plain(), RecordingSession::new().with_fallback(1.0));
    probes.transformers[1].rated_kva = None;
    let frame = solve_snapshot(&mut circuit, &probes, "08:00").expect("snapshot");
    assert_eq!(frame.transformers.len(), 2);
    assert!(frame.transformers[0].utilization_pct.is_some());
    assert_eq!(frame.transformers[1].utilization_pct, None);
    assert_eq!(frame.issues.len(), 1);
    assert_eq!(frame.issues[0].asset, "mv_f0_lv_T2");
}

#[test]
fn invalid_time_is_rejected_before_solving() {
    let (_, mut circuit, probes) =
        built(&fixtures::urban_plain(), RecordingSession::new().with_fallback(1.0));
    let err = solve_snapshot(&mut circuit, &probes, "25:00").unwrap_err();
    assert!(matches!(err, SimError::InvalidTime { .. }));
    assert_eq!(circuit.session().solve_count(), 0);
}

#[test]
fn colocated_generation_is_added_to_load_power() {
    let mut tables = fixtures::urban_plain();
    tables.lv_generation.push(GenerationRow {
        gen_name: "pv1".to_string(),
        bus1: "lvb1.1".to_string(),
        phases: 1,
        kv: 0.23,
        kw: 3.0,
        pf: 1.0,
    });
    let (_, mut circuit, probes) = built(&tables, RecordingSession::new().with_fallback(0.0));
    let session = circuit.session_mut();
    session.script_powers(&ElementRef::new(ElementClass::Load, "res1"), vec![2.0, 0.5, 0.0, 0.0]);
    session.script_powers(
        &ElementRef::new(ElementClass::Generator, "pv1"),
        vec![-1.5, 0.0, 0.0, 0.0],
    );

    let outcome = solve_daily(&mut circuit, &probes).expect("daily");
    let res1 = outcome.frame.load_series("res1");
    assert_eq!(res1.len(), 48);
    assert!((res1[0].p_kw - 0.5).abs() < 1e-12);
    assert!((res1[0].q_kvar - 0.5).abs() < 1e-12);
    circuit.close().expect("close");
}

#[test]
fn generation_shared_by_two_loads_is_counted_once() {
    let mut tables = fixtures::urban_plain();
    tables
        .lv_loads
        .push(fixtures::load("res4", "lvb1.1", 1, 0.23, Some(500.0)));
    tables.lv_generation.push(GenerationRow {
        gen_name: "pv1".to_string(),
        bus1: "lvb1.1".to_string(),
        phases: 1,
        kv: 0.23,
        kw: 3.0,
        pf: 1.0,
    });
    let (_, mut circuit, probes) = built(&tables, RecordingSession::new().with_fallback(0.0));
    let session = circuit.session_mut();
    for load in ["res1", "res4"] {
        session.script_powers(&ElementRef::new(ElementClass::Load, load), vec![2.0, 0.0, 0.0, 0.0]);
    }
    session.script_powers(
        &ElementRef::new(ElementClass::Generator, "pv1"),
        vec![-3.0, 0.0, 0.0, 0.0],
    );

    let outcome = solve_daily(&mut circuit, &probes).expect("daily");
    let res1 = outcome.frame.load_series("res1");
    let res4 = outcome.frame.load_series("res4");
    assert!((res1[0].p_kw + 1.0).abs() < 1e-12);
    assert!((res4[0].p_kw - 2.0).abs() < 1e-12);
    let net = res1[0].p_kw + res4[0].p_kw;
    assert!((net - 1.0).abs() < 1e-12, "net load at lvb1 was {net}");
}

#[test]
fn session_can_be_taken_back_from_the_circuit() {
    let (_, circuit, _) = built(&fixtures::urban_plain(), RecordingSession::new());
    let mut session = circuit.into_session();
    session.solve().expect("solve while open");
    session.close().expect("close");
}
