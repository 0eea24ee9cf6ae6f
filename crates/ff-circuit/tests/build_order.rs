//! Construction plans for the network shapes and their application to a session.

use ff_circuit::{
    CircuitError, CircuitSettings, Command, ElementClass, ElementRef, RecordingSession, Stage,
    build, load_demands, plan,
};
use ff_core::{CustomerClass, INTERVALS_PER_DAY};
use ff_network::fixtures;
use ff_network::schema::MvTxRow;
use ff_network::{NetworkId, NetworkModel, NetworkTables, compile};
use ff_profiles::{AssignSettings, DayAssignment, Profile, ProfilePool, assign_day};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn model(n: u8, tables: &NetworkTables) -> NetworkModel {
    compile(NetworkId::new(n).expect("network id"), tables).expect("compile")
}

fn assignment(model: &NetworkModel) -> DayAssignment {
    let mut pool = ProfilePool::new();
    let shape: Vec<f64> = (0..INTERVALS_PER_DAY).map(|i| 0.5 + i as f64 / 100.0).collect();
    pool.insert(CustomerClass::Residential, 1, 1, Profile::new(shape.clone()).expect("profile"));
    pool.insert(CustomerClass::Commercial, 1, 1, Profile::new(shape).expect("profile"));
    let mut rng = StdRng::seed_from_u64(0);
    assign_day(&pool, &load_demands(model), 1, &AssignSettings::default(), &mut rng)
        .expect("assignment")
}

fn find<'a>(mut commands: impl Iterator<Item = &'a Command>, name: &str) -> &'a Command {
    commands
        .find(|c| c.defines().is_some_and(|e| e.name == name))
        .unwrap_or_else(|| panic!("no definition of {name}"))
}

#[test]
fn every_element_is_defined_after_what_it_references() {
    for (n, tables) in [
        (1, fixtures::rural_with_regulator()),
        (2, fixtures::rural_swer()),
        (3, fixtures::urban_plain()),
        (4, fixtures::urban_with_caps()),
    ] {
        let model = model(n, &tables);
        let plan = plan(&model, &assignment(&model), &CircuitSettings::default()).expect("plan");

        let stages: Vec<Stage> = plan.commands().iter().map(|c| c.stage).collect();
        assert!(stages.windows(2).all(|w| w[0] <= w[1]), "network {n} stages out of order");

        for (index, planned) in plan.commands().iter().enumerate() {
            let Some(element) = planned.command.defines() else {
                continue;
            };
            let references = match element.class {
                ElementClass::Line => planned
                    .command
                    .property("linecode")
                    .map(|lc| ElementRef::new(ElementClass::Linecode, lc)),
                ElementClass::Load => planned
                    .command
                    .property("daily")
                    .map(|shape| ElementRef::new(ElementClass::Loadshape, shape)),
                ElementClass::RegControl => planned
                    .command
                    .property("transformer")
                    .map(|tx| ElementRef::new(ElementClass::Transformer, tx)),
                _ => None,
            };
            if let Some(reference) = references {
                let at = plan.position(&reference).expect("referenced element is planned");
                assert!(at < index, "{element} defined before {reference}");
            }
        }
    }
}

#[test]
fn empty_optional_stages_emit_nothing() {
    let model = model(3, &fixtures::urban_plain());
    let plan = plan(&model, &assignment(&model), &CircuitSettings::default()).expect("plan");
    assert_eq!(plan.stage_count(Stage::Capacitors), 0);
    assert_eq!(plan.stage_count(Stage::MvTransformers), 0);
    assert_eq!(plan.stage_count(Stage::Generation), 0);
    assert_eq!(plan.stage_count(Stage::LvTransformers), 2);
    // One shape and one load per customer.
    assert_eq!(plan.stage_count(Stage::Loads), 6);
    let first: Vec<String> = plan.commands().iter().take(2).map(|c| c.command.to_string()).collect();
    assert_eq!(first, ["Clear", "Set DefaultBaseFrequency=50"]);
    assert!(plan.script().ends_with("CalcVoltageBases\n"));
}

#[test]
fn regulator_is_three_jumpered_units_with_controls() {
    let model = model(1, &fixtures::rural_with_regulator());
    let plan = plan(&model, &assignment(&model), &CircuitSettings::default()).expect("plan");
    assert_eq!(plan.stage_count(Stage::MvTransformers), 12);
    assert_eq!(plan.stage_count(Stage::Capacitors), 1);

    let unit = find(plan.stage(Stage::MvTransformers), "R1_REG_B");
    assert_eq!(unit.property("numtaps"), Some("32"));
    assert_eq!(unit.property("kV"), Some("12.7"));
    assert_eq!(unit.property("kVA"), Some("454.55"));

    let jumper = find(plan.stage(Stage::MvTransformers), "Jumper_R1_REG_B_E");
    assert_eq!(jumper.property("bus1"), Some("mv_f0_n4.2"));
    assert_eq!(jumper.property("bus2"), Some("Jumper_R1_REG_B.2"));

    let control = find(plan.stage(Stage::MvTransformers), "Reg_R1_REG_C");
    assert_eq!(control.property("ptratio"), Some("127"));
    assert_eq!(control.property("vreg"), Some("100"));

    let cap = find(plan.stage(Stage::Capacitors), "mv_f0_c1");
    assert_eq!(cap.property("bus1"), Some("mv_f0_n2.1.2.3"));

    let settings = plan.stage(Stage::Settings).map(ToString::to_string).collect::<Vec<_>>();
    assert!(settings.contains(&"Set MaxControlIter=100".to_string()));
    assert!(settings.contains(&"Set VoltageBases=[66, 22, 12.7, 0.4, 0.2309]".to_string()));
}

#[test]
fn swer_transformers_use_centre_tapped_and_single_phase_layouts() {
    let model = model(2, &fixtures::rural_swer());
    let plan = plan(&model, &assignment(&model), &CircuitSettings::default()).expect("plan");

    let iso = find(plan.stage(Stage::MvTransformers), "ISO1");
    assert_eq!(
        iso.property("buses"),
        Some("[mv_f0_n4.1.2, mv_f0_n5.1.0, mv_f0_n5.0.2]")
    );
    assert_eq!(iso.property("conns"), Some("[Delta, Wye, Wye]"));
    assert_eq!(iso.property("windings"), Some("3"));

    let t3 = find(plan.stage(Stage::LvTransformers), "mv_f0_lv_T3");
    assert_eq!(t3.property("buses"), Some("[mv_f0_n6.1, mv_f0_lv2_busbar.1]"));
    assert_eq!(t3.property("conns"), Some("[Wye, Wye]"));
    assert_eq!(t3.property("numtaps"), Some("4"));
    assert_eq!(t3.property("maxtap"), Some("1.137"));

    let t1 = find(plan.stage(Stage::LvTransformers), "mv_f0_lv_T1");
    assert_eq!(t1.property("phases"), Some("3"));
    assert_eq!(t1.property("buses"), Some("[mv_f0_n3, mv_f0_lv0_busbar]"));
    assert_eq!(t1.property("tap"), Some("1.05"));

    let lv = find(plan.stage(Stage::LvLines), "lv_s1");
    assert_eq!(lv.property("bus1"), Some("mv_f0_lv2_busbar.1"));
    assert_eq!(lv.property("linecode"), Some("lc_lv_a"));
}

#[test]
fn loads_reference_their_own_shape() {
    let model = model(3, &fixtures::urban_plain());
    let plan = plan(&model, &assignment(&model), &CircuitSettings::default()).expect("plan");
    let res2 = find(plan.stage(Stage::Loads), "res2");
    assert_eq!(res2.property("daily"), Some("Load_shape_res_1"));
    assert_eq!(res2.property("bus1"), Some("lvb2.1"));
    let com1 = find(plan.stage(Stage::Loads), "com1");
    assert_eq!(com1.property("daily"), Some("Load_shape_com_2"));
    let shape = find(plan.stage(Stage::Loads), "Load_shape_com_2");
    assert_eq!(shape.property("npts"), Some("48"));
    assert_eq!(shape.property("minterval"), Some("30"));
    assert!(shape.property("Pmult").expect("pmult").starts_with("[0.5 "));
}

#[test]
fn colliding_names_are_rejected_before_any_command() {
    let mut tables = fixtures::rural_with_regulator();
    tables.mvtx.push(MvTxRow {
        substation_id: "R1_REG_A".to_string(),
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
    let model = model(1, &tables);
    let session = RecordingSession::new();
    let err = build(&model, &assignment(&model), &CircuitSettings::default(), session)
        .err()
        .expect("duplicate should fail");
    assert!(
        matches!(err, CircuitError::DuplicateElement { ref element } if element == "Transformer.R1_REG_A")
    );
}

#[test]
fn missing_profile_is_reported() {
    let model = model(3, &fixtures::urban_plain());
    let mut partial = assignment(&model);
    partial.profiles.retain(|p| p.load != "com1");
    let err = plan(&model, &partial, &CircuitSettings::default()).unwrap_err();
    assert!(matches!(err, CircuitError::MissingProfile { ref load } if load == "com1"));
}

#[test]
fn build_sends_the_plan_to_the_session_in_order() {
    let model = model(2, &fixtures::rural_swer());
    let assignment = assignment(&model);
    let settings = CircuitSettings::default();
    let expected = plan(&model, &assignment, &settings).expect("plan");

    let built = build(&model, &assignment, &settings, RecordingSession::new()).expect("build");
    assert_eq!(built.commands_sent(), expected.len());
    assert_eq!(built.session().script(), expected.script());
    assert!(built.session().is_defined(&ElementRef::new(ElementClass::Load, "res3")));
    built.close().expect("close");
}
