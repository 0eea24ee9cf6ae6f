//! Compilation of the four network shapes and their failure modes.

use ff_core::PhaseConfig;
use ff_network::fixtures as common;
use ff_network::{
    GeoKind, GeoModel, NetworkError, NetworkId, NetworkModel, NetworkSummary, NetworkTables,
    TransformerKind, compile, load_tables,
};

fn net(n: u8) -> NetworkId {
    NetworkId::new(n).expect("valid network id")
}

fn assert_references_resolve(model: &NetworkModel) {
    let bus_count = model.buses.len();
    for line in &model.lines {
        assert!(line.from.bus.as_usize() < bus_count, "{}", line.name);
        assert!(line.to.bus.as_usize() < bus_count, "{}", line.name);
        assert!(model.linecodes.get(&line.linecode).is_some(), "{}", line.name);
    }
    for tx in &model.transformers {
        assert!(tx.primary.as_usize() < bus_count, "{}", tx.name);
        assert!(tx.secondary.as_usize() < bus_count, "{}", tx.name);
    }
    for load in &model.loads {
        assert!(load.bus.as_usize() < bus_count, "{}", load.name);
    }
    for cap in &model.capacitors {
        assert!(cap.bus.as_usize() < bus_count, "{}", cap.name);
    }
}

#[test]
fn every_shape_compiles_with_resolved_references() {
    let shapes: [(u8, NetworkTables); 4] = [
        (1, common::rural_with_regulator()),
        (2, common::rural_swer()),
        (3, common::urban_plain()),
        (4, common::urban_with_caps()),
    ];
    for (n, tables) in shapes {
        let model = compile(net(n), &tables).expect("shape should compile");
        assert_references_resolve(&model);
        assert_eq!(model.id.number(), n);
    }
}

#[test]
fn urban_network_has_empty_optional_collections() {
    let model = compile(net(3), &common::urban_plain()).expect("compile");
    assert!(model.capacitors.is_empty());
    assert_eq!(model.regulators().count(), 0);
    assert_eq!(model.mv_transformers().count(), 0);
    assert!(model.generators.is_empty());
    assert!(model.substation().is_some());
}

#[test]
fn deleted_rows_are_skipped() {
    let model = compile(net(3), &common::urban_plain()).expect("compile");
    assert_eq!(model.mv_lines().count(), 3);
    assert!(model.mv_lines().all(|l| l.name != "mv_f0_l9"));
}

#[test]
fn mv_lines_carry_rated_ampacity() {
    let model = compile(net(3), &common::urban_plain()).expect("compile");
    let line = model
        .mv_lines()
        .find(|l| l.name == "mv_f0_l1")
        .expect("line 1");
    assert_eq!(line.linecode, "Mink-3ph");
    assert_eq!(line.ampacity, Some(200.0));
    assert_eq!(line.config, PhaseConfig::Three);
    assert!((line.length_km() - 1.5).abs() < 1e-12);
}

#[test]
fn dangling_bus_is_a_referential_error() {
    let mut tables = common::urban_plain();
    tables.lines[1].end_node = "42".to_string();
    let err = compile(net(3), &tables).unwrap_err();
    match err {
        NetworkError::ReferentialIntegrity { element, field, id } => {
            assert_eq!(element, "mv_f0_l2");
            assert_eq!(field, "End_Node");
            assert_eq!(id, "mv_f0_n42");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn dangling_linecode_is_a_referential_error() {
    let mut tables = common::urban_plain();
    tables.lv_lines[0].linecode = "lc_missing".to_string();
    let err = compile(net(3), &tables).unwrap_err();
    assert!(err.is_referential(), "{err}");
    assert!(err.to_string().contains("lc_missing"));
}

#[test]
fn load_on_unknown_bus_is_rejected() {
    let mut tables = common::urban_plain();
    tables
        .lv_loads
        .push(common::load("stray", "nowhere.1", 1, 0.23, None));
    let err = compile(net(3), &tables).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::ReferentialIntegrity { field: "bus1", .. }
    ));
}

#[test]
fn islanded_lv_conductor_is_rejected() {
    let mut tables = common::urban_plain();
    tables.lv_lines.push(ff_network::schema::LvLineRow {
        line_name: "orphan".to_string(),
        bus1: "far_a".to_string(),
        bus2: "far_b".to_string(),
        phases: 1,
        length: 10.0,
        units: "m".to_string(),
        linecode: "lv_a".to_string(),
    });
    let err = compile(net(3), &tables).unwrap_err();
    assert!(matches!(err, NetworkError::Islanded { ref line } if line == "orphan"));
}

#[test]
fn duplicate_load_names_are_rejected() {
    let mut tables = common::urban_plain();
    tables
        .lv_loads
        .push(common::load("RES1", "lvb1.1", 1, 0.23, None));
    let err = compile(net(3), &tables).unwrap_err();
    assert!(matches!(err, NetworkError::DuplicateId { context: "loads", .. }));
}

#[test]
fn voltage_bases_follow_feeding_windings() {
    let model = compile(net(2), &common::rural_swer()).expect("compile");
    let kv = |name: &str| {
        let id = model.bus_id(name).expect("bus exists");
        model.bus(id).kv_base
    };
    assert_eq!(kv("sourcebus"), Some(66.0));
    assert_eq!(kv("mv_f0_n2"), Some(22.0));
    assert_eq!(kv("mv_f0_n6"), Some(12.7));
    assert_eq!(kv("lvb2"), Some(0.4));
    assert_eq!(kv("lvs1"), Some(0.25));
}

#[test]
fn transformer_kinds_and_customer_counts() {
    let model = compile(net(2), &common::rural_swer()).expect("compile");
    let iso = model
        .transformers
        .iter()
        .find(|t| t.name == "ISO1")
        .expect("isolating transformer");
    assert_eq!(iso.kind, TransformerKind::SwerIsolating);
    assert_eq!(iso.windings.len(), 3);

    let customers: Vec<(String, usize)> = model
        .distribution_transformers()
        .map(|t| match t.kind {
            TransformerKind::Distribution { customers, .. } => (t.name.clone(), customers),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(
        customers,
        vec![
            ("mv_f0_lv_T1".to_string(), 2),
            ("mv_f0_lv_T2".to_string(), 1),
            ("mv_f0_lv_T3".to_string(), 1),
        ]
    );
}

#[test]
fn busbars_sharing_a_zone_count_customers_once() {
    let mut tables = common::urban_plain();
    tables.lv_lines.push(ff_network::schema::LvLineRow {
        line_name: "lv_tie".to_string(),
        bus1: "mv_f0_lv0_busbar".to_string(),
        bus2: "mv_f0_lv1_busbar".to_string(),
        phases: 3,
        length: 40.0,
        units: "m".to_string(),
        linecode: "lv_abc".to_string(),
    });
    let model = compile(net(3), &tables).expect("compile");
    let customers: Vec<usize> = model
        .distribution_transformers()
        .map(|t| match t.kind {
            TransformerKind::Distribution { customers, .. } => customers,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(customers, vec![3, 0]);
    assert_eq!(customers.iter().sum::<usize>(), model.loads.len());
}

fn pv(name: &str, bus: &str) -> ff_network::schema::GenerationRow {
    ff_network::schema::GenerationRow {
        gen_name: name.to_string(),
        bus1: bus.to_string(),
        phases: 1,
        kv: 0.23,
        kw: 3.0,
        pf: 1.0,
    }
}

#[test]
fn each_generator_is_attributed_to_one_load() {
    let mut tables = common::urban_plain();
    tables.lv_loads.push(common::load("res4", "lvb1.1", 1, 0.23, None));
    tables.lv_loads.push(common::load("res5", "lvb1.2", 1, 0.23, None));
    tables.lv_generation.push(pv("pv1", "lvb1.1"));
    tables.lv_generation.push(pv("pv2", "lvb1.2"));
    tables.lv_generation.push(pv("pv3", "lvb1"));
    tables.lv_generation.push(pv("pv4", "lvc1.3"));
    let model = compile(net(3), &tables).expect("compile");

    let owned: Vec<(String, Vec<String>)> = model
        .loads
        .iter()
        .zip(model.generation_by_load())
        .map(|(load, gens)| {
            let names = gens.iter().map(|g| g.name.to_lowercase()).collect();
            (load.name.to_lowercase(), names)
        })
        .collect();
    let names = |load: &str| {
        owned
            .iter()
            .find(|(name, _)| name == load)
            .map(|(_, gens)| gens.clone())
            .expect("load")
    };
    assert_eq!(names("res1"), vec!["pv1", "pv3"]);
    assert_eq!(names("res4"), Vec::<String>::new());
    assert_eq!(names("res5"), vec!["pv2"]);
    assert_eq!(names("com1"), vec!["pv4"]);
    assert_eq!(
        owned.iter().map(|(_, gens)| gens.len()).sum::<usize>(),
        model.generators.len()
    );

    let buses: Vec<&str> = model.load_buses().into_iter().map(|b| model.bus_name(b)).collect();
    assert_eq!(buses, vec!["lvb1", "lvb2", "lvc1"]);
}

#[test]
fn regulator_units_are_rated_on_the_regulation_range() {
    let model = compile(net(1), &common::rural_with_regulator()).expect("compile");
    let reg = model.regulators().next().expect("regulator");
    assert_eq!(
        reg.kind,
        TransformerKind::Regulator {
            numtaps: 33,
            line_kv: 22.0
        }
    );
    assert_eq!(reg.windings[0].kv, 12.7);
    assert_eq!(reg.windings[0].kva, 454.55);
    assert_eq!(reg.windings[1].kv, 1.27);
    assert_eq!(model.capacitors.len(), 1);
}

#[test]
fn summary_counts_rural_swer() {
    let model = compile(net(2), &common::rural_swer()).expect("compile");
    let summary = NetworkSummary::from_model(&model);
    assert_eq!(summary.residential_substations, 2);
    assert_eq!(summary.commercial_substations, 1);
    assert_eq!(summary.residential_customers, 3);
    assert_eq!(summary.commercial_customers, 1);
    assert_eq!(summary.swer_mv_transformers, 1);
    assert_eq!(summary.swer_lv_transformers, 1);
    assert_eq!(summary.regulators, 0);
    assert!((summary.mv_length_km - 6.0).abs() < 1e-9);
    assert!((summary.mv_swer_length_km - 1.5).abs() < 1e-9);
    assert!((summary.lv_length_km - 0.16).abs() < 1e-9);
}

#[test]
fn geo_model_exposes_points_and_polylines() {
    let model = compile(net(4), &common::urban_with_caps()).expect("compile");
    let geo = GeoModel::from_model(&model);
    assert_eq!(geo.lines.len(), 3);
    assert_eq!(
        geo.line("mv_f0_l2").expect("line").coords,
        vec![(1.0, 0.0), (2.0, 0.0)]
    );
    assert_eq!(
        geo.point("SUB1").expect("substation").kind,
        GeoKind::SubstationTransformer
    );
    assert_eq!(geo.point("mv_f0_lv_T2").expect("tx").x, 3.0);
    assert_eq!(geo.point("mv_f0_c1").expect("cap").kind, GeoKind::Capacitor);
}

#[test]
fn tables_load_from_disk_with_optional_sheets_absent() {
    let dir = common::unique_temp_dir("ff_network_load").expect("temp dir");
    common::write_tables(&dir, &common::urban_plain()).expect("write sheets");
    let tables = load_tables(&dir).expect("tables should load");
    assert!(tables.mvcaps.is_empty());
    assert!(tables.mvtx.is_empty());
    assert_eq!(tables.lv_loads.len(), 3);
    let model = compile(net(3), &tables).expect("compile");
    assert_eq!(model.loads.len(), 3);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_required_sheet_is_reported_by_name() {
    let dir = common::unique_temp_dir("ff_network_missing").expect("temp dir");
    common::write_tables(&dir, &common::urban_plain()).expect("write sheets");
    std::fs::remove_file(dir.join("linecodes.csv")).expect("remove linecodes");
    let err = load_tables(&dir).unwrap_err();
    assert!(matches!(err, NetworkError::MissingData { sheet: "linecodes", .. }));
    let _ = std::fs::remove_dir_all(&dir);
}
