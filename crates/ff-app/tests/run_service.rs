//! Service-layer runs over a temporary data root and a recording session.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use ff_app::{
    AppError, RunMode, RunProgressEvent, RunRequest, RunStage, StudyConfig, check_data,
    dry_run_script, execute_run, execute_run_with_progress, load_network, prepare_circuit, query,
    select_network,
};
use ff_circuit::{RecordingSession, Stage};
use ff_network::fixtures;
use ff_network::{NetworkId, NetworkTables};
use ff_profiles::{COMMERCIAL_POOL_FILE, RESIDENTIAL_POOL_FILE};
use ff_results::RunType;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn write_pool(path: &Path, value: f64) {
    let mut text = String::from("sample,day");
    for i in 0..48 {
        write!(text, ",v{i}").expect("header");
    }
    text.push('\n');
    for day in 1..=365 {
        write!(text, "1,{day}").expect("row");
        for _ in 0..48 {
            write!(text, ",{value}").expect("value");
        }
        text.push('\n');
    }
    std::fs::write(path, text).expect("pool file should be written");
}

fn write_network(root: &Path, id: u8, tables: &NetworkTables) {
    let name = NetworkId::new(id).expect("id").name();
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).expect("network dir should be created");
    fixtures::write_tables(&dir, tables).expect("tables should be written");
}

fn data_root(prefix: &str) -> PathBuf {
    let root = fixtures::unique_temp_dir(prefix).expect("temp dir");
    write_network(&root, 1, &fixtures::rural_with_regulator());
    write_network(&root, 2, &fixtures::rural_swer());
    write_network(&root, 3, &fixtures::urban_plain());
    write_network(&root, 4, &fixtures::urban_with_caps());
    write_pool(&root.join(RESIDENTIAL_POOL_FILE), 1.0);
    write_pool(&root.join(COMMERCIAL_POOL_FILE), 0.5);
    root
}

fn config(root: &Path) -> StudyConfig {
    StudyConfig {
        data_root: root.to_path_buf(),
        ..StudyConfig::default()
    }
}

fn request(config: &StudyConfig, day: u16, mode: RunMode) -> RunRequest<'_> {
    RunRequest {
        network: NetworkId::new(3).expect("id"),
        day,
        mode,
        config,
    }
}

fn session() -> RecordingSession {
    RecordingSession::new().with_fallback(10.0)
}

#[test]
fn check_data_finds_every_network_and_pool() {
    let root = data_root("ff_app_check");
    let inventory = check_data(&root).expect("data root should be complete");
    assert_eq!(inventory.networks.len(), 4);
    assert_eq!(inventory.pools.len(), 2);
    assert!(inventory.networks[2].1.ends_with("Network_3_Urban_HPK11"));

    std::fs::remove_file(root.join(COMMERCIAL_POOL_FILE)).expect("remove pool");
    assert!(matches!(check_data(&root), Err(AppError::MissingData(_))));
}

#[test]
fn network_selection_accepts_only_known_ids() {
    assert_eq!(select_network(" 3 ").expect("valid").number(), 3);
    for input in ["0", "5", "three", ""] {
        let err = select_network(input).expect_err("should be rejected");
        assert!(matches!(err, AppError::InputSelection(_)), "{input}: {err}");
        assert!(err.is_recoverable());
    }
}

#[test]
fn urban_network_loads_without_optional_elements() {
    let root = data_root("ff_app_load");
    let loaded = load_network(&root, NetworkId::new(3).expect("id")).expect("load");
    assert!(loaded.model.capacitors.is_empty());
    assert!(!loaded.model.has_regulators());
    assert_eq!(loaded.summary.capacitors, 0);
    assert_eq!(
        loaded.summary.residential_customers + loaded.summary.commercial_customers,
        3
    );
    assert!(!loaded.geo.points.is_empty());
}

#[test]
fn missing_network_directory_is_missing_data() {
    let root = fixtures::unique_temp_dir("ff_app_empty").expect("temp dir");
    let err = load_network(&root, NetworkId::new(2).expect("id")).expect_err("no data");
    assert!(matches!(err, AppError::MissingData(_)));
}

#[test]
fn daily_run_reports_progress_and_48_intervals() {
    let root = data_root("ff_app_daily");
    let config = config(&root);
    let request = request(&config, 10, RunMode::Daily);
    let mut rng = StdRng::seed_from_u64(7);

    let mut events: Vec<RunProgressEvent> = Vec::new();
    let response = execute_run_with_progress(
        &request,
        session(),
        &mut rng,
        Some(&mut |event| events.push(event)),
    )
    .expect("daily run should succeed");

    let outcome = response.daily.as_ref().expect("daily outcome");
    assert_eq!(outcome.frame.len(), 48);
    assert!(response.snapshot.is_none());
    assert_eq!(response.manifest.run_type, RunType::Daily { steps: 48 });
    assert_eq!(response.manifest.network, "Network_3_Urban_HPK11");
    assert_eq!(response.manifest.day, 10);
    assert_eq!(response.manifest.date, "January 10");
    assert_eq!(response.manifest.season, "Summer");
    assert_eq!(response.run_id.len(), 64);
    assert_eq!(response.timing.solve_steps, 48);
    assert!(response.timing.commands_sent > 0);
    assert!(response.issues.is_empty());

    for stage in [
        RunStage::LoadingNetwork,
        RunStage::AssigningProfiles,
        RunStage::BuildingCircuit,
        RunStage::SolvingDaily,
        RunStage::Completed,
    ] {
        assert!(events.iter().any(|e| e.stage == stage), "missing {stage:?}");
    }
    let last_step = events
        .iter()
        .filter_map(|e| e.daily.as_ref())
        .map(|d| d.step)
        .max();
    assert_eq!(last_step, Some(48));
    assert_eq!(events.last().map(|e| e.stage), Some(RunStage::Completed));

    let summary = query::get_run_summary(&response);
    assert_eq!(summary.intervals, 48);
    assert_eq!(summary.load_count, 3);
    assert_eq!(summary.transformer_count, 2);
    assert!(summary.substation_max_kva.is_some());
}

#[test]
fn snapshot_run_rounds_time_down() {
    let root = data_root("ff_app_snapshot");
    let config = config(&root);
    let request = request(
        &config,
        200,
        RunMode::Snapshot {
            time: "15:43".to_string(),
        },
    );
    let mut rng = StdRng::seed_from_u64(1);

    let response = execute_run(&request, session(), &mut rng).expect("snapshot should succeed");
    let frame = response.snapshot.as_ref().expect("snapshot frame");
    assert_eq!(frame.time, "15:30");
    assert_eq!(
        response.manifest.run_type,
        RunType::Snapshot {
            time: "15:30".to_string()
        }
    );
    assert_eq!(response.manifest.season, "Winter");
    assert_eq!(frame.transformers.len(), 2);
    assert!(response.daily.is_none());
}

#[test]
fn bad_selections_fail_before_any_data_is_read() {
    let config = config(Path::new("/nonexistent/feederflow/data"));
    let mut rng = StdRng::seed_from_u64(1);

    let bad_time = request(
        &config,
        10,
        RunMode::Snapshot {
            time: "25:99".to_string(),
        },
    );
    let err = execute_run(&bad_time, session(), &mut rng).expect_err("bad time");
    assert!(matches!(err, AppError::InputSelection(_)), "{err}");

    let bad_day = request(&config, 366, RunMode::Daily);
    let err = execute_run(&bad_day, session(), &mut rng).expect_err("bad day");
    assert!(matches!(err, AppError::InputSelection(_)), "{err}");

    let good = request(&config, 10, RunMode::Daily);
    let err = execute_run(&good, session(), &mut rng).expect_err("no data root");
    assert!(matches!(err, AppError::MissingData(_)), "{err}");
}

#[test]
fn random_day_rerun_with_returned_day_matches() {
    let root = data_root("ff_app_random");
    let config = config(&root);
    let mut rng = StdRng::seed_from_u64(99);

    let first = execute_run(&request(&config, 0, RunMode::Daily), session(), &mut rng)
        .expect("random day run");
    let day = first.manifest.day;
    assert!((1..=365).contains(&day));

    let again = execute_run(&request(&config, day, RunMode::Daily), session(), &mut rng)
        .expect("explicit day run");
    assert_eq!(again.run_id, first.run_id);
    assert_eq!(again.manifest.date, first.manifest.date);
}

#[test]
fn dry_run_emits_the_planned_script() {
    let root = data_root("ff_app_dry_run");
    let config = config(&root);
    let mut rng = StdRng::seed_from_u64(3);

    let prepared = prepare_circuit(&config, NetworkId::new(3).expect("id"), 10, &mut rng)
        .expect("prepare");
    let script = dry_run_script(&prepared).expect("dry run");

    assert_eq!(script.lines().count(), prepared.plan.len());
    assert_eq!(script.lines().next(), Some("Clear"));
    assert_eq!(script, prepared.plan.script());

    let counts = prepared.stage_counts();
    assert_eq!(counts.len(), Stage::ALL.len());
    let capacitors = counts.iter().find(|(s, _)| *s == Stage::Capacitors).map(|(_, n)| *n);
    assert_eq!(capacitors, Some(0));
    let loads = counts.iter().find(|(s, _)| *s == Stage::Loads).map(|(_, n)| *n);
    assert_eq!(loads, Some(6));
}
