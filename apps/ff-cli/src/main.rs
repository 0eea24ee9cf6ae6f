use clap::{Args, Parser, Subcommand};
use ff_app::{
    AppResult, RunMode, RunProgressEvent, RunRequest, RunResponse, RunStage, RunTimingSummary,
    StudyConfig, check_data, circuit_service, load_config, load_network, query, run_service,
    select_network,
};
use ff_circuit::ProcessSession;
use ff_results::{DailyPeak, SnapshotFrame};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

#[derive(Parser)]
#[command(name = "ff-cli")]
#[command(about = "feederflow CLI - distribution network load-flow studies", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Study configuration YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Data root holding the network directories and profile pools
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Seed for per-load profile draws
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Solver executable
    #[arg(long, global = true)]
    solver: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify that every network directory and profile pool is present
    CheckData,
    /// Show the inventory of a network
    Summary {
        /// Network number (1-4)
        network: String,
    },
    /// Compile a network, assign profiles and plan the circuit without solving
    Build {
        /// Network number (1-4)
        network: String,
        /// Day of year (1-365), 0 for a random day
        #[arg(long, default_value_t = 0)]
        day: u16,
        /// Write the command script to this file
        #[arg(long)]
        emit: Option<PathBuf>,
    },
    /// Run a simulation
    #[command(subcommand)]
    Run(RunCommands),
}

#[derive(Subcommand)]
enum RunCommands {
    /// Solve a single half-hour
    Snapshot {
        /// Network number (1-4)
        network: String,
        /// Time of day, HH:MM (rounded down to the half hour)
        #[arg(long)]
        time: String,
        /// Day of year (1-365), 0 for a random day
        #[arg(long, default_value_t = 0)]
        day: u16,
    },
    /// Solve all 48 half-hours of a day
    Daily {
        /// Network number (1-4)
        network: String,
        /// Day of year (1-365), 0 for a random day
        #[arg(long, default_value_t = 0)]
        day: u16,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = resolve_config(&cli.global)?;

    match cli.command {
        Commands::CheckData => cmd_check_data(&config),
        Commands::Summary { network } => cmd_summary(&config, &network),
        Commands::Build { network, day, emit } => cmd_build(&config, &network, day, emit),
        Commands::Run(run_cmd) => match run_cmd {
            RunCommands::Snapshot { network, time, day } => {
                cmd_run(&config, &network, day, RunMode::Snapshot { time })
            }
            RunCommands::Daily { network, day } => cmd_run(&config, &network, day, RunMode::Daily),
        },
    }
}

/// Config file first, then flags on top.
fn resolve_config(args: &GlobalArgs) -> AppResult<StudyConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => StudyConfig::default(),
    };
    if let Some(data) = &args.data {
        config.data_root = data.clone();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(solver) = &args.solver {
        config.solver.program = solver.clone();
    }
    debug!(data_root = %config.data_root.display(), solver = %config.solver.program, "configuration resolved");
    Ok(config)
}

fn cmd_check_data(config: &StudyConfig) -> AppResult<()> {
    println!("Checking data root: {}", config.data_root.display());
    let inventory = check_data(&config.data_root)?;
    for (id, dir) in &inventory.networks {
        println!("  {}  {}", id, dir.display());
    }
    for pool in &inventory.pools {
        println!("  pool  {}", pool.display());
    }
    println!("✓ All network data and profile pools present");
    Ok(())
}

fn cmd_summary(config: &StudyConfig, network: &str) -> AppResult<()> {
    let id = select_network(network)?;
    let loaded = load_network(&config.data_root, id)?;
    println!("{}\n", loaded.id);
    print!("{}", loaded.summary);
    Ok(())
}

fn cmd_build(
    config: &StudyConfig,
    network: &str,
    day: u16,
    emit: Option<PathBuf>,
) -> AppResult<()> {
    let id = select_network(network)?;
    let mut rng = rand::thread_rng();
    let prepared = circuit_service::prepare_circuit(config, id, day, &mut rng)?;

    let resolved = prepared.assignment.day;
    println!(
        "{}: day {} ({}, {})",
        prepared.network.id,
        resolved,
        resolved.date_label(),
        resolved.season()
    );
    println!("Build stages:");
    for (stage, count) in prepared.stage_counts() {
        println!("  {:<24} {}", stage.label(), count);
    }
    println!("  {:<24} {}", "total", prepared.plan.len());

    if let Some(path) = emit {
        let script = circuit_service::dry_run_script(&prepared)?;
        std::fs::write(&path, script)?;
        println!("✓ Wrote {} commands to {}", prepared.plan.len(), path.display());
    }
    Ok(())
}

fn cmd_run(config: &StudyConfig, network: &str, day: u16, mode: RunMode) -> AppResult<()> {
    let id = select_network(network)?;
    println!("Running {} simulation for {}", mode.label(), id);

    let request = RunRequest {
        network: id,
        day,
        mode,
        config,
    };
    let session = ProcessSession::spawn(&config.solver.program, &config.solver.args)?;
    let mut rng = rand::thread_rng();

    let mut last_emit = Instant::now();
    let mut last_stage: Option<RunStage> = None;
    let response = run_service::execute_run_with_progress(
        &request,
        session,
        &mut rng,
        Some(&mut |event| {
            let emit_now = last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    println!("✓ Simulation completed: {}", response.run_id);
    println!(
        "  Day {}: {} ({})",
        response.manifest.day, response.manifest.date, response.manifest.season
    );
    print_timing_summary(&response.timing);
    print_results(&response);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.daily) {
        (RunStage::SolvingDaily, Some(d)) => {
            let width = 28usize;
            let filled = ((d.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  step={}/{}  elapsed={:.1}s",
                bar,
                d.fraction_complete * 100.0,
                d.step,
                d.steps,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let pct = |t: f64| 100.0 * t / total;

    println!("\nTiming summary:");
    println!("  Load:      {:.3}s ({:.1}%)", timing.load_time_s, pct(timing.load_time_s));
    println!("  Assign:    {:.3}s ({:.1}%)", timing.assign_time_s, pct(timing.assign_time_s));
    println!("  Build:     {:.3}s ({:.1}%)", timing.build_time_s, pct(timing.build_time_s));
    println!("  Solve:     {:.3}s ({:.1}%)", timing.solve_time_s, pct(timing.solve_time_s));
    println!("  Aggregate: {:.3}s ({:.1}%)", timing.aggregate_time_s, pct(timing.aggregate_time_s));
    println!("  Total:     {:.3}s", timing.total_time_s);
    println!("  Commands sent: {}", timing.commands_sent);
    println!("  Solves:        {}", timing.solve_steps);
}

fn print_results(response: &RunResponse) {
    if let Some(frame) = &response.snapshot {
        print_snapshot(frame);
    }
    if let Some(outcome) = &response.daily {
        let summary = query::get_run_summary(response);
        println!(
            "\n{} intervals, {} loads, {} transformers, {} lines",
            summary.intervals, summary.load_count, summary.transformer_count, summary.line_count
        );
        print_peaks("Transformer", "kVA", &outcome.summary.transformers);
        print_peaks("Line", "A", &outcome.summary.lines);
        if let Some(kva) = outcome.summary.substation_max_kva {
            println!("\nSubstation daily max: {:.1} kVA", kva);
        }
    }
    if !response.issues.is_empty() {
        println!("\nMetric issues:");
        for issue in &response.issues {
            println!("  ! {} ({}): {}", issue.asset, issue.metric, issue.message);
        }
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}

fn print_snapshot(frame: &SnapshotFrame) {
    println!("\nSnapshot at {}", frame.time);

    let lowest = frame
        .nodes
        .iter()
        .min_by(|a, b| a.voltage_pu.total_cmp(&b.voltage_pu));
    let highest = frame
        .nodes
        .iter()
        .max_by(|a, b| a.voltage_pu.total_cmp(&b.voltage_pu));
    if let (Some(lo), Some(hi)) = (lowest, highest) {
        println!(
            "  Voltage range: {:.4} pu ({}) to {:.4} pu ({})",
            lo.voltage_pu, lo.node, hi.voltage_pu, hi.node
        );
    }

    println!("\n  {:<28} {:>10} {:>10} {:>8}", "Transformer", "kVA", "Rating", "Util %");
    for t in &frame.transformers {
        println!(
            "  {:<28} {:>10.1} {:>10} {:>8}",
            t.transformer,
            t.apparent_kva,
            fmt_opt(t.rating_kva, 0),
            fmt_opt(t.utilization_pct, 1)
        );
    }

    println!("\n  {:<28} {:>10} {:>10} {:>8}", "Line", "A", "Ampacity", "Util %");
    for l in &frame.lines {
        println!(
            "  {:<28} {:>10.1} {:>10} {:>8}",
            l.line,
            l.current_a,
            fmt_opt(l.ampacity_a, 0),
            fmt_opt(l.utilization_pct, 1)
        );
    }
}

fn print_peaks(kind: &str, unit: &str, peaks: &[DailyPeak]) {
    println!(
        "\n  {:<28} {:>10} {:>10} {:>8}",
        kind,
        format!("Max {}", unit),
        "Rating",
        "Peak %"
    );
    for peak in query::most_utilized(peaks, peaks.len()) {
        println!(
            "  {:<28} {:>10.1} {:>10} {:>8}",
            peak.asset,
            peak.daily_max,
            fmt_opt(peak.rating, 0),
            fmt_opt(peak.peak_utilization_pct, 1)
        );
    }
}
