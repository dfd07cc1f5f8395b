use ac_scenario_runner::client::HttpDeviceApi;
use ac_scenario_runner::config::{load_config, RunnerConfig};
use ac_scenario_runner::parsers::csv_source::{default_rows, load_rows_from_csv};
use ac_scenario_runner::parsers::grid_loader::{GridLoader, ScenarioGrid};
use ac_scenario_runner::scheduler::{planned_waits, Scheduler};
use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "ac-scenario-runner")]
#[command(about = "Replays a timed air-conditioning test scenario against the hotel backend", long_about = None)]
struct Args {
    /// JSON config file (room table, API URL, time scale)
    #[arg(long, env = "AC_CONFIG")]
    config: Option<PathBuf>,

    /// Scenario CSV; the bundled five-room schedule is used when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Treat the first CSV row as a header
    #[arg(long)]
    has_headers: bool,

    /// Base URL of the backend API, e.g. http://192.168.1.100:8080/api
    #[arg(long)]
    api_base_url: Option<String>,

    /// Real seconds per logical scenario minute
    #[arg(long)]
    time_scale_secs: Option<f64>,

    /// Write a JSON report of every verdict to this path
    #[arg(long, env = "AC_REPORT")]
    report: Option<PathBuf>,

    /// Print the schedule without contacting the API
    #[arg(long)]
    dry_run: bool,
}

fn build_config(args: &Args) -> Result<RunnerConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RunnerConfig::default(),
    }
    .with_env_overrides()?;

    if let Some(url) = &args.api_base_url {
        config.api_base_url = url.clone();
    }
    if let Some(scale) = args.time_scale_secs {
        config.time_scale_secs = scale;
    }

    config.validate()?;
    Ok(config)
}

fn load_grid(args: &Args, config: &RunnerConfig) -> Result<ScenarioGrid> {
    let rows = match &args.scenario {
        Some(path) => load_rows_from_csv(path, args.has_headers)?,
        None => default_rows().context("bundled scenario is not valid CSV")?,
    };

    let loader = GridLoader::new(config.rooms.clone(), config.expect_failure_marker.clone())
        .with_default_mode(config.default_mode);
    let grid = loader.load(&rows);
    info!(
        "Parsed {} rows into {} time points, {} operations",
        rows.len(),
        grid.time_point_count(),
        grid.operation_count()
    );
    Ok(grid)
}

fn print_banner(config: &RunnerConfig) {
    let rooms: Vec<&str> = config.rooms.iter().map(|r| r.room_id.as_str()).collect();
    println!("============================================================");
    println!("Air-conditioning scenario run against {}", config.api_base_url);
    println!("1 logical minute = {:?} real time", config.time_scale());
    println!("Rooms {} must already be checked in.", rooms.join(", "));
    println!("This runner never checks rooms in or out; do that manually.");
    println!("============================================================");
}

fn print_schedule(grid: &ScenarioGrid, config: &RunnerConfig) -> Result<()> {
    let waits = planned_waits(grid, config.time_scale())?;
    for ((time_point, operations), (_, wait)) in grid.iter().zip(waits) {
        println!("[t = {} min] wait {:?}", time_point, wait);
        for operation in operations {
            println!("  {}", operation);
        }
    }
    Ok(())
}

async fn run(args: Args) -> Result<bool> {
    let config = build_config(&args)?;
    let grid = load_grid(&args, &config)?;

    if args.dry_run {
        print_schedule(&grid, &config)?;
        return Ok(true);
    }

    print_banner(&config);

    let api = HttpDeviceApi::new(&config.api_base_url, config.request_timeout())?;
    let mut scheduler = Scheduler::new(api, config.time_scale());
    let summary = scheduler.run(&grid).await?;

    let results = scheduler.results();
    results.print_summary();

    if let Some(path) = &args.report {
        results.report(&config).write_json(path)?;
        info!("Report written to {}", path.display());
    }

    Ok(summary.all_succeeded())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}
