//! matchday-runner: headless gameweek forecaster.
//!
//! Usage:
//!   matchday-runner --config data/run.json
//!   matchday-runner --config data/run.json --seed 12345 --trials 50000 --db run.db

mod config;
mod store;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use matchday_core::{
    config::SimulationMode,
    engine::{ForecastEngine, GameweekForecast},
    history::{build_from_tables, BuildFailure, BuildReport},
};

use crate::{config::RunConfig, store::RunStore};

const DEFAULT_SEED: u64 = 42;

/// Forecast a gameweek from historical results grids
#[derive(Parser, Debug)]
#[command(name = "matchday-runner", version, about)]
struct Args {
    /// Run config JSON (seasons, promotions, fixtures, simulation settings)
    #[arg(long, env = "MATCHDAY_CONFIG")]
    config: PathBuf,

    /// Master seed; overrides the config file
    #[arg(long, env = "MATCHDAY_SEED")]
    seed: Option<u64>,

    /// Trials per fixture; overrides the config file
    #[arg(long)]
    trials: Option<u64>,

    /// Goal model: empirical or poisson
    #[arg(long)]
    mode: Option<SimulationMode>,

    /// Scorelines to keep per fixture
    #[arg(long)]
    top_k: Option<usize>,

    /// SQLite database for the run record
    #[arg(long, env = "MATCHDAY_DB", default_value = ":memory:")]
    db: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = RunConfig::load(&args.config)?;
    if let Some(trials) = args.trials {
        config.simulation.trials = trials;
    }
    if let Some(mode) = args.mode {
        config.simulation.mode = mode;
    }
    if let Some(top_k) = args.top_k {
        config.simulation.top_k = top_k;
    }
    config.validate()?;
    let seed = args.seed.or(config.seed).unwrap_or(DEFAULT_SEED);

    println!("Matchday forecaster");
    println!("  config:  {}", args.config.display());
    println!("  seed:    {seed}");
    println!("  trials:  {}", config.simulation.trials);
    println!("  mode:    {:?}", config.simulation.mode);
    println!("  db:      {}", args.db);
    println!();

    let report = build_from_tables(config.load_grids(), &config.promotions);
    print_build_report(&report);

    let mut store = RunStore::open(&args.db).context("open run store")?;
    store.migrate()?;
    let run_id = uuid::Uuid::new_v4().to_string();
    let mode = format!("{:?}", config.simulation.mode).to_lowercase();
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"), &mode, config.simulation.trials)?;
    store.save_histories(&run_id, &report.store)?;

    let engine = ForecastEngine::new(run_id.clone(), seed, report.store, config.simulation.clone())?;
    let forecast = engine.predict_gameweek(&config.fixtures);

    for prediction in &forecast.predictions {
        store.save_prediction(&run_id, prediction)?;
    }
    for event in &forecast.events {
        store.append_event(&run_id, event)?;
    }
    log::info!(
        "run {run_id}: {} predictions, {} events written to {}",
        store.prediction_count(&run_id)?,
        forecast.events.len(),
        args.db
    );

    print_forecast(&forecast);
    println!();
    println!("  run_id:  {run_id}");
    Ok(())
}

fn print_build_report(report: &BuildReport) {
    println!("=== HISTORY ===");
    println!("  seasons used:  {}", report.seasons_used);
    println!("  teams:         {}", report.store.len());
    println!("  warnings:      {}", report.warnings.len());
    for failure in &report.failures {
        match failure {
            BuildFailure::Season { season, error } => println!("  skipped season {season}: {error}"),
            BuildFailure::Promotion { team, error } => println!("  skipped promotion {team}: {error}"),
        }
    }
    println!();
}

fn print_forecast(forecast: &GameweekForecast) {
    println!("=== GAMEWEEK ===");
    for p in &forecast.predictions {
        let r = &p.result;
        let scoreline = p
            .most_likely()
            .map(|s| format!("{}-{} ({:.1}%)", s.home_goals, s.away_goals, s.probability * 100.0))
            .unwrap_or_else(|| "n/a".into());
        println!(
            "  {}: {:.3} / {}: {:.3} / Draw: {:.3} | xG {:.2}-{:.2} | likely {scoreline}{}",
            p.fixture.home,
            r.home_win_prob,
            p.fixture.away,
            r.away_win_prob,
            r.draw_prob,
            r.expected_home_goals,
            r.expected_away_goals,
            if r.low_confidence { " [low confidence]" } else { "" }
        );
    }
    for f in &forecast.failures {
        println!("  {} v {}: failed: {}", f.fixture.home, f.fixture.away, f.error);
    }
}
