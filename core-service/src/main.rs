//! waterlog-predict - command line entry point
//!
//! Exit codes: 0 success, 1 computation/configuration failure,
//! 2 predictions computed but could not be persisted.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use waterlog_core::constants::{self, APP_NAME, APP_VERSION};
use waterlog_core::logic::features::LayoutInfo;
use waterlog_core::logic::weather::WeatherObservation;
use waterlog_core::{
    load_bundle, persist_to, skip_persistence, FixedWeatherProvider, ModelRegistry, OpenMeteoProvider,
    Persistence, Pipeline, PipelineConfig, PredictionStore, ReferenceData, RunControl, RunReport,
    SqliteRainfallProvider, SqliteStore, WeatherResolver,
};

#[derive(Parser, Debug)]
#[command(name = "waterlog-predict", version, about = "Predict waterlogging hotspots for a date")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline for a date and replace the stored predictions
    Predict {
        /// Prediction date, YYYY-MM-DD
        date: String,

        /// Model bundle (JSON)
        #[arg(long)]
        model: PathBuf,

        /// Expected SHA-256 of the bundle file
        #[arg(long)]
        model_sha256: Option<String>,

        /// SQLite database (defaults to the local data dir)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Use this 24h rainfall (mm) instead of looking it up
        #[arg(long)]
        simulate_rain: Option<f64>,

        /// Pipeline config JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Reference data JSON (risk zones, named locations)
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Skip the Open-Meteo lookup
        #[arg(long)]
        no_live_weather: bool,

        /// Compute only, do not write
        #[arg(long)]
        dry_run: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a model bundle and print its summary
    Model {
        #[arg(long)]
        model: PathBuf,

        #[arg(long)]
        model_sha256: Option<String>,
    },

    /// Store an observed rainfall record for later runs
    RecordRainfall {
        date: String,

        #[arg(long)]
        rainfall_mm: f64,

        #[arg(long, default_value_t = 30.0)]
        temperature_c: f64,

        #[arg(long, default_value_t = 70, value_parser = clap::value_parser!(u8).range(0..=100))]
        humidity_percent: u8,

        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print stored predictions for a date
    Show {
        date: String,

        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print prediction statistics
    Stats {
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("{} v{}", APP_NAME, APP_VERSION);

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Predict {
            date,
            model,
            model_sha256,
            db,
            simulate_rain,
            config,
            reference,
            no_live_weather,
            dry_run,
            json,
        } => {
            let date = parse_date(&date)?;
            let db_path = db.unwrap_or_else(constants::get_default_db_path);

            let mut config = match config {
                Some(path) => PipelineConfig::load(&path)?,
                None => PipelineConfig::from_env(),
            };
            if no_live_weather {
                config.live_weather = false;
            }

            let reference = match reference {
                Some(path) => ReferenceData::load(&path)?,
                None => ReferenceData::delhi(),
            };

            let models = Arc::new(ModelRegistry::new());
            models
                .load(&model, model_sha256.as_deref())
                .with_context(|| format!("loading model bundle {}", model.display()))?;

            let weather = build_resolver(&config, simulate_rain, &db_path)?;
            let pipeline = Pipeline::new(config, Arc::new(reference), models, weather)?;
            let control = RunControl::new();

            let run = pipeline.compute(date, Utc::now(), &control)?;
            let report = if dry_run {
                skip_persistence(run)
            } else {
                persist_to(run, SqliteStore::open(&db_path))
            };

            print_report(&report, json)?;
            Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::from(2) })
        }

        Command::Model { model, model_sha256 } => {
            let ensemble = load_bundle(&model, model_sha256.as_deref())?;
            let out = serde_json::json!({
                "model": ensemble.summary(),
                "layout": LayoutInfo::current(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::RecordRainfall { date, rainfall_mm, temperature_c, humidity_percent, db } => {
            let date = parse_date(&date)?;
            if !rainfall_mm.is_finite() || rainfall_mm < 0.0 {
                bail!("rainfall must be a finite value >= 0, got {}", rainfall_mm);
            }
            let db_path = db.unwrap_or_else(constants::get_default_db_path);
            let provider = SqliteRainfallProvider::open(&db_path)?;
            provider.record(
                date,
                &WeatherObservation { rainfall_24h_mm: rainfall_mm, temperature_c, humidity_percent },
            )?;
            println!("Recorded {:.1} mm for {}", rainfall_mm, date);
            Ok(ExitCode::SUCCESS)
        }

        Command::Show { date, db } => {
            let date = parse_date(&date)?;
            let store = SqliteStore::open(&db.unwrap_or_else(constants::get_default_db_path))?;
            let hotspots = store.load_for_date(date)?;
            println!("{}", serde_json::to_string_pretty(&hotspots)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Stats { db } => {
            let store = SqliteStore::open(&db.unwrap_or_else(constants::get_default_db_path))?;
            println!("{}", serde_json::to_string_pretty(&store.stats()?)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", s))
}

/// Simulation replaces every lookup. Otherwise: recorded history, then live.
fn build_resolver(config: &PipelineConfig, simulate_rain: Option<f64>, db_path: &Path) -> Result<WeatherResolver> {
    if let Some(mm) = simulate_rain {
        log::info!("Simulating {:.1} mm of rainfall", mm);
        return Ok(WeatherResolver::new().with_provider(Arc::new(FixedWeatherProvider::simulated(mm)?)));
    }

    let mut resolver = WeatherResolver::new();
    match SqliteRainfallProvider::open(db_path) {
        Ok(history) => resolver = resolver.with_provider(Arc::new(history)),
        Err(e) => log::warn!("Historical rainfall unavailable: {}", e),
    }
    if config.live_weather {
        let timeout = Duration::from_secs(config.weather_timeout_secs);
        resolver = resolver.with_provider(Arc::new(OpenMeteoProvider::new(timeout)));
    }
    Ok(resolver)
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let run = &report.run;
    println!("Date:          {}", run.prediction_date);
    println!("Model:         {}", run.model_version);
    println!(
        "Rainfall:      {:.1} mm ({}{})",
        run.weather.rainfall_mm(),
        run.weather.source,
        if run.weather.degraded { ", degraded" } else { "" }
    );
    println!("Grid points:   {}", run.grid_points);
    println!("High risk:     {}", run.high_risk_points);
    println!("Hotspots:      {}", run.hotspots.len());
    for h in &run.hotspots {
        println!(
            "  {:<9} {:<32} conf {:.2}  r={}m",
            h.severity.as_str(),
            h.name,
            h.confidence_score,
            h.radius_meters
        );
    }
    match &report.persistence {
        Persistence::Persisted { count } => println!("Persisted:     {}", count),
        Persistence::Failed { error } => println!("Persist FAILED: {}", error),
        Persistence::Skipped => println!("Persisted:     skipped (dry run)"),
    }
    Ok(())
}
