//! Forecast Watch - Main Entry Point
//!
//! Runs one evaluation:
//! 1. Loads configuration (location, overseed band, flood profiles)
//! 2. Fetches the 5 day / 3 hour forecast (or reads a saved response)
//! 3. Evaluates the overseed and flood rules
//! 4. Reports any alerts
//!
//! Meant to be triggered by an external scheduler (cron, systemd timer).
//!
//! Usage:
//!   cargo run --release
//!   cargo run --release -- --forecast-file saved.json --json
//!
//! Options:
//!   --config PATH          Configuration file (default: wxwatch.toml)
//!   --forecast-file PATH   Evaluate a saved forecast response instead of fetching
//!   --json                 Write alerts as JSON to stdout instead of logging them
//!   --log-file PATH        Also append log lines to PATH
//!   --verbose              Debug-level logging
//!
//! Environment:
//!   OPEN_WEATHER_MAP_KEY - forecast API key (may be set in .env)

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use log::LevelFilter;
use wxwatch_service::config::{self, Settings};
use wxwatch_service::engine::{Engine, EngineConfig};
use wxwatch_service::ingest::owm::{self, IngestError};
use wxwatch_service::logging::{self, ConsoleTarget};
use wxwatch_service::model::RawSample;
use wxwatch_service::report::{self, AlertReporter, JsonReporter, LogReporter};

struct Args {
    config_path: PathBuf,
    forecast_file: Option<PathBuf>,
    json: bool,
    log_file: Option<PathBuf>,
    verbose: bool,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        config_path: PathBuf::from(config::DEFAULT_CONFIG_PATH),
        forecast_file: None,
        json: false,
        log_file: None,
        verbose: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "--forecast-file" | "--log-file" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} requires a path", args[i]))?;
                let path = PathBuf::from(value);
                match args[i].as_str() {
                    "--config" => parsed.config_path = path,
                    "--forecast-file" => parsed.forecast_file = Some(path),
                    _ => parsed.log_file = Some(path),
                }
                i += 2;
            }
            "--json" => {
                parsed.json = true;
                i += 1;
            }
            "--verbose" => {
                parsed.verbose = true;
                i += 1;
            }
            other => {
                return Err(format!(
                    "Unknown argument: {}\nUsage: {} [--config PATH] [--forecast-file PATH] [--json] [--log-file PATH] [--verbose]",
                    other, args[0]
                ));
            }
        }
    }

    Ok(parsed)
}

fn load_forecast(args: &Args, settings: &Settings) -> Result<Vec<RawSample>, Box<dyn Error>> {
    if let Some(path) = &args.forecast_file {
        log::info!("Reading saved forecast from {}", path.display());
        let body = fs::read_to_string(path)?;
        return Ok(owm::parse_forecast_response(&body)?);
    }

    let api_key = config::api_key().ok_or(IngestError::MissingApiKey(config::API_KEY_VAR))?;
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    Ok(owm::fetch_forecast(&client, settings.latitude, settings.longitude, &api_key)?)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let settings = Settings::load(&args.config_path)?;
    log::info!(
        "Loaded {} flood profile(s) for ({:.4}, {:.4}) in {}",
        settings.profiles.len(),
        settings.latitude,
        settings.longitude,
        settings.timezone
    );

    let raw = load_forecast(args, &settings)?;

    let engine = Engine::new(EngineConfig::from(&settings));
    let outcome = engine.run(&raw)?;
    logging::log_run_summary(&outcome);

    let mut reporter: Box<dyn AlertReporter> = if args.json {
        Box::new(JsonReporter::new(std::io::stdout()))
    } else {
        Box::new(LogReporter)
    };
    report::deliver_all(reporter.as_mut(), &outcome.alerts)?;

    Ok(())
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // JSON documents own stdout; console logging moves to stderr.
    let level = if args.verbose {
        LevelFilter::Debug
    } else if args.json {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    let console = if args.json { ConsoleTarget::Stderr } else { ConsoleTarget::Split };
    if let Err(e) = logging::init_logger(level, args.log_file.as_deref(), false, console) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        log::error!("Run failed: {}", e);
        std::process::exit(1);
    }
}
