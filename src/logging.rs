/// Logging backend for the forecast watch service
///
/// Implements the `log` facade so the rest of the crate can use
/// `log::info!` and friends. Console output keeps the short marker style
/// (✗ for errors, ⚠ for warnings); the optional log file gets one fully
/// qualified line per entry with a UTC timestamp, level, and target.

use chrono::Utc;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::engine::RunOutcome;

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Where console lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    /// Errors and warnings on stderr, everything else on stdout.
    Split,
    /// Every level on stderr; stdout is left to the caller (JSON output).
    Stderr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    pub fn stream_for(self, level: Level) -> Stream {
        match (self, level) {
            (ConsoleTarget::Stderr, _) | (_, Level::Error | Level::Warn) => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }
}

pub struct Logger {
    /// Minimum log level to display
    min_level: LevelFilter,
    /// Optional append-only log file
    log_file: Option<Mutex<File>>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
    console: ConsoleTarget,
}

impl Logger {
    pub fn new(
        min_level: LevelFilter,
        log_file: Option<File>,
        console_timestamps: bool,
        console: ConsoleTarget,
    ) -> Self {
        Logger {
            min_level,
            log_file: log_file.map(Mutex::new),
            console_timestamps,
            console,
        }
    }

    fn write_console(&self, record: &Record, entry: &str) {
        let line = if self.console_timestamps {
            match record.level() {
                Level::Error => entry.to_string(),
                _ => format!("   {}", entry),
            }
        } else {
            match record.level() {
                Level::Error => format!("   ✗ {}", record.args()),
                Level::Warn => format!("   ⚠ {}", record.args()),
                Level::Info => format!("   {}", record.args()),
                Level::Debug | Level::Trace => format!("   [DEBUG] {}", record.args()),
            }
        };

        match self.console.stream_for(record.level()) {
            Stream::Stdout => println!("{}", line),
            Stream::Stderr => eprintln!("{}", line),
        }
    }
}

/// Formats a log line for the file sink and timestamped console output.
pub fn format_entry(level: Level, target: &str, message: &str) -> String {
    format!(
        "{} {:<5} {}: {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        level,
        target,
        message
    )
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = format_entry(record.level(), record.target(), &record.args().to_string());
        self.write_console(record, &entry);

        if let Some(file) = &self.log_file {
            if let Ok(mut file) = file.lock() {
                if let Err(e) = writeln!(file, "{}", entry) {
                    eprintln!("Failed to write to log file: {}", e);
                }
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.log_file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Install the global logger. Call once, at startup.
pub fn init_logger(
    min_level: LevelFilter,
    log_file: Option<&Path>,
    console_timestamps: bool,
    console: ConsoleTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };

    log::set_boxed_logger(Box::new(Logger::new(min_level, file, console_timestamps, console)))?;
    log::set_max_level(min_level);
    Ok(())
}

/// Log a one-line summary of a run, escalating to a warning when any alert
/// was raised.
pub fn log_run_summary(outcome: &RunOutcome) {
    let message = run_summary(outcome);
    if outcome.has_alerts() {
        log::warn!("{}", message);
    } else {
        log::info!("{}", message);
    }
}

pub fn run_summary(outcome: &RunOutcome) -> String {
    let kinds: Vec<String> = outcome
        .alerts
        .iter()
        .map(|a| format!("{} ({} flagged)", a.kind(), a.flagged_count()))
        .collect();

    format!(
        "Run complete: {} samples over {} days, alerts: {}",
        outcome.sample_count,
        outcome.day_count,
        if kinds.is_empty() { "none".to_string() } else { kinds.join(", ") }
    )
}
