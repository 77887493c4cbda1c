//! Alert reporting: message composition and delivery.
//!
//! The engine only produces `Alert` values. This module turns them into
//! what a human reads (subject + body text, per-profile comparison chart
//! series) and hands them to an `AlertReporter`. Transport (email, chart
//! rendering) lives behind that trait; the reporters shipped here log the
//! message or write the alert as JSON.

use std::io::Write;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

use crate::model::{Alert, DailyRecord, FloodAlert, Horizon, OverseedAlert};

/// Timestamp format for flagged flood times, e.g. "Tue Nov 19 02PM".
pub const FLOOD_TIME_FORMAT: &str = "%a %b %d %I%p";

/// Timestamp format for chart file names, e.g. "2024-11-19_02PM".
pub const CHART_FILE_FORMAT: &str = "%Y-%m-%d_%I%p";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write alert: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize alert: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Reporter trait
// ---------------------------------------------------------------------------

/// Delivers one alert. Not invoked when a run raised nothing.
pub trait AlertReporter {
    fn deliver(&mut self, alert: &Alert) -> Result<(), ReportError>;
}

/// Delivers every alert in order, returning how many were delivered.
pub fn deliver_all<R: AlertReporter + ?Sized>(
    reporter: &mut R,
    alerts: &[Alert],
) -> Result<usize, ReportError> {
    for alert in alerts {
        reporter.deliver(alert)?;
    }
    Ok(alerts.len())
}

/// Logs the composed message through the `log` facade.
#[derive(Debug, Default)]
pub struct LogReporter;

impl AlertReporter for LogReporter {
    fn deliver(&mut self, alert: &Alert) -> Result<(), ReportError> {
        let message = compose_message(alert);
        log::info!("{}\n\n{}", message.subject, message.body);

        if let Alert::Flood(flood) = alert {
            for chart in flood_charts(flood) {
                log::debug!("Comparison chart: {} ({} bars)", chart.file_stem, chart.bars.len());
            }
        }
        Ok(())
    }
}

/// Writes each alert as one JSON document per line.
pub struct JsonReporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AlertReporter for JsonReporter<W> {
    fn deliver(&mut self, alert: &Alert) -> Result<(), ReportError> {
        serde_json::to_writer(&mut self.writer, alert)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Message composition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub subject: String,
    pub body: String,
}

pub fn compose_message(alert: &Alert) -> Message {
    match alert {
        Alert::Overseed(a) => compose_overseed(a),
        Alert::Flood(a) => compose_flood(a),
    }
}

fn compose_overseed(alert: &OverseedAlert) -> Message {
    let dates: Vec<String> = alert.flagged.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    Message {
        subject: "Overseed window Detected!".to_string(),
        body: format!(
            "The following dates are good for overseeding: {}\n\n{}",
            dates.join(", "),
            daily_table_markdown(&alert.table, &alert.flagged)
        ),
    }
}

fn compose_flood(alert: &FloodAlert) -> Message {
    let times: Vec<String> = alert
        .flagged
        .iter()
        .map(|t| t.format(FLOOD_TIME_FORMAT).to_string())
        .collect();
    Message {
        subject: "Upcoming Flood Conditions Detected!".to_string(),
        body: format!(
            "The following times are forecast to meet/exceed flood conditions:\n\n{}",
            times.join("\n")
        ),
    }
}

/// Renders the daily table as markdown, one `hours_<label>` column per
/// condition label and a trailing `overseed_today` flag column.
pub fn daily_table_markdown(table: &[DailyRecord], flagged: &[NaiveDate]) -> String {
    let labels: Vec<&String> = table
        .first()
        .map(|r| r.condition_hours.keys().collect())
        .unwrap_or_default();

    let mut header = vec![
        "date".to_string(),
        "high_temp".to_string(),
        "low_temp".to_string(),
        "rain_3h".to_string(),
        "max_windspeed".to_string(),
    ];
    header.extend(labels.iter().map(|l| format!("hours_{}", l.to_lowercase())));
    header.push("overseed_today".to_string());

    let mut lines = vec![
        format!("| {} |", header.join(" | ")),
        format!("|{}|", vec!["---"; header.len()].join("|")),
    ];

    for record in table {
        let mut cells = vec![
            record.date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", record.high_temp),
            format!("{:.2}", record.low_temp),
            format!("{:.3}", record.rain_total),
            format!("{:.2}", record.max_wind),
        ];
        cells.extend(
            labels
                .iter()
                .map(|l| record.condition_hours.get(*l).copied().unwrap_or(0).to_string()),
        );
        cells.push(flagged.contains(&record.date).to_string());
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Comparison charts
// ---------------------------------------------------------------------------

/// One bar group: the forecast total and the profile threshold for a horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonBar {
    pub horizon: Horizon,
    pub forecast: Option<f64>,
    pub threshold: Option<f64>,
}

/// Data for one chart comparing a flagged time against one profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonChart {
    pub title: String,
    pub file_stem: String,
    pub profile_name: String,
    pub timestamp: DateTime<Tz>,
    pub bars: Vec<ComparisonBar>,
}

/// One chart per (profile, flagged row), in profile order then time order.
pub fn flood_charts(alert: &FloodAlert) -> Vec<ComparisonChart> {
    alert
        .comparisons
        .iter()
        .flat_map(|cmp| {
            cmp.rows.iter().map(move |row| ComparisonChart {
                title: format!(
                    "{} vs {} Flood",
                    row.timestamp.format(FLOOD_TIME_FORMAT),
                    cmp.profile.name
                ),
                file_stem: format!(
                    "{}_v_{}_flood",
                    row.timestamp.format(CHART_FILE_FORMAT),
                    cmp.profile.name
                ),
                profile_name: cmp.profile.name.clone(),
                timestamp: row.timestamp,
                bars: Horizon::ALL
                    .iter()
                    .map(|&h| ComparisonBar {
                        horizon: h,
                        forecast: row.get(h),
                        threshold: cmp.profile.threshold(h),
                    })
                    .collect(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
