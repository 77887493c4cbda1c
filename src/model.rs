/// Core data types for the forecast watch service.
///
/// This module defines the shared domain model imported by all other modules.
/// Each pipeline stage owns its own immutable value type:
///
///   RawSample → Sample → DailyRecord → Alert (overseed)
///   RawSample → Sample → RollingTotals → Alert (flood)
///
/// No I/O lives here, only types and the small amount of logic that belongs
/// to the types themselves (horizon arithmetic, threshold lookups).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Millimetres per inch. Forecast providers report precipitation in mm.
pub const MM_PER_INCH: f64 = 25.4;

/// Spacing between consecutive forecast samples, in hours.
pub const SAMPLE_CADENCE_HOURS: u32 = 3;

/// Condition label used when the provider omits the weather category.
pub const UNKNOWN_CONDITION: &str = "Unknown";

// ---------------------------------------------------------------------------
// Sample types
// ---------------------------------------------------------------------------

/// One forecast entry exactly as the provider delivered it, already parsed
/// but not yet validated. Every field is optional so that the normalizer
/// decides what is malformed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSample {
    pub epoch_seconds: Option<i64>,  // UTC epoch
    pub high_temp_f: Option<f64>,
    pub low_temp_f: Option<f64>,
    pub rain_3h_mm: Option<f64>,     // None = no precipitation reported
    pub wind_speed_mph: Option<f64>,
    pub condition: Option<String>,   // e.g. "Rain", "Clouds"
}

/// A single validated forecast reading in the local time zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Tz>,
    pub high_temp: f64,   // °F
    pub low_temp: f64,    // °F
    pub rain_3h: f64,     // inches
    pub wind_speed: f64,  // mph
    pub condition_label: String,
}

impl Sample {
    /// Local calendar date of this sample; the daily grouping key.
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

// ---------------------------------------------------------------------------
// Daily aggregates
// ---------------------------------------------------------------------------

/// One calendar day of aggregated samples.
///
/// `condition_hours` carries one entry per condition label seen anywhere in
/// the run, zero-filled when the label never occurred on this date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub high_temp: f64,
    pub low_temp: f64,
    pub rain_total: f64,
    pub max_wind: f64,
    pub condition_hours: BTreeMap<String, u32>,
}

// ---------------------------------------------------------------------------
// Rolling horizons
// ---------------------------------------------------------------------------

/// A trailing rainfall window. Every horizon is an exact multiple of the
/// 3-hour sample cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Horizon {
    #[serde(rename = "rain_3h")]
    H3,
    #[serde(rename = "rain_6h")]
    H6,
    #[serde(rename = "rain_12h")]
    H12,
    #[serde(rename = "rain_24h")]
    H24,
    #[serde(rename = "rain_48h")]
    H48,
    #[serde(rename = "rain_72h")]
    H72,
    #[serde(rename = "rain_96h")]
    H96,
    #[serde(rename = "rain_120h")]
    H120,
}

impl Horizon {
    /// All horizons, shortest first.
    pub const ALL: [Horizon; 8] = [
        Horizon::H3,
        Horizon::H6,
        Horizon::H12,
        Horizon::H24,
        Horizon::H48,
        Horizon::H72,
        Horizon::H96,
        Horizon::H120,
    ];

    /// Horizons that indicate saturated soil when met.
    pub const SATURATION: [Horizon; 5] = [
        Horizon::H24,
        Horizon::H48,
        Horizon::H72,
        Horizon::H96,
        Horizon::H120,
    ];

    pub fn hours(self) -> u32 {
        match self {
            Horizon::H3 => 3,
            Horizon::H6 => 6,
            Horizon::H12 => 12,
            Horizon::H24 => 24,
            Horizon::H48 => 48,
            Horizon::H72 => 72,
            Horizon::H96 => 96,
            Horizon::H120 => 120,
        }
    }

    /// Number of consecutive samples the window spans.
    pub fn window_len(self) -> usize {
        (self.hours() / SAMPLE_CADENCE_HOURS) as usize
    }

    /// Column name used in configuration and reports, e.g. `rain_24h`.
    pub fn column_name(self) -> String {
        format!("rain_{}h", self.hours())
    }

    /// Inverse of `column_name`.
    pub fn from_column_name(name: &str) -> Option<Horizon> {
        Horizon::ALL.into_iter().find(|h| h.column_name() == name)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rain_{}h", self.hours())
    }
}

/// Trailing rainfall totals at one sample position.
///
/// A horizon maps to `None` until enough preceding samples exist to fill its
/// window. `None` never satisfies a threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingTotals {
    pub timestamp: DateTime<Tz>,
    pub totals: BTreeMap<Horizon, Option<f64>>,
}

impl RollingTotals {
    /// The total for `horizon`, or `None` when it is not yet evaluable.
    pub fn get(&self, horizon: Horizon) -> Option<f64> {
        self.totals.get(&horizon).copied().flatten()
    }
}

// ---------------------------------------------------------------------------
// Threshold profiles
// ---------------------------------------------------------------------------

/// A named set of per-horizon rainfall amounts (inches) historically
/// associated with flooding, e.g. the 2019 and 2020 events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdProfile {
    pub name: String,
    pub description: Option<String>,
    pub thresholds: BTreeMap<Horizon, f64>,
}

impl ThresholdProfile {
    pub fn threshold(&self, horizon: Horizon) -> Option<f64> {
        self.thresholds.get(&horizon).copied()
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Overseed,
    Flood,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::Overseed => write!(f, "overseed"),
            AlertKind::Flood => write!(f, "flood"),
        }
    }
}

/// Anchor dates whose following days form an overseeding window, plus the
/// full daily table for context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverseedAlert {
    pub flagged: Vec<NaiveDate>,
    pub table: Vec<DailyRecord>,
}

/// The rows one profile flagged, alongside the profile's own thresholds for
/// comparison rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileComparison {
    pub profile: ThresholdProfile,
    pub rows: Vec<RollingTotals>,
}

/// Union of all profiles' flagged timestamps (ascending, deduplicated) and
/// the per-profile supporting rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloodAlert {
    pub flagged: Vec<DateTime<Tz>>,
    pub comparisons: Vec<ProfileComparison>,
}

/// An alert produced by one run. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Alert {
    Overseed(OverseedAlert),
    Flood(FloodAlert),
}

impl Alert {
    pub fn kind(&self) -> AlertKind {
        match self {
            Alert::Overseed(_) => AlertKind::Overseed,
            Alert::Flood(_) => AlertKind::Flood,
        }
    }

    /// Number of flagged dates or timestamps.
    pub fn flagged_count(&self) -> usize {
        match self {
            Alert::Overseed(a) => a.flagged.len(),
            Alert::Flood(a) => a.flagged.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort an engine run.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// A raw sample lacks a required field (timestamp, temperature, wind).
    #[error("Malformed input: sample {index} is missing {field}")]
    MalformedInput { index: usize, field: &'static str },

    /// A rule pipeline worker exited without reporting a result.
    #[error("Pipeline failed: {0}")]
    PipelineFailed(&'static str),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_windows_are_multiples_of_cadence() {
        for h in Horizon::ALL {
            assert_eq!(h.hours() % SAMPLE_CADENCE_HOURS, 0);
            assert_eq!(h.window_len() as u32 * SAMPLE_CADENCE_HOURS, h.hours());
        }
        assert_eq!(Horizon::H3.window_len(), 1);
        assert_eq!(Horizon::H24.window_len(), 8);
        assert_eq!(Horizon::H120.window_len(), 40);
    }

    #[test]
    fn test_horizon_column_name_round_trips() {
        assert_eq!(Horizon::H48.column_name(), "rain_48h");
        assert_eq!(Horizon::from_column_name("rain_96h"), Some(Horizon::H96));
        assert_eq!(Horizon::from_column_name("rain_9h"), None);
        assert_eq!(Horizon::from_column_name("rain_3"), None);
    }

    #[test]
    fn test_saturation_horizons_exclude_short_windows() {
        assert!(!Horizon::SATURATION.contains(&Horizon::H3));
        assert!(!Horizon::SATURATION.contains(&Horizon::H6));
        assert!(!Horizon::SATURATION.contains(&Horizon::H12));
        assert_eq!(Horizon::SATURATION.len(), 5);
    }

    #[test]
    fn test_rolling_totals_undefined_is_none() {
        let tz: Tz = chrono_tz::US::Pacific;
        let ts = chrono::TimeZone::with_ymd_and_hms(&tz, 2024, 10, 1, 5, 0, 0).unwrap();
        let mut totals = BTreeMap::new();
        totals.insert(Horizon::H3, Some(0.2));
        totals.insert(Horizon::H6, None);
        let row = RollingTotals { timestamp: ts, totals };

        assert_eq!(row.get(Horizon::H3), Some(0.2));
        assert_eq!(row.get(Horizon::H6), None);
        assert_eq!(row.get(Horizon::H120), None, "absent horizon is not evaluable");
    }

    #[test]
    fn test_malformed_input_message_names_field() {
        let err = EngineError::MalformedInput { index: 4, field: "wind speed" };
        assert_eq!(err.to_string(), "Malformed input: sample 4 is missing wind speed");
    }
}
