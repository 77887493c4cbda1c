//! Overseeding window detection.
//!
//! A date is flagged when the days strictly after it (three by default)
//! all sit inside the overseed band: mild temperatures, light rain, and calm
//! wind. All predicates must hold on all following days. The last
//! `window_days` dates of a table can never be anchors.

use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use crate::model::{DailyRecord, OverseedAlert};

/// Weather band that makes a day suitable for overseeding.
///
/// Bounds are inclusive except `max_wind_mph`: the day's peak wind must
/// stay strictly below it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverseedBand {
    pub max_high_temp_f: f64,
    pub min_low_temp_f: f64,
    pub min_rain_in: f64,
    pub max_rain_in: f64,
    pub max_wind_mph: f64,
    pub window_days: usize,
}

impl Default for OverseedBand {
    fn default() -> Self {
        Self {
            max_high_temp_f: 75.0,
            min_low_temp_f: 50.0,
            min_rain_in: 0.1,
            max_rain_in: 0.25,
            max_wind_mph: 10.0,
            window_days: 3,
        }
    }
}

impl OverseedBand {
    fn temps_ok(&self, day: &DailyRecord) -> bool {
        day.high_temp <= self.max_high_temp_f && day.low_temp >= self.min_low_temp_f
    }

    fn rain_ok(&self, day: &DailyRecord) -> bool {
        day.rain_total >= self.min_rain_in && day.rain_total <= self.max_rain_in
    }

    fn wind_ok(&self, day: &DailyRecord) -> bool {
        day.max_wind < self.max_wind_mph
    }

    /// True when a single day satisfies every predicate group.
    pub fn accepts(&self, day: &DailyRecord) -> bool {
        self.temps_ok(day) && self.rain_ok(day) && self.wind_ok(day)
    }
}

/// Returns the anchor dates whose following `window_days` calendar days are
/// all present and all accepted by the band, ascending.
///
/// The window is by calendar date, not by row: a date missing from the
/// forecast breaks any window that spans it.
pub fn scan(records: &[DailyRecord], band: &OverseedBand) -> Vec<NaiveDate> {
    let window = band.window_days;
    if window == 0 || records.len() <= window {
        return Vec::new();
    }

    (0..records.len() - window)
        .filter(|&i| {
            let anchor = records[i].date;
            records[i + 1..=i + window]
                .iter()
                .enumerate()
                .all(|(offset, day)| {
                    day.date == anchor + Duration::days(offset as i64 + 1) && band.accepts(day)
                })
        })
        .map(|i| records[i].date)
        .collect()
}

/// Runs the scan and raises an alert carrying the daily table when any
/// anchor is flagged.
pub fn evaluate(records: Vec<DailyRecord>, band: &OverseedBand) -> Option<OverseedAlert> {
    let flagged = scan(&records, band);

    if flagged.is_empty() {
        log::info!("No overseed window detected");
        return None;
    }

    log::info!("Overseed window detected for {} date(s)", flagged.len());
    Some(OverseedAlert {
        flagged,
        table: records,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
