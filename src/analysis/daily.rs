/// Daily aggregation: 3-hour samples → one row per local calendar date.
///
/// Grouping is keyed by date, so the result does not depend on the order
/// the samples arrive in. Within a date, samples are folded in timestamp
/// order so floating-point sums are reproducible as well. Dates without
/// samples never appear; there is no gap filling.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::model::{DailyRecord, SAMPLE_CADENCE_HOURS, Sample};

/// Folds samples into `DailyRecord`s ordered by date ascending.
///
/// Each sample contributes one cadence interval (3 hours) to its condition
/// label. Every record carries every label seen in the input, zero-filled.
pub fn aggregate(samples: &[Sample]) -> Vec<DailyRecord> {
    let mut ordered: Vec<&Sample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.timestamp);

    let labels: BTreeSet<&str> = ordered.iter().map(|s| s.condition_label.as_str()).collect();

    let mut by_date: BTreeMap<NaiveDate, Vec<&Sample>> = BTreeMap::new();
    for sample in ordered {
        by_date.entry(sample.local_date()).or_default().push(sample);
    }

    by_date
        .into_iter()
        .map(|(date, day)| fold_day(date, &day, &labels))
        .collect()
}

fn fold_day(date: NaiveDate, day: &[&Sample], labels: &BTreeSet<&str>) -> DailyRecord {
    let mut condition_hours: BTreeMap<String, u32> =
        labels.iter().map(|label| (label.to_string(), 0)).collect();

    for sample in day {
        if let Some(hours) = condition_hours.get_mut(sample.condition_label.as_str()) {
            *hours += SAMPLE_CADENCE_HOURS;
        }
    }

    DailyRecord {
        date,
        high_temp: day.iter().map(|s| s.high_temp).fold(f64::NEG_INFINITY, f64::max),
        low_temp: day.iter().map(|s| s.low_temp).fold(f64::INFINITY, f64::min),
        rain_total: day.iter().map(|s| s.rain_3h).sum(),
        max_wind: day.iter().map(|s| s.wind_speed).fold(f64::NEG_INFINITY, f64::max),
        condition_hours,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::US::Pacific;

    fn sample(day: u32, hour: u32, high: f64, low: f64, rain: f64, wind: f64, label: &str) -> Sample {
        Sample {
            timestamp: Pacific.with_ymd_and_hms(2024, 10, day, hour, 0, 0).unwrap(),
            high_temp: high,
            low_temp: low,
            rain_3h: rain,
            wind_speed: wind,
            condition_label: label.to_string(),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, day).unwrap()
    }

    fn two_day_series() -> Vec<Sample> {
        vec![
            sample(1, 2, 60.0, 52.0, 0.05, 3.0, "Rain"),
            sample(1, 5, 64.0, 50.0, 0.10, 7.5, "Rain"),
            sample(1, 8, 71.0, 55.0, 0.00, 4.0, "Clouds"),
            sample(2, 2, 58.0, 49.0, 0.25, 12.0, "Rain"),
        ]
    }

    #[test]
    fn test_aggregate_max_min_sum_per_date() {
        let daily = aggregate(&two_day_series());
        assert_eq!(daily.len(), 2);

        let first = &daily[0];
        assert_eq!(first.date, date(1));
        assert_eq!(first.high_temp, 71.0);
        assert_eq!(first.low_temp, 50.0);
        assert!((first.rain_total - 0.15).abs() < 1e-12);
        assert_eq!(first.max_wind, 7.5);

        let second = &daily[1];
        assert_eq!(second.date, date(2));
        assert_eq!(second.high_temp, 58.0);
        assert_eq!(second.low_temp, 49.0);
        assert_eq!(second.rain_total, 0.25);
        assert_eq!(second.max_wind, 12.0);
    }

    #[test]
    fn test_condition_hours_zero_filled_across_dates() {
        let daily = aggregate(&two_day_series());

        assert_eq!(daily[0].condition_hours["Rain"], 6);
        assert_eq!(daily[0].condition_hours["Clouds"], 3);
        assert_eq!(daily[1].condition_hours["Rain"], 3);
        assert_eq!(
            daily[1].condition_hours.get("Clouds"),
            Some(&0),
            "labels seen on any date appear on every date"
        );
    }

    #[test]
    fn test_aggregate_independent_of_input_order() {
        let forward = aggregate(&two_day_series());

        let mut shuffled = two_day_series();
        shuffled.reverse();
        shuffled.swap(0, 2);

        assert_eq!(aggregate(&shuffled), forward);
    }

    #[test]
    fn test_dates_without_samples_are_not_synthesized() {
        let samples = vec![
            sample(1, 2, 60.0, 52.0, 0.0, 3.0, "Clear"),
            sample(4, 2, 60.0, 52.0, 0.0, 3.0, "Clear"),
        ];

        let dates: Vec<NaiveDate> = aggregate(&samples).iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(1), date(4)]);
    }

    #[test]
    fn test_aggregate_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }
}
