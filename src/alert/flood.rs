//! Flood risk evaluation against historical threshold profiles.
//!
//! A sample position is flagged by a profile when both hold:
//!
//! - **high active rain**: the 3-hour total is at or above the profile's
//!   `rain_3h` threshold, and
//! - **saturated soil**: at least one of the 24h…120h totals is at or above
//!   that horizon's threshold in the same profile.
//!
//! Horizons that are not yet evaluable at a position, or that the profile
//! does not define, simply do not count toward saturation. The final alert
//! set is the union of every profile's flagged timestamps.

use std::collections::BTreeSet;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::model::{FloodAlert, Horizon, ProfileComparison, RollingTotals, ThresholdProfile};

/// True when `row` has a defined total for `horizon` that meets the
/// profile's threshold for it.
fn meets(row: &RollingTotals, profile: &ThresholdProfile, horizon: Horizon) -> bool {
    match (row.get(horizon), profile.threshold(horizon)) {
        (Some(total), Some(threshold)) => total >= threshold,
        _ => false,
    }
}

pub fn is_high_active_rain(row: &RollingTotals, profile: &ThresholdProfile) -> bool {
    meets(row, profile, Horizon::H3)
}

pub fn is_saturated(row: &RollingTotals, profile: &ThresholdProfile) -> bool {
    Horizon::SATURATION.iter().any(|&h| meets(row, profile, h))
}

/// Rows flagged by a single profile, in input order.
pub fn flagged_rows(rows: &[RollingTotals], profile: &ThresholdProfile) -> Vec<RollingTotals> {
    rows.iter()
        .filter(|row| is_high_active_rain(row, profile) && is_saturated(row, profile))
        .cloned()
        .collect()
}

/// Compares every profile against the rolling totals.
///
/// Returns `None` when no profile flags anything. Otherwise the alert's
/// `flagged` list is the ascending, deduplicated union across profiles, and
/// `comparisons` holds one entry per profile that flagged at least one row.
pub fn evaluate(rows: &[RollingTotals], profiles: &[ThresholdProfile]) -> Option<FloodAlert> {
    let mut union: BTreeSet<DateTime<Tz>> = BTreeSet::new();
    let mut comparisons = Vec::new();

    for profile in profiles {
        let matched = flagged_rows(rows, profile);
        log::debug!("Profile {} flagged {} position(s)", profile.name, matched.len());

        if matched.is_empty() {
            continue;
        }

        union.extend(matched.iter().map(|row| row.timestamp));
        comparisons.push(ProfileComparison {
            profile: profile.clone(),
            rows: matched,
        });
    }

    if union.is_empty() {
        log::info!("No potential flood conditions detected");
        return None;
    }

    log::info!("Potential flood conditions detected at {} time(s)", union.len());
    Some(FloodAlert {
        flagged: union.into_iter().collect(),
        comparisons,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rolling::accumulate;
    use crate::model::Sample;
    use chrono::{Duration, TimeZone};
    use chrono_tz::US::Pacific;
    use std::collections::BTreeMap;

    fn profile(name: &str, entries: &[(Horizon, f64)]) -> ThresholdProfile {
        ThresholdProfile {
            name: name.to_string(),
            description: None,
            thresholds: entries.iter().copied().collect(),
        }
    }

    fn row(hour: u32, entries: &[(Horizon, Option<f64>)]) -> RollingTotals {
        let totals: BTreeMap<Horizon, Option<f64>> = entries.iter().copied().collect();
        RollingTotals {
            timestamp: Pacific.with_ymd_and_hms(2024, 11, 19, hour, 0, 0).unwrap(),
            totals,
        }
    }

    fn series(rain: &[f64]) -> Vec<Sample> {
        let start = Pacific.with_ymd_and_hms(2024, 11, 15, 2, 0, 0).unwrap();
        rain.iter()
            .enumerate()
            .map(|(i, r)| Sample {
                timestamp: start + Duration::hours(3 * i as i64),
                high_temp: 52.0,
                low_temp: 44.0,
                rain_3h: *r,
                wind_speed: 15.0,
                condition_label: "Rain".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_requires_both_active_rain_and_saturation() {
        let p = profile("p", &[(Horizon::H3, 0.25), (Horizon::H24, 1.0)]);

        let both = row(2, &[(Horizon::H3, Some(0.3)), (Horizon::H24, Some(1.2))]);
        let rain_only = row(5, &[(Horizon::H3, Some(0.3)), (Horizon::H24, Some(0.8))]);
        let soil_only = row(8, &[(Horizon::H3, Some(0.1)), (Horizon::H24, Some(1.5))]);

        let flagged = flagged_rows(&[both.clone(), rain_only, soil_only], &p);
        assert_eq!(flagged, vec![both]);
    }

    #[test]
    fn test_thresholds_are_at_or_above() {
        let p = profile("p", &[(Horizon::H3, 0.25), (Horizon::H48, 2.0)]);
        let exact = row(2, &[(Horizon::H3, Some(0.25)), (Horizon::H48, Some(2.0))]);
        assert_eq!(flagged_rows(&[exact], &p).len(), 1);
    }

    #[test]
    fn test_saturation_is_or_across_horizons() {
        let p = profile(
            "p",
            &[
                (Horizon::H3, 0.2),
                (Horizon::H24, 5.0),
                (Horizon::H48, 5.0),
                (Horizon::H120, 1.0),
            ],
        );
        let r = row(
            2,
            &[
                (Horizon::H3, Some(0.2)),
                (Horizon::H24, Some(0.5)),
                (Horizon::H48, Some(0.9)),
                (Horizon::H120, Some(1.1)),
            ],
        );
        assert!(is_saturated(&r, &p));
    }

    #[test]
    fn test_undefined_horizon_never_satisfies() {
        let p = profile("p", &[(Horizon::H3, 0.2), (Horizon::H24, 0.5), (Horizon::H72, 0.5)]);

        let undefined = row(2, &[(Horizon::H3, Some(0.4)), (Horizon::H24, None), (Horizon::H72, None)]);
        assert!(!is_saturated(&undefined, &p));

        // An undefined 24h total does not block the 72h comparison.
        let mixed = row(5, &[(Horizon::H3, Some(0.4)), (Horizon::H24, None), (Horizon::H72, Some(0.6))]);
        assert!(is_saturated(&mixed, &p));
    }

    #[test]
    fn test_partial_window_sum_excluded_even_when_large() {
        // Three huge samples: their partial 24h sum would exceed 1.0, but a
        // 24h window needs eight samples.
        let rows = accumulate(&series(&[2.0, 2.0, 2.0]));
        let p = profile("p", &[(Horizon::H3, 0.1), (Horizon::H24, 1.0)]);

        assert!(evaluate(&rows, &[p]).is_none());
    }

    #[test]
    fn test_union_deduplicates_across_profiles() {
        let a = profile("2019", &[(Horizon::H3, 0.2), (Horizon::H24, 1.0)]);
        let b = profile("2020", &[(Horizon::H3, 0.5), (Horizon::H24, 1.0)]);

        let t1 = row(2, &[(Horizon::H3, Some(0.3)), (Horizon::H24, Some(1.1))]);
        let t2 = row(5, &[(Horizon::H3, Some(0.6)), (Horizon::H24, Some(1.4))]);

        let alert = evaluate(&[t1.clone(), t2.clone()], &[a, b]).expect("should flag");

        // Profile 2019 flags t1 and t2; 2020 flags only t2.
        assert_eq!(alert.flagged, vec![t1.timestamp, t2.timestamp]);
        assert_eq!(alert.comparisons.len(), 2);
        assert_eq!(alert.comparisons[0].rows.len(), 2);
        assert_eq!(alert.comparisons[1].rows.len(), 1);
    }

    #[test]
    fn test_flagged_output_is_ascending() {
        let a = profile("a", &[(Horizon::H3, 0.5), (Horizon::H24, 0.1)]);
        let b = profile("b", &[(Horizon::H3, 0.1), (Horizon::H24, 0.1)]);

        let late = row(20, &[(Horizon::H3, Some(0.6)), (Horizon::H24, Some(1.0))]);
        let early = row(2, &[(Horizon::H3, Some(0.2)), (Horizon::H24, Some(1.0))]);

        let alert = evaluate(&[early.clone(), late.clone()], &[a, b]).unwrap();
        assert_eq!(alert.flagged, vec![early.timestamp, late.timestamp]);
    }

    #[test]
    fn test_profiles_without_matches_are_omitted_from_comparisons() {
        let hit = profile("hit", &[(Horizon::H3, 0.1), (Horizon::H24, 0.5)]);
        let miss = profile("miss", &[(Horizon::H3, 9.0), (Horizon::H24, 0.5)]);
        let r = row(2, &[(Horizon::H3, Some(0.2)), (Horizon::H24, Some(0.6))]);

        let alert = evaluate(&[r], &[miss, hit]).unwrap();
        assert_eq!(alert.comparisons.len(), 1);
        assert_eq!(alert.comparisons[0].profile.name, "hit");
    }

    #[test]
    fn test_flat_zero_rain_never_alerts() {
        let rows = accumulate(&series(&[0.0; 40]));
        let p = profile(
            "2019",
            &[
                (Horizon::H3, 0.26),
                (Horizon::H24, 1.68),
                (Horizon::H48, 2.08),
                (Horizon::H72, 2.16),
                (Horizon::H96, 2.27),
                (Horizon::H120, 2.54),
            ],
        );
        assert!(evaluate(&rows, &[p]).is_none());
    }

    #[test]
    fn test_every_qualifying_position_is_reported() {
        // Eight samples of history then a sustained downpour: each position
        // of the event qualifies on its own.
        let mut rain = vec![0.1; 8];
        rain.extend([0.5, 0.5, 0.5]);
        let rows = accumulate(&series(&rain));
        let p = profile("p", &[(Horizon::H3, 0.4), (Horizon::H24, 1.0)]);

        let alert = evaluate(&rows, &[p]).unwrap();
        assert_eq!(alert.flagged.len(), 3);
    }

    #[test]
    fn test_no_profiles_no_alert() {
        let rows = accumulate(&series(&[1.0; 10]));
        assert!(evaluate(&rows, &[]).is_none());
    }
}
