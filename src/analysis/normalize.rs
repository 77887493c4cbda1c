/// Sample normalization: provider entries → validated local-time samples.
///
/// Converts UTC epoch timestamps into the configured local zone once, at
/// ingestion, and converts precipitation from millimetres to inches. A
/// missing precipitation block means "no precipitation reported" and
/// becomes 0. A missing timestamp, temperature, or wind field fails the
/// whole batch; partial days would otherwise be aggregated silently.

use chrono::{TimeZone, Utc};
use chrono_tz::Tz;

use crate::model::{
    EngineError, MM_PER_INCH, RawSample, SAMPLE_CADENCE_HOURS, Sample, UNKNOWN_CONDITION,
};

/// Validates and converts a batch of raw samples, returning them ordered by
/// timestamp ascending.
pub fn normalize(raw: &[RawSample], tz: Tz) -> Result<Vec<Sample>, EngineError> {
    let mut samples = raw
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize_one(index, entry, tz))
        .collect::<Result<Vec<_>, _>>()?;

    samples.sort_by_key(|s| s.timestamp);

    let gaps = cadence_gaps(&samples);
    if gaps > 0 {
        log::warn!(
            "{} sample interval(s) deviate from the {}-hour cadence; rolling windows are positional",
            gaps,
            SAMPLE_CADENCE_HOURS
        );
    }

    Ok(samples)
}

fn normalize_one(index: usize, entry: &RawSample, tz: Tz) -> Result<Sample, EngineError> {
    let missing = |field: &'static str| EngineError::MalformedInput { index, field };

    let epoch = entry.epoch_seconds.ok_or_else(|| missing("timestamp"))?;
    let utc = Utc
        .timestamp_opt(epoch, 0)
        .single()
        .ok_or_else(|| missing("timestamp"))?;

    let high_temp = entry.high_temp_f.ok_or_else(|| missing("high temperature"))?;
    let low_temp = entry.low_temp_f.ok_or_else(|| missing("low temperature"))?;
    let wind_speed = entry.wind_speed_mph.ok_or_else(|| missing("wind speed"))?;

    let rain_3h = entry.rain_3h_mm.unwrap_or(0.0) / MM_PER_INCH;

    let condition_label = entry
        .condition
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNKNOWN_CONDITION)
        .to_string();

    Ok(Sample {
        timestamp: utc.with_timezone(&tz),
        high_temp,
        low_temp,
        rain_3h,
        wind_speed,
        condition_label,
    })
}

/// Counts adjacent pairs of samples that are not exactly one cadence apart.
pub fn cadence_gaps(samples: &[Sample]) -> usize {
    samples
        .windows(2)
        .filter(|pair| {
            let step = pair[1].timestamp.signed_duration_since(pair[0].timestamp);
            step.num_minutes() != i64::from(SAMPLE_CADENCE_HOURS) * 60
        })
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
