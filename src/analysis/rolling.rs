/// Rolling rainfall accumulation over the fixed horizon set.
///
/// For every sample position and every horizon, the trailing (causal,
/// right-aligned) sum of `rain_3h` over the `horizon / 3` samples ending at
/// that position. Positions with fewer preceding samples than the window
/// needs get `None` for that horizon.
///
/// Windows are positional: the n-th sample back is assumed to be 3n hours
/// back. The normalizer warns when the series has cadence gaps.

use std::collections::BTreeMap;

use crate::model::{Horizon, RollingTotals, Sample};

/// Computes rolling totals for every sample, in timestamp order.
pub fn accumulate(samples: &[Sample]) -> Vec<RollingTotals> {
    let mut ordered: Vec<&Sample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.timestamp);

    let rain: Vec<f64> = ordered.iter().map(|s| s.rain_3h).collect();

    let per_horizon: Vec<(Horizon, Vec<Option<f64>>)> = Horizon::ALL
        .into_iter()
        .map(|h| (h, trailing_sums(&rain, h.window_len())))
        .collect();

    ordered
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let totals: BTreeMap<Horizon, Option<f64>> = per_horizon
                .iter()
                .map(|(h, sums)| (*h, sums[i]))
                .collect();
            RollingTotals {
                timestamp: sample.timestamp,
                totals,
            }
        })
        .collect()
}

/// Sums each full window directly, so a position's value is exactly the sum
/// of its `window` samples and a dry window reads 0. `None` until the window
/// is full.
pub fn trailing_sums(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                None
            } else {
                Some(values[i + 1 - window..=i].iter().sum())
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
