/// Data transformations shared by the alert rules.
///
/// Submodules:
/// - `normalize` — raw provider entries into validated local-time samples.
/// - `daily`     — 3-hour samples into one aggregate row per calendar day.
/// - `rolling`   — trailing rainfall totals over the 6h…120h horizons.

pub mod daily;
pub mod normalize;
pub mod rolling;
