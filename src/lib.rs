/// wxwatch_service: forecast condition watch for lawn overseeding windows
/// and local flood risk.
///
/// # Module structure
///
/// ```text
/// wxwatch_service
/// ├── model       — shared data types (Sample, DailyRecord, RollingTotals, Alert, …)
/// ├── config      — wxwatch.toml loader (location, overseed band, flood profiles)
/// ├── logging     — `log` backend: console + optional log file
/// ├── engine      — one evaluation run; rule pipelines on a worker pool
/// ├── report      — alert messages, comparison chart data, reporters
/// ├── ingest
/// │   ├── owm     — OpenWeatherMap forecast API: URL construction + JSON parsing
/// │   └── fixtures (test only) — representative API response payloads
/// ├── analysis
/// │   ├── normalize — raw entries → validated local-time samples
/// │   ├── daily     — samples → per-date aggregates
/// │   └── rolling   — samples → trailing rainfall totals per horizon
/// └── alert
///     ├── overseed  — 3-day forward suitability window
///     └── flood     — multi-profile rolling-total threshold comparison
/// ```

pub mod alert;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;
