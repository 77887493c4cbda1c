/// Forecast data retrieval.
///
/// - `owm`      — OpenWeatherMap forecast API: URL construction + JSON parsing
/// - `fixtures` — representative API payloads (test only)

pub mod fixtures;
pub mod owm;
