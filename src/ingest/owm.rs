/// OpenWeatherMap 5 day / 3 hour forecast client
///
/// Retrieves the forecast used by both alert rules. Requests `units=imperial`,
/// so temperatures arrive in °F and wind in mph; precipitation is always
/// reported in millimetres and is converted by the normalizer.
///
/// API Documentation: https://openweathermap.org/forecast5
///
/// Every field below the `list` array is optional in the response structs.
/// Validation (what counts as malformed) belongs to `analysis::normalize`,
/// not to the parser.

use serde::Deserialize;
use thiserror::Error;

use crate::model::RawSample;

const OWM_BASE_URL: &str = "https://api.openweathermap.org";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("API key not found in environment variable {0}")]
    MissingApiKey(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Forecast API error: HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to parse forecast response: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// API Response Structures
// ============================================================================

/// Forecast response envelope
#[derive(Debug, Deserialize)]
pub struct OwmForecastResponse {
    pub list: Vec<OwmEntry>,
    pub city: Option<OwmCity>,
}

#[derive(Debug, Deserialize)]
pub struct OwmCity {
    pub name: Option<String>,
    pub timezone: Option<i64>,  // offset from UTC, seconds
}

/// Single 3-hour forecast entry
#[derive(Debug, Deserialize)]
pub struct OwmEntry {
    pub dt: Option<i64>,  // UTC epoch seconds
    pub main: Option<OwmMain>,
    #[serde(default)]
    pub weather: Vec<OwmWeather>,
    pub wind: Option<OwmWind>,
    pub rain: Option<OwmPrecip>,
}

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct OwmWeather {
    pub main: Option<String>,  // category: "Rain", "Clouds", "Clear", …
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwmWind {
    pub speed: Option<f64>,
}

/// Precipitation volume for the preceding interval
#[derive(Debug, Deserialize)]
pub struct OwmPrecip {
    #[serde(rename = "3h")]
    pub three_hour_mm: Option<f64>,
}

impl From<OwmEntry> for RawSample {
    fn from(entry: OwmEntry) -> Self {
        RawSample {
            epoch_seconds: entry.dt,
            high_temp_f: entry.main.as_ref().and_then(|m| m.temp_max),
            low_temp_f: entry.main.as_ref().and_then(|m| m.temp_min),
            rain_3h_mm: entry.rain.and_then(|r| r.three_hour_mm),
            wind_speed_mph: entry.wind.and_then(|w| w.speed),
            condition: entry.weather.into_iter().next().and_then(|w| w.main),
        }
    }
}

// ============================================================================
// URL construction + parsing
// ============================================================================

/// Builds the 5 day / 3 hour forecast URL for a coordinate.
pub fn build_forecast_url(latitude: f64, longitude: f64, api_key: &str) -> String {
    format!(
        "{}/data/2.5/forecast?lat={:.6}&lon={:.6}&units=imperial&appid={}",
        OWM_BASE_URL,
        latitude,
        longitude,
        urlencoding::encode(api_key)
    )
}

/// Parses a forecast response body into raw samples, in response order.
pub fn parse_forecast_response(json: &str) -> Result<Vec<RawSample>, IngestError> {
    let response: OwmForecastResponse = serde_json::from_str(json)?;
    Ok(response.list.into_iter().map(RawSample::from).collect())
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetches the forecast for a coordinate.
///
/// # Parameters
/// - `client`: HTTP client
/// - `latitude`, `longitude`: forecast point
/// - `api_key`: OpenWeatherMap API key
pub fn fetch_forecast(
    client: &reqwest::blocking::Client,
    latitude: f64,
    longitude: f64,
    api_key: &str,
) -> Result<Vec<RawSample>, IngestError> {
    let url = build_forecast_url(latitude, longitude, api_key);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(IngestError::HttpStatus(response.status().as_u16()));
    }

    let body = response.text()?;
    let samples = parse_forecast_response(&body)?;
    log::info!("Fetched {} forecast entries", samples.len());

    Ok(samples)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;

    #[test]
    fn test_build_forecast_url() {
        let url = build_forecast_url(47.55044, -122.39346, "abc123");
        assert_eq!(
            url,
            "https://api.openweathermap.org/data/2.5/forecast?lat=47.550440&lon=-122.393460&units=imperial&appid=abc123"
        );
    }

    #[test]
    fn test_api_key_is_url_encoded() {
        let url = build_forecast_url(0.0, 0.0, "a b&c");
        assert!(url.ends_with("appid=a%20b%26c"), "got: {}", url);
    }

    #[test]
    fn test_parse_forecast_fields() {
        let samples = parse_forecast_response(fixture_forecast_json()).expect("fixture should parse");
        assert_eq!(samples.len(), 3);

        let first = &samples[0];
        assert_eq!(first.epoch_seconds, Some(1_727_740_800));
        assert_eq!(first.high_temp_f, Some(64.2));
        assert_eq!(first.low_temp_f, Some(61.7));
        assert_eq!(first.rain_3h_mm, Some(1.27));
        assert_eq!(first.wind_speed_mph, Some(6.9));
        assert_eq!(first.condition.as_deref(), Some("Rain"));
    }

    #[test]
    fn test_parse_entry_without_rain_block() {
        let samples = parse_forecast_response(fixture_forecast_json()).unwrap();
        assert_eq!(samples[1].rain_3h_mm, None, "no rain block means no precipitation reported");
        assert_eq!(samples[1].condition.as_deref(), Some("Clouds"));
    }

    #[test]
    fn test_parse_keeps_missing_wind_for_normalizer() {
        let samples = parse_forecast_response(fixture_missing_wind_json()).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].wind_speed_mph, None);
    }

    #[test]
    fn test_parse_rejects_non_forecast_body() {
        let err = parse_forecast_response(r#"{"cod":"401","message":"Invalid API key"}"#).unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
    }

    #[test]
    fn test_parse_empty_list() {
        let samples = parse_forecast_response(r#"{"cod":"200","list":[]}"#).unwrap();
        assert!(samples.is_empty());
    }
}
