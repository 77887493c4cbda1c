/// Test fixtures: representative JSON payloads from the OpenWeatherMap
/// 5 day / 3 hour forecast API.
///
/// These fixtures are structurally complete but truncated to the minimum
/// needed to exercise the parser. They reflect the real envelope returned by:
///   https://api.openweathermap.org/data/2.5/forecast?units=imperial&...
///
/// Forecast response shape:
///   list[]
///     .dt                — UTC epoch seconds
///     .main.temp_max     — °F (imperial units)
///     .main.temp_min     — °F
///     .weather[0].main   — condition category ("Rain", "Clouds", …)
///     .wind.speed        — mph
///     .rain.3h           — millimetres, ABSENT when no rain is forecast
///   city.timezone        — offset from UTC in seconds (not used; the zone
///                          comes from configuration)

/// Three consecutive entries starting 2024-10-01T00:00Z (Sep 30 17:00 PDT).
/// The middle entry has no rain block.
#[cfg(test)]
pub(crate) fn fixture_forecast_json() -> &'static str {
    r#"{
      "cod": "200",
      "message": 0,
      "cnt": 3,
      "list": [
        {
          "dt": 1727740800,
          "main": { "temp": 63.1, "feels_like": 62.8, "temp_min": 61.7, "temp_max": 64.2, "pressure": 1014, "humidity": 82 },
          "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10n" }],
          "clouds": { "all": 100 },
          "wind": { "speed": 6.9, "deg": 204, "gust": 11.2 },
          "visibility": 10000,
          "pop": 0.62,
          "rain": { "3h": 1.27 },
          "sys": { "pod": "n" },
          "dt_txt": "2024-10-01 00:00:00"
        },
        {
          "dt": 1727751600,
          "main": { "temp": 58.4, "feels_like": 57.9, "temp_min": 58.4, "temp_max": 58.4, "pressure": 1015, "humidity": 88 },
          "weather": [{ "id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04n" }],
          "clouds": { "all": 100 },
          "wind": { "speed": 5.1, "deg": 190, "gust": 8.3 },
          "visibility": 10000,
          "pop": 0.2,
          "sys": { "pod": "n" },
          "dt_txt": "2024-10-01 03:00:00"
        },
        {
          "dt": 1727762400,
          "main": { "temp": 55.0, "feels_like": 54.1, "temp_min": 55.0, "temp_max": 55.0, "pressure": 1016, "humidity": 91 },
          "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10n" }],
          "clouds": { "all": 100 },
          "wind": { "speed": 4.3, "deg": 185, "gust": 6.0 },
          "visibility": 10000,
          "pop": 0.71,
          "rain": { "3h": 2.54 },
          "sys": { "pod": "n" },
          "dt_txt": "2024-10-01 06:00:00"
        }
      ],
      "city": { "id": 5809844, "name": "Seattle", "timezone": -25200 }
    }"#
}

/// A single entry with no `wind` object; parses fine but must fail
/// normalization.
#[cfg(test)]
pub(crate) fn fixture_missing_wind_json() -> &'static str {
    r#"{
      "cod": "200",
      "list": [
        {
          "dt": 1727740800,
          "main": { "temp_min": 61.7, "temp_max": 64.2 },
          "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01n" }]
        }
      ]
    }"#
}
