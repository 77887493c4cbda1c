/// Service configuration loader - parses wxwatch.toml
///
/// Separates the forecast location, the overseed band, and the flood
/// threshold profiles from code, so thresholds can be tuned or a new
/// historical event added as a profile without recompiling the service.
///
/// Secrets (the forecast API key) come from the environment, loaded from
/// `.env` when present.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use chrono_tz::Tz;
use thiserror::Error;

use crate::alert::overseed::OverseedBand;
use crate::model::{Horizon, ThresholdProfile};

/// Default configuration path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "wxwatch.toml";

/// Environment variable holding the OpenWeatherMap API key.
pub const API_KEY_VAR: &str = "OPEN_WEATHER_MAP_KEY";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Profile {profile}: unknown horizon column {column}")]
    UnknownHorizon { profile: String, column: String },

    #[error("Profile {profile}: threshold for {horizon} must be a non-negative number, got {value}")]
    InvalidThreshold { profile: String, horizon: Horizon, value: f64 },

    #[error("Profile {0}: missing rain_3h threshold")]
    MissingActiveRainThreshold(String),

    #[error("Profile {0}: needs at least one of rain_24h, rain_48h, rain_72h, rain_96h, rain_120h")]
    MissingSaturationThreshold(String),

    #[error("Duplicate profile name: {0}")]
    DuplicateProfile(String),

    #[error("No threshold profiles configured")]
    NoProfiles,

    #[error("Invalid overseed band: {0}")]
    InvalidBand(String),
}

// ---------------------------------------------------------------------------
// TOML structures
// ---------------------------------------------------------------------------

/// Forecast location and the local zone used for daily grouping.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "US/Pacific".to_string()
}

/// One `[[profile]]` entry as written in the file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    pub name: String,
    pub description: Option<String>,
    pub thresholds: BTreeMap<String, f64>,  // keyed by column name, e.g. "rain_24h"
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Deserialize)]
struct ConfigFile {
    location: LocationConfig,
    #[serde(default)]
    overseed: OverseedBand,
    #[serde(default)]
    profile: Vec<ProfileConfig>,
}

// ---------------------------------------------------------------------------
// Validated settings
// ---------------------------------------------------------------------------

/// Fully validated service settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Tz,
    pub overseed: OverseedBand,
    pub profiles: Vec<ThresholdProfile>,
}

impl Settings {
    /// Parses and validates settings from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;

        let timezone: Tz = file
            .location
            .timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimeZone(file.location.timezone.clone()))?;

        validate_band(&file.overseed)?;

        if file.profile.is_empty() {
            return Err(ConfigError::NoProfiles);
        }

        let mut seen = HashSet::new();
        let mut profiles = Vec::with_capacity(file.profile.len());
        for raw in &file.profile {
            if !seen.insert(raw.name.clone()) {
                return Err(ConfigError::DuplicateProfile(raw.name.clone()));
            }
            profiles.push(ThresholdProfile::try_from(raw)?);
        }

        Ok(Settings {
            latitude: file.location.latitude,
            longitude: file.location.longitude,
            timezone,
            overseed: file.overseed,
            profiles,
        })
    }

    /// Loads settings from a file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

fn validate_band(band: &OverseedBand) -> Result<(), ConfigError> {
    if band.min_rain_in > band.max_rain_in {
        return Err(ConfigError::InvalidBand(format!(
            "min_rain_in ({}) exceeds max_rain_in ({})",
            band.min_rain_in, band.max_rain_in
        )));
    }
    if band.min_low_temp_f > band.max_high_temp_f {
        return Err(ConfigError::InvalidBand(format!(
            "min_low_temp_f ({}) exceeds max_high_temp_f ({})",
            band.min_low_temp_f, band.max_high_temp_f
        )));
    }
    if band.window_days == 0 {
        return Err(ConfigError::InvalidBand("window_days must be at least 1".to_string()));
    }
    Ok(())
}

/// Converts a profile as written in TOML into the domain type.
///
/// Column names are validated against the fixed horizon set, so a typo such
/// as `rain_36h` fails loudly instead of being silently ignored.
impl TryFrom<&ProfileConfig> for ThresholdProfile {
    type Error = ConfigError;

    fn try_from(config: &ProfileConfig) -> Result<Self, Self::Error> {
        let mut thresholds = BTreeMap::new();

        for (column, &value) in &config.thresholds {
            let horizon = Horizon::from_column_name(column).ok_or_else(|| {
                ConfigError::UnknownHorizon {
                    profile: config.name.clone(),
                    column: column.clone(),
                }
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold {
                    profile: config.name.clone(),
                    horizon,
                    value,
                });
            }
            thresholds.insert(horizon, value);
        }

        if !thresholds.contains_key(&Horizon::H3) {
            return Err(ConfigError::MissingActiveRainThreshold(config.name.clone()));
        }
        if !Horizon::SATURATION.iter().any(|h| thresholds.contains_key(h)) {
            return Err(ConfigError::MissingSaturationThreshold(config.name.clone()));
        }

        Ok(ThresholdProfile {
            name: config.name.clone(),
            description: config.description.clone(),
            thresholds,
        })
    }
}

/// Reads the forecast API key, loading `.env` first if present.
pub fn api_key() -> Option<String> {
    dotenv::dotenv().ok();
    std::env::var(API_KEY_VAR).ok().filter(|k| !k.trim().is_empty())
}
