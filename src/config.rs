use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::identify::{OutputFormat, SeparationModel, SkyTarget, WindowPolicy};
use crate::predict::GroundStation;

const DEFAULT_MAX_ANGLE_DEG: f64 = 1.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Settings as read from a file or the command line. Every field is optional
/// so a value of zero is never mistaken for "not given".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub observer: ObserverConfig,
    pub target: TargetConfig,
    pub max_angle_deg: Option<f64>,
    pub window: WindowConfig,
    pub model: Option<SeparationModel>,
    pub format: Option<OutputFormat>,
    pub tle: Option<PathBuf>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub altitude_m: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub ra_deg: Option<f64>,
    pub dec_deg: Option<f64>,
}

/// Human-readable offsets such as `10m` or `90s`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub station: GroundStation,
    /// `None` means targets are read interactively.
    pub target: Option<SkyTarget>,
    pub max_angle_deg: f64,
    pub window: WindowPolicy,
    pub model: SeparationModel,
    pub format: OutputFormat,
    pub tle: PathBuf,
    pub time: String,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let latitude = self
            .observer
            .latitude_deg
            .ok_or(ConfigError::Missing("observer latitude"))?;
        let longitude = self
            .observer
            .longitude_deg
            .ok_or(ConfigError::Missing("observer longitude"))?;
        let altitude = self
            .observer
            .altitude_m
            .ok_or(ConfigError::Missing("observer altitude"))?;

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ConfigError::Invalid {
                field: "observer latitude",
                message: format!("{} is outside [-90, 90]", latitude),
            });
        }

        let target = match (self.target.ra_deg, self.target.dec_deg) {
            (Some(ra), Some(dec)) => Some(SkyTarget::from_degrees(ra, dec)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("target declination")),
            (None, Some(_)) => return Err(ConfigError::Missing("target right ascension")),
        };

        let defaults = WindowPolicy::default();
        let window = WindowPolicy {
            before: parse_offset("window before", self.window.before.as_deref(), defaults.before)?,
            after: parse_offset("window after", self.window.after.as_deref(), defaults.after)?,
        };
        if window.span().is_none() {
            return Err(ConfigError::Invalid {
                field: "window",
                message: "combined before and after offsets are too long".to_string(),
            });
        }

        Ok(Settings {
            station: GroundStation::new(latitude, longitude, altitude),
            target,
            max_angle_deg: self.max_angle_deg.unwrap_or(DEFAULT_MAX_ANGLE_DEG),
            window,
            model: self.model.unwrap_or_default(),
            format: self.format.unwrap_or_default(),
            tle: self.tle.ok_or(ConfigError::Missing("TLE file"))?,
            time: self.time.ok_or(ConfigError::Missing("exposure end time"))?,
        })
    }
}

fn parse_offset(
    field: &'static str,
    value: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(text) = value else {
        return Ok(default);
    };
    let invalid = |message: String| ConfigError::Invalid { field, message };
    let std_duration = humantime::parse_duration(text.trim()).map_err(|e| invalid(e.to_string()))?;
    Duration::from_std(std_duration).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
observer:
  latitude_deg: 0.0
  longitude_deg: 0.0
  altitude_m: 0.0
target:
  ra_deg: 0.0
  dec_deg: 0.0
max_angle_deg: 0.5
window:
  before: 2m
  after: 30s
model: refracted
format: json
tle: catalog.tle
time: "2024-03-01 12:00:00 0"
"#;

    #[test]
    fn zero_coordinates_are_valid() {
        let settings = Config::from_yaml(FULL).unwrap().resolve().unwrap();
        assert_eq!(settings.station, GroundStation::new(0.0, 0.0, 0.0));
        assert_eq!(settings.target, Some(SkyTarget::from_degrees(0.0, 0.0)));
        assert_eq!(settings.max_angle_deg, 0.5);
        assert_eq!(settings.window.before, Duration::minutes(2));
        assert_eq!(settings.window.after, Duration::seconds(30));
        assert_eq!(settings.model, SeparationModel::Refracted);
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.tle, PathBuf::from("catalog.tle"));
    }

    #[test]
    fn defaults_apply_to_optional_settings() {
        let yaml = r#"
observer: { latitude_deg: 52.0, longitude_deg: 4.5, altitude_m: 10 }
tle: catalog.tle
time: "2024-03-01 12:00:00 0"
"#;
        let settings = Config::from_yaml(yaml).unwrap().resolve().unwrap();
        assert_eq!(settings.target, None);
        assert_eq!(settings.max_angle_deg, 1.0);
        assert_eq!(settings.window, WindowPolicy::default());
        assert_eq!(settings.model, SeparationModel::Direct);
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn missing_observer_is_reported() {
        let yaml = "tle: catalog.tle\ntime: \"2024-03-01 12:00:00 0\"\n";
        let err = Config::from_yaml(yaml).unwrap().resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("observer latitude")));
    }

    #[test]
    fn half_a_target_is_an_error() {
        let mut config = Config::from_yaml(FULL).unwrap();
        config.target.dec_deg = None;
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("target declination")));
    }

    #[test]
    fn bad_window_offset_is_an_error() {
        let mut config = Config::from_yaml(FULL).unwrap();
        config.window.before = Some("ten minutes".to_string());
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "window before", .. }));
    }

    #[test]
    fn overflowing_window_is_an_error() {
        let mut config = Config::from_yaml(FULL).unwrap();
        config.window.before = Some("200000000y".to_string());
        config.window.after = Some("200000000y".to_string());
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "window", .. }));
    }

    #[test]
    fn latitude_out_of_range_is_an_error() {
        let mut config = Config::from_yaml(FULL).unwrap();
        config.observer.latitude_deg = Some(91.0);
        assert!(config.resolve().is_err());
    }
}
