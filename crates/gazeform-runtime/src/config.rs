//! Module configuration
//!
//! Loaded from JSON. Every field is optional; an empty object yields the
//! shipped defaults.
//!
//! ```json
//! {
//!   "name": "quest-pro",
//!   "tick_interval": "10ms",
//!   "calibration": { "gaze": "linear" },
//!   "log": { "level": "debug", "json": true }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use gazeform_calibrate::CalibrationConfig;
use serde::{Deserialize, Serialize};

use crate::RuntimeResult;

/// Logger configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Tracking module configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Name used in log output
    pub name: String,
    /// Pause after each update
    #[serde(with = "human_duration")]
    pub tick_interval: Duration,
    pub calibration: CalibrationConfig,
    pub log: LogConfig,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        ModuleConfig {
            name: "gazeform".to_string(),
            tick_interval: Duration::from_millis(10),
            calibration: CalibrationConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl ModuleConfig {
    pub fn from_json_str(json: &str) -> RuntimeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> RuntimeResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> RuntimeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Override the tick interval from a human duration such as `"16ms"`
    pub fn set_tick_interval(&mut self, interval: &str) -> RuntimeResult<()> {
        self.tick_interval = humantime::parse_duration(interval)?;
        Ok(())
    }
}

mod human_duration {
    use std::time::Duration;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuntimeError;
    use gazeform_calibrate::{GazeMode, MouthClosedBlend};
    use proptest::prelude::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = ModuleConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ModuleConfig::default());
        assert_eq!(config.tick_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_full_config() {
        let config = ModuleConfig::from_json_str(
            r#"{
                "name": "quest-pro",
                "tick_interval": "16ms",
                "calibration": { "gaze": "linear", "mouth_closed": "lips_toward_capped_by_jaw" },
                "log": { "level": "debug", "json": true }
            }"#,
        )
        .unwrap();

        assert_eq!(config.name, "quest-pro");
        assert_eq!(config.tick_interval, Duration::from_millis(16));
        assert_eq!(config.calibration.gaze, GazeMode::Linear);
        assert_eq!(config.calibration.mouth_closed, MouthClosedBlend::LipsTowardCappedByJaw);
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
    }

    #[test]
    fn test_bad_duration_rejected() {
        let result = ModuleConfig::from_json_str(r#"{ "tick_interval": "soon" }"#);
        assert!(matches!(result, Err(RuntimeError::Config(_))));

        let mut config = ModuleConfig::default();
        assert!(matches!(
            config.set_tick_interval("ten"),
            Err(RuntimeError::Duration(_))
        ));
        config.set_tick_interval("2ms").unwrap();
        assert_eq!(config.tick_interval, Duration::from_millis(2));
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = ModuleConfig::default();
        config.tick_interval = Duration::from_millis(250);
        config.calibration = CalibrationConfig::linear_gaze();

        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"250ms\""));
        assert_eq!(ModuleConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let result = ModuleConfig::from_json_file("/nonexistent/gazeform.json");
        assert!(matches!(result, Err(RuntimeError::Io(_))));
    }

    proptest! {
        #[test]
        fn prop_tick_interval_survives_json(millis in 0u64..600_000) {
            let config = ModuleConfig {
                tick_interval: Duration::from_millis(millis),
                ..Default::default()
            };
            let json = config.to_json_string().unwrap();
            prop_assert_eq!(ModuleConfig::from_json_str(&json).unwrap(), config);
        }
    }
}
