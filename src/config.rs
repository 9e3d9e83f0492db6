//! Runtime configuration
//!
//! Loaded from an optional JSON file. Every field has a default, so a file
//! only needs to name what it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Config file picked up from the working directory when none is named
pub const DEFAULT_CONFIG_PATH: &str = "glowfield.json";

pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const DEFAULT_MQTT_TOPIC: &str = "glowfield/pointer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Simulated time added per frame, independent of real frame timing
    pub time_step: f32,
    /// Pointer stillness after which particles spread out into the grid
    pub idle_threshold_ms: u64,
    /// Opacity of the black overlay composited before each frame
    pub trail_opacity: f32,
    /// Fixed RNG seed; clock-seeded when absent
    pub seed: Option<u64>,
    /// Upper clamp on the responsive particle count
    pub max_particles: Option<usize>,
    pub mqtt: Option<MqttConfig>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            time_step: 0.016,
            idle_threshold_ms: 300,
            trail_opacity: 0.5,
            seed: None,
            max_particles: None,
            mqtt: None,
        }
    }
}

/// Broker for the remote pointer feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub topic: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_MQTT_PORT,
            topic: DEFAULT_MQTT_TOPIC.to_string(),
        }
    }
}

impl MqttConfig {
    /// Parse `HOST` or `HOST:PORT`
    pub fn from_address(address: &str) -> Option<Self> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }
        let (host, port) = match address.rsplit_once(':') {
            Some((host, port)) => (host, port.parse().ok()?),
            None => (address, DEFAULT_MQTT_PORT),
        };
        Some(Self {
            host: host.to_string(),
            port,
            ..Self::default()
        })
    }
}

impl FieldConfig {
    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the named file, or the default file if it exists, or defaults.
    /// Only an explicitly named file is required to exist.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = FieldConfig::from_json("{}").unwrap();
        assert_eq!(config, FieldConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            FieldConfig::from_json(r#"{ "seed": 7, "max_particles": 100, "mqtt": { "host": "broker" } }"#)
                .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_particles, Some(100));
        assert_eq!(config.time_step, 0.016);
        let mqtt = config.mqtt.unwrap();
        assert_eq!(mqtt.host, "broker");
        assert_eq!(mqtt.port, DEFAULT_MQTT_PORT);
        assert_eq!(mqtt.topic, DEFAULT_MQTT_TOPIC);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(FieldConfig::from_json(r#"{ "time_step": "fast" }"#).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = FieldConfig::resolve(Some(Path::new("/nonexistent/glowfield.json"))).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("glowfield-test-{}.json", std::process::id()));
        let config = FieldConfig {
            seed: Some(99),
            trail_opacity: 0.25,
            ..FieldConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = FieldConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_into_missing_dir_is_write_error() {
        let err = FieldConfig::default()
            .save("/nonexistent/dir/glowfield.json")
            .unwrap_err();
        assert!(matches!(err, Error::ConfigWrite { .. }));
        assert!(err.to_string().starts_with("failed to write config"));
    }

    #[test]
    fn test_mqtt_address() {
        let cfg = MqttConfig::from_address("10.0.0.2:1999").unwrap();
        assert_eq!((cfg.host.as_str(), cfg.port), ("10.0.0.2", 1999));
        let cfg = MqttConfig::from_address("broker").unwrap();
        assert_eq!((cfg.host.as_str(), cfg.port), ("broker", DEFAULT_MQTT_PORT));
        assert!(MqttConfig::from_address("broker:notaport").is_none());
        assert!(MqttConfig::from_address("").is_none());
    }
}
