//! Painting configuration, stored as JSON

use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::growth::GrowthConfig;
use crate::render::RenderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// File the binary looks for in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "tendril.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    pub width: u32,
    pub height: u32,
    /// Growth ticks per second
    pub tick_hz: u32,
    /// Fixed RNG seed; entropy when absent
    pub seed: Option<u64>,
    pub growth: GrowthConfig,
    pub render: RenderConfig,
    /// History entries needed before recall is considered
    pub memory_threshold: usize,
    /// Hues in [0, 1) that new colors lean toward
    pub preferred_hues: Vec<f64>,
    /// Brush samples averaged per tick
    pub smoothing_window: usize,
    /// Refuse to start a stroke inside the previous stroke's last blob
    pub forbid_start_inside_hull: bool,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_hz: 30,
            seed: None,
            growth: GrowthConfig::default(),
            render: RenderConfig::default(),
            memory_threshold: 3,
            preferred_hues: Vec::new(),
            smoothing_window: 4,
            forbid_start_inside_hull: false,
        }
    }
}

impl PaintConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` if it exists, otherwise defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::invalid(
                "resolution",
                format!("{}x{} has no pixels", self.width, self.height),
            ));
        }
        if self.tick_hz == 0 {
            return Err(ConfigError::invalid("tick_hz", "must be at least 1"));
        }
        if self.smoothing_window == 0 {
            return Err(ConfigError::invalid("smoothing_window", "must be at least 1"));
        }
        if let Some(h) = self.preferred_hues.iter().find(|h| !(0.0..1.0).contains(*h)) {
            return Err(ConfigError::invalid("preferred_hues", format!("{} is outside [0, 1)", h)));
        }
        let gain = self.render.ink_gain;
        if !gain.is_finite() || gain < 0.0 {
            return Err(ConfigError::invalid("render.ink_gain", format!("{} is not a usable gain", gain)));
        }
        self.growth.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tendril-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(PaintConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_json_round_trip() {
        let path = temp_path("roundtrip");
        let config = PaintConfig {
            seed: Some(42),
            preferred_hues: vec![0.1, 0.6],
            ..PaintConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = PaintConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PaintConfig = serde_json::from_str(r#"{"width": 320, "growth": {"lifespan": 10}}"#).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.growth.lifespan, 10);
        assert_eq!(config.growth.max_blobs, GrowthConfig::default().max_blobs);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            PaintConfig {
                width: 0,
                ..PaintConfig::default()
            },
            PaintConfig {
                tick_hz: 0,
                ..PaintConfig::default()
            },
            PaintConfig {
                preferred_hues: vec![1.5],
                ..PaintConfig::default()
            },
            PaintConfig {
                growth: GrowthConfig {
                    lifespan: 0,
                    ..GrowthConfig::default()
                },
                ..PaintConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
        }
    }

    #[test]
    fn test_missing_file() {
        let path = temp_path("missing");
        assert!(matches!(PaintConfig::load(&path), Err(ConfigError::Io { .. })));
        assert_eq!(PaintConfig::load_or_default(&path).unwrap(), PaintConfig::default());
    }

    #[test]
    fn test_malformed_file() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ not json").unwrap();
        let result = PaintConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
