//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DifftrailError, DifftrailResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default blend parameters.
    pub blend: BlendDefaults,

    /// Live capture and buffering parameters.
    pub capture: CaptureDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default blend parameters used when the caller does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendDefaults {
    /// Blend mode name (e.g. "fast-approx-color-trail") or index ("0".."4").
    pub mode: String,

    /// Change threshold in [0, 255].
    pub threshold: u8,

    /// Upper bound on `(frames - 1) * width * height`. `None` disables the guard.
    pub pixel_budget: Option<u64>,
}

/// Live capture parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Interval between grabs in milliseconds.
    pub interval_ms: u64,

    /// Number of frames kept in the live buffer.
    pub buffer_capacity: usize,

    /// Maximum trail recomputations per second while capturing.
    pub recompute_hz: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "difftrail=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for BlendDefaults {
    fn default() -> Self {
        Self {
            mode: "fast-approx-color-trail".to_string(),
            threshold: 30,
            pixel_budget: None,
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            interval_ms: 16,
            buffer_capacity: 100,
            recompute_hz: 4,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> DifftrailResult<Self> {
        if !path.exists() {
            return Err(DifftrailError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> DifftrailResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> DifftrailResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values that would make capture or buffering meaningless.
    pub fn validate(&self) -> DifftrailResult<()> {
        if self.capture.interval_ms == 0 {
            return Err(DifftrailError::config("capture.interval_ms must be > 0"));
        }
        if self.capture.buffer_capacity == 0 {
            return Err(DifftrailError::config(
                "capture.buffer_capacity must be > 0",
            ));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("difftrail").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_live_capture_setup() {
        let config = AppConfig::default();
        assert_eq!(config.blend.threshold, 30);
        assert_eq!(config.blend.mode, "fast-approx-color-trail");
        assert_eq!(config.capture.interval_ms, 16);
        assert_eq!(config.capture.buffer_capacity, 100);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"blend":{"threshold":12}}"#).unwrap();
        assert_eq!(config.blend.threshold, 12);
        assert_eq!(config.blend.mode, "fast-approx-color-trail");
        assert_eq!(config.capture.buffer_capacity, 100);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("difftrail_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.blend.threshold = 5;
        config.capture.recompute_hz = 10;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.blend.threshold, 5);
        assert_eq!(loaded.capture.recompute_hz, 10);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = AppConfig::default();
        config.capture.interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(DifftrailError::Config { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let path = std::env::temp_dir().join("difftrail_no_such_config.json");
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(DifftrailError::FileNotFound { .. })
        ));
    }
}
