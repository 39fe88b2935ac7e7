//! Configuration loading and validation

use anyhow::Result;
use kinetrace_core::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Number of synthetic frames to record
    #[serde(default = "default_frames")]
    pub frames: u64,
    /// Simulated frame rate in Hz
    #[serde(default = "default_rate")]
    pub rate_hz: f64,
    /// Device description registered with the collector
    #[serde(default = "default_device")]
    pub device: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            rate_hz: default_rate(),
            device: default_device(),
        }
    }
}

impl CaptureConfig {
    /// Configured rate, with non-positive or non-finite values replaced by
    /// the default. Sub-1 Hz rates are legitimate and pass through.
    pub fn effective_rate_hz(&self) -> f64 {
        if self.rate_hz.is_finite() && self.rate_hz > 0.0 {
            self.rate_hz
        } else {
            default_rate()
        }
    }
}

fn default_frames() -> u64 {
    600
}

fn default_rate() -> f64 {
    90.0
}

fn default_device() -> String {
    "Simulated HMD (synthetic source)".to_string()
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let config = Config {
        session: SessionConfig {
            collector_base_url: "https://collector.example.com".to_string(),
            ..SessionConfig::default()
        },
        capture: CaptureConfig::default(),
    };

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.capture.frames, 600);
        assert_eq!(config.capture.rate_hz, 90.0);
        assert_eq!(config.session.max_samples_per_file, 5400);
        assert!(config.session.enable_cloud_upload);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kinetrace.toml");
        std::fs::write(
            &path,
            "[session]\nmax_samples_per_file = 4\n\n[capture]\nframes = 12\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.session.max_samples_per_file, 4);
        assert_eq!(config.capture.frames, 12);
        assert!(config.session.enable_local_backup);
        assert_eq!(config.capture.device, default_device());
    }

    #[test]
    fn sub_hertz_rates_pass_through() {
        let config = CaptureConfig {
            rate_hz: 0.5,
            ..CaptureConfig::default()
        };
        assert_eq!(config.effective_rate_hz(), 0.5);
    }

    #[test]
    fn invalid_rates_fall_back_to_default() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let config = CaptureConfig {
                rate_hz: bad,
                ..CaptureConfig::default()
            };
            assert_eq!(config.effective_rate_hz(), 90.0);
        }
    }

    #[test]
    fn saved_default_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kinetrace.toml");
        save_default_config(&path).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(
            config.session.collector_base_url,
            "https://collector.example.com"
        );
        assert_eq!(config.capture.frames, 600);
    }
}
