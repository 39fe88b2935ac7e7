//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default flush threshold: 60 seconds of 90 Hz frames
pub const DEFAULT_MAX_SAMPLES_PER_FILE: usize = 5400;

/// Configuration for one recording session.
///
/// Supplied at pipeline initialization and replaceable wholesale afterwards;
/// flush decisions always read the config in effect when the trigger fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base URL of the remote collector REST root (no trailing slash needed)
    #[serde(default)]
    pub collector_base_url: String,
    /// API key, sent as both bearer token and `apikey` header
    #[serde(default)]
    pub api_key: String,
    /// Buffered samples per backup file; reaching this count triggers a flush
    #[serde(default = "default_max_samples")]
    pub max_samples_per_file: usize,
    /// Write each flushed batch to a local CSV file
    #[serde(default = "default_enabled")]
    pub enable_local_backup: bool,
    /// Send each flushed batch to the remote collector
    #[serde(default = "default_enabled")]
    pub enable_cloud_upload: bool,
    /// Directory local backup files are written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            collector_base_url: String::new(),
            api_key: String::new(),
            max_samples_per_file: default_max_samples(),
            enable_local_backup: default_enabled(),
            enable_cloud_upload: default_enabled(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES_PER_FILE
}

fn default_enabled() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
