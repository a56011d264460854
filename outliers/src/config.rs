//! Batch configuration, read from YAML.

use std::path::{Path, PathBuf};

use common::{LogConfig, default_max_concurrent_tasks};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame files read at once.
    pub max_concurrent_loads: usize,
    /// Output files written at once.
    pub max_concurrent_saves: usize,
    /// Frames processed on their own task at once; the rest run inline.
    pub max_concurrent_tasks: u64,
    /// Hough histogram bucket width in degrees. Must divide 360.
    pub histogram_increment: u32,
    /// Blobs refuse merges that would grow them past this many pixels.
    pub max_blob_size: Option<usize>,
    /// Frames with more pixels than this are rejected before rectification.
    pub max_frame_pixels: usize,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_loads: 8,
            max_concurrent_saves: 4,
            max_concurrent_tasks: default_max_concurrent_tasks(),
            histogram_increment: 5,
            max_blob_size: None,
            max_frame_pixels: 1 << 28,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml, path)
    }

    pub fn validate(&self) {
        assert!(
            self.max_concurrent_loads > 0,
            "max_concurrent_loads must be positive"
        );
        assert!(
            self.max_concurrent_saves > 0,
            "max_concurrent_saves must be positive"
        );
        assert!(
            self.max_concurrent_tasks > 0,
            "max_concurrent_tasks must be positive"
        );
        assert!(
            self.histogram_increment > 0 && 360 % self.histogram_increment == 0,
            "histogram_increment must divide 360"
        );
        assert!(
            self.max_frame_pixels > 0,
            "max_frame_pixels must be positive"
        );
        if let Some(max_blob_size) = self.max_blob_size {
            assert!(max_blob_size > 0, "max_blob_size must be positive");
        }
    }
}
