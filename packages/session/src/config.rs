//! Application configuration.
//!
//! Read from a TOML file whose path comes from the command line, then the
//! `VAXMAP_CONFIG` environment variable, then `vaxmap.toml` in the working
//! directory. Every section has defaults, so a missing file is not an
//! error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vaxmap_classify::ClassifierConfig;
use vaxmap_metrics_models::{MetricKind, RegionId, SelectedMetrics};
use vaxmap_playback::PlaybackConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "VAXMAP_CONFIG";

/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "vaxmap.toml";

/// Regions dropped from the map: Antarctica and Greenland.
pub const DEFAULT_EXCLUDED_REGIONS: &[u32] = &[10, 304];

/// Errors that can occur while reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`AppConfig`].
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Locations of the two input datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// `TopoJSON` world topology.
    pub topology: PathBuf,
    /// Flat JSON array of metric records.
    pub records: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            topology: PathBuf::from("static/data/world-50m.json"),
            records: PathBuf::from("static/data/records.json"),
        }
    }
}

/// Initial view settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Metrics toggled on at startup.
    pub default_metrics: SelectedMetrics,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_metrics: [MetricKind::Incidents].into_iter().collect(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Region ids never drawn.
    pub excluded_regions: Vec<RegionId>,
    /// Dataset locations.
    pub data: DataConfig,
    /// Playback range and speed.
    pub playback: PlaybackConfig,
    /// Thresholds and palette.
    pub classifier: ClassifierConfig,
    /// Initial view settings.
    pub view: ViewConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            excluded_regions: DEFAULT_EXCLUDED_REGIONS
                .iter()
                .copied()
                .map(RegionId::new)
                .collect(),
            data: DataConfig::default(),
            playback: PlaybackConfig::default(),
            classifier: ClassifierConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Loads the config at `path`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                log::info!("Loading config from {}", path.display());
                Self::from_toml_str(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Picks the config path: explicit argument, then `VAXMAP_CONFIG`, then
    /// [`DEFAULT_CONFIG_PATH`].
    #[must_use]
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}
