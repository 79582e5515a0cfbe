//! Configuration for the IMU monitor.
//!
//! Supports YAML configuration with precedence: CLI > file > defaults.

use crate::channel::SensorGroup;
use crate::error::{MonitorError, Result};
use crate::filter::{SmoothingRatio, DEFAULT_COEFFICIENT};
use crate::temperature::TempScale;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sampling loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Delay between iterations, in microseconds.
    #[serde(default = "default_period_us")]
    pub period_us: u64,

    /// Smoothing time-constant coefficient, per microsecond of period.
    #[serde(default = "default_coefficient")]
    pub smoothing_coefficient: f64,
}

fn default_period_us() -> u64 {
    30_000
}
fn default_coefficient() -> f64 {
    DEFAULT_COEFFICIENT
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { period_us: default_period_us(), smoothing_coefficient: default_coefficient() }
    }
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Scale used for the converted temperature column.
    #[serde(default)]
    pub temperature_scale: TempScale,

    /// Draw a bar meter for each normalized value.
    #[serde(default = "default_show_meters")]
    pub show_meters: bool,

    /// Colours.
    #[serde(default)]
    pub theme: Theme,
}

fn default_show_meters() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            temperature_scale: TempScale::default(),
            show_meters: default_show_meters(),
            theme: Theme::default(),
        }
    }
}

/// Where raw samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Deterministic synthetic signals.
    #[default]
    Simulated,
}

/// Sensor source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source implementation.
    #[serde(default)]
    pub kind: SourceKind,

    /// Seed for simulated noise.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Peak simulated noise, in raw counts.
    #[serde(default = "default_noise")]
    pub noise: f64,

    /// Groups to sample. Channels of omitted groups keep their zero state.
    #[serde(default = "default_groups")]
    pub groups: Vec<SensorGroup>,
}

fn default_seed() -> u64 {
    42
}
fn default_noise() -> f64 {
    40.0
}
fn default_groups() -> Vec<SensorGroup> {
    SensorGroup::ALL.to_vec()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            seed: default_seed(),
            noise: default_noise(),
            groups: default_groups(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Sampling settings.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Display settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Source settings.
    #[serde(default)]
    pub source: SourceConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            sampling: SamplingConfig::default(),
            display: DisplayConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location, `<config_dir>/imu-monitor/config.yaml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("imu-monitor").join("config.yaml"))
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ConfigNotFound`] only when the file does not
    /// exist. Any other read failure is [`MonitorError::ConfigRead`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => MonitorError::ConfigNotFound(path.display().to_string()),
            _ => MonitorError::ConfigRead { path: path.display().to_string(), message: e.to_string() },
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails, or
    /// [`MonitorError::ConfigInvalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            MonitorError::ConfigParse { line, message: e.to_string() }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(path) {
            Err(MonitorError::ConfigNotFound(missing)) => {
                crate::debug!("config", "{missing} not found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Checks values serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ConfigInvalid`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if !self.sampling.smoothing_coefficient.is_finite() {
            return Err(MonitorError::ConfigInvalid {
                key: "sampling.smoothing_coefficient".to_string(),
                message: "must be a finite number".to_string(),
            });
        }
        if !self.source.noise.is_finite() {
            return Err(MonitorError::ConfigInvalid {
                key: "source.noise".to_string(),
                message: "must be a finite number".to_string(),
            });
        }
        for (i, group) in self.source.groups.iter().enumerate() {
            if self.source.groups[..i].contains(group) {
                return Err(MonitorError::ConfigInvalid {
                    key: "source.groups".to_string(),
                    message: format!("'{}' listed more than once", group.label()),
                });
            }
        }
        Ok(())
    }

    /// Returns the sampling period as a Duration.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_micros(self.sampling.period_us)
    }

    /// Smoothing ratio derived from the coefficient and period.
    #[must_use]
    pub fn smoothing_ratio(&self) -> SmoothingRatio {
        SmoothingRatio::from_period(self.sampling.smoothing_coefficient, self.period())
    }
}
