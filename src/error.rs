//! Error types for the IMU monitor.
//!
//! Acquisition failures, configuration problems and terminal I/O all surface
//! through [`MonitorError`]. Normalization never fails, so the engine has no
//! error variant of its own.

use std::io;
use thiserror::Error;

/// Error type for monitor operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A sensor source could not produce a sample.
    #[error("failed to read from '{source_id}': {message}")]
    Acquisition {
        /// The sensor source that failed.
        source_id: &'static str,
        /// Error message describing the failure.
        message: String,
    },

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Configuration file exists but could not be read.
    #[error("cannot read configuration file {path}: {message}")]
    ConfigRead {
        /// Path that was opened.
        path: String,
        /// Underlying I/O error.
        message: String,
    },

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },

    /// Terminal initialization or rendering error.
    #[error("terminal error: {0}")]
    TerminalError(#[from] io::Error),

    /// Installing the shutdown signal handlers failed.
    #[error("failed to install signal handler: {0}")]
    SignalSetup(String),
}

impl MonitorError {
    /// Builds an acquisition error for the given source.
    pub fn acquisition(source_id: &'static str, message: impl Into<String>) -> Self {
        Self::Acquisition { source_id, message: message.into() }
    }

    /// Returns true if this error came from a sensor source.
    #[must_use]
    pub fn is_acquisition(&self) -> bool {
        matches!(self, Self::Acquisition { .. })
    }
}

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
