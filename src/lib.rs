//! # imu-monitor
//!
//! Live conditioning and display of a nine-axis IMU (accelerometer,
//! magnetometer, gyroscope) plus the gyroscope's die temperature.
//!
//! Every axis is tracked by a [`ChannelState`]: an exponential moving average
//! of the raw samples, the running min/max of that average, and the average
//! rescaled into `[-1, +1]` against those bounds. A [`SamplingLoop`] reads
//! each [`SensorSource`], updates all ten channels, hands the table to a
//! [`DisplaySink`], sleeps for the sampling period and polls a
//! [`ShutdownFlag`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use imu_monitor::prelude::*;
//!
//! let config = Config::default();
//! let shutdown = ShutdownFlag::new();
//! install_signal_handlers(&shutdown)?;
//!
//! let sources = SimulatedSource::all(config.source.seed, config.source.noise);
//! let display = TerminalDisplay::new(config.display.clone())?;
//! let summary = SamplingLoop::new(sources, display, shutdown, &config)?.run()?;
//! ```
//!
//! ## Modules
//!
//! - **filter**: smoothing ratio, `init`/`update` engine
//! - **channel**: channel identities, per-channel state, the channel table
//! - **controller**: the sampling loop state machine
//! - **source** / **display**: collaborator traits and implementations
//! - **config**: YAML configuration
//! - **debug**: opt-in logging macros

#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

// ============================================================================
// Ambient
// ============================================================================

pub mod debug;
pub mod error;

pub use error::{MonitorError, Result};

// ============================================================================
// Signal conditioning
// ============================================================================

pub mod channel;
pub mod filter;

pub use channel::{ChannelId, ChannelState, ChannelTable, RawSample, SensorGroup, CHANNEL_COUNT};
pub use filter::SmoothingRatio;

// ============================================================================
// Collaborators
// ============================================================================

pub mod display;
pub mod shutdown;
pub mod source;
pub mod temperature;
pub mod theme;
pub mod widgets;

pub use display::{DisplaySink, HeadlessDisplay, TerminalDisplay};
pub use shutdown::{install_signal_handlers, ShutdownFlag};
pub use source::{BoxedSource, GroupSample, SensorSource, SimulatedSource};

// ============================================================================
// Application
// ============================================================================

pub mod config;
pub mod controller;

pub use config::Config;
pub use controller::{Delay, Phase, RunSummary, SamplingLoop, ThreadDelay};

/// Commonly used types.
pub mod prelude {
    pub use crate::channel::{ChannelId, ChannelState, ChannelTable, SensorGroup};
    pub use crate::config::Config;
    pub use crate::controller::{Delay, RunSummary, SamplingLoop, ThreadDelay};
    pub use crate::display::{DisplaySink, HeadlessDisplay, TerminalDisplay};
    pub use crate::error::{MonitorError, Result};
    pub use crate::filter::SmoothingRatio;
    pub use crate::shutdown::{install_signal_handlers, ShutdownFlag};
    pub use crate::source::{GroupSample, SensorSource, SimulatedSource};
}
