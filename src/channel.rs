//! Per-axis channel state and the fixed table that owns it.

use crate::filter::{self, SmoothingRatio};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// A raw sample as produced by the 16-bit sensor devices.
pub type RawSample = i16;

/// Number of tracked channels: three per sensor group plus temperature.
pub const CHANNEL_COUNT: usize = 10;

/// A physical sensor feeding one or more channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorGroup {
    /// ADXL345-class three-axis accelerometer.
    Accelerometer,
    /// HMC5883L-class three-axis magnetometer (compass).
    Magnetometer,
    /// ITG-3200-class three-axis gyroscope with die temperature.
    Gyroscope,
}

impl SensorGroup {
    /// All groups in display order.
    pub const ALL: [SensorGroup; 3] =
        [SensorGroup::Accelerometer, SensorGroup::Magnetometer, SensorGroup::Gyroscope];

    /// Returns the X/Y/Z channels fed by this group.
    #[must_use]
    pub fn axes(self) -> [ChannelId; 3] {
        match self {
            Self::Accelerometer => [ChannelId::AccelX, ChannelId::AccelY, ChannelId::AccelZ],
            Self::Magnetometer => [ChannelId::MagX, ChannelId::MagY, ChannelId::MagZ],
            Self::Gyroscope => [ChannelId::GyroX, ChannelId::GyroY, ChannelId::GyroZ],
        }
    }

    /// Returns true if this group also reports temperature.
    #[must_use]
    pub fn has_temperature(self) -> bool {
        matches!(self, Self::Gyroscope)
    }

    /// Human-readable name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Accelerometer => "Accelerometer",
            Self::Magnetometer => "Compass",
            Self::Gyroscope => "Gyroscope",
        }
    }
}

impl fmt::Display for SensorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of one tracked channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelId {
    /// Accelerometer X axis.
    AccelX,
    /// Accelerometer Y axis.
    AccelY,
    /// Accelerometer Z axis.
    AccelZ,
    /// Magnetometer X axis.
    MagX,
    /// Magnetometer Y axis.
    MagY,
    /// Magnetometer Z axis.
    MagZ,
    /// Gyroscope X axis.
    GyroX,
    /// Gyroscope Y axis.
    GyroY,
    /// Gyroscope Z axis.
    GyroZ,
    /// Gyroscope die temperature.
    Temperature,
}

impl ChannelId {
    /// All channels in table order.
    pub const ALL: [ChannelId; CHANNEL_COUNT] = [
        ChannelId::AccelX,
        ChannelId::AccelY,
        ChannelId::AccelZ,
        ChannelId::MagX,
        ChannelId::MagY,
        ChannelId::MagZ,
        ChannelId::GyroX,
        ChannelId::GyroY,
        ChannelId::GyroZ,
        ChannelId::Temperature,
    ];

    /// Position of this channel in a [`ChannelTable`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The sensor group that produces this channel.
    #[must_use]
    pub fn group(self) -> SensorGroup {
        match self {
            Self::AccelX | Self::AccelY | Self::AccelZ => SensorGroup::Accelerometer,
            Self::MagX | Self::MagY | Self::MagZ => SensorGroup::Magnetometer,
            Self::GyroX | Self::GyroY | Self::GyroZ | Self::Temperature => SensorGroup::Gyroscope,
        }
    }

    /// Short name, e.g. `"accel.x"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AccelX => "accel.x",
            Self::AccelY => "accel.y",
            Self::AccelZ => "accel.z",
            Self::MagX => "mag.x",
            Self::MagY => "mag.y",
            Self::MagZ => "mag.z",
            Self::GyroX => "gyro.x",
            Self::GyroY => "gyro.y",
            Self::GyroZ => "gyro.z",
            Self::Temperature => "gyro.temp",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Latest sample and derived statistics for one axis.
///
/// After [`ChannelState::seeded`] every field equals the first raw sample.
/// After any [`ChannelState::update`], `min <= smoothed <= max` and
/// `normalized` lies in `[-1, +1]` (exactly `0` while `min == max`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelState {
    /// Latest raw sample in sensor-native units.
    pub raw: RawSample,
    /// Exponentially smoothed estimate of `raw`.
    pub smoothed: f64,
    /// Lowest smoothed value seen.
    pub min: f64,
    /// Highest smoothed value seen.
    pub max: f64,
    /// `smoothed` rescaled into `[-1, +1]` against `min`/`max`.
    pub normalized: f64,
}

impl ChannelState {
    /// Creates a channel seeded from its first sample.
    #[must_use]
    pub fn seeded(raw: RawSample) -> Self {
        let mut state = Self::default();
        filter::init(&mut state, raw);
        state
    }

    /// Re-seeds this channel from `raw`.
    pub fn init(&mut self, raw: RawSample) {
        filter::init(self, raw);
    }

    /// Folds a new sample into this channel.
    pub fn update(&mut self, raw: RawSample, alpha: SmoothingRatio) {
        filter::update(self, raw, alpha);
    }

    /// Width of the observed range.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Fixed-size table holding every channel, indexed by [`ChannelId`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelTable {
    channels: [ChannelState; CHANNEL_COUNT],
}

impl ChannelTable {
    /// Creates a zeroed table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state for `id`.
    #[must_use]
    pub fn get(&self, id: ChannelId) -> &ChannelState {
        &self.channels[id.index()]
    }

    /// Returns the states for a group's X/Y/Z axes.
    #[must_use]
    pub fn axes(&self, group: SensorGroup) -> [&ChannelState; 3] {
        group.axes().map(|id| self.get(id))
    }

    /// Iterates channels in table order.
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, &ChannelState)> {
        ChannelId::ALL.into_iter().zip(self.channels.iter())
    }
}

impl Index<ChannelId> for ChannelTable {
    type Output = ChannelState;

    fn index(&self, id: ChannelId) -> &ChannelState {
        &self.channels[id.index()]
    }
}

impl IndexMut<ChannelId> for ChannelTable {
    fn index_mut(&mut self, id: ChannelId) -> &mut ChannelState {
        &mut self.channels[id.index()]
    }
}
