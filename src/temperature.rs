//! Gyroscope die temperature.
//!
//! The ITG-3200 reports temperature as a signed count with 280 LSB/°C and
//! an offset of -13200 counts at 35 °C.

use serde::{Deserialize, Serialize};

/// Counts per degree Celsius.
pub const LSB_PER_CELSIUS: f64 = 280.0;

/// Raw reading that corresponds to [`REFERENCE_CELSIUS`].
pub const REFERENCE_OFFSET: f64 = -13_200.0;

/// Temperature at [`REFERENCE_OFFSET`].
pub const REFERENCE_CELSIUS: f64 = 35.0;

/// Converts a (possibly smoothed) raw reading to degrees Celsius.
#[must_use]
pub fn raw_to_celsius(raw: f64) -> f64 {
    REFERENCE_CELSIUS + (raw - REFERENCE_OFFSET) / LSB_PER_CELSIUS
}

/// Temperature scale for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempScale {
    /// Celsius (default).
    #[default]
    Celsius,
    /// Fahrenheit.
    Fahrenheit,
    /// Kelvin.
    Kelvin,
}

impl TempScale {
    /// Converts temperature from Celsius to this scale.
    #[must_use]
    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            Self::Kelvin => celsius + 273.15,
        }
    }

    /// Converts a raw gyroscope reading straight into this scale.
    #[must_use]
    pub fn from_raw(&self, raw: f64) -> f64 {
        self.convert(raw_to_celsius(raw))
    }

    /// Returns the unit suffix.
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Kelvin => "K",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_point() {
        assert_relative_eq!(raw_to_celsius(-13_200.0), 35.0);
    }

    #[test]
    fn test_slope() {
        assert_relative_eq!(raw_to_celsius(-13_200.0 + 280.0), 36.0);
        assert_relative_eq!(raw_to_celsius(-16_000.0), 25.0);
    }

    #[test]
    fn test_scales() {
        assert_relative_eq!(TempScale::Celsius.convert(25.0), 25.0);
        assert_relative_eq!(TempScale::Fahrenheit.convert(100.0), 212.0);
        assert_relative_eq!(TempScale::Kelvin.convert(0.0), 273.15);
        assert_relative_eq!(TempScale::Fahrenheit.from_raw(-16_000.0), 77.0);
    }

    #[test]
    fn test_suffix() {
        assert_eq!(TempScale::Celsius.suffix(), "°C");
        assert_eq!(TempScale::Kelvin.suffix(), "K");
    }
}
