//! Sensor sources.
//!
//! A [`SensorSource`] is the narrow capability the sampling loop needs from a
//! device: read one sample for its group. Bus setup and register
//! configuration happen before a source is handed to the loop, so the engine
//! never sees device specifics.
//!
//! [`SimulatedSource`] produces deterministic synthetic motion for running
//! without hardware.

use crate::channel::{RawSample, SensorGroup};
use crate::error::Result;

/// One acquisition from a sensor group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupSample {
    /// X, Y, Z readings.
    pub axes: [RawSample; 3],
    /// Die temperature, for groups that report it.
    pub temperature: Option<RawSample>,
}

impl GroupSample {
    /// A three-axis sample without temperature.
    #[must_use]
    pub fn xyz(x: RawSample, y: RawSample, z: RawSample) -> Self {
        Self { axes: [x, y, z], temperature: None }
    }

    /// Attaches a temperature reading.
    #[must_use]
    pub fn with_temperature(mut self, temperature: RawSample) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Trait for raw sample providers.
///
/// Implementations own their device handle; dropping the source releases it.
///
/// # Example
///
/// ```rust,ignore
/// use imu_monitor::{GroupSample, MonitorError, Result, SensorGroup, SensorSource};
///
/// struct Fixed;
///
/// impl SensorSource for Fixed {
///     fn id(&self) -> &'static str {
///         "fixed"
///     }
///
///     fn group(&self) -> SensorGroup {
///         SensorGroup::Accelerometer
///     }
///
///     fn read(&mut self) -> Result<GroupSample> {
///         Ok(GroupSample::xyz(0, 0, 256))
///     }
/// }
/// ```
pub trait SensorSource: Send {
    /// Returns the unique identifier for this source.
    ///
    /// Used in error messages and logs.
    fn id(&self) -> &'static str;

    /// The group whose channels this source feeds.
    fn group(&self) -> SensorGroup;

    /// Reads one sample.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Acquisition`](crate::MonitorError::Acquisition)
    /// on bus or device failure. The loop treats this as fatal.
    fn read(&mut self) -> Result<GroupSample>;
}

/// A boxed source for dynamic dispatch.
pub type BoxedSource = Box<dyn SensorSource>;

/// Small xorshift generator; good enough for sensor noise.
#[derive(Debug, Clone)]
struct Xorshift(u64);

impl Xorshift {
    fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[-amplitude, amplitude]`.
    fn jitter(&mut self, amplitude: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        (unit * 2.0 - 1.0) * amplitude
    }
}

/// Deterministic synthetic sensor.
///
/// Each group gets a plausible signal in its native units:
///
/// - accelerometer: about 256 counts of gravity on Z with a slow tilt
/// - magnetometer: a field vector rotating in the horizontal plane
/// - gyroscope: small oscillating rates plus a warming die temperature
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    group: SensorGroup,
    rng: Xorshift,
    noise: f64,
    tick: u64,
}

impl SimulatedSource {
    /// Creates a simulated source for `group`.
    #[must_use]
    pub fn new(group: SensorGroup, seed: u64, noise: f64) -> Self {
        // Give each group its own noise stream.
        let salt = match group {
            SensorGroup::Accelerometer => 0x9E37_79B9,
            SensorGroup::Magnetometer => 0x85EB_CA6B,
            SensorGroup::Gyroscope => 0xC2B2_AE35,
        };
        Self { group, rng: Xorshift::new(seed ^ salt), noise: noise.abs(), tick: 0 }
    }

    /// Creates one source per group, all sharing `seed`.
    #[must_use]
    pub fn all(seed: u64, noise: f64) -> Vec<BoxedSource> {
        SensorGroup::ALL
            .into_iter()
            .map(|group| Box::new(Self::new(group, seed, noise)) as BoxedSource)
            .collect()
    }

    /// Number of samples produced so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    fn sample(&mut self, base: f64) -> RawSample {
        let value = base + self.rng.jitter(self.noise);
        value.round().clamp(f64::from(RawSample::MIN), f64::from(RawSample::MAX)) as RawSample
    }
}

impl SensorSource for SimulatedSource {
    fn id(&self) -> &'static str {
        match self.group {
            SensorGroup::Accelerometer => "sim-accelerometer",
            SensorGroup::Magnetometer => "sim-magnetometer",
            SensorGroup::Gyroscope => "sim-gyroscope",
        }
    }

    fn group(&self) -> SensorGroup {
        self.group
    }

    fn read(&mut self) -> Result<GroupSample> {
        let t = self.tick as f64;
        self.tick += 1;

        let sample = match self.group {
            SensorGroup::Accelerometer => {
                let tilt = (t * 0.02).sin();
                GroupSample::xyz(
                    self.sample(tilt * 120.0),
                    self.sample((t * 0.013).cos() * 80.0),
                    self.sample(256.0 - tilt.abs() * 40.0),
                )
            }
            SensorGroup::Magnetometer => {
                let heading = t * 0.01;
                GroupSample::xyz(
                    self.sample(heading.cos() * 350.0),
                    self.sample(heading.sin() * 350.0),
                    self.sample(-420.0),
                )
            }
            SensorGroup::Gyroscope => {
                // 35 C sits at raw -13200; warm from about 25 C towards 40 C.
                let celsius = 40.0 - 15.0 * (-t / 2000.0).exp();
                let temperature = self.sample((celsius - 35.0) * 280.0 - 13_200.0);
                GroupSample::xyz(
                    self.sample((t * 0.05).sin() * 60.0),
                    self.sample((t * 0.031).cos() * 45.0),
                    self.sample((t * 0.017).sin() * 30.0),
                )
                .with_temperature(temperature)
            }
        };

        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_is_deterministic() {
        let mut a = SimulatedSource::new(SensorGroup::Magnetometer, 7, 25.0);
        let mut b = SimulatedSource::new(SensorGroup::Magnetometer, 7, 25.0);

        for _ in 0..100 {
            assert_eq!(a.read().unwrap(), b.read().unwrap());
        }
        assert_eq!(a.ticks(), 100);
    }

    #[test]
    fn test_seed_changes_noise() {
        let mut a = SimulatedSource::new(SensorGroup::Accelerometer, 1, 25.0);
        let mut b = SimulatedSource::new(SensorGroup::Accelerometer, 2, 25.0);

        let a: Vec<_> = (0..20).map(|_| a.read().unwrap()).collect();
        let b: Vec<_> = (0..20).map(|_| b.read().unwrap()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_only_gyroscope_reports_temperature() {
        for group in SensorGroup::ALL {
            let mut source = SimulatedSource::new(group, 3, 0.0);
            let sample = source.read().unwrap();
            assert_eq!(sample.temperature.is_some(), group.has_temperature(), "{group}");
            assert_eq!(source.group(), group);
        }
    }

    #[test]
    fn test_noiseless_accelerometer_sees_gravity() {
        let mut source = SimulatedSource::new(SensorGroup::Accelerometer, 0, 0.0);
        let sample = source.read().unwrap();
        assert_eq!(sample.axes, [0, 80, 256]);
    }

    #[test]
    fn test_noiseless_temperature_starts_near_room() {
        let mut source = SimulatedSource::new(SensorGroup::Gyroscope, 0, 0.0);
        let sample = source.read().unwrap();
        // 25 C
        assert_eq!(sample.temperature, Some(-16_000));
    }

    #[test]
    fn test_all_builds_one_source_per_group() {
        let sources = SimulatedSource::all(9, 10.0);
        let groups: Vec<_> = sources.iter().map(|s| s.group()).collect();
        assert_eq!(groups, SensorGroup::ALL.to_vec());
    }

    #[test]
    fn test_jitter_stays_in_amplitude() {
        let mut rng = Xorshift::new(0);
        for _ in 0..1000 {
            let j = rng.jitter(5.0);
            assert!((-5.0..=5.0).contains(&j));
        }
    }
}
