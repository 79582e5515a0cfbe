//! Sampling loop.
//!
//! [`SamplingLoop`] walks a three-phase state machine:
//!
//! - **Initializing**: read every source once and seed each channel.
//! - **Running**: read every source, update every channel, render, sleep for
//!   the configured period, then poll the shutdown flag.
//! - **Stopping**: close the display sink and drop every source.
//!
//! Stopping runs on every exit path. A failed read is fatal in both
//! Initializing and Running; it is returned unchanged after Stopping.

use crate::channel::{ChannelId, ChannelTable, SensorGroup};
use crate::config::Config;
use crate::display::DisplaySink;
use crate::error::{MonitorError, Result};
use crate::filter::SmoothingRatio;
use crate::shutdown::ShutdownFlag;
use crate::source::{BoxedSource, GroupSample};
use std::time::Duration;

/// Loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Seeding channels from the first samples.
    Initializing,
    /// Sampling, updating and rendering.
    Running,
    /// Releasing resources. Terminal.
    Stopping,
}

/// Blocking pause between iterations.
pub trait Delay {
    /// Suspends the loop for `period`.
    fn delay(&mut self, period: Duration);
}

/// [`Delay`] backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, period: Duration) {
        if !period.is_zero() {
            std::thread::sleep(period);
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Iterations that reached the render step.
    pub iterations: u64,
    /// Channel values at shutdown.
    pub channels: ChannelTable,
}

/// Drives acquisition, conditioning and rendering until shutdown.
pub struct SamplingLoop<S: DisplaySink, D: Delay = ThreadDelay> {
    sources: Vec<BoxedSource>,
    sink: S,
    shutdown: ShutdownFlag,
    delay: D,
    period: Duration,
    alpha: SmoothingRatio,
    channels: ChannelTable,
    phase: Phase,
    max_iterations: Option<u64>,
    /// Samples of the current iteration, reused to avoid per-tick allocation.
    pending: Vec<(SensorGroup, GroupSample)>,
}

impl<S: DisplaySink> SamplingLoop<S, ThreadDelay> {
    /// Creates a loop over already-opened sources.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ConfigInvalid`] if two sources feed the same
    /// sensor group.
    pub fn new(
        sources: Vec<BoxedSource>,
        sink: S,
        shutdown: ShutdownFlag,
        config: &Config,
    ) -> Result<Self> {
        for (i, source) in sources.iter().enumerate() {
            if let Some(other) = sources[..i].iter().find(|s| s.group() == source.group()) {
                return Err(MonitorError::ConfigInvalid {
                    key: "sources".to_string(),
                    message: format!(
                        "'{}' and '{}' both feed the {}",
                        other.id(),
                        source.id(),
                        source.group()
                    ),
                });
            }
        }

        let pending = Vec::with_capacity(sources.len());
        Ok(Self {
            sources,
            sink,
            shutdown,
            delay: ThreadDelay,
            period: config.period(),
            alpha: config.smoothing_ratio(),
            channels: ChannelTable::new(),
            phase: Phase::Initializing,
            max_iterations: None,
            pending,
        })
    }
}

impl<S: DisplaySink, D: Delay> SamplingLoop<S, D> {
    /// Replaces the pause between iterations.
    #[must_use]
    pub fn with_delay<D2: Delay>(self, delay: D2) -> SamplingLoop<S, D2> {
        SamplingLoop {
            sources: self.sources,
            sink: self.sink,
            shutdown: self.shutdown,
            delay,
            period: self.period,
            alpha: self.alpha,
            channels: self.channels,
            phase: self.phase,
            max_iterations: self.max_iterations,
            pending: self.pending,
        }
    }

    /// Stops after `iterations` renders even without a shutdown request.
    ///
    /// The limit is checked after each render, so a run always renders at
    /// least once: the loop performs `max(1, iterations)` iterations.
    #[must_use]
    pub fn with_iteration_limit(mut self, iterations: u64) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Smoothing ratio applied on every update.
    #[must_use]
    pub fn smoothing_ratio(&self) -> SmoothingRatio {
        self.alpha
    }

    /// Current channel values.
    #[must_use]
    pub fn channels(&self) -> &ChannelTable {
        &self.channels
    }

    /// Runs until shutdown or a failed read.
    ///
    /// Consumes the loop so every source and the sink are released whatever
    /// the outcome.
    ///
    /// # Errors
    ///
    /// Returns the first [`MonitorError::Acquisition`] raised by a source.
    pub fn run(mut self) -> Result<RunSummary> {
        crate::info!(
            "sampler",
            "starting: {} sources, period {:?}, alpha {:.4}",
            self.sources.len(),
            self.period,
            self.alpha.get()
        );

        let result = self.initialize().and_then(|()| self.run_loop());
        self.stop();

        match result {
            Ok(iterations) => {
                crate::info!("sampler", "stopped after {iterations} iterations");
                Ok(RunSummary { iterations, channels: self.channels })
            }
            Err(e) => {
                crate::error!("sampler", "stopped on error: {e}");
                Err(e)
            }
        }
    }

    fn enter(&mut self, phase: Phase) {
        crate::debug!("sampler", "{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.sink.on_phase(phase);
    }

    fn initialize(&mut self) -> Result<()> {
        self.enter(Phase::Initializing);
        self.acquire()?;
        for (group, sample) in &self.pending {
            for (id, raw) in group.axes().into_iter().zip(sample.axes) {
                self.channels[id].init(raw);
            }
            if let (true, Some(raw)) = (group.has_temperature(), sample.temperature) {
                self.channels[ChannelId::Temperature].init(raw);
            }
        }
        crate::debug!("sampler", "channels seeded");
        Ok(())
    }

    fn run_loop(&mut self) -> Result<u64> {
        self.enter(Phase::Running);
        let mut iterations = 0u64;

        loop {
            self.acquire()?;
            self.apply_updates();
            self.sink.render(&self.channels);
            iterations += 1;

            self.delay.delay(self.period);

            if self.shutdown.is_requested() {
                crate::info!("sampler", "shutdown requested");
                return Ok(iterations);
            }
            if self.max_iterations.is_some_and(|max| iterations >= max) {
                return Ok(iterations);
            }
        }
    }

    /// Reads every source into `pending`. Nothing is applied on failure.
    fn acquire(&mut self) -> Result<()> {
        crate::time_scope!("sampler", "acquire");
        self.pending.clear();
        for source in &mut self.sources {
            match source.read() {
                Ok(sample) => self.pending.push((source.group(), sample)),
                Err(e) => {
                    crate::error!("sampler", "{} read failed in {:?}: {e}", source.id(), self.phase);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn apply_updates(&mut self) {
        for (group, sample) in &self.pending {
            for (id, raw) in group.axes().into_iter().zip(sample.axes) {
                self.channels[id].update(raw, self.alpha);
            }
            if let (true, Some(raw)) = (group.has_temperature(), sample.temperature) {
                self.channels[ChannelId::Temperature].update(raw, self.alpha);
            }
        }
    }

    fn stop(&mut self) {
        self.enter(Phase::Stopping);
        self.sink.close();
        for source in self.sources.drain(..) {
            crate::debug!("sampler", "releasing {}", source.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::HeadlessDisplay;
    use crate::source::SensorSource;
    use approx::assert_relative_eq;
    use std::collections::VecDeque;

    /// Replays scripted samples, then fails.
    struct Scripted {
        group: SensorGroup,
        samples: VecDeque<Result<GroupSample>>,
    }

    impl Scripted {
        fn boxed(group: SensorGroup, samples: Vec<Result<GroupSample>>) -> BoxedSource {
            Box::new(Self { group, samples: samples.into() })
        }
    }

    impl SensorSource for Scripted {
        fn id(&self) -> &'static str {
            "scripted"
        }

        fn group(&self) -> SensorGroup {
            self.group
        }

        fn read(&mut self) -> Result<GroupSample> {
            self.samples
                .pop_front()
                .unwrap_or_else(|| Err(MonitorError::acquisition("scripted", "exhausted")))
        }
    }

    #[derive(Default)]
    struct NoDelay;

    impl Delay for NoDelay {
        fn delay(&mut self, _period: Duration) {}
    }

    #[test]
    fn test_scenario_values_reach_the_table() {
        let accel = Scripted::boxed(
            SensorGroup::Accelerometer,
            vec![
                Ok(GroupSample::xyz(100, 0, 0)),
                Ok(GroupSample::xyz(200, 0, 0)),
                Ok(GroupSample::xyz(50, 0, 0)),
            ],
        );
        let sampler = SamplingLoop::new(
            vec![accel],
            HeadlessDisplay::new(),
            ShutdownFlag::new(),
            &Config::default(),
        )
        .unwrap()
        .with_delay(NoDelay)
        .with_iteration_limit(2);

        let summary = sampler.run().unwrap();
        let x = summary.channels.get(ChannelId::AccelX);

        assert_eq!(summary.iterations, 2);
        assert_eq!(x.raw, 50);
        assert_relative_eq!(x.smoothed, 105.25, epsilon = 1e-9);
        assert_relative_eq!(x.max, 115.0, epsilon = 1e-9);
        assert_relative_eq!(x.normalized, -0.3, epsilon = 1e-9);
        // Constant zero axis stays degenerate.
        assert_eq!(summary.channels.get(ChannelId::AccelY).normalized, 0.0);
    }

    #[test]
    fn test_temperature_follows_gyroscope() {
        let gyro = Scripted::boxed(
            SensorGroup::Gyroscope,
            vec![
                Ok(GroupSample::xyz(1, 2, 3).with_temperature(-16_000)),
                Ok(GroupSample::xyz(1, 2, 3).with_temperature(-15_000)),
            ],
        );
        let summary = SamplingLoop::new(
            vec![gyro],
            HeadlessDisplay::new(),
            ShutdownFlag::new(),
            &Config::default(),
        )
        .unwrap()
        .with_delay(NoDelay)
        .with_iteration_limit(1)
        .run()
        .unwrap();

        let temp = summary.channels.get(ChannelId::Temperature);
        assert_eq!(temp.raw, -15_000);
        assert_relative_eq!(temp.smoothed, -15_850.0, epsilon = 1e-9);
        assert_eq!(summary.channels.get(ChannelId::GyroZ).raw, 3);
    }

    #[test]
    fn test_initial_read_failure_is_fatal() {
        let broken = Scripted::boxed(SensorGroup::Magnetometer, vec![]);
        let err = SamplingLoop::new(
            vec![broken],
            HeadlessDisplay::new(),
            ShutdownFlag::new(),
            &Config::default(),
        )
        .unwrap()
        .with_delay(NoDelay)
        .run()
        .unwrap_err();

        assert!(err.is_acquisition());
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let a = Scripted::boxed(SensorGroup::Gyroscope, vec![]);
        let b = Scripted::boxed(SensorGroup::Gyroscope, vec![]);

        let result =
            SamplingLoop::new(vec![a, b], HeadlessDisplay::new(), ShutdownFlag::new(), &Config::default());

        assert!(matches!(result, Err(MonitorError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_ratio_comes_from_config() {
        let mut config = Config::default();
        config.sampling.period_us = 10_000;

        let sampler =
            SamplingLoop::new(vec![], HeadlessDisplay::new(), ShutdownFlag::new(), &config).unwrap();

        assert_relative_eq!(sampler.smoothing_ratio().get(), 0.05, epsilon = 1e-12);
        assert_eq!(sampler.channels(), &ChannelTable::new());
    }

    #[test]
    fn test_thread_delay_sleeps() {
        let start = std::time::Instant::now();
        ThreadDelay.delay(Duration::from_millis(5));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
