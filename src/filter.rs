//! Adaptive smoothing and normalization.
//!
//! Each channel runs an exponential moving average over its raw samples,
//! tracks the running min/max of the smoothed value, and rescales the
//! smoothed value into `[-1, +1]` against those bounds:
//!
//! ```text
//! smoothed'   = smoothed + (raw - smoothed) * alpha
//! min'        = min(min, smoothed')
//! max'        = max(max, smoothed')
//! normalized' = (smoothed' - min') / (max' - min') * 2 - 1    (0 when max' == min')
//! ```
//!
//! `alpha` comes from the sampling period and a fixed time-constant
//! coefficient, `alpha = K * period_us`. Nothing here allocates, performs I/O
//! or fails.

use crate::channel::{ChannelState, RawSample};
use std::time::Duration;

/// Default time-constant coefficient, per microsecond of sampling period.
pub const DEFAULT_COEFFICIENT: f64 = 0.000_005;

/// Default sampling period.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(30);

/// Blend weight applied to each new sample.
///
/// Values outside `(0, 1)` are accepted as-is: `alpha >= 1` makes the filter
/// follow the raw signal exactly and `alpha <= 0` freezes it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SmoothingRatio(f64);

impl SmoothingRatio {
    /// Wraps a literal ratio.
    #[must_use]
    pub const fn new(alpha: f64) -> Self {
        Self(alpha)
    }

    /// Derives the ratio from a coefficient and a sampling period.
    ///
    /// The coefficient is calibrated against microseconds.
    #[must_use]
    pub fn from_period(coefficient: f64, period: Duration) -> Self {
        Self(coefficient * period.as_micros() as f64)
    }

    /// Returns the raw blend weight.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for SmoothingRatio {
    fn default() -> Self {
        Self::from_period(DEFAULT_COEFFICIENT, DEFAULT_PERIOD)
    }
}

/// Linear interpolation between `a` and `b`.
#[inline]
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Maps `value` from `[min, max]` onto `[-1, +1]`.
///
/// A zero-width range maps to the midpoint `0`.
#[inline]
#[must_use]
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        return 0.0;
    }
    (value - min) / range * 2.0 - 1.0
}

/// Seeds a channel from its first sample.
///
/// Every statistic, `normalized` included, takes the raw value. This is the
/// only point where `normalized` can lie outside `[-1, +1]`.
pub fn init(state: &mut ChannelState, raw: RawSample) {
    let value = f64::from(raw);
    state.raw = raw;
    state.smoothed = value;
    state.min = value;
    state.max = value;
    state.normalized = value;
}

/// Folds a new sample into a channel.
pub fn update(state: &mut ChannelState, raw: RawSample, alpha: SmoothingRatio) {
    state.raw = raw;
    state.smoothed = lerp(state.smoothed, f64::from(raw), alpha.get());
    // Bounds widen before normalizing so smoothed always lies inside them.
    state.min = state.min.min(state.smoothed);
    state.max = state.max.max(state.smoothed);
    state.normalized = normalize(state.smoothed, state.min, state.max);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn seeded(raw: RawSample) -> ChannelState {
        let mut state = ChannelState::default();
        init(&mut state, raw);
        state
    }

    #[test]
    fn test_default_ratio_is_point_one_five() {
        assert_relative_eq!(SmoothingRatio::default().get(), 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_ratio_from_period_scales_linearly() {
        let ratio = SmoothingRatio::from_period(DEFAULT_COEFFICIENT, Duration::from_millis(10));
        assert_relative_eq!(ratio.get(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 10.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(2.0, 10.0, 0.5), 6.0);
    }

    #[test]
    fn test_init_copies_raw_everywhere() {
        let state = seeded(100);

        assert_eq!(state.raw, 100);
        assert_eq!(state.smoothed, 100.0);
        assert_eq!(state.min, 100.0);
        assert_eq!(state.max, 100.0);
        assert_eq!(state.normalized, 100.0);
    }

    #[test]
    fn test_update_rising_sample() {
        let mut state = seeded(100);
        update(&mut state, 200, SmoothingRatio::new(0.15));

        assert_eq!(state.raw, 200);
        assert_relative_eq!(state.smoothed, 115.0, epsilon = 1e-9);
        assert_eq!(state.min, 100.0);
        assert_relative_eq!(state.max, 115.0, epsilon = 1e-9);
        assert_relative_eq!(state.normalized, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_update_falling_sample_keeps_bounds() {
        let mut state = seeded(100);
        update(&mut state, 200, SmoothingRatio::new(0.15));
        update(&mut state, 50, SmoothingRatio::new(0.15));

        assert_relative_eq!(state.smoothed, 105.25, epsilon = 1e-9);
        assert_eq!(state.min, 100.0);
        assert_relative_eq!(state.max, 115.0, epsilon = 1e-9);
        assert_relative_eq!(state.normalized, -0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_update_with_zero_range_is_midpoint() {
        let mut state = seeded(-42);
        assert_eq!(state.normalized, -42.0);

        update(&mut state, -42, SmoothingRatio::default());

        assert_eq!(state.min, state.max);
        assert_eq!(state.normalized, 0.0);
    }

    #[test]
    fn test_frozen_filter_stays_degenerate() {
        let mut state = seeded(7);
        update(&mut state, 1000, SmoothingRatio::new(0.0));

        assert_eq!(state.raw, 1000);
        assert_eq!(state.smoothed, 7.0);
        assert_eq!(state.normalized, 0.0);
    }

    #[test]
    fn test_unit_ratio_tracks_raw() {
        let mut state = seeded(0);
        update(&mut state, 300, SmoothingRatio::new(1.0));

        assert_eq!(state.smoothed, 300.0);
        assert_eq!(state.max, 300.0);
        assert_eq!(state.normalized, 1.0);
    }

    #[test]
    fn test_extreme_samples_are_accepted() {
        let mut state = seeded(i16::MIN);
        update(&mut state, i16::MAX, SmoothingRatio::new(0.5));

        assert!(state.normalized.is_finite());
        assert_eq!(state.normalized, 1.0);
    }

    proptest! {
        #[test]
        fn prop_smoothed_within_bounds(
            first in any::<i16>(),
            samples in prop::collection::vec(any::<i16>(), 1..200),
            alpha in 0.0f64..=1.0,
        ) {
            let mut state = seeded(first);
            for raw in samples {
                update(&mut state, raw, SmoothingRatio::new(alpha));
                prop_assert!(state.min <= state.smoothed);
                prop_assert!(state.smoothed <= state.max);
            }
        }

        #[test]
        fn prop_bounds_are_monotonic(
            first in any::<i16>(),
            samples in prop::collection::vec(any::<i16>(), 1..200),
            alpha in 0.01f64..=1.0,
        ) {
            let mut state = seeded(first);
            for raw in samples {
                let (min, max) = (state.min, state.max);
                update(&mut state, raw, SmoothingRatio::new(alpha));
                prop_assert!(state.min <= min);
                prop_assert!(state.max >= max);
            }
        }

        #[test]
        fn prop_normalized_in_unit_range(
            first in any::<i16>(),
            samples in prop::collection::vec(any::<i16>(), 1..200),
            alpha in 0.01f64..=1.0,
        ) {
            let mut state = seeded(first);
            for raw in samples {
                update(&mut state, raw, SmoothingRatio::new(alpha));
                if state.max > state.min {
                    prop_assert!((-1.0..=1.0).contains(&state.normalized));
                    if state.smoothed == state.min {
                        prop_assert_eq!(state.normalized, -1.0);
                    }
                    if state.smoothed == state.max {
                        prop_assert_eq!(state.normalized, 1.0);
                    }
                } else {
                    prop_assert_eq!(state.normalized, 0.0);
                }
            }
        }

        #[test]
        fn prop_constant_input_converges(
            start in -20_000i16..20_000,
            target in -20_000i16..20_000,
            alpha in 0.05f64..0.5,
        ) {
            prop_assume!(start != target);
            let mut state = seeded(start);
            let target_f = f64::from(target);
            let mut distance = (state.smoothed - target_f).abs();
            for _ in 0..20 {
                update(&mut state, target, SmoothingRatio::new(alpha));
                let next = (state.smoothed - target_f).abs();
                prop_assert!(next < distance, "distance {} did not shrink below {}", next, distance);
                distance = next;
            }
        }
    }
}
