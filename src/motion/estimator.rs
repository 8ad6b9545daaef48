//! Angular velocity estimation
//!
//! Turns irregularly timed angle samples into a filtered, deadzone-gated
//! velocity in degrees per second.

use crate::sensor::AngleSample;

/// Samples closer together than this (seconds) are rejected
pub const MIN_DT: f64 = 0.001;

/// Fastest physically plausible hinge movement in deg/s
pub const MAX_VELOCITY: f64 = 1000.0;

/// Number of raw velocities averaged by the first smoothing stage
pub const WINDOW: usize = 3;

/// Weight of the new moving average in the exponential stage
pub const SMOOTHING: f64 = 0.5;

/// Filtered velocities below this magnitude (deg/s) read as zero
pub const DEADZONE: f64 = 1.0;

/// Seconds without movement after which idle decay kicks in
pub const MOVEMENT_TIMEOUT: f64 = 0.05;

/// Filtered angular velocity estimator
#[derive(Debug, Clone)]
pub struct VelocityEstimator {
    last_angle: f64,
    last_timestamp: f64,
    has_last: bool,
    filtered: f64,
    raw: f64,
    history: [f64; WINDOW],
    history_len: usize,
    history_pos: usize,
}

impl VelocityEstimator {
    /// Create an estimator with no history
    pub fn new() -> Self {
        Self {
            last_angle: 0.0,
            last_timestamp: 0.0,
            has_last: false,
            filtered: 0.0,
            raw: 0.0,
            history: [0.0; WINDOW],
            history_len: 0,
            history_pos: 0,
        }
    }

    /// Current filtered velocity in deg/s
    pub fn velocity(&self) -> f64 {
        self.filtered
    }

    /// Last unfiltered velocity, after wraparound correction and clamping
    pub fn raw_velocity(&self) -> f64 {
        self.raw
    }

    /// Angle of the last accepted sample, if any
    pub fn last_angle(&self) -> Option<f64> {
        self.has_last.then_some(self.last_angle)
    }

    /// Feed a sample and return the filtered velocity
    ///
    /// Invalid samples and samples less than [`MIN_DT`] after the previous
    /// accepted one leave the state untouched.
    pub fn accept(&mut self, sample: AngleSample) -> f64 {
        if !sample.valid {
            return self.filtered;
        }

        if !self.has_last {
            self.remember(sample);
            return self.filtered;
        }

        let dt = sample.timestamp - self.last_timestamp;
        // Also rejects NaN and time going backwards
        if !(dt > MIN_DT) {
            return self.filtered;
        }

        let raw = shortest_delta(self.last_angle, sample.angle) / dt;
        self.raw = if raw.is_finite() {
            raw.clamp(-MAX_VELOCITY, MAX_VELOCITY)
        } else {
            0.0
        };

        let average = self.push_history(self.raw);
        let smoothed = if self.history_len == 1 {
            average
        } else {
            SMOOTHING * average + (1.0 - SMOOTHING) * self.filtered
        };

        self.filtered = if smoothed.abs() < DEADZONE { 0.0 } else { smoothed };
        self.remember(sample);
        self.filtered
    }

    /// Feed a zero-motion sample if nothing has arrived for [`MOVEMENT_TIMEOUT`]
    ///
    /// Keeps the velocity falling toward zero when the sensor goes quiet.
    pub fn decay_idle(&mut self, timestamp: f64) -> f64 {
        if self.has_last && timestamp - self.last_timestamp > MOVEMENT_TIMEOUT {
            self.accept(AngleSample::new(self.last_angle, timestamp))
        } else {
            self.filtered
        }
    }

    /// Force the filtered output until the next accepted sample
    pub fn override_velocity(&mut self, velocity: f64) {
        self.filtered = if velocity.is_finite() {
            velocity.clamp(-MAX_VELOCITY, MAX_VELOCITY)
        } else {
            0.0
        };
    }

    /// Clear all history
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn remember(&mut self, sample: AngleSample) {
        self.last_angle = sample.angle;
        self.last_timestamp = sample.timestamp;
        self.has_last = true;
    }

    fn push_history(&mut self, value: f64) -> f64 {
        self.history[self.history_pos] = value;
        self.history_pos = (self.history_pos + 1) % WINDOW;
        self.history_len = (self.history_len + 1).min(WINDOW);

        let sum: f64 = self.history[..self.history_len].iter().sum();
        sum / self.history_len as f64
    }
}

impl Default for VelocityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed angle change taking the short way around 0/360
fn shortest_delta(from: f64, to: f64) -> f64 {
    let delta = to - from;
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(estimator: &mut VelocityEstimator, samples: &[(f64, f64)]) -> f64 {
        let mut velocity = 0.0;
        for &(angle, t) in samples {
            velocity = estimator.accept(AngleSample::new(angle, t));
        }
        velocity
    }

    #[test]
    fn test_first_sample_has_no_velocity() {
        let mut estimator = VelocityEstimator::new();
        assert_eq!(estimator.accept(AngleSample::new(45.0, 0.0)), 0.0);
        assert_eq!(estimator.last_angle(), Some(45.0));
    }

    #[test]
    fn test_raw_velocity_is_angle_over_time() {
        let mut estimator = VelocityEstimator::new();
        feed(&mut estimator, &[(45.0, 0.0), (47.0, 0.2)]);
        assert!((estimator.raw_velocity() - 10.0).abs() < 1e-9);

        feed(&mut estimator, &[(44.0, 0.3)]);
        assert!((estimator.raw_velocity() + 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_velocity_seeds_filter() {
        let mut estimator = VelocityEstimator::new();
        let velocity = feed(&mut estimator, &[(45.0, 0.0), (47.0, 0.2)]);
        assert!((velocity - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_wraparound_forward() {
        let mut estimator = VelocityEstimator::new();
        let velocity = feed(&mut estimator, &[(359.0, 0.0), (1.0, 0.1)]);
        assert!((velocity - 20.0).abs() < 1e-6, "got {}", velocity);
    }

    #[test]
    fn test_wraparound_backward() {
        let mut estimator = VelocityEstimator::new();
        let velocity = feed(&mut estimator, &[(1.0, 0.0), (359.0, 0.1)]);
        assert!((velocity + 20.0).abs() < 1e-6, "got {}", velocity);
    }

    #[test]
    fn test_deadzone_snaps_to_zero() {
        let mut estimator = VelocityEstimator::new();
        // 0.05 degrees over 0.1 s = 0.5 deg/s
        let velocity = feed(&mut estimator, &[(90.0, 0.0), (90.05, 0.1)]);
        assert_eq!(velocity, 0.0);
        assert!(estimator.raw_velocity() > 0.0);
    }

    #[test]
    fn test_deadzone_holds_both_directions() {
        for speed in [-0.999, -0.75, -0.3, -0.01, 0.01, 0.3, 0.75, 0.999] {
            let mut estimator = VelocityEstimator::new();
            for i in 0..12 {
                let t = i as f64 * 0.1;
                let velocity = estimator.accept(AngleSample::new(180.0 + speed * t, t));
                assert_eq!(velocity, 0.0, "speed {} at {} s", speed, t);
            }
        }

        let mut estimator = VelocityEstimator::new();
        let velocity = feed(&mut estimator, &[(180.0, 0.0), (179.85, 0.1)]);
        assert!(velocity <= -DEADZONE);
    }

    #[test]
    fn test_identical_sample_is_rejected() {
        let mut estimator = VelocityEstimator::new();
        assert_eq!(estimator.accept(AngleSample::new(30.0, 1.0)), 0.0);
        assert_eq!(estimator.accept(AngleSample::new(30.0, 1.0)), 0.0);
    }

    #[test]
    fn test_tiny_dt_is_rejected() {
        let mut estimator = VelocityEstimator::new();
        let velocity = feed(&mut estimator, &[(30.0, 1.0), (60.0, 1.0005)]);
        assert_eq!(velocity, 0.0);
        assert_eq!(estimator.last_angle(), Some(30.0));
    }

    #[test]
    fn test_backwards_time_is_rejected() {
        let mut estimator = VelocityEstimator::new();
        feed(&mut estimator, &[(30.0, 1.0), (35.0, 1.5)]);
        let before = estimator.velocity();
        assert_eq!(estimator.accept(AngleSample::new(80.0, 0.5)), before);
        assert_eq!(estimator.last_angle(), Some(35.0));
    }

    #[test]
    fn test_invalid_sample_preserves_state() {
        let mut estimator = VelocityEstimator::new();
        feed(&mut estimator, &[(45.0, 0.0), (47.0, 0.2)]);
        let before = estimator.velocity();

        assert_eq!(estimator.accept(AngleSample::invalid(0.3)), before);
        assert_eq!(estimator.accept(AngleSample::new(f64::NAN, 0.4)), before);
        assert_eq!(estimator.last_angle(), Some(47.0));
    }

    #[test]
    fn test_implausible_jump_is_clamped() {
        let mut estimator = VelocityEstimator::new();
        // 170 degrees in 2 ms
        let velocity = feed(&mut estimator, &[(0.0, 0.0), (170.0, 0.002)]);
        assert_eq!(velocity, MAX_VELOCITY);
    }

    #[test]
    fn test_smoothing_lags_a_step() {
        let mut estimator = VelocityEstimator::new();
        // 10 deg/s, then the lid stops
        feed(&mut estimator, &[(0.0, 0.0), (1.0, 0.1)]);
        let velocity = feed(&mut estimator, &[(1.0, 0.2)]);
        assert!(velocity > 0.0 && velocity < 10.0, "got {}", velocity);
    }

    #[test]
    fn test_decays_to_zero_at_rest() {
        let mut estimator = VelocityEstimator::new();
        feed(&mut estimator, &[(0.0, 0.0), (5.0, 0.1)]);
        let mut t = 0.1;
        for _ in 0..20 {
            t += 0.1;
            estimator.accept(AngleSample::new(5.0, t));
        }
        assert_eq!(estimator.velocity(), 0.0);
    }

    #[test]
    fn test_decay_idle_only_after_timeout() {
        let mut estimator = VelocityEstimator::new();
        feed(&mut estimator, &[(0.0, 0.0), (5.0, 0.1)]);
        let moving = estimator.velocity();

        assert_eq!(estimator.decay_idle(0.12), moving);
        assert!(estimator.decay_idle(0.2) < moving);
    }

    #[test]
    fn test_override_until_next_sample() {
        let mut estimator = VelocityEstimator::new();
        feed(&mut estimator, &[(10.0, 0.0)]);

        estimator.override_velocity(55.0);
        assert_eq!(estimator.velocity(), 55.0);

        estimator.accept(AngleSample::new(10.0, 1.0));
        assert!(estimator.velocity() < 55.0);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut estimator = VelocityEstimator::new();
        feed(&mut estimator, &[(0.0, 0.0), (5.0, 0.1)]);
        estimator.reset();

        assert_eq!(estimator.velocity(), 0.0);
        assert_eq!(estimator.raw_velocity(), 0.0);
        assert_eq!(estimator.last_angle(), None);
    }
}
