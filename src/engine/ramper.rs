//! Parameter slew limiting
//!
//! Moves each parameter toward its target by at most a fixed amount per
//! second, so sudden target jumps never reach the sink as clicks.

use crate::mapping::AudioParameters;

/// Slew limiter over a parameter pair
#[derive(Debug, Clone)]
pub struct ParameterRamper<P: AudioParameters> {
    current: P,
    target: P,
}

impl<P: AudioParameters> ParameterRamper<P> {
    /// Create a ramper resting at `initial`, using the parameters' own limits
    pub fn new(initial: P) -> Self {
        Self {
            current: initial,
            target: initial,
        }
    }

    /// Current output
    pub fn current(&self) -> P {
        self.current
    }

    /// Value being ramped toward
    pub fn target(&self) -> P {
        self.target
    }

    /// Check if every parameter has reached its target
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Set a new target and advance by `dt` seconds
    pub fn step(&mut self, target: P, dt: f64) -> P {
        self.target = target;
        self.advance(dt)
    }

    /// Advance toward the existing target by `dt` seconds
    pub fn advance(&mut self, dt: f64) -> P {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let current = self.current.values();
        let target = self.target.values();
        let mut next = current;

        for i in 0..next.len() {
            let gap = target[i] - current[i];
            let limit = P::MAX_DELTA[i] * dt;
            next[i] = if gap.abs() <= limit {
                target[i]
            } else {
                current[i] + limit.copysign(gap)
            };
        }

        self.current = P::from_values(next);
        self.current
    }

    /// Jump straight to `value` with no ramp
    pub fn reset(&mut self, value: P) {
        self.current = value;
        self.target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{CreakParameters, ThereminParameters};

    #[test]
    fn test_step_is_bounded() {
        let mut ramper = ParameterRamper::new(CreakParameters::new(0.0, 1.0));
        let next = ramper.step(CreakParameters::new(1.0, 1.0), 0.1);

        // Gain limit is 5/s
        assert!((next.gain - 0.5).abs() < 1e-12);
        assert!(!ramper.is_settled());
    }

    #[test]
    fn test_snaps_when_close() {
        let mut ramper = ParameterRamper::new(CreakParameters::new(0.9, 1.0));
        let next = ramper.step(CreakParameters::new(1.0, 1.0), 0.1);
        assert_eq!(next.gain, 1.0);
        assert!(ramper.is_settled());
    }

    #[test]
    fn test_never_overshoots() {
        let targets = [1.0, 0.0, 0.7, 0.2, 1.0, 0.95];
        let mut ramper = ParameterRamper::new(CreakParameters::new(0.0, 0.5));

        for &gain in &targets {
            let target = CreakParameters::new(gain, 2.0 - gain);
            let mut gap = ramper.current().gain - gain;
            for step in 0..40 {
                let dt = 0.003 + (step % 5) as f64 * 0.02;
                let current = ramper.step(target, dt);
                let next_gap = current.gain - gain;
                assert!(next_gap.abs() <= gap.abs() + 1e-12);
                assert!(next_gap == 0.0 || next_gap.signum() == gap.signum());
                gap = next_gap;
            }
            assert!(ramper.is_settled());
        }
    }

    #[test]
    fn test_parameters_ramp_independently() {
        let mut ramper = ParameterRamper::new(ThereminParameters::new(110.0, 0.0));
        let next = ramper.step(ThereminParameters::new(880.0, 1.0), 0.1);

        // Frequency limit 2000 Hz/s, volume limit 5/s
        assert!((next.frequency - 310.0).abs() < 1e-9);
        assert!((next.volume - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bad_dt_holds_still() {
        let mut ramper = ParameterRamper::new(CreakParameters::new(0.0, 1.0));
        let target = CreakParameters::new(1.0, 1.0);

        assert_eq!(ramper.step(target, 0.0).gain, 0.0);
        assert_eq!(ramper.step(target, -1.0).gain, 0.0);
        assert_eq!(ramper.step(target, f64::NAN).gain, 0.0);
        assert_eq!(ramper.target(), target);
    }

    #[test]
    fn test_advance_uses_stored_target() {
        let mut ramper = ParameterRamper::new(CreakParameters::new(0.0, 1.0));
        ramper.step(CreakParameters::new(1.0, 1.0), 0.05);
        ramper.advance(0.05);
        assert!((ramper.current().gain - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset_jumps() {
        let mut ramper = ParameterRamper::new(CreakParameters::new(0.0, 1.0));
        ramper.step(CreakParameters::new(1.0, 2.0), 0.01);
        ramper.reset(CreakParameters::new(0.0, 0.5));
        assert!(ramper.is_settled());
        assert_eq!(ramper.current(), CreakParameters::new(0.0, 0.5));
    }
}
