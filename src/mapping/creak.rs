//! Creak engine mapping
//!
//! Loudness follows the fade curve; playback rate rises with speed so a
//! faster swing also sounds higher and quicker.

use super::mapper::map_finite;
use super::{CreakParameters, FadeMapper, LogarithmicMapper, Mapper, ParameterMapper, MAX_RATE, MIN_RATE};

/// Maps lid velocity to creak gain and rate
pub struct CreakMapper {
    gain: FadeMapper,
    /// Rate over log10(speed): 0.5x at 1 deg/s, 1x at 10, 2x at 100
    rate: LogarithmicMapper,
}

impl CreakMapper {
    /// Create the creak mapping
    pub fn new() -> Self {
        Self {
            gain: FadeMapper::new("creak_gain"),
            rate: LogarithmicMapper::new("creak_rate", 0.0, 2.0, MIN_RATE, MAX_RATE),
        }
    }

    /// Target gain for a velocity in deg/s
    pub fn gain(&self, velocity: f64) -> f64 {
        self.gain.map(velocity)
    }

    /// Target playback rate for a velocity in deg/s
    ///
    /// Uses speed only; the sample always plays forwards.
    pub fn rate(&self, velocity: f64) -> f64 {
        let speed = velocity.abs().max(1.0);
        map_finite(&self.rate, speed.log10())
    }
}

impl Default for CreakMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterMapper for CreakMapper {
    type Params = CreakParameters;

    fn name(&self) -> &str {
        "creak"
    }

    fn map(&self, _angle: f64, velocity: f64) -> CreakParameters {
        CreakParameters::new(self.gain(velocity), self.rate(velocity))
    }

    fn rest(&self) -> CreakParameters {
        self.map(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_curve_boundaries() {
        let mapper = CreakMapper::new();
        assert_eq!(mapper.gain(1.0), 1.0);
        assert_eq!(mapper.gain(10.0), 1.0);
        assert_eq!(mapper.gain(100.0), 0.0);
        assert_eq!(mapper.gain(250.0), 0.0);
    }

    #[test]
    fn test_rest_is_silent_at_slowest_rate() {
        let rest = CreakMapper::new().rest();
        assert_eq!(rest.gain, 0.0);
        assert_eq!(rest.rate, MIN_RATE);
    }

    #[test]
    fn test_rate_anchors() {
        let mapper = CreakMapper::new();
        assert!((mapper.rate(1.0) - 0.5).abs() < 1e-12);
        assert!((mapper.rate(10.0) - 1.0).abs() < 1e-12);
        assert!((mapper.rate(100.0) - 2.0).abs() < 1e-12);
        assert_eq!(mapper.rate(1000.0), MAX_RATE);
    }

    #[test]
    fn test_rate_rises_with_speed() {
        let mapper = CreakMapper::new();
        let mut previous = mapper.rate(0.0);
        for step in 1..200 {
            let rate = mapper.rate(step as f64);
            assert!(rate >= previous);
            previous = rate;
        }
    }

    #[test]
    fn test_direction_uses_magnitude() {
        let mapper = CreakMapper::new();
        assert_eq!(mapper.map(90.0, -20.0), mapper.map(90.0, 20.0));
    }

    #[test]
    fn test_angle_is_ignored() {
        let mapper = CreakMapper::new();
        assert_eq!(mapper.map(0.0, 5.0), mapper.map(300.0, 5.0));
    }

    #[test]
    fn test_non_finite_velocity_is_safe() {
        let params = CreakMapper::new().map(0.0, f64::NAN);
        assert_eq!(params.gain, 0.0);
        assert!(params.rate.is_finite());
    }
}
