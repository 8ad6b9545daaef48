//! Theremin engine mapping
//!
//! Pitch follows how far the lid is open; loudness follows how gently it
//! moves.

use super::mapper::map_finite;
use super::{
    FadeMapper, LogarithmicMapper, Mapper, ParameterMapper, ThereminParameters, MAX_FREQUENCY,
    MIN_FREQUENCY,
};
use crate::error::EngineError;
use crate::sensor::MAX_ANGLE;

/// Default pitch with the lid closed, in Hz
pub const DEFAULT_MIN_HZ: f64 = 110.0;

/// Default pitch with the lid folded fully back, in Hz
pub const DEFAULT_MAX_HZ: f64 = 880.0;

/// Maps lid angle to pitch and lid velocity to volume
pub struct ThereminMapper {
    /// Exponential over 0..360 degrees so equal angles are equal intervals
    frequency: LogarithmicMapper,
    volume: FadeMapper,
}

impl ThereminMapper {
    /// Create a theremin mapping over `min_hz..=max_hz`
    ///
    /// Fails if the range is empty, inverted, or outside the audible band.
    pub fn new(min_hz: f64, max_hz: f64) -> Result<Self, EngineError> {
        let valid = min_hz.is_finite()
            && max_hz.is_finite()
            && min_hz >= MIN_FREQUENCY
            && max_hz <= MAX_FREQUENCY
            && min_hz < max_hz;
        if !valid {
            return Err(EngineError::InvalidRange {
                parameter: "frequency",
                min: min_hz,
                max: max_hz,
            });
        }

        Ok(Self {
            frequency: LogarithmicMapper::new("theremin_frequency", 0.0, MAX_ANGLE, min_hz, max_hz),
            volume: FadeMapper::new("theremin_volume"),
        })
    }

    /// Lowest pitch, at 0 degrees
    pub fn min_hz(&self) -> f64 {
        self.frequency.out_min()
    }

    /// Highest pitch, at 360 degrees
    pub fn max_hz(&self) -> f64 {
        self.frequency.out_max()
    }

    /// Target pitch for an angle in degrees
    pub fn frequency(&self, angle: f64) -> f64 {
        map_finite(&self.frequency, angle)
    }

    /// Target volume for a velocity in deg/s
    pub fn volume(&self, velocity: f64) -> f64 {
        self.volume.map(velocity)
    }
}

impl Default for ThereminMapper {
    fn default() -> Self {
        Self {
            frequency: LogarithmicMapper::new(
                "theremin_frequency",
                0.0,
                MAX_ANGLE,
                DEFAULT_MIN_HZ,
                DEFAULT_MAX_HZ,
            ),
            volume: FadeMapper::new("theremin_volume"),
        }
    }
}

impl ParameterMapper for ThereminMapper {
    type Params = ThereminParameters;

    fn name(&self) -> &str {
        "theremin"
    }

    fn map(&self, angle: f64, velocity: f64) -> ThereminParameters {
        ThereminParameters::new(self.frequency(angle), self.volume(velocity))
    }

    fn rest(&self) -> ThereminParameters {
        ThereminParameters::new(self.min_hz(), 0.0)
    }
}
