//! Mapper traits
//!
//! [`Mapper`] is a single scalar curve. [`ParameterMapper`] turns the lid's
//! angle and velocity into a full set of engine parameters.

use super::AudioParameters;

/// Trait for scalar mapping curves
pub trait Mapper: Send + Sync {
    /// Get the name of this mapper
    fn name(&self) -> &str;

    /// Map an input value to an output value
    fn map(&self, input: f64) -> f64;
}

/// Maps lid state to the parameters of one sound engine
///
/// Implementations are pure: the same angle and velocity always produce
/// the same parameters, already clamped to their valid ranges.
pub trait ParameterMapper: Send + Sync {
    /// Parameter set produced by this mapper
    type Params: AudioParameters;

    /// Short engine name used in logs
    fn name(&self) -> &str;

    /// Target parameters for the given angle (degrees) and velocity (deg/s)
    fn map(&self, angle: f64, velocity: f64) -> Self::Params;

    /// Parameters to start from before any movement is seen
    fn rest(&self) -> Self::Params;
}

/// Maps `value` through `mapper`, treating non-finite input as zero
pub(crate) fn map_finite(mapper: &dyn Mapper, value: f64) -> f64 {
    mapper.map(if value.is_finite() { value } else { 0.0 })
}
