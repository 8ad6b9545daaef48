//! Velocity strategies
//!
//! The engine reads velocity through [`VelocitySource`], which either
//! computes it from samples or holds a fixed value for tests and manual
//! control.

use super::VelocityEstimator;
use crate::sensor::AngleSample;

/// Where the engine's angular velocity comes from
#[derive(Debug, Clone)]
pub enum VelocitySource {
    /// Estimated from the sample stream
    Computed(VelocityEstimator),
    /// Always reports the same velocity, ignoring samples
    Fixed(f64),
}

impl VelocitySource {
    /// Velocity estimated from samples
    pub fn computed() -> Self {
        Self::Computed(VelocityEstimator::new())
    }

    /// Constant velocity in deg/s
    pub fn fixed(velocity: f64) -> Self {
        Self::Fixed(if velocity.is_finite() { velocity } else { 0.0 })
    }

    /// Feed a sample and return the current velocity
    pub fn accept(&mut self, sample: AngleSample) -> f64 {
        match self {
            Self::Computed(estimator) => estimator.accept(sample),
            Self::Fixed(velocity) => *velocity,
        }
    }

    /// Apply idle decay at `timestamp`
    pub fn decay_idle(&mut self, timestamp: f64) -> f64 {
        match self {
            Self::Computed(estimator) => estimator.decay_idle(timestamp),
            Self::Fixed(velocity) => *velocity,
        }
    }

    /// Current velocity without feeding a sample
    pub fn velocity(&self) -> f64 {
        match self {
            Self::Computed(estimator) => estimator.velocity(),
            Self::Fixed(velocity) => *velocity,
        }
    }

    /// Force the reported velocity
    ///
    /// A computed source holds the value until its next accepted sample.
    pub fn override_velocity(&mut self, velocity: f64) {
        match self {
            Self::Computed(estimator) => estimator.override_velocity(velocity),
            Self::Fixed(_) => *self = Self::fixed(velocity),
        }
    }

    /// Last known angle, if the source tracks one
    pub fn last_angle(&self) -> Option<f64> {
        match self {
            Self::Computed(estimator) => estimator.last_angle(),
            Self::Fixed(_) => None,
        }
    }

    /// Clear any sample history
    pub fn reset(&mut self) {
        if let Self::Computed(estimator) = self {
            estimator.reset();
        }
    }
}

impl Default for VelocitySource {
    fn default() -> Self {
        Self::computed()
    }
}
