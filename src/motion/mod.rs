//! Hinge motion analysis
//!
//! Estimates how fast the lid is moving from the stream of angle samples.

mod estimator;
mod source;

pub use estimator::{
    VelocityEstimator, DEADZONE, MAX_VELOCITY, MIN_DT, MOVEMENT_TIMEOUT, SMOOTHING, WINDOW,
};
pub use source::VelocitySource;
