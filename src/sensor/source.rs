//! Source trait and AngleSample definition

/// Value returned by a lid sensor when a read fails.
///
/// Deliberately outside the 0..=360 range so it can never be mistaken for
/// a real reading.
pub const SENSOR_READ_FAILED: f64 = -2.0;

/// Upper bound of the lid angle domain in degrees
pub const MAX_ANGLE: f64 = 360.0;

/// A single timestamped reading of the hinge angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSample {
    /// Hinge angle in degrees (0..=360)
    pub angle: f64,

    /// Seconds on a monotonic clock
    pub timestamp: f64,

    /// False when the source reported a failure or an out-of-range value
    pub valid: bool,
}

impl AngleSample {
    /// Create a sample from a raw reading, validating the angle
    pub fn new(angle: f64, timestamp: f64) -> Self {
        let valid = angle.is_finite()
            && (0.0..=MAX_ANGLE).contains(&angle)
            && timestamp.is_finite();
        Self {
            angle,
            timestamp,
            valid,
        }
    }

    /// A sample representing "no data" at the given time
    pub fn invalid(timestamp: f64) -> Self {
        Self {
            angle: SENSOR_READ_FAILED,
            timestamp,
            valid: false,
        }
    }
}

/// Trait for hinge angle sources
///
/// Implementations never block waiting for data: a failed or missing read
/// is reported as [`SENSOR_READ_FAILED`].
pub trait AngleSource: Send {
    /// Get the name of this source
    fn name(&self) -> &str;

    /// Read the current angle in degrees, or [`SENSOR_READ_FAILED`]
    fn read(&mut self) -> f64;

    /// Check if the source can still produce readings
    fn is_available(&self) -> bool {
        true
    }
}
