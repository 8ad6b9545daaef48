//! Loudness fade curve
//!
//! Slow movement is loud, fast movement is quiet. Speeds are compared by
//! magnitude, so opening and closing the lid sound the same.
//!
//! ```text
//!  level
//!  1.0 |     ______
//!      |    |      \
//!      |    |        \
//!  0.0 |____|          \_______
//!      0    1     10        100   speed (deg/s, log scale above 10)
//! ```

use super::{LinearMapper, Mapper};
use crate::motion::DEADZONE;

/// Top of the full-volume band in deg/s
pub const FULL_VOLUME_MAX: f64 = 10.0;

/// Speed at and above which the output is silent, in deg/s
pub const SILENT_FROM: f64 = 100.0;

/// Piecewise velocity-to-loudness curve
pub struct FadeMapper {
    name: String,
    deadzone: f64,
    full_max: f64,
    silent_from: f64,
    /// Fades over log10(speed) between the two band edges
    fade: LinearMapper,
}

impl FadeMapper {
    /// Create the standard fade curve
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deadzone: DEADZONE,
            full_max: FULL_VOLUME_MAX,
            silent_from: SILENT_FROM,
            fade: LinearMapper::new(
                "fade",
                FULL_VOLUME_MAX.log10(),
                SILENT_FROM.log10(),
                1.0,
                0.0,
            ),
        }
    }
}

impl Mapper for FadeMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        let speed = input.abs();
        if !speed.is_finite() || speed >= self.silent_from {
            0.0
        } else if speed < self.deadzone {
            0.0
        } else if speed <= self.full_max {
            1.0
        } else {
            self.fade.map(speed.log10())
        }
    }
}
