//! Hinge angle sensors
//!
//! Sources produce raw angle readings; the monitor turns them into
//! timestamped [`AngleSample`]s for the engine. Hardware access lives
//! outside this crate behind the [`AngleSource`] trait.

mod monitor;
mod replay;
mod simulated;
mod source;

pub use monitor::Monitor;
pub use replay::{ReplaySource, SensorError};
pub use simulated::SimulatedLid;
pub use source::{AngleSample, AngleSource, MAX_ANGLE, SENSOR_READ_FAILED};

/// A source whose readings are a function of elapsed time
///
/// Lets recordings and simulations be rendered faster than real time.
pub trait Timeline: AngleSource {
    /// Reading at `seconds` since the start of the timeline
    fn angle_at(&mut self, seconds: f64) -> f64;

    /// Length of the timeline, or `None` if it never ends
    fn duration(&self) -> Option<f64>;
}
