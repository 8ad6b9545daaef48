//! Audio sink interface
//!
//! The engine controller pushes parameters into a sink; the sink owns
//! whatever actually makes sound.

use crate::error::SinkError;
use crate::mapping::Parameter;

/// Receiver of engine parameters
///
/// `set_parameter` is called from both the sensor thread and the audio
/// callback, so it must not block.
pub trait AudioSink: Send + Sync {
    /// Prepare to produce sound
    fn activate(&self) -> Result<(), SinkError>;

    /// Stop producing sound
    fn deactivate(&self);

    /// Set a parameter value
    fn set_parameter(&self, parameter: Parameter, value: f64);
}
