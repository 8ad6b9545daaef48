//! Sonification engine
//!
//! Turns angle samples into ramped audio parameters and pushes them to an
//! audio sink, then renders them live or to a file.

mod controller;
mod driver;
mod player;
mod ramper;
mod recorder;
mod shared;
mod sink;

pub use controller::{Diagnostics, EngineController, EngineState, RenderTick};
pub use driver::drive;
pub use player::{default_device_name, list_output_devices, Player};
pub use ramper::ParameterRamper;
pub use recorder::{render_timeline, Recorder, RenderReport, RenderSettings};
pub use shared::{AtomicF64, SharedParameters};
pub use sink::AudioSink;
