//! Hinge - laptop lid sonifier
//!
//! Reads the lid hinge angle, estimates how fast it is moving, and turns
//! angle and speed into sound. A slow swing creaks like an old door; a
//! theremin mode pitches a tone by how far the lid is open.

pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod motion;
pub mod sensor;
pub mod synth;

pub use config::HingeConfig;
pub use engine::EngineController;
pub use error::{EngineError, SinkError};
