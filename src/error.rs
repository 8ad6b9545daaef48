//! Engine error types

use thiserror::Error;

/// Errors raised by the audio sink
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SinkError {
    #[error("audio output is not running")]
    OutputUnavailable,

    #[error("audio output failed: {0}")]
    Output(String),
}

/// Errors from building or starting an engine
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("audio sink failed to activate: {0}")]
    SinkActivation(#[from] SinkError),

    #[error("invalid {parameter} range {min}..{max}")]
    InvalidRange {
        parameter: &'static str,
        min: f64,
        max: f64,
    },
}
