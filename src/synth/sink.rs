//! Sink that feeds the voices
//!
//! Writes parameters into [`SharedParameters`], which the audio callback's
//! voice reads. Activation succeeds only while the output stream is up.

use crate::engine::{AudioSink, SharedParameters};
use crate::error::SinkError;
use crate::mapping::Parameter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// [`AudioSink`] backed by lock-free shared parameters
pub struct VoiceSink {
    params: Arc<SharedParameters>,
    /// Set by whoever owns the output stream
    output_ready: Arc<AtomicBool>,
    active: AtomicBool,
}

impl VoiceSink {
    /// Create a sink gated on `output_ready`
    pub fn new(params: Arc<SharedParameters>, output_ready: Arc<AtomicBool>) -> Self {
        Self {
            params,
            output_ready,
            active: AtomicBool::new(false),
        }
    }

    /// A sink whose output is always available, for offline rendering
    pub fn offline(params: Arc<SharedParameters>) -> Self {
        Self::new(params, Arc::new(AtomicBool::new(true)))
    }

    /// Parameters read by the voice
    pub fn params(&self) -> &Arc<SharedParameters> {
        &self.params
    }

    /// Check if the sink is accepting parameters
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl AudioSink for VoiceSink {
    fn activate(&self) -> Result<(), SinkError> {
        if !self.output_ready.load(Ordering::Acquire) {
            return Err(SinkError::OutputUnavailable);
        }
        self.active.store(true, Ordering::Release);
        Ok(())
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
        self.params.mute();
    }

    fn set_parameter(&self, parameter: Parameter, value: f64) {
        if self.is_active() && value.is_finite() {
            self.params.set(parameter, value);
        }
    }
}
