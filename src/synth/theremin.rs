//! Theremin voice
//!
//! A sine tone with gentle vibrato, pitched and levelled from shared
//! parameters.

use super::{Lfo, Oscillator, Smoother, Voice, Waveform};
use crate::engine::SharedParameters;
use crate::mapping::Parameter;
use std::sync::Arc;

/// Default vibrato rate in Hz
pub const DEFAULT_VIBRATO_HZ: f64 = 5.0;

/// Default vibrato depth as a fraction of pitch
pub const DEFAULT_VIBRATO_DEPTH: f64 = 0.03;

/// Output level at full volume, leaving headroom
const OUTPUT_LEVEL: f64 = 0.6;

/// Sine theremin voice
pub struct ThereminVoice {
    params: Arc<SharedParameters>,
    oscillator: Oscillator,
    vibrato: Lfo,
    frequency: Smoother,
    volume: Smoother,
}

impl ThereminVoice {
    /// Create a theremin voice with the default vibrato
    pub fn new(params: Arc<SharedParameters>, sample_rate: f64) -> Self {
        Self::with_vibrato(params, sample_rate, DEFAULT_VIBRATO_HZ, DEFAULT_VIBRATO_DEPTH)
    }

    /// Create a theremin voice with custom vibrato
    pub fn with_vibrato(
        params: Arc<SharedParameters>,
        sample_rate: f64,
        vibrato_hz: f64,
        vibrato_depth: f64,
    ) -> Self {
        let frequency = params.get(Parameter::Frequency);
        Self {
            oscillator: Oscillator::new(Waveform::Sine, frequency, sample_rate),
            vibrato: Lfo::new(vibrato_hz, vibrato_depth, sample_rate),
            frequency: Smoother::new(frequency, sample_rate),
            volume: Smoother::new(params.get(Parameter::Volume), sample_rate),
            params,
        }
    }

    /// Instantaneous oscillator pitch including vibrato
    pub fn frequency(&self) -> f64 {
        self.oscillator.frequency()
    }
}

impl Voice for ThereminVoice {
    fn name(&self) -> &str {
        "theremin"
    }

    fn process(&mut self) -> f64 {
        let base = self.frequency.next(self.params.get(Parameter::Frequency));
        let volume = self.volume.next(self.params.get(Parameter::Volume));

        self.oscillator.set_frequency(base * (1.0 + self.vibrato.process()));
        self.oscillator.generate() * volume * OUTPUT_LEVEL
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.oscillator.set_sample_rate(sample_rate);
        self.vibrato.set_sample_rate(sample_rate);
        self.frequency.set_sample_rate(sample_rate);
        self.volume.set_sample_rate(sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_at_zero_volume() {
        let params = Arc::new(SharedParameters::new());
        let mut voice = ThereminVoice::new(params, 44100.0);
        for _ in 0..100 {
            assert_eq!(voice.process(), 0.0);
        }
    }

    #[test]
    fn test_audible_at_full_volume() {
        let params = Arc::new(SharedParameters::new());
        params.set(Parameter::Volume, 1.0);
        let mut voice = ThereminVoice::new(Arc::clone(&params), 44100.0);

        let mut peak = 0.0f64;
        for _ in 0..4410 {
            peak = peak.max(voice.process().abs());
        }
        assert!(peak > 0.5 && peak <= OUTPUT_LEVEL);
    }

    #[test]
    fn test_vibrato_stays_near_pitch() {
        let params = Arc::new(SharedParameters::new());
        params.set(Parameter::Frequency, 440.0);
        let mut voice = ThereminVoice::with_vibrato(Arc::clone(&params), 44100.0, 5.0, 0.03);

        for _ in 0..44100 {
            voice.process();
            let frequency = voice.frequency();
            assert!(frequency <= 440.0 * 1.03 + 1e-9);
        }
        assert!((voice.frequency() - 440.0).abs() < 440.0 * 0.031);
    }

    #[test]
    fn test_no_vibrato_tracks_pitch_exactly() {
        let params = Arc::new(SharedParameters::new());
        params.set(Parameter::Frequency, 330.0);
        let mut voice = ThereminVoice::with_vibrato(Arc::clone(&params), 44100.0, 5.0, 0.0);

        for _ in 0..4410 {
            voice.process();
        }
        assert!((voice.frequency() - 330.0).abs() < 1e-3);
    }
}
