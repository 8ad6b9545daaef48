//! Creak voice
//!
//! Loops a creak sample, reading gain and playback rate from shared
//! parameters every sample.

use super::{Sample, Smoother, Voice};
use crate::engine::SharedParameters;
use crate::mapping::Parameter;
use std::sync::Arc;

/// Variable-rate looping sample player
pub struct CreakVoice {
    sample: Sample,
    params: Arc<SharedParameters>,
    sample_rate: f64,
    /// Read position in sample frames
    position: f64,
    gain: Smoother,
    rate: Smoother,
}

impl CreakVoice {
    /// Create a creak voice playing `sample`
    pub fn new(sample: Sample, params: Arc<SharedParameters>, sample_rate: f64) -> Self {
        let gain = Smoother::new(params.get(Parameter::Gain), sample_rate);
        let rate = Smoother::new(params.get(Parameter::Rate), sample_rate);
        Self {
            sample,
            params,
            sample_rate,
            position: 0.0,
            gain,
            rate,
        }
    }

    /// Current read position in frames
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Linear interpolation between neighbouring frames, wrapping at the end
    fn read(&self) -> f64 {
        let data = self.sample.data();
        let index = self.position as usize;
        let frac = self.position - index as f64;
        let a = data[index % data.len()] as f64;
        let b = data[(index + 1) % data.len()] as f64;
        a + (b - a) * frac
    }
}

impl Voice for CreakVoice {
    fn name(&self) -> &str {
        "creak"
    }

    fn process(&mut self) -> f64 {
        let gain = self.gain.next(self.params.get(Parameter::Gain));
        let rate = self.rate.next(self.params.get(Parameter::Rate));
        if self.sample.is_empty() {
            return 0.0;
        }

        let output = self.read() * gain;

        let step = rate * self.sample.sample_rate() as f64 / self.sample_rate;
        let len = self.sample.len() as f64;
        self.position += step;
        if self.position >= len {
            self.position %= len;
        }

        output
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.gain.set_sample_rate(sample_rate);
        self.rate.set_sample_rate(sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_sample() -> Sample {
        // 0.0, 0.1, ... 0.9
        Sample::new((0..10).map(|i| i as f32 / 10.0).collect(), 1000)
    }

    #[test]
    fn test_silent_at_zero_gain() {
        let params = Arc::new(SharedParameters::new());
        let mut voice = CreakVoice::new(ramp_sample(), params, 1000.0);
        for _ in 0..100 {
            assert_eq!(voice.process(), 0.0);
        }
    }

    #[test]
    fn test_rate_scales_position() {
        let params = Arc::new(SharedParameters::new());
        params.set(Parameter::Rate, 2.0);
        let mut voice = CreakVoice::new(ramp_sample(), Arc::clone(&params), 1000.0);

        voice.process();
        voice.process();
        assert!((voice.position() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_wraps() {
        let params = Arc::new(SharedParameters::new());
        let mut voice = CreakVoice::new(ramp_sample(), params, 1000.0);
        for _ in 0..25 {
            voice.process();
        }
        assert!((voice.position() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_gain_fades_in_smoothly() {
        let params = Arc::new(SharedParameters::new());
        let sample = Sample::new(vec![1.0; 64], 44100);
        let mut voice = CreakVoice::new(sample, Arc::clone(&params), 44100.0);

        params.set(Parameter::Gain, 1.0);
        let first = voice.process();
        assert!(first > 0.0 && first < 0.1, "jumped to {}", first);

        let mut last = first;
        for _ in 0..4410 {
            last = voice.process();
        }
        assert!((last - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_sample_rate_conversion() {
        let params = Arc::new(SharedParameters::new());
        // Sample recorded at half the output rate plays at half speed
        let mut voice = CreakVoice::new(ramp_sample(), params, 2000.0);
        voice.process();
        assert!((voice.position() - 0.5).abs() < 1e-9);
    }
}
