//! Vibrato LFO

use std::f64::consts::PI;

/// Sine low-frequency oscillator with depth
pub struct Lfo {
    frequency: f64,
    phase: f64,
    sample_rate: f64,
    /// Depth of modulation (0.0 to 1.0)
    depth: f64,
}

impl Lfo {
    /// Create an LFO at `frequency` Hz
    pub fn new(frequency: f64, depth: f64, sample_rate: f64) -> Self {
        Self {
            frequency: frequency.clamp(0.01, 100.0),
            phase: 0.0,
            sample_rate,
            depth: depth.clamp(0.0, 1.0),
        }
    }

    /// Get LFO frequency
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Get modulation depth
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Set the sample rate
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    /// Next value in -depth..=depth
    pub fn process(&mut self) -> f64 {
        let value = (self.phase * 2.0 * PI).sin() * self.depth;
        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfo_clamps_settings() {
        let lfo = Lfo::new(500.0, 2.0, 44100.0);
        assert_eq!(lfo.frequency(), 100.0);
        assert_eq!(lfo.depth(), 1.0);
    }

    #[test]
    fn test_lfo_stays_within_depth() {
        let mut lfo = Lfo::new(5.0, 0.03, 1000.0);
        let mut peak = 0.0f64;
        for _ in 0..1000 {
            let value = lfo.process();
            assert!(value.abs() <= 0.03 + 1e-12);
            peak = peak.max(value.abs());
        }
        assert!(peak > 0.029);
    }

    #[test]
    fn test_zero_depth_is_silent() {
        let mut lfo = Lfo::new(5.0, 0.0, 44100.0);
        for _ in 0..100 {
            assert_eq!(lfo.process(), 0.0);
        }
    }
}
