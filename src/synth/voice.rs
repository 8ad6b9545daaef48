//! Voice trait for sound generators

/// A sound generator rendered by the audio callback
pub trait Voice: Send {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Generate the next mono sample
    fn process(&mut self) -> f64;

    /// Set the output sample rate
    fn set_sample_rate(&mut self, sample_rate: f64);

    /// Fill a buffer with samples
    fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }
}

/// Seconds for a parameter to cover ~63% of a jump
const SMOOTHING_TIME: f64 = 0.005;

/// One-pole smoother that removes per-buffer steps in a parameter
#[derive(Debug, Clone)]
pub struct Smoother {
    value: f64,
    coefficient: f64,
}

impl Smoother {
    /// Create a smoother starting at `value`
    pub fn new(value: f64, sample_rate: f64) -> Self {
        let mut smoother = Self {
            value,
            coefficient: 0.0,
        };
        smoother.set_sample_rate(sample_rate);
        smoother
    }

    /// Recompute the coefficient for a new sample rate
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.coefficient = 1.0 - (-1.0 / (SMOOTHING_TIME * sample_rate.max(1.0))).exp();
    }

    /// Current smoothed value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Move one sample toward `target`
    pub fn next(&mut self, target: f64) -> f64 {
        self.value += (target - self.value) * self.coefficient;
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoother_converges_without_overshoot() {
        let mut smoother = Smoother::new(0.0, 44100.0);
        let mut previous = 0.0;
        for _ in 0..4410 {
            let value = smoother.next(1.0);
            assert!(value >= previous && value <= 1.0);
            previous = value;
        }
        assert!((smoother.value() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_smoother_time_constant() {
        let sample_rate = 1000.0;
        let mut smoother = Smoother::new(0.0, sample_rate);
        for _ in 0..5 {
            smoother.next(1.0);
        }
        // One time constant (5 samples at 1 kHz)
        assert!((smoother.value() - 0.632).abs() < 0.01);
    }
}
