//! Biquad filter implementation
//!
//! Used to shape the synthesized creak: band-pass resonances give the
//! wood its tone, a high-pass strips the DC left by the friction pulses.

use std::f64::consts::PI;

/// Filter type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    HighPass,
    BandPass,
}

/// Normalized biquad coefficients
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Biquad filter, Direct Form II transposed
pub struct Filter {
    filter_type: FilterType,
    sample_rate: f64,
    frequency: f64,
    q: f64,
    coeffs: Coefficients,
    z1: f64,
    z2: f64,
}

impl Filter {
    /// Band-pass centred on `center` Hz with quality factor `q`
    pub fn band_pass(sample_rate: f64, center: f64, q: f64) -> Self {
        Self::new(FilterType::BandPass, sample_rate, center, q)
    }

    /// Butterworth high-pass at `cutoff` Hz
    pub fn high_pass(sample_rate: f64, cutoff: f64) -> Self {
        Self::new(FilterType::HighPass, sample_rate, cutoff, std::f64::consts::FRAC_1_SQRT_2)
    }

    fn new(filter_type: FilterType, sample_rate: f64, frequency: f64, q: f64) -> Self {
        let mut filter = Self {
            filter_type,
            sample_rate,
            // Keep clear of DC and Nyquist
            frequency: frequency.clamp(20.0, sample_rate * 0.45),
            // Clamp Q to prevent instability
            q: q.clamp(0.1, 40.0),
            coeffs: Coefficients {
                b0: 1.0,
                b1: 0.0,
                b2: 0.0,
                a1: 0.0,
                a2: 0.0,
            },
            z1: 0.0,
            z2: 0.0,
        };
        filter.calculate_coefficients();
        filter
    }

    /// Centre or cutoff frequency in Hz
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Quality factor
    pub fn q(&self) -> f64 {
        self.q
    }

    fn calculate_coefficients(&mut self) {
        let omega = 2.0 * PI * self.frequency / self.sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * self.q);

        let (b0, b1, b2) = match self.filter_type {
            FilterType::HighPass => (
                (1.0 + cos_omega) / 2.0,
                -(1.0 + cos_omega),
                (1.0 + cos_omega) / 2.0,
            ),
            // Constant 0 dB peak gain
            FilterType::BandPass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;

        self.coeffs = Coefficients {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_omega / a0,
            a2: (1.0 - alpha) / a0,
        };
    }

    /// Process a single sample
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak_response(filter: &mut Filter, freq: f64, sample_rate: f64) -> f64 {
        let mut peak = 0.0f64;
        for i in 0..8820 {
            let t = i as f64 / sample_rate;
            let output = filter.process((2.0 * PI * freq * t).sin());
            if i > 4410 {
                peak = peak.max(output.abs());
            }
        }
        peak
    }

    #[test]
    fn test_parameter_clamping() {
        let filter = Filter::band_pass(44100.0, 5.0, 100.0);
        assert_eq!(filter.frequency(), 20.0);
        assert_eq!(filter.q(), 40.0);

        let filter = Filter::high_pass(44100.0, 30000.0);
        assert!(filter.frequency() < 22050.0);
    }

    #[test]
    fn test_band_pass_passes_centre() {
        let mut filter = Filter::band_pass(44100.0, 700.0, 8.0);
        let peak = peak_response(&mut filter, 700.0, 44100.0);
        assert!((peak - 1.0).abs() < 0.05, "centre gain {}", peak);
    }

    #[test]
    fn test_band_pass_rejects_far_frequencies() {
        let mut filter = Filter::band_pass(44100.0, 700.0, 8.0);
        let peak = peak_response(&mut filter, 5000.0, 44100.0);
        assert!(peak < 0.1, "gain at 5 kHz {}", peak);
    }

    #[test]
    fn test_high_pass_removes_dc() {
        let mut filter = Filter::high_pass(44100.0, 40.0);
        let mut output = 0.0;
        for _ in 0..44100 {
            output = filter.process(1.0);
        }
        assert!(output.abs() < 1e-3, "DC leak {}", output);
    }
}
