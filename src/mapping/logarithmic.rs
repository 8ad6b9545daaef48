//! Logarithmic mapper implementation
//!
//! Maps a linear input onto an exponential output so that equal input
//! steps give equal perceived steps, e.g. octaves of pitch.

use super::Mapper;

/// Logarithmic mapper for perceptual scaling
///
/// Uses the formula: output = out_min * (out_max/out_min)^((input - in_min)/(in_max - in_min))
pub struct LogarithmicMapper {
    name: String,
    in_min: f64,
    in_max: f64,
    out_min: f64,
    out_max: f64,
}

impl LogarithmicMapper {
    /// Create a new logarithmic mapper
    ///
    /// Both output bounds must be positive; smaller values are raised to 0.001.
    pub fn new(
        name: impl Into<String>,
        in_min: f64,
        in_max: f64,
        out_min: f64,
        out_max: f64,
    ) -> Self {
        Self {
            name: name.into(),
            in_min,
            in_max,
            out_min: out_min.max(0.001),
            out_max: out_max.max(0.001),
        }
    }

    /// Output at the bottom of the input range
    pub fn out_min(&self) -> f64 {
        self.out_min
    }

    /// Output at the top of the input range
    pub fn out_max(&self) -> f64 {
        self.out_max
    }
}

impl Mapper for LogarithmicMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        let in_range = self.in_max - self.in_min;
        let normalized = if in_range.abs() < f64::EPSILON {
            0.0
        } else {
            ((input - self.in_min) / in_range).clamp(0.0, 1.0)
        };

        let ratio = self.out_max / self.out_min;
        let output = self.out_min * ratio.powf(normalized);

        output.clamp(self.out_min.min(self.out_max), self.out_min.max(self.out_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_to_frequency_octaves() {
        // 0..360 degrees across three octaves
        let mapper = LogarithmicMapper::new("pitch", 0.0, 360.0, 110.0, 880.0);

        assert!((mapper.map(0.0) - 110.0).abs() < 1e-9);
        assert!((mapper.map(120.0) - 220.0).abs() < 1e-6);
        assert!((mapper.map(240.0) - 440.0).abs() < 1e-6);
        assert!((mapper.map(360.0) - 880.0).abs() < 1e-9);
    }

    #[test]
    fn test_midpoint_is_geometric_mean() {
        let mapper = LogarithmicMapper::new("rate", 0.0, 2.0, 0.5, 2.0);
        assert!((mapper.map(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_outside_range() {
        let mapper = LogarithmicMapper::new("test", 0.0, 100.0, 10.0, 1000.0);

        assert_eq!(mapper.map(-50.0), 10.0);
        assert_eq!(mapper.map(150.0), 1000.0);
    }

    #[test]
    fn test_non_positive_bounds_are_raised() {
        let mapper = LogarithmicMapper::new("test", 0.0, 1.0, 0.0, 1.0);
        assert_eq!(mapper.out_min(), 0.001);
        assert!(mapper.map(0.0) > 0.0);
    }
}
