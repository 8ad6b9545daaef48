//! Linear mapper implementation

use super::Mapper;

/// Linear interpolation between two ranges
pub struct LinearMapper {
    name: String,
    in_min: f64,
    in_max: f64,
    out_min: f64,
    out_max: f64,
}

impl LinearMapper {
    /// Create a new linear mapper from `in_min..in_max` to `out_min..out_max`
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
            out_min,
            out_max,
        }
    }
}

impl Mapper for LinearMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        let in_range = self.in_max - self.in_min;
        let normalized = if in_range.abs() < f64::EPSILON {
            0.0
        } else {
            (input - self.in_min) / in_range
        };

        let output = self.out_min + normalized * (self.out_max - self.out_min);

        output.clamp(self.out_min.min(self.out_max), self.out_min.max(self.out_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_to_unit() {
        let mapper = LinearMapper::new("angle", 0.0, 360.0, 0.0, 1.0);

        assert_eq!(mapper.map(0.0), 0.0);
        assert_eq!(mapper.map(180.0), 0.5);
        assert_eq!(mapper.map(360.0), 1.0);
    }

    #[test]
    fn test_descending_output() {
        // One decade of velocity fading loudness from full to silent
        let mapper = LinearMapper::new("fade", 1.0, 2.0, 1.0, 0.0);

        assert_eq!(mapper.map(1.0), 1.0);
        assert_eq!(mapper.map(1.5), 0.5);
        assert_eq!(mapper.map(2.0), 0.0);
    }

    #[test]
    fn test_clamped() {
        let mapper = LinearMapper::new("test", 0.0, 100.0, 0.0, 1.0);

        assert_eq!(mapper.map(-50.0), 0.0);
        assert_eq!(mapper.map(150.0), 1.0);
    }

    #[test]
    fn test_degenerate_input_range() {
        let mapper = LinearMapper::new("flat", 5.0, 5.0, 2.0, 4.0);
        assert_eq!(mapper.map(100.0), 2.0);
    }
}
