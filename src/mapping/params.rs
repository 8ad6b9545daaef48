//! Audio parameter sets
//!
//! Each engine drives exactly two parameters. The ramper and the sink
//! work on them generically through [`AudioParameters`].

use serde::Serialize;
use std::fmt;

/// Lowest frequency any engine may emit, in Hz
pub const MIN_FREQUENCY: f64 = 20.0;

/// Highest frequency any engine may emit, in Hz
pub const MAX_FREQUENCY: f64 = 20000.0;

/// Slowest creak playback rate
pub const MIN_RATE: f64 = 0.5;

/// Fastest creak playback rate
pub const MAX_RATE: f64 = 2.0;

/// A single controllable sink parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// Creak loudness, 0..=1
    Gain,
    /// Creak playback speed multiplier
    Rate,
    /// Theremin pitch in Hz
    Frequency,
    /// Theremin loudness, 0..=1
    Volume,
}

impl Parameter {
    /// Name used in logs and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gain => "gain",
            Self::Rate => "rate",
            Self::Frequency => "frequency",
            Self::Volume => "volume",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed pair of engine parameters
pub trait AudioParameters: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Which sink parameter each value drives
    const PARAMETERS: [Parameter; 2];

    /// Largest change per second the ramper allows for each value
    const MAX_DELTA: [f64; 2];

    /// Values in [`Self::PARAMETERS`] order
    fn values(&self) -> [f64; 2];

    /// Build from values in [`Self::PARAMETERS`] order, clamping to valid ranges
    fn from_values(values: [f64; 2]) -> Self;
}

/// Clamp, mapping NaN to `fallback`
fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Parameters of the creak engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreakParameters {
    /// Loudness, 0..=1
    pub gain: f64,
    /// Playback speed multiplier
    pub rate: f64,
}

impl CreakParameters {
    /// Create clamped creak parameters
    pub fn new(gain: f64, rate: f64) -> Self {
        Self::from_values([gain, rate])
    }
}

impl AudioParameters for CreakParameters {
    const PARAMETERS: [Parameter; 2] = [Parameter::Gain, Parameter::Rate];
    const MAX_DELTA: [f64; 2] = [5.0, 4.0];

    fn values(&self) -> [f64; 2] {
        [self.gain, self.rate]
    }

    fn from_values([gain, rate]: [f64; 2]) -> Self {
        Self {
            gain: clamp_finite(gain, 0.0, 1.0, 0.0),
            rate: clamp_finite(rate, MIN_RATE, MAX_RATE, 1.0),
        }
    }
}

/// Parameters of the theremin engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThereminParameters {
    /// Pitch in Hz
    pub frequency: f64,
    /// Loudness, 0..=1
    pub volume: f64,
}

impl ThereminParameters {
    /// Create clamped theremin parameters
    pub fn new(frequency: f64, volume: f64) -> Self {
        Self::from_values([frequency, volume])
    }
}

impl AudioParameters for ThereminParameters {
    const PARAMETERS: [Parameter; 2] = [Parameter::Frequency, Parameter::Volume];
    const MAX_DELTA: [f64; 2] = [2000.0, 5.0];

    fn values(&self) -> [f64; 2] {
        [self.frequency, self.volume]
    }

    fn from_values([frequency, volume]: [f64; 2]) -> Self {
        Self {
            frequency: clamp_finite(frequency, MIN_FREQUENCY, MAX_FREQUENCY, MIN_FREQUENCY),
            volume: clamp_finite(volume, 0.0, 1.0, 0.0),
        }
    }
}
