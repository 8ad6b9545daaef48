//! Lock-free parameter publishing
//!
//! Values cross from the sensor thread to the audio callback as `f64`
//! bit patterns in atomics, so neither side ever waits on the other.

use crate::mapping::Parameter;
use std::sync::atomic::{AtomicU64, Ordering};

/// An `f64` stored in an `AtomicU64`
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    /// Create a new atomic float
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Read the current value
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Replace the current value
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Latest value of every sink parameter
#[derive(Debug)]
pub struct SharedParameters {
    gain: AtomicF64,
    rate: AtomicF64,
    frequency: AtomicF64,
    volume: AtomicF64,
}

impl SharedParameters {
    /// Silent defaults: no gain or volume, unity rate, lowest theremin pitch
    pub fn new() -> Self {
        Self {
            gain: AtomicF64::new(0.0),
            rate: AtomicF64::new(1.0),
            frequency: AtomicF64::new(crate::mapping::DEFAULT_MIN_HZ),
            volume: AtomicF64::new(0.0),
        }
    }

    fn slot(&self, parameter: Parameter) -> &AtomicF64 {
        match parameter {
            Parameter::Gain => &self.gain,
            Parameter::Rate => &self.rate,
            Parameter::Frequency => &self.frequency,
            Parameter::Volume => &self.volume,
        }
    }

    /// Read a parameter
    pub fn get(&self, parameter: Parameter) -> f64 {
        self.slot(parameter).load()
    }

    /// Write a parameter
    pub fn set(&self, parameter: Parameter, value: f64) {
        self.slot(parameter).store(value);
    }

    /// Silence both engines without touching pitch or rate
    pub fn mute(&self) {
        self.gain.store(0.0);
        self.volume.store(0.0);
    }
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_atomic_f64_round_trips_special_values() {
        let value = AtomicF64::new(1.5);
        assert_eq!(value.load(), 1.5);

        value.store(-0.0);
        assert!(value.load().is_sign_negative());
    }

    #[test]
    fn test_parameters_are_independent() {
        let shared = SharedParameters::new();
        shared.set(Parameter::Gain, 0.8);
        shared.set(Parameter::Frequency, 440.0);

        assert_eq!(shared.get(Parameter::Gain), 0.8);
        assert_eq!(shared.get(Parameter::Frequency), 440.0);
        assert_eq!(shared.get(Parameter::Rate), 1.0);
        assert_eq!(shared.get(Parameter::Volume), 0.0);
    }

    #[test]
    fn test_mute() {
        let shared = SharedParameters::new();
        shared.set(Parameter::Gain, 1.0);
        shared.set(Parameter::Volume, 1.0);
        shared.set(Parameter::Rate, 1.7);
        shared.mute();

        assert_eq!(shared.get(Parameter::Gain), 0.0);
        assert_eq!(shared.get(Parameter::Volume), 0.0);
        assert_eq!(shared.get(Parameter::Rate), 1.7);
    }

    #[test]
    fn test_cross_thread_publish() {
        let shared = Arc::new(SharedParameters::new());
        let writer = Arc::clone(&shared);

        std::thread::spawn(move || {
            for i in 0..=100 {
                writer.set(Parameter::Volume, i as f64 / 100.0);
            }
        })
        .join()
        .unwrap();

        assert_eq!(shared.get(Parameter::Volume), 1.0);
    }
}
