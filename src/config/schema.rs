//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::mapping::{DEFAULT_MAX_HZ, DEFAULT_MIN_HZ, MAX_FREQUENCY};
use crate::synth::{DEFAULT_VIBRATO_DEPTH, DEFAULT_VIBRATO_HZ};

/// Main configuration for Hinge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HingeConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Where lid angles come from
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Which sound the lid makes
    #[serde(default)]
    pub engine: EngineConfig,
}

impl HingeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate audio settings
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }

        // Validate sensor settings
        if self.sensor.poll_interval_ms < 1 || self.sensor.poll_interval_ms > 1000 {
            bail!("Sensor poll interval must be between 1 and 1000 ms");
        }
        if self.sensor.kind == SensorKind::Replay && self.sensor.path.is_none() {
            bail!("Replay sensor requires a path");
        }

        // Validate engine settings
        if !(0.0..=1.0).contains(&self.engine.master_volume) {
            bail!("Master volume must be between 0.0 and 1.0");
        }
        let theremin = &self.engine.theremin;
        if !(theremin.min_hz > 0.0 && theremin.min_hz < theremin.max_hz) {
            bail!(
                "Theremin range must satisfy 0 < min_hz < max_hz (got {} - {})",
                theremin.min_hz,
                theremin.max_hz
            );
        }
        if theremin.max_hz > MAX_FREQUENCY {
            bail!("Theremin max_hz must not exceed {}", MAX_FREQUENCY);
        }
        if theremin.vibrato_hz < 0.0 || theremin.vibrato_hz > 20.0 {
            bail!("Vibrato rate must be between 0 and 20 Hz");
        }
        if !(0.0..=0.5).contains(&theremin.vibrato_depth) {
            bail!("Vibrato depth must be between 0.0 and 0.5");
        }

        Ok(())
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Buffer size in samples (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }

/// Angle sensor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Sensor type
    #[serde(default)]
    pub kind: SensorKind,

    /// Milliseconds between reads (default: 16)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// CSV file for the replay sensor
    pub path: Option<PathBuf>,

    /// Jitter seed for the simulated lid
    #[serde(default)]
    pub seed: u64,
}

impl SensorConfig {
    /// Poll interval as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            kind: SensorKind::default(),
            poll_interval_ms: default_poll_interval_ms(),
            path: None,
            seed: 0,
        }
    }
}

fn default_poll_interval_ms() -> u64 { 16 }

/// Types of angle sensors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Scripted lid motion (default)
    #[default]
    Simulated,
    /// Angles replayed from a CSV file
    Replay,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine type
    #[serde(default)]
    pub kind: EngineKind,

    /// Output volume 0.0-1.0 (default: 0.7)
    #[serde(default = "default_master_volume")]
    pub master_volume: f32,

    /// Creak engine settings
    #[serde(default)]
    pub creak: CreakConfig,

    /// Theremin engine settings
    #[serde(default)]
    pub theremin: ThereminConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            master_volume: default_master_volume(),
            creak: CreakConfig::default(),
            theremin: ThereminConfig::default(),
        }
    }
}

fn default_master_volume() -> f32 { 0.7 }

/// Types of sonification engines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Door-creak sample driven by angular speed (default)
    #[default]
    Creak,
    /// Tone pitched by lid angle
    Theremin,
}

/// Creak engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreakConfig {
    /// WAV file to loop; a synthesized creak is used when absent
    pub sample: Option<PathBuf>,
}

/// Theremin engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThereminConfig {
    /// Pitch at a closed lid in Hz (default: 110)
    #[serde(default = "default_min_hz")]
    pub min_hz: f64,

    /// Pitch at a fully open lid in Hz (default: 880)
    #[serde(default = "default_max_hz")]
    pub max_hz: f64,

    /// Vibrato rate in Hz (default: 5)
    #[serde(default = "default_vibrato_hz")]
    pub vibrato_hz: f64,

    /// Vibrato depth as a fraction of pitch (default: 0.03)
    #[serde(default = "default_vibrato_depth")]
    pub vibrato_depth: f64,
}

impl Default for ThereminConfig {
    fn default() -> Self {
        Self {
            min_hz: default_min_hz(),
            max_hz: default_max_hz(),
            vibrato_hz: default_vibrato_hz(),
            vibrato_depth: default_vibrato_depth(),
        }
    }
}

fn default_min_hz() -> f64 { DEFAULT_MIN_HZ }
fn default_max_hz() -> f64 { DEFAULT_MAX_HZ }
fn default_vibrato_hz() -> f64 { DEFAULT_VIBRATO_HZ }
fn default_vibrato_depth() -> f64 { DEFAULT_VIBRATO_DEPTH }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_audio_config() {
        let yaml = "sample_rate: 48000";
        let config: AudioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, 512); // default
    }

    #[test]
    fn test_sensor_config() {
        let yaml = r#"
kind: replay
path: sessions/open-close.csv
poll_interval_ms: 10
"#;
        let config: SensorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.kind, SensorKind::Replay);
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn test_engine_config() {
        let yaml = r#"
kind: theremin
master_volume: 0.5
theremin:
  min_hz: 220
"#;
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.kind, EngineKind::Theremin);
        assert_eq!(config.master_volume, 0.5);
        assert_eq!(config.theremin.min_hz, 220.0);
        assert_eq!(config.theremin.max_hz, 880.0);
        assert!(config.creak.sample.is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(HingeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_replay_requires_path() {
        let mut config = HingeConfig::default();
        config.sensor.kind = SensorKind::Replay;
        assert!(config.validate().is_err());

        config.sensor.path = Some(PathBuf::from("lid.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_theremin_range() {
        let mut config = HingeConfig::default();
        config.engine.theremin.min_hz = 900.0;
        assert!(config.validate().is_err());

        config.engine.theremin.min_hz = 0.0;
        assert!(config.validate().is_err());

        config.engine.theremin.min_hz = 110.0;
        config.engine.theremin.max_hz = 25000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_master_volume() {
        let mut config = HingeConfig::default();
        config.engine.master_volume = 1.5;
        assert!(config.validate().is_err());
    }
}
