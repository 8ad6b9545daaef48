//! Simulated lid sensor
//!
//! Plays back a looping open/close motion profile with sensor jitter,
//! for demos and for exercising the engines without hardware.

use super::{AngleSource, Timeline, SENSOR_READ_FAILED};
use std::time::Instant;

/// One leg of the motion profile: move from `from` to `to` over `duration` seconds
#[derive(Debug, Clone, Copy)]
struct Segment {
    duration: f64,
    from: f64,
    to: f64,
}

/// Slow open, pause, medium open, pause, fast slam shut, rest.
/// The three moving legs land in the loud, fading and silent creak bands.
const PROFILE: [Segment; 7] = [
    Segment { duration: 1.0, from: 30.0, to: 30.0 },
    Segment { duration: 4.0, from: 30.0, to: 60.0 },
    Segment { duration: 1.0, from: 60.0, to: 60.0 },
    Segment { duration: 1.5, from: 60.0, to: 120.0 },
    Segment { duration: 0.5, from: 120.0, to: 120.0 },
    Segment { duration: 0.6, from: 120.0, to: 30.0 },
    Segment { duration: 1.4, from: 30.0, to: 30.0 },
];

/// Peak sensor jitter in degrees
const JITTER: f64 = 0.05;

/// A deterministic fake lid
pub struct SimulatedLid {
    name: String,
    started: Option<Instant>,
    rng_state: u64,
    jitter: f64,
    /// Every Nth read fails (0 = never)
    fail_every: u64,
    reads: u64,
}

impl SimulatedLid {
    /// Create a new simulated lid with a jitter seed
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            started: None,
            rng_state: seed.max(1),
            jitter: JITTER,
            fail_every: 0,
            reads: 0,
        }
    }

    /// Make every `n`th read report a sensor failure
    pub fn with_failure_every(mut self, n: u64) -> Self {
        self.fail_every = n;
        self
    }

    /// Set the peak jitter in degrees
    pub fn with_jitter(mut self, degrees: f64) -> Self {
        self.jitter = degrees.abs();
        self
    }

    /// Length of one loop of the motion profile in seconds
    pub fn period() -> f64 {
        PROFILE.iter().map(|s| s.duration).sum()
    }

    /// Noise-free angle of the profile at `seconds`
    pub fn profile_angle(seconds: f64) -> f64 {
        let mut t = seconds.max(0.0) % Self::period();
        for segment in &PROFILE {
            if t < segment.duration {
                let progress = t / segment.duration;
                return segment.from + (segment.to - segment.from) * progress;
            }
            t -= segment.duration;
        }
        PROFILE[PROFILE.len() - 1].to
    }

    /// Xorshift RNG, -1.0..1.0
    fn random(&mut self) -> f64 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        (x as f64 / u64::MAX as f64) * 2.0 - 1.0
    }
}

impl Timeline for SimulatedLid {
    fn angle_at(&mut self, seconds: f64) -> f64 {
        self.reads += 1;
        if self.fail_every > 0 && self.reads % self.fail_every == 0 {
            return SENSOR_READ_FAILED;
        }

        let angle = Self::profile_angle(seconds) + self.random() * self.jitter;
        angle.clamp(0.0, 360.0)
    }

    fn duration(&self) -> Option<f64> {
        None
    }
}

impl AngleSource for SimulatedLid {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self) -> f64 {
        let started = *self.started.get_or_insert_with(Instant::now);
        self.angle_at(started.elapsed().as_secs_f64())
    }
}
