//! Engine controller
//!
//! Owns one velocity source, one mapper and one ramper, and pushes ramped
//! parameters into an injected [`AudioSink`].
//!
//! Locking: the motion pipeline is only touched from the sensor and control
//! threads. The ramper and the sink connection are shared with the audio
//! callback, which only ever `try_lock`s them and skips a tick on
//! contention. No filtering or mapping runs under a lock the audio callback
//! can see. Lock order is `connected` then `ramp`.
//!
//! Both domains advance the same ramper. Render time and sensor time cover
//! the same wall clock, so a sensor step only advances by the part of its
//! interval the audio callback has not already rendered.

use super::{AtomicF64, AudioSink, ParameterRamper};
use crate::error::EngineError;
use crate::mapping::{AudioParameters, Parameter, ParameterMapper};
use crate::motion::VelocitySource;
use crate::sensor::AngleSample;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Lifecycle state of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Stopped,
    Running,
}

/// Point-in-time view of an engine for logs and tests
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub engine: String,
    pub state: EngineState,
    pub angle: f64,
    pub velocity: f64,
    pub parameters: [(Parameter, f64); 2],
}

/// Anything the audio callback can advance
pub trait RenderTick: Send + Sync {
    /// Advance parameter ramps by `dt` seconds of rendered audio
    fn tick(&self, dt: f64);
}

/// Sensor-side state
struct Motion {
    velocity: VelocitySource,
    angle: f64,
    last_update: Option<f64>,
}

impl Motion {
    /// Seconds since the previous update, or `None` for the first one
    fn advance_clock(&mut self, timestamp: f64) -> Option<f64> {
        match self.last_update {
            Some(last) if timestamp > last => {
                self.last_update = Some(timestamp);
                Some(timestamp - last)
            }
            Some(_) => Some(0.0),
            None => {
                self.last_update = Some(timestamp);
                None
            }
        }
    }
}

/// Ramper advanced from both the sensor and the render domain
struct SharedRamp<P: AudioParameters> {
    ramper: ParameterRamper<P>,
    /// Render time not yet matched by sensor time
    rendered: f64,
}

impl<P: AudioParameters> SharedRamp<P> {
    fn new(initial: P) -> Self {
        Self {
            ramper: ParameterRamper::new(initial),
            rendered: 0.0,
        }
    }

    /// Advance by `dt` seconds of rendered audio
    fn render(&mut self, dt: f64) -> P {
        if dt.is_finite() && dt > 0.0 {
            self.rendered += dt;
        }
        self.ramper.advance(dt)
    }

    /// Retarget from the sensor side
    ///
    /// `None` restarts the sensor clock: nothing is advanced and earlier
    /// render time is forgotten.
    fn sense(&mut self, target: P, dt: Option<f64>) -> P {
        let dt = match dt {
            None => {
                self.rendered = 0.0;
                0.0
            }
            Some(dt) if dt.is_finite() && dt > 0.0 => {
                let covered = self.rendered.min(dt);
                self.rendered -= covered;
                dt - covered
            }
            Some(_) => 0.0,
        };
        self.ramper.step(target, dt)
    }

    fn reset(&mut self, value: P) {
        self.ramper.reset(value);
        self.rendered = 0.0;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives one sound engine from lid samples
pub struct EngineController<M: ParameterMapper> {
    mapper: M,
    sink: Arc<dyn AudioSink>,
    /// Template restored into `motion` on every start
    velocity_source: VelocitySource,
    motion: Mutex<Motion>,
    ramp: Mutex<SharedRamp<M::Params>>,
    /// `Some` while the sink may receive writes
    connected: Mutex<Option<Arc<dyn AudioSink>>>,
    running: AtomicBool,
    epoch: Instant,
    angle: AtomicF64,
    velocity: AtomicF64,
    values: [AtomicF64; 2],
}

impl<M: ParameterMapper> EngineController<M> {
    /// Create a stopped engine
    pub fn new(mapper: M, sink: Arc<dyn AudioSink>) -> Self {
        Self::with_velocity_source(mapper, sink, VelocitySource::computed())
    }

    /// Create a stopped engine with a specific velocity strategy
    pub fn with_velocity_source(
        mapper: M,
        sink: Arc<dyn AudioSink>,
        velocity_source: VelocitySource,
    ) -> Self {
        let rest = mapper.rest();
        let values = rest.values();
        Self {
            mapper,
            sink,
            motion: Mutex::new(Motion {
                velocity: velocity_source.clone(),
                angle: 0.0,
                last_update: None,
            }),
            velocity_source,
            ramp: Mutex::new(SharedRamp::new(rest)),
            connected: Mutex::new(None),
            running: AtomicBool::new(false),
            epoch: Instant::now(),
            angle: AtomicF64::new(0.0),
            velocity: AtomicF64::new(0.0),
            values: [AtomicF64::new(values[0]), AtomicF64::new(values[1])],
        }
    }

    /// The engine's mapper
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Clock origin used by [`Self::update`]
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Check if the engine is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        if self.is_running() {
            EngineState::Running
        } else {
            EngineState::Stopped
        }
    }

    /// Filtered velocity from the last mapping pass, in deg/s
    pub fn velocity(&self) -> f64 {
        self.velocity.load()
    }

    /// Angle from the last accepted sample
    pub fn angle(&self) -> f64 {
        self.angle.load()
    }

    /// Parameters most recently handed to the sink
    pub fn parameters(&self) -> M::Params {
        M::Params::from_values([self.values[0].load(), self.values[1].load()])
    }

    /// Snapshot for logs and monitoring output
    pub fn diagnostics(&self) -> Diagnostics {
        let values = self.parameters().values();
        let [first, second] = M::Params::PARAMETERS;
        Diagnostics {
            engine: self.mapper.name().to_string(),
            state: self.state(),
            angle: self.angle(),
            velocity: self.velocity(),
            parameters: [(first, values[0]), (second, values[1])],
        }
    }

    /// Activate the sink and start accepting updates
    ///
    /// Starting a running engine is a no-op. If the sink refuses to
    /// activate the engine stays stopped.
    pub fn start(&self) -> Result<(), EngineError> {
        let mut connected = lock(&self.connected);
        if connected.is_some() {
            return Ok(());
        }

        if let Err(e) = self.sink.activate() {
            tracing::warn!(engine = self.mapper.name(), error = %e, "engine failed to start");
            return Err(e.into());
        }

        let rest = self.mapper.rest();
        {
            let mut motion = lock(&self.motion);
            motion.velocity = self.velocity_source.clone();
            motion.angle = 0.0;
            motion.last_update = None;
        }
        lock(&self.ramp).reset(rest);
        self.velocity.store(0.0);
        self.publish(rest);
        write_parameters(self.sink.as_ref(), rest);

        *connected = Some(Arc::clone(&self.sink));
        self.running.store(true, Ordering::Release);
        tracing::info!(engine = self.mapper.name(), "engine started");
        Ok(())
    }

    /// Stop the engine and release the sink
    ///
    /// Once this returns no further parameter writes reach the sink.
    /// Stopping a stopped engine is a no-op.
    pub fn stop(&self) {
        let mut connected = lock(&self.connected);
        let Some(sink) = connected.take() else {
            return;
        };
        self.running.store(false, Ordering::Release);
        sink.deactivate();
        drop(connected);

        let rest = self.mapper.rest();
        {
            let mut motion = lock(&self.motion);
            motion.velocity.reset();
            motion.last_update = None;
        }
        lock(&self.ramp).reset(rest);
        self.velocity.store(0.0);
        self.publish(rest);
        tracing::info!(engine = self.mapper.name(), "engine stopped");
    }

    /// Feed an angle in degrees stamped with the engine clock
    pub fn update(&self, angle: f64) {
        let timestamp = self.epoch.elapsed().as_secs_f64();
        self.update_sample(AngleSample::new(angle, timestamp));
    }

    /// Feed a timestamped sample through estimator, mapper, ramper and sink
    ///
    /// Does nothing while stopped. Invalid samples leave every value as it
    /// was.
    pub fn update_sample(&self, sample: AngleSample) {
        if !self.is_running() {
            return;
        }
        if !sample.valid {
            tracing::trace!(angle = sample.angle, "ignoring invalid sample");
            return;
        }

        let (target, dt) = {
            let mut motion = lock(&self.motion);
            let velocity = motion.velocity.accept(sample);
            motion.angle = sample.angle;
            let dt = motion.advance_clock(sample.timestamp);
            self.angle.store(sample.angle);
            self.velocity.store(velocity);
            (self.mapper.map(sample.angle, velocity), dt)
        };

        tracing::trace!(angle = sample.angle, velocity = self.velocity(), ?target, "mapped sample");
        self.apply(target, dt);
    }

    /// Let the velocity decay when no samples have arrived for a while
    pub fn idle(&self) {
        self.idle_at(self.epoch.elapsed().as_secs_f64());
    }

    /// [`Self::idle`] with an explicit timestamp
    pub fn idle_at(&self, timestamp: f64) {
        if !self.is_running() {
            return;
        }

        let (target, dt) = {
            let mut motion = lock(&self.motion);
            if motion.velocity.last_angle().is_none() {
                return;
            }
            let velocity = motion.velocity.decay_idle(timestamp);
            let dt = motion.advance_clock(timestamp);
            self.velocity.store(velocity);
            (self.mapper.map(motion.angle, velocity), dt)
        };
        self.apply(target, dt);
    }

    /// Force the velocity used by the next mapping pass and apply it now
    ///
    /// A computed velocity source resumes on its next accepted sample.
    pub fn set_velocity_override(&self, velocity: f64) {
        if !self.is_running() {
            return;
        }

        let target = {
            let mut motion = lock(&self.motion);
            motion.velocity.override_velocity(velocity);
            let velocity = motion.velocity.velocity();
            self.velocity.store(velocity);
            self.mapper.map(motion.angle, velocity)
        };
        self.apply(target, Some(0.0));
    }

    /// Step the ramp, then publish and write while the sink is connected
    fn apply(&self, target: M::Params, dt: Option<f64>) {
        let connected = lock(&self.connected);
        let Some(sink) = connected.as_deref() else {
            return;
        };
        let current = lock(&self.ramp).sense(target, dt);
        self.publish(current);
        write_parameters(sink, current);
    }

    fn publish(&self, params: M::Params) {
        let values = params.values();
        self.values[0].store(values[0]);
        self.values[1].store(values[1]);
    }
}

impl<M: ParameterMapper> RenderTick for EngineController<M> {
    fn tick(&self, dt: f64) {
        if !self.is_running() {
            return;
        }

        let Ok(mut ramp) = self.ramp.try_lock() else {
            return;
        };
        let Ok(connected) = self.connected.try_lock() else {
            return;
        };
        let Some(sink) = connected.as_deref() else {
            return;
        };

        let settled = ramp.ramper.is_settled();
        let current = ramp.render(dt);
        if settled {
            return;
        }
        self.publish(current);
        write_parameters(sink, current);
    }
}

impl<M: ParameterMapper> Drop for EngineController<M> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn write_parameters<P: AudioParameters>(sink: &dyn AudioSink, params: P) {
    for (parameter, value) in P::PARAMETERS.into_iter().zip(params.values()) {
        sink.set_parameter(parameter, value);
    }
}
