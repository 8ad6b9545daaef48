//! WAV file recorder
//!
//! Records engine output to WAV files, and renders whole sensor timelines
//! offline faster than real time.

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::{EngineController, RenderTick};
use crate::mapping::ParameterMapper;
use crate::sensor::{AngleSample, Timeline};
use crate::synth::Voice;

/// Frames rendered between ramp ticks, like an audio callback buffer
const BLOCK_FRAMES: usize = 512;

/// WAV file recorder
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    samples_written: u64,
}

impl Recorder {
    /// Create a mono 32-bit float recorder
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            samples_written: 0,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of samples written
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Get the duration recorded in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / self.sample_rate as f64
    }

    /// Write a single sample
    pub fn write_sample(&mut self, sample: f32) -> Result<()> {
        self.writer
            .write_sample(sample)
            .context("failed to write sample")?;
        self.samples_written += 1;
        Ok(())
    }

    /// Finalize the WAV file
    ///
    /// This must be called to properly close the file and write the header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}

/// Summary of an offline render
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RenderReport {
    /// Sensor polls performed
    pub polls: u64,
    /// Polls that returned an invalid reading
    pub failed_reads: u64,
    /// Loudest output sample
    pub peak: f32,
    /// Highest filtered speed seen, in deg/s
    pub max_speed: f64,
}

/// Offline rendering settings
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    /// Seconds of audio to produce
    pub seconds: f64,
    /// Seconds between sensor polls
    pub poll_interval: f64,
    /// Output scale, 0..=1
    pub master_volume: f32,
}

/// Drive `engine` from `timeline` and record `voice` to `recorder`
///
/// The engine must already be started. Sensor polls and ramp ticks are
/// interleaved exactly as the live monitor and audio callback would.
pub fn render_timeline<M: ParameterMapper>(
    engine: &EngineController<M>,
    voice: &mut dyn Voice,
    timeline: &mut dyn Timeline,
    recorder: &mut Recorder,
    settings: RenderSettings,
) -> Result<RenderReport> {
    if !(settings.seconds.is_finite() && settings.seconds >= 0.0) {
        bail!("cannot render {} seconds", settings.seconds);
    }
    let sample_rate = recorder.sample_rate() as f64;
    let total_frames = (settings.seconds * sample_rate) as u64;
    let poll_interval = settings.poll_interval.max(1e-3);
    voice.set_sample_rate(sample_rate);

    let mut report = RenderReport::default();
    let mut next_poll = 0.0;
    let mut frame: u64 = 0;

    while frame < total_frames {
        let block = (total_frames - frame).min(BLOCK_FRAMES as u64);
        let block_end = (frame + block) as f64 / sample_rate;

        while next_poll < block_end {
            let sample = AngleSample::new(timeline.angle_at(next_poll), next_poll);
            report.polls += 1;
            if sample.valid {
                engine.update_sample(sample);
            } else {
                report.failed_reads += 1;
                engine.idle_at(next_poll);
            }
            report.max_speed = report.max_speed.max(engine.velocity().abs());
            next_poll += poll_interval;
        }

        engine.tick(block as f64 / sample_rate);

        for _ in 0..block {
            let value = voice.process() as f32 * settings.master_volume;
            report.peak = report.peak.max(value.abs());
            recorder.write_sample(value)?;
        }
        frame += block;
    }

    Ok(report)
}
