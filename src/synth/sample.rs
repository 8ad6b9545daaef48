//! Mono sample loading and the built-in creak loop

use super::{Filter, Oscillator, Waveform};
use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};
use std::path::Path;

/// A mono sample held in memory
#[derive(Debug, Clone)]
pub struct Sample {
    data: Vec<f32>,
    sample_rate: u32,
}

impl Sample {
    /// Wrap mono data recorded at `sample_rate`
    pub fn new(data: Vec<f32>, sample_rate: u32) -> Self {
        Self { data, sample_rate }
    }

    /// Load a WAV file, mixing all channels down to mono
    pub fn load_wav(path: &Path) -> Result<Self> {
        let mut reader = WavReader::open(path)
            .with_context(|| format!("failed to open WAV file: {:?}", path))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .context("failed to read samples")?,
            SampleFormat::Int => {
                let scale = 1.0 / (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .context("failed to read samples")?
            }
        };

        let data: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        if data.is_empty() {
            bail!("WAV file {:?} contains no audio", path);
        }

        tracing::debug!(?path, frames = data.len(), sample_rate = spec.sample_rate, "loaded sample");
        Ok(Self::new(data, spec.sample_rate))
    }

    /// Audio frames
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Rate the sample was recorded at
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the sample has no frames
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length in seconds
    pub fn duration_secs(&self) -> f64 {
        self.data.len() as f64 / self.sample_rate as f64
    }
}

/// Length of the synthesized creak loop in seconds
const CREAK_LOOP_SECS: f64 = 1.5;

/// Synthesize a looping hinge creak
///
/// Stick-slip friction is modelled as an irregular pulse train whose
/// density wanders with brown noise, rung through two wooden resonances.
pub fn synthesize_creak(sample_rate: u32) -> Sample {
    let rate = sample_rate as f64;
    let frames = (CREAK_LOOP_SECS * rate) as usize;

    let mut jitter = Oscillator::new(Waveform::WhiteNoise, 0.0, rate).with_seed(0x5eed);
    let mut wander = Oscillator::new(Waveform::BrownNoise, 0.0, rate).with_seed(0xc4ea);
    let mut body = Filter::band_pass(rate, 650.0, 12.0);
    let mut overtone = Filter::band_pass(rate, 1450.0, 9.0);
    let mut dc_block = Filter::high_pass(rate, 40.0);

    let mut data = Vec::with_capacity(frames);
    let mut until_pulse = 0.0;

    for _ in 0..frames {
        // 60..110 slips per second
        let slip_rate = 85.0 + wander.generate() * 25.0;

        let mut excitation = 0.0;
        until_pulse -= 1.0;
        if until_pulse <= 0.0 {
            excitation = 1.0 + jitter.generate() * 0.3;
            until_pulse += rate / slip_rate * (1.0 + jitter.generate() * 0.15);
        }

        let ringing = body.process(excitation) + 0.6 * overtone.process(excitation);
        data.push(dc_block.process(ringing) as f32);
    }

    fade_edges(&mut data, (0.01 * rate) as usize);
    normalize(&mut data, 0.9);
    Sample::new(data, sample_rate)
}

fn normalize(data: &mut [f32], peak: f32) {
    let max = data.iter().fold(0.0f32, |a, &b| a.max(b.abs()));
    if max > 0.0 {
        let scale = peak / max;
        for sample in data.iter_mut() {
            *sample *= scale;
        }
    }
}

/// Linear fade at both ends so the loop point does not click
fn fade_edges(data: &mut [f32], frames: usize) {
    let frames = frames.min(data.len() / 2);
    let len = data.len();
    for i in 0..frames {
        let gain = i as f32 / frames as f32;
        data[i] *= gain;
        data[len - 1 - i] *= gain;
    }
}
