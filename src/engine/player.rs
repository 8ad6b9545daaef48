//! Real-time audio playback using cpal
//!
//! Each output callback first advances the engine's parameter ramps by the
//! buffer's duration, then renders the voice.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, Stream, StreamConfig, SupportedBufferSize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::RenderTick;
use crate::synth::Voice;

/// Real-time audio player
pub struct Player {
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
    sample_rate: Option<u32>,
}

impl Player {
    /// Create a stopped player
    pub fn new() -> Self {
        Self {
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
            sample_rate: None,
        }
    }

    /// Flag that is true while the output stream is playing
    pub fn ready_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sample rate of the open stream
    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Open an output device and start rendering `voice`
    ///
    /// `device` selects an output by name; `None` uses the default output.
    /// `buffer_frames` is clamped to what the device supports.
    pub fn start(
        &mut self,
        mut voice: Box<dyn Voice>,
        ticker: Arc<dyn RenderTick>,
        device: Option<&str>,
        buffer_frames: u32,
        master_volume: f32,
    ) -> Result<()> {
        let device = find_output_device(device)?;
        let config = device.default_output_config()?;
        let sample_format = config.sample_format();
        let buffer_size = choose_buffer_size(config.buffer_size(), buffer_frames);
        let mut stream_config: StreamConfig = config.into();
        stream_config.buffer_size = buffer_size;

        voice.set_sample_rate(stream_config.sample_rate.0 as f64);
        tracing::info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = stream_config.sample_rate.0,
            channels = stream_config.channels,
            buffer = ?stream_config.buffer_size,
            voice = voice.name(),
            "opening audio output"
        );

        let render = Render {
            voice,
            ticker,
            running: Arc::clone(&self.running),
            channels: stream_config.channels as usize,
            sample_rate: stream_config.sample_rate.0 as f64,
            master_volume,
        };

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, render)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, render)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, render)?,
            other => return Err(anyhow!("Unsupported sample format {:?}", other)),
        };

        stream.play()?;
        self.sample_rate = Some(stream_config.sample_rate.0);
        self.stream = Some(stream);
        self.running.store(true, Ordering::SeqCst);

        Ok(())
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State moved into the audio callback
struct Render {
    voice: Box<dyn Voice>,
    ticker: Arc<dyn RenderTick>,
    running: Arc<AtomicBool>,
    channels: usize,
    sample_rate: f64,
    master_volume: f32,
}

impl Render {
    fn fill<T: cpal::Sample + cpal::FromSample<f32>>(&mut self, data: &mut [T]) {
        if !self.running.load(Ordering::Acquire) {
            for sample in data.iter_mut() {
                *sample = T::from_sample(0.0f32);
            }
            return;
        }

        let frames = data.len() / self.channels.max(1);
        self.ticker.tick(frames as f64 / self.sample_rate);

        for frame in data.chunks_mut(self.channels.max(1)) {
            let value = self.voice.process() as f32 * self.master_volume;
            for channel_sample in frame.iter_mut() {
                *channel_sample = T::from_sample(value);
            }
        }
    }
}

fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    mut render: Render,
) -> Result<Stream> {
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| render.fill(data),
        |err| {
            tracing::error!(error = %err, "audio stream error");
        },
        None,
    )?;

    Ok(stream)
}

/// Fixed buffer of `frames`, within the device's supported range
fn choose_buffer_size(supported: &SupportedBufferSize, frames: u32) -> BufferSize {
    match supported {
        SupportedBufferSize::Range { min, max } if min <= max => {
            BufferSize::Fixed(frames.clamp(*min, *max))
        }
        _ => BufferSize::Default,
    }
}

fn find_output_device(name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();
    match name {
        None => host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available")),
        Some(wanted) => host
            .output_devices()?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| anyhow!("Output device '{}' not found", wanted)),
    }
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}

/// List all available output devices
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
