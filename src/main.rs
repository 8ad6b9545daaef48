//! Hinge - laptop lid sonifier

use anyhow::{bail, Context, Result};
use clap::Parser;
use hinge::config::{self, EngineKind, HingeConfig, SensorConfig, SensorKind};
use hinge::engine::{
    default_device_name, drive, list_output_devices, render_timeline, AudioSink,
    EngineController, Player, Recorder, RenderSettings, RenderTick, SharedParameters,
};
use hinge::mapping::{CreakMapper, ParameterMapper, ThereminMapper};
use hinge::sensor::{AngleSource, Monitor, ReplaySource, SimulatedLid, Timeline};
use hinge::synth::{synthesize_creak, CreakVoice, Sample, ThereminVoice, Voice, VoiceSink};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

const EXAMPLE_CONFIG: &str = include_str!("../hinge.example.yaml");

/// How often `monitor` prints a diagnostics line
const MONITOR_REPORT_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Play { config: config_path } => {
            let cfg = config::load_config(&config_path)?;
            let params = Arc::new(SharedParameters::new());
            let voice = build_voice(&cfg, Arc::clone(&params))?;
            match cfg.engine.kind {
                EngineKind::Creak => play(&cfg, CreakMapper::new(), voice, params),
                EngineKind::Theremin => play(&cfg, theremin_mapper(&cfg)?, voice, params),
            }
        }

        Commands::Record {
            config: config_path,
            output,
            duration,
        } => {
            let cfg = config::load_config(&config_path)?;
            let params = Arc::new(SharedParameters::new());
            let voice = build_voice(&cfg, Arc::clone(&params))?;
            match cfg.engine.kind {
                EngineKind::Creak => record(&cfg, CreakMapper::new(), voice, params, &output, duration),
                EngineKind::Theremin => {
                    record(&cfg, theremin_mapper(&cfg)?, voice, params, &output, duration)
                }
            }
        }

        Commands::Monitor {
            config: config_path,
            duration,
        } => {
            let cfg = config::load_config(&config_path)?;
            let params = Arc::new(SharedParameters::new());
            match cfg.engine.kind {
                EngineKind::Creak => monitor(&cfg, CreakMapper::new(), params, duration),
                EngineKind::Theremin => monitor(&cfg, theremin_mapper(&cfg)?, params, duration),
            }
        }

        Commands::Devices => {
            println!("Available audio output devices:\n");

            let default = default_device_name();
            if let Some(name) = &default {
                println!("Default output: {}\n", name);
            }

            let devices = list_output_devices();
            if devices.is_empty() {
                println!("  (none found)");
            }
            for (name, config) in devices {
                let marker = if default.as_deref() == Some(name.as_str()) { "*" } else { "-" };
                println!(
                    "  {} {} ({} Hz, {} ch)",
                    marker, name, config.sample_rate.0, config.channels
                );
            }
            Ok(())
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Buffer size: {}", cfg.audio.buffer_size);
                    println!(
                        "  Device: {}",
                        cfg.audio.device.as_deref().unwrap_or("(default)")
                    );
                    println!(
                        "  Sensor: {:?} every {} ms",
                        cfg.sensor.kind, cfg.sensor.poll_interval_ms
                    );
                    println!("  Engine: {:?}", cfg.engine.kind);
                    println!("  Master volume: {:.0}%", cfg.engine.master_volume * 100.0);
                    if cfg.engine.kind == EngineKind::Theremin {
                        println!(
                            "  Range: {} - {} Hz",
                            cfg.engine.theremin.min_hz, cfg.engine.theremin.max_hz
                        );
                    }
                    Ok(())
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let path = "hinge.yaml";
            if Path::new(path).exists() {
                println!("hinge.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, EXAMPLE_CONFIG)?;
                println!("Created hinge.yaml with example configuration.");
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn theremin_mapper(cfg: &HingeConfig) -> Result<ThereminMapper> {
    let theremin = &cfg.engine.theremin;
    ThereminMapper::new(theremin.min_hz, theremin.max_hz).context("invalid theremin range")
}

fn build_voice(cfg: &HingeConfig, params: Arc<SharedParameters>) -> Result<Box<dyn Voice>> {
    let sample_rate = cfg.audio.sample_rate as f64;
    let voice: Box<dyn Voice> = match cfg.engine.kind {
        EngineKind::Creak => {
            let sample = match &cfg.engine.creak.sample {
                Some(path) => Sample::load_wav(path)?,
                None => synthesize_creak(cfg.audio.sample_rate),
            };
            if sample.is_empty() {
                bail!("Creak sample contains no audio");
            }
            Box::new(CreakVoice::new(sample, params, sample_rate))
        }
        EngineKind::Theremin => {
            let theremin = &cfg.engine.theremin;
            Box::new(ThereminVoice::with_vibrato(
                params,
                sample_rate,
                theremin.vibrato_hz,
                theremin.vibrato_depth,
            ))
        }
    };
    Ok(voice)
}

fn build_source(cfg: &SensorConfig) -> Result<Box<dyn AngleSource>> {
    Ok(match cfg.kind {
        SensorKind::Simulated => Box::new(SimulatedLid::new("simulated", cfg.seed)),
        SensorKind::Replay => Box::new(open_replay(cfg)?),
    })
}

fn build_timeline(cfg: &SensorConfig) -> Result<Box<dyn Timeline>> {
    Ok(match cfg.kind {
        SensorKind::Simulated => Box::new(SimulatedLid::new("simulated", cfg.seed)),
        SensorKind::Replay => Box::new(open_replay(cfg)?),
    })
}

fn open_replay(cfg: &SensorConfig) -> Result<ReplaySource> {
    let Some(path) = &cfg.path else {
        bail!("Replay sensor requires a path");
    };
    ReplaySource::from_path("replay", path)
        .with_context(|| format!("failed to load replay {:?}", path))
}

/// Ctrl-C as an async stop signal
fn stop_signal() -> Result<mpsc::UnboundedReceiver<()>> {
    let (tx, rx) = mpsc::unbounded_channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("failed to install Ctrl-C handler")?;
    Ok(rx)
}

fn play<M: ParameterMapper + 'static>(
    cfg: &HingeConfig,
    mapper: M,
    voice: Box<dyn Voice>,
    params: Arc<SharedParameters>,
) -> Result<()> {
    let mut player = Player::new();
    let sink = Arc::new(VoiceSink::new(params, player.ready_flag()));
    let engine = Arc::new(EngineController::new(mapper, sink as Arc<dyn AudioSink>));

    player.start(
        voice,
        Arc::clone(&engine) as Arc<dyn RenderTick>,
        cfg.audio.device.as_deref(),
        cfg.audio.buffer_size as u32,
        cfg.engine.master_volume,
    )?;
    engine.start().context("failed to start engine")?;

    println!(
        "Playing {} engine. Move the lid; Ctrl-C to stop.",
        engine.mapper().name()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut stop = stop_signal()?;
        let mut monitor = Monitor::new(
            build_source(&cfg.sensor)?,
            cfg.sensor.poll_interval(),
            engine.epoch(),
        );
        monitor.start()?;
        let driver = tokio::spawn(drive(Arc::clone(&engine), monitor.subscribe()));

        loop {
            tokio::select! {
                _ = stop.recv() => break,
                _ = tokio::time::sleep(Duration::from_millis(200)) => {
                    if !monitor.is_running() {
                        tracing::info!(source = monitor.name(), "sensor finished");
                        break;
                    }
                }
            }
        }

        monitor.stop().await;
        driver.abort();
        tracing::debug!(failed_reads = monitor.failed_reads(), "sensor stopped");
        Ok::<_, anyhow::Error>(())
    })?;

    engine.stop();
    player.stop();
    println!("Stopped.");
    Ok(())
}

fn record<M: ParameterMapper>(
    cfg: &HingeConfig,
    mapper: M,
    mut voice: Box<dyn Voice>,
    params: Arc<SharedParameters>,
    output: &Path,
    duration: f64,
) -> Result<()> {
    let sink = Arc::new(VoiceSink::offline(params));
    let engine = EngineController::new(mapper, sink as Arc<dyn AudioSink>);
    engine.start().context("failed to start engine")?;

    let mut timeline = build_timeline(&cfg.sensor)?;
    if let Some(length) = timeline.duration() {
        if length < duration {
            tracing::warn!(length, duration, "replay is shorter than the recording; holding last angle");
        }
    }

    println!("Recording {:.1} seconds to {:?}...", duration, output);
    let started = Instant::now();

    let mut recorder = Recorder::new(output, cfg.audio.sample_rate)?;
    let report = render_timeline(
        &engine,
        voice.as_mut(),
        timeline.as_mut(),
        &mut recorder,
        RenderSettings {
            seconds: duration,
            poll_interval: cfg.sensor.poll_interval().as_secs_f64(),
            master_volume: cfg.engine.master_volume,
        },
    )?;
    engine.stop();

    let recorded = recorder.duration_secs();
    recorder.finalize()?;

    tracing::info!(
        polls = report.polls,
        failed_reads = report.failed_reads,
        peak = report.peak,
        max_speed = report.max_speed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "render complete"
    );
    println!("Recorded {:.1}s to {:?}", recorded, output);
    Ok(())
}

fn monitor<M: ParameterMapper + 'static>(
    cfg: &HingeConfig,
    mapper: M,
    params: Arc<SharedParameters>,
    duration: f64,
) -> Result<()> {
    let sink = Arc::new(VoiceSink::offline(params));
    let engine = Arc::new(EngineController::new(mapper, sink as Arc<dyn AudioSink>));
    engine.start().context("failed to start engine")?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut stop = stop_signal()?;
        let mut monitor = Monitor::new(
            build_source(&cfg.sensor)?,
            cfg.sensor.poll_interval(),
            engine.epoch(),
        );
        monitor.start()?;
        let driver = tokio::spawn(drive(Arc::clone(&engine), monitor.subscribe()));

        let deadline = tokio::time::sleep(Duration::from_secs_f64(duration));
        tokio::pin!(deadline);
        let mut report = tokio::time::interval(MONITOR_REPORT_INTERVAL);

        loop {
            tokio::select! {
                _ = stop.recv() => break,
                _ = &mut deadline => break,
                _ = report.tick() => {
                    // No audio callback here, so ramps advance on the report clock
                    engine.tick(MONITOR_REPORT_INTERVAL.as_secs_f64());
                    println!("{}", serde_json::to_string(&engine.diagnostics())?);
                    if !monitor.is_running() {
                        break;
                    }
                }
            }
        }

        monitor.stop().await;
        driver.abort();
        Ok::<_, anyhow::Error>(())
    })?;

    engine.stop();
    Ok(())
}
