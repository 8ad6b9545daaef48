//! CLI interface for Hinge

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Longest session `record` and `monitor` accept, in seconds
const MAX_DURATION_SECS: f64 = 86_400.0;

/// Turn laptop lid motion into sound
#[derive(Parser)]
#[command(name = "hinge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play the lid in real time until Ctrl-C
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "hinge.yaml")]
        config: PathBuf,
    },

    /// Render a sensor session to a WAV file
    Record {
        /// Configuration file path
        #[arg(short, long, default_value = "hinge.yaml")]
        config: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value = "10", value_parser = parse_duration)]
        duration: f64,
    },

    /// List available audio output devices
    Devices,

    /// Print engine diagnostics as JSON lines without producing audio
    Monitor {
        /// Configuration file path
        #[arg(short, long, default_value = "hinge.yaml")]
        config: PathBuf,

        /// Stop after this many seconds
        #[arg(short, long, default_value = "10", value_parser = parse_duration)]
        duration: f64,
    },

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "hinge.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}

fn parse_duration(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if seconds.is_finite() && seconds > 0.0 && seconds <= MAX_DURATION_SECS {
        Ok(seconds)
    } else {
        Err(format!(
            "duration must be greater than 0 and at most {} seconds",
            MAX_DURATION_SECS
        ))
    }
}
