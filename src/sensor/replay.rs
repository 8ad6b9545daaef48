//! Replay of recorded lid angles
//!
//! Reads a CSV of `seconds,angle` lines and plays it back with
//! sample-and-hold between rows.

use super::{AngleSource, Timeline, SENSOR_READ_FAILED};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

/// Errors loading a replay file
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("failed to read replay file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("replay file contains no samples")]
    Empty,
}

/// A source that replays recorded readings
#[derive(Debug)]
pub struct ReplaySource {
    name: String,
    /// (seconds, angle) rows, sorted by time
    rows: Vec<(f64, f64)>,
    cursor: usize,
    started: Option<Instant>,
}

impl ReplaySource {
    /// Load a replay from a CSV file
    pub fn from_path(name: impl Into<String>, path: &Path) -> Result<Self, SensorError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(name, &contents)
    }

    /// Parse replay rows from CSV text
    ///
    /// Blank lines, `#` comments and a non-numeric header line are skipped.
    /// An angle column may hold the failure sentinel or be empty to mark a
    /// failed read.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, SensorError> {
        let mut rows = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (time, angle) = line.split_once(',').ok_or_else(|| SensorError::Parse {
                line: index + 1,
                message: "expected `seconds,angle`".to_string(),
            })?;

            let time: f64 = match time.trim().parse() {
                Ok(t) => t,
                // Header row
                Err(_) if rows.is_empty() && index == 0 => continue,
                Err(_) => {
                    return Err(SensorError::Parse {
                        line: index + 1,
                        message: format!("invalid time `{}`", time.trim()),
                    })
                }
            };

            let angle = match angle.trim() {
                "" => SENSOR_READ_FAILED,
                value => value.parse().map_err(|_| SensorError::Parse {
                    line: index + 1,
                    message: format!("invalid angle `{}`", value),
                })?,
            };

            rows.push((time, angle));
        }

        if rows.is_empty() {
            return Err(SensorError::Empty);
        }
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Self {
            name: name.into(),
            rows,
            cursor: 0,
            started: None,
        })
    }

    /// Number of recorded rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the replay has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn elapsed(&self) -> f64 {
        self.started
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl Timeline for ReplaySource {
    fn angle_at(&mut self, seconds: f64) -> f64 {
        if seconds < self.rows[0].0 {
            return SENSOR_READ_FAILED;
        }

        // Rows are usually read in order; rewind only when time goes backwards
        if self.rows[self.cursor].0 > seconds {
            self.cursor = 0;
        }
        while self.cursor + 1 < self.rows.len() && self.rows[self.cursor + 1].0 <= seconds {
            self.cursor += 1;
        }
        self.rows[self.cursor].1
    }

    fn duration(&self) -> Option<f64> {
        self.rows.last().map(|(t, _)| *t)
    }
}

impl AngleSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self) -> f64 {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
        let now = self.elapsed();
        self.angle_at(now)
    }

    fn is_available(&self) -> bool {
        match (self.started, self.duration()) {
            (Some(_), Some(end)) => self.elapsed() <= end,
            _ => true,
        }
    }
}
