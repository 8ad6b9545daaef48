//! Sensor polling
//!
//! Polls an [`AngleSource`] on a tokio task and publishes the most recent
//! valid sample through a single-slot watch channel. Readers always see the
//! latest angle; stale samples are overwritten rather than queued.

use super::{AngleSample, AngleSource};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Polls a sensor and publishes the latest sample
pub struct Monitor {
    name: String,
    interval: Duration,
    epoch: Instant,
    running: Arc<AtomicBool>,
    failed_reads: Arc<AtomicU64>,
    sender: Arc<watch::Sender<AngleSample>>,
    source: Option<Box<dyn AngleSource>>,
    task: Option<JoinHandle<Box<dyn AngleSource>>>,
}

impl Monitor {
    /// Create a monitor for `source`, stamping samples relative to `epoch`
    pub fn new(source: Box<dyn AngleSource>, interval: Duration, epoch: Instant) -> Self {
        let (sender, _) = watch::channel(AngleSample::invalid(0.0));
        Self {
            name: source.name().to_string(),
            interval,
            epoch,
            running: Arc::new(AtomicBool::new(false)),
            failed_reads: Arc::new(AtomicU64::new(0)),
            sender: Arc::new(sender),
            source: Some(source),
            task: None,
        }
    }

    /// Get the name of the monitored source
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribe to the latest valid sample
    pub fn subscribe(&self) -> watch::Receiver<AngleSample> {
        self.sender.subscribe()
    }

    /// Most recently published sample
    pub fn latest(&self) -> AngleSample {
        *self.sender.borrow()
    }

    /// Number of reads that returned the failure sentinel or an invalid angle
    pub fn failed_reads(&self) -> u64 {
        self.failed_reads.load(Ordering::Relaxed)
    }

    /// Check if the polling task is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start polling on the current tokio runtime
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let mut source = self
            .source
            .take()
            .ok_or_else(|| anyhow::anyhow!("source '{}' is still held by a stopping task", self.name))?;

        self.running.store(true, Ordering::SeqCst);

        let interval = self.interval;
        let epoch = self.epoch;
        let running = Arc::clone(&self.running);
        let failed_reads = Arc::clone(&self.failed_reads);
        let sender = Arc::clone(&self.sender);
        let name = self.name.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            while running.load(Ordering::SeqCst) {
                ticker.tick().await;

                if !source.is_available() {
                    tracing::info!(source = %name, "angle source exhausted");
                    running.store(false, Ordering::SeqCst);
                    break;
                }

                let angle = source.read();
                let sample = AngleSample::new(angle, epoch.elapsed().as_secs_f64());
                if sample.valid {
                    sender.send_replace(sample);
                } else {
                    failed_reads.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!(source = %name, angle, "dropping invalid angle reading");
                }
            }
            source
        });

        tracing::debug!(source = %self.name, interval_ms = interval.as_millis() as u64, "monitor started");
        self.task = Some(task);
        Ok(())
    }

    /// Stop polling and take the source back
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            match task.await {
                Ok(source) => self.source = Some(source),
                Err(e) => tracing::warn!(source = %self.name, error = %e, "monitor task failed"),
            }
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SENSOR_READ_FAILED;

    /// Yields a fixed sequence of readings, then repeats the last one
    struct Scripted {
        readings: Vec<f64>,
        index: usize,
    }

    impl AngleSource for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn read(&mut self) -> f64 {
            let value = self.readings[self.index.min(self.readings.len() - 1)];
            self.index += 1;
            value
        }
    }

    fn scripted(readings: &[f64]) -> Box<dyn AngleSource> {
        Box::new(Scripted {
            readings: readings.to_vec(),
            index: 0,
        })
    }

    #[tokio::test]
    async fn test_monitor_creation() {
        let monitor = Monitor::new(scripted(&[10.0]), Duration::from_millis(5), Instant::now());
        assert_eq!(monitor.name(), "scripted");
        assert!(!monitor.is_running());
        assert!(!monitor.latest().valid);
    }

    #[tokio::test]
    async fn test_monitor_publishes_latest() {
        let mut monitor = Monitor::new(
            scripted(&[10.0, 20.0, 30.0]),
            Duration::from_millis(2),
            Instant::now(),
        );
        let mut receiver = monitor.subscribe();
        monitor.start().unwrap();

        let result = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                receiver.changed().await.unwrap();
                let sample = *receiver.borrow_and_update();
                if sample.angle == 30.0 {
                    return sample;
                }
            }
        })
        .await;

        monitor.stop().await;
        let sample = result.expect("timeout");
        assert!(sample.valid);
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_monitor_drops_failed_reads() {
        let mut monitor = Monitor::new(
            scripted(&[SENSOR_READ_FAILED, SENSOR_READ_FAILED, 400.0, 15.0]),
            Duration::from_millis(2),
            Instant::now(),
        );
        let mut receiver = monitor.subscribe();
        monitor.start().unwrap();

        let first = tokio::time::timeout(Duration::from_secs(2), receiver.changed()).await;
        monitor.stop().await;

        first.expect("timeout").unwrap();
        assert_eq!(receiver.borrow().angle, 15.0);
        assert_eq!(monitor.failed_reads(), 3);
    }

    #[tokio::test]
    async fn test_monitor_restart_after_stop() {
        let mut monitor = Monitor::new(scripted(&[5.0]), Duration::from_millis(2), Instant::now());
        monitor.start().unwrap();
        monitor.stop().await;
        assert!(monitor.start().is_ok());
        monitor.stop().await;
    }
}
