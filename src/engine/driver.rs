//! Sensor-to-engine forwarding
//!
//! Bridges the monitor's watch channel to an engine controller on the
//! sensor side, applying idle decay when the sensor goes quiet.

use super::EngineController;
use crate::mapping::ParameterMapper;
use crate::motion::MOVEMENT_TIMEOUT;
use crate::sensor::AngleSample;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Forward samples into `engine` until the sender side is dropped
pub async fn drive<M: ParameterMapper>(
    engine: Arc<EngineController<M>>,
    mut samples: watch::Receiver<AngleSample>,
) {
    let timeout = Duration::from_secs_f64(MOVEMENT_TIMEOUT);

    loop {
        match tokio::time::timeout(timeout, samples.changed()).await {
            Ok(Ok(())) => {
                let sample = *samples.borrow_and_update();
                engine.update_sample(sample);
            }
            Ok(Err(_)) => break,
            Err(_) => engine.idle(),
        }
    }
    tracing::debug!(engine = engine.mapper().name(), "sample stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sink::testing::RecordingSink;
    use crate::engine::AudioSink;
    use crate::mapping::CreakMapper;

    #[tokio::test]
    async fn test_drive_forwards_samples() {
        let sink = Arc::new(RecordingSink::default());
        let engine = Arc::new(EngineController::new(
            CreakMapper::new(),
            Arc::clone(&sink) as Arc<dyn AudioSink>,
        ));
        engine.start().unwrap();

        let (sender, receiver) = watch::channel(AngleSample::invalid(0.0));
        let task = tokio::spawn(drive(Arc::clone(&engine), receiver));

        sender.send_replace(AngleSample::new(45.0, 0.0));
        tokio::time::sleep(Duration::from_millis(20)).await;
        sender.send_replace(AngleSample::new(47.0, 0.2));
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(sender);
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("driver did not exit")
            .unwrap();

        assert_eq!(engine.angle(), 47.0);
        assert!(sink.write_count() > 2);
    }
}
