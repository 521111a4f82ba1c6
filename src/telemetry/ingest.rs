use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::error::TelemetryError;
use super::source::{Subscription, TelemetrySource};
use super::store::StateStore;
use super::types::{StreamKind, TelemetryUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionOutcome {
    /// The upstream closed the subscription.
    EndOfStream,
    /// A receive or decode error ended the subscription.
    Failed(String),
    /// The process is shutting down.
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionReport {
    pub kind: StreamKind,
    pub samples: u64,
    pub outcome: IngestionOutcome,
}

/// Copies samples from one subscription into the [`StateStore`].
///
/// A worker runs until its stream ends or fails and is never restarted. The
/// store keeps the last value it wrote for as long as the process lives.
pub struct IngestionWorker<S> {
    kind: StreamKind,
    subscription: S,
    store: StateStore,
}

impl<S> IngestionWorker<S>
where
    S: Subscription,
    S::Item: Into<TelemetryUpdate>,
{
    pub fn new(kind: StreamKind, subscription: S, store: StateStore) -> Self {
        Self {
            kind,
            subscription,
            store,
        }
    }

    pub async fn run(mut self, shutdown: CancellationToken) -> IngestionReport {
        let mut samples: u64 = 0;

        let outcome = loop {
            let received = tokio::select! {
                biased;

                _ = shutdown.cancelled() => break IngestionOutcome::Shutdown,
                received = self.subscription.recv() => received,
            };

            match received {
                Ok(Some(sample)) => {
                    self.store.apply(sample.into());
                    samples += 1;
                    if samples == 1 {
                        log::info!("First {} sample received", self.kind);
                    }
                }
                Ok(None) => {
                    log::warn!("{} stream ended after {} samples", self.kind, samples);
                    break IngestionOutcome::EndOfStream;
                }
                Err(e) => {
                    log::error!("{} stream failed after {} samples: {}", self.kind, samples, e);
                    break IngestionOutcome::Failed(e.to_string());
                }
            }
        };

        IngestionReport {
            kind: self.kind,
            samples,
            outcome,
        }
    }
}

pub struct IngestionHandles {
    pub position: JoinHandle<IngestionReport>,
    pub attitude: JoinHandle<IngestionReport>,
}

/// Subscribes to both streams and spawns one worker per stream.
///
/// Fails without spawning anything if either subscribe call fails.
pub async fn spawn_ingestion<T: TelemetrySource>(
    source: &T,
    store: StateStore,
    shutdown: CancellationToken,
) -> Result<IngestionHandles, TelemetryError> {
    let positions = source.subscribe_position().await?;
    let attitudes = source.subscribe_attitude_quaternion().await?;

    let position = tokio::spawn(
        IngestionWorker::new(StreamKind::Position, positions, store.clone())
            .run(shutdown.clone()),
    );
    let attitude = tokio::spawn(
        IngestionWorker::new(StreamKind::AttitudeQuaternion, attitudes, store).run(shutdown),
    );

    Ok(IngestionHandles { position, attitude })
}
