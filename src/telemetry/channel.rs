use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use super::error::TelemetryError;
use super::source::{Subscription, TelemetrySource};
use super::types::{Position, Quaternion, StreamKind};

/// In-process telemetry source fed through channels.
///
/// Each subscription can be taken once. Dropping the matching
/// [`ChannelFeed`] sender ends that stream; sending an `Err` fails it.
pub struct ChannelSource {
    positions: Mutex<Option<mpsc::Receiver<Result<Position, TelemetryError>>>>,
    attitudes: Mutex<Option<mpsc::Receiver<Result<Quaternion, TelemetryError>>>>,
}

/// Producer side of a [`ChannelSource`].
pub struct ChannelFeed {
    pub positions: mpsc::Sender<Result<Position, TelemetryError>>,
    pub attitudes: mpsc::Sender<Result<Quaternion, TelemetryError>>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (Self, ChannelFeed) {
        let (position_tx, position_rx) = mpsc::channel(capacity);
        let (attitude_tx, attitude_rx) = mpsc::channel(capacity);
        let source = Self {
            positions: Mutex::new(Some(position_rx)),
            attitudes: Mutex::new(Some(attitude_rx)),
        };
        let feed = ChannelFeed {
            positions: position_tx,
            attitudes: attitude_tx,
        };
        (source, feed)
    }
}

pub struct ChannelSubscription<T> {
    rx: mpsc::Receiver<Result<T, TelemetryError>>,
}

impl<T: Send + 'static> Subscription for ChannelSubscription<T> {
    type Item = T;

    async fn recv(&mut self) -> Result<Option<T>, TelemetryError> {
        self.rx.recv().await.transpose()
    }
}

impl TelemetrySource for ChannelSource {
    type Positions = ChannelSubscription<Position>;
    type Attitudes = ChannelSubscription<Quaternion>;

    async fn subscribe_position(&self) -> Result<Self::Positions, TelemetryError> {
        self.positions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .map(|rx| ChannelSubscription { rx })
            .ok_or(TelemetryError::Unavailable(StreamKind::Position))
    }

    async fn subscribe_attitude_quaternion(&self) -> Result<Self::Attitudes, TelemetryError> {
        self.attitudes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .map(|rx| ChannelSubscription { rx })
            .ok_or(TelemetryError::Unavailable(StreamKind::AttitudeQuaternion))
    }
}
