//! Telemetry source abstraction.
//!
//! A source hands out two independent subscriptions, one per stream kind.
//! The ingestion workers only ever see the [`Subscription`] side, so the
//! TCP client and the in-process channel source are interchangeable.

use std::future::Future;

use super::error::TelemetryError;
use super::types::{Position, Quaternion};

/// An open push subscription.
///
/// `recv` yields `Ok(Some(sample))` for each message, `Ok(None)` once the
/// upstream closes the stream and `Err` on a transport or decode failure.
/// After `None` or `Err` the subscription is finished.
pub trait Subscription: Send + 'static {
    type Item: Send;

    fn recv(&mut self) -> impl Future<Output = Result<Option<Self::Item>, TelemetryError>> + Send;
}

pub trait TelemetrySource {
    type Positions: Subscription<Item = Position>;
    type Attitudes: Subscription<Item = Quaternion>;

    fn subscribe_position(
        &self,
    ) -> impl Future<Output = Result<Self::Positions, TelemetryError>> + Send;

    fn subscribe_attitude_quaternion(
        &self,
    ) -> impl Future<Output = Result<Self::Attitudes, TelemetryError>> + Send;
}
