//! TCP client for a telemetry service speaking newline-delimited JSON.
//!
//! Every subscription opens its own connection, writes one request line and
//! then reads one response object per line:
//!
//! ```text
//! -> {"subscribe":"position"}
//! <- {"position":{"latitude_deg":35.681,"longitude_deg":139.767,"absolute_altitude_m":50.0,"relative_altitude_m":10.0}}
//! -> {"subscribe":"attitude_quaternion"}
//! <- {"attitude_quaternion":{"w":1.0,"x":0.0,"y":0.0,"z":0.0}}
//! ```

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;

use super::error::TelemetryError;
use super::source::{Subscription, TelemetrySource};
use super::types::{Position, Quaternion, StreamKind};

/// Kept off 50051, which `mavsdk_server` uses for gRPC.
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:47800";

#[derive(Debug, Clone)]
pub struct NdjsonSource {
    endpoint: String,
}

impl NdjsonSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn subscribe<M: Message>(&self) -> Result<NdjsonSubscription<M>, TelemetryError> {
        let stream = TcpStream::connect(&self.endpoint)
            .await
            .map_err(|source| TelemetryError::Connect {
                endpoint: self.endpoint.clone(),
                source,
            })?;
        stream.set_nodelay(true)?;
        let (read, mut write) = stream.into_split();

        let mut request = serde_json::to_vec(&SubscribeRequest {
            subscribe: M::KIND,
        })
        .map_err(|source| TelemetryError::Decode {
            kind: M::KIND,
            source,
        })?;
        request.push(b'\n');
        write.write_all(&request).await?;
        write.flush().await?;

        log::info!("Subscribed to {} on {}", M::KIND, self.endpoint);

        Ok(NdjsonSubscription {
            lines: BufReader::new(read).lines(),
            _write: write,
            _message: PhantomData,
        })
    }
}

impl Default for NdjsonSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl TelemetrySource for NdjsonSource {
    type Positions = NdjsonSubscription<PositionResponse>;
    type Attitudes = NdjsonSubscription<AttitudeQuaternionResponse>;

    async fn subscribe_position(&self) -> Result<Self::Positions, TelemetryError> {
        self.subscribe().await
    }

    async fn subscribe_attitude_quaternion(&self) -> Result<Self::Attitudes, TelemetryError> {
        self.subscribe().await
    }
}

#[derive(Serialize)]
struct SubscribeRequest {
    subscribe: StreamKind,
}

/// A response line for one stream kind.
pub trait Message: DeserializeOwned + Send + 'static {
    const KIND: StreamKind;
    type Sample: Send;

    fn into_sample(self) -> Option<Self::Sample>;
}

#[derive(Debug, Deserialize)]
pub struct PositionResponse {
    position: Option<PositionMessage>,
}

#[derive(Debug, Deserialize)]
struct PositionMessage {
    latitude_deg: f64,
    longitude_deg: f64,
    absolute_altitude_m: f64,
}

impl Message for PositionResponse {
    const KIND: StreamKind = StreamKind::Position;
    type Sample = Position;

    fn into_sample(self) -> Option<Position> {
        self.position
            .map(|p| Position::new(p.longitude_deg, p.latitude_deg, p.absolute_altitude_m))
    }
}

#[derive(Debug, Deserialize)]
pub struct AttitudeQuaternionResponse {
    attitude_quaternion: Option<QuaternionMessage>,
}

#[derive(Debug, Deserialize)]
struct QuaternionMessage {
    w: f64,
    x: f64,
    y: f64,
    z: f64,
}

impl Message for AttitudeQuaternionResponse {
    const KIND: StreamKind = StreamKind::AttitudeQuaternion;
    type Sample = Quaternion;

    fn into_sample(self) -> Option<Quaternion> {
        self.attitude_quaternion
            .map(|q| Quaternion::new(q.x, q.y, q.z, q.w))
    }
}

pub struct NdjsonSubscription<M> {
    lines: Lines<BufReader<OwnedReadHalf>>,
    // Keeps the connection open for the lifetime of the subscription.
    _write: tokio::net::tcp::OwnedWriteHalf,
    _message: PhantomData<fn() -> M>,
}

impl<M: Message> Subscription for NdjsonSubscription<M> {
    type Item = M::Sample;

    async fn recv(&mut self) -> Result<Option<M::Sample>, TelemetryError> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                continue;
            }
            return decode_line::<M>(&line).map(Some);
        }
    }
}

fn decode_line<M: Message>(line: &str) -> Result<M::Sample, TelemetryError> {
    let message: M = serde_json::from_str(line).map_err(|source| TelemetryError::Decode {
        kind: M::KIND,
        source,
    })?;
    message
        .into_sample()
        .ok_or(TelemetryError::MissingPayload(M::KIND))
}
