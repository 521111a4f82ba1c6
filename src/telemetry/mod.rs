mod channel;
mod error;
mod ingest;
mod ndjson;
mod source;
mod store;
mod types;

pub use channel::{ChannelFeed, ChannelSource, ChannelSubscription};
pub use error::TelemetryError;
pub use ingest::{
    spawn_ingestion, IngestionHandles, IngestionOutcome, IngestionReport, IngestionWorker,
};
pub use ndjson::{
    AttitudeQuaternionResponse, Message, NdjsonSource, NdjsonSubscription, PositionResponse,
    DEFAULT_ENDPOINT,
};
pub use source::{Subscription, TelemetrySource};
pub use store::StateStore;
pub use types::{Position, Quaternion, StreamKind, TelemetrySnapshot, TelemetryUpdate};
