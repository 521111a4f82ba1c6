use thiserror::Error;

use super::types::StreamKind;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to connect to telemetry endpoint {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid {kind} message: {source}")]
    Decode {
        kind: StreamKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} response is missing its payload")]
    MissingPayload(StreamKind),
    #[error("{0} subscription is not available")]
    Unavailable(StreamKind),
}
