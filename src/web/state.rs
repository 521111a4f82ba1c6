use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::czml::StreamSettings;
use crate::session::Timeline;
use crate::telemetry::StateStore;

#[derive(Clone)]
pub struct AppState {
    pub store: StateStore,
    pub settings: Arc<StreamSettings>,
    pub timeline: Timeline,
    /// Parent of every session token; cancelled on server shutdown.
    pub shutdown: CancellationToken,
}
