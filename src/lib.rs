//! Live drone telemetry to Cesium CZML over server-sent events.
//!
//! Two ingestion workers copy position and attitude samples from the
//! telemetry service into a shared [`telemetry::StateStore`]. Each browser
//! connection to `/czml` gets its own [`session::SessionBroadcaster`] that
//! samples the store once per second and streams CZML packets.

pub mod czml;
pub mod session;
pub mod telemetry;
pub mod utils;
pub mod web;
