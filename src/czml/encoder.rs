//! Pure mapping from telemetry state to CZML packets and event-stream frames.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use super::error::CzmlError;
use super::style::StreamSettings;
use super::types::{
    Clock, Document, Material, ModelProperty, OrientationProperty, Packet, PathProperty,
    PositionProperty, SolidColor,
};
use crate::session::TrackSample;
use crate::telemetry::TelemetrySnapshot;

pub const DOCUMENT_VERSION: &str = "1.0";
pub const CLOCK_MULTIPLIER: f64 = 1.0;
pub const CLOCK_RANGE: &str = "LOOP_STOP";
pub const CLOCK_STEP: &str = "SYSTEM_CLOCK_MULTIPLIER";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_time(time: DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn interval(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!("{}/{}", format_time(start), format_time(end))
}

fn later(time: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|d| time.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn earlier(time: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|d| time.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Timeline metadata: a window starting `lead_in` before `now` and running
/// `window` past it, played back in real time.
pub fn document_packet(settings: &StreamSettings, now: DateTime<Utc>) -> Document {
    let start = earlier(now, settings.lead_in);
    Document {
        id: settings.document_id.clone(),
        version: DOCUMENT_VERSION.to_string(),
        clock: Clock {
            interval: interval(start, later(now, settings.window)),
            current_time: format_time(start),
            multiplier: CLOCK_MULTIPLIER,
            range: CLOCK_RANGE.to_string(),
            step: CLOCK_STEP.to_string(),
        },
    }
}

/// Static placement of the model at the session epoch.
pub fn placement_packet(
    snapshot: &TelemetrySnapshot,
    settings: &StreamSettings,
    epoch: DateTime<Utc>,
) -> Packet {
    let epoch_str = format_time(epoch);
    let cartographic_degrees = snapshot
        .position
        .map(|p| p.to_array().to_vec())
        .unwrap_or_default();
    let unit_quaternion = snapshot
        .orientation
        .map(|q| q.to_array().to_vec())
        .unwrap_or_default();

    Packet {
        id: settings.entity_id.clone(),
        name: Some(settings.entity_name.clone()),
        availability: Some(interval(epoch, later(epoch, settings.window))),
        position: Some(PositionProperty {
            epoch: epoch_str.clone(),
            cartographic_degrees,
        }),
        orientation: Some(OrientationProperty {
            epoch: epoch_str,
            unit_quaternion,
        }),
        path: None,
        model: Some(ModelProperty {
            gltf: settings.model.gltf.clone(),
            scale: settings.model.scale,
            minimum_pixel_size: settings.model.minimum_pixel_size,
            show: true,
        }),
    }
}

/// One incremental track sample, time-tagged in seconds since `epoch`.
pub fn track_packet(
    sample: &TrackSample,
    settings: &StreamSettings,
    epoch: DateTime<Utc>,
) -> Packet {
    let epoch_str = format_time(epoch);
    let t = sample.flight_time as f64;

    let mut cartographic_degrees = vec![t];
    if let Some(p) = sample.position {
        cartographic_degrees.extend_from_slice(&p.to_array());
    }
    let mut unit_quaternion = vec![t];
    if let Some(q) = sample.orientation {
        unit_quaternion.extend_from_slice(&q.to_array());
    }

    Packet {
        id: settings.entity_id.clone(),
        name: None,
        availability: None,
        position: Some(PositionProperty {
            epoch: epoch_str.clone(),
            cartographic_degrees,
        }),
        orientation: Some(OrientationProperty {
            epoch: epoch_str,
            unit_quaternion,
        }),
        path: Some(PathProperty {
            show: true,
            width: settings.path.width,
            lead_time: settings.path.lead_time,
            resolution: settings.path.resolution,
            material: Material {
                solid_color: SolidColor {
                    rgba: settings.path.color,
                },
            },
        }),
        model: None,
    }
}

/// Frames a record for the event stream: `id: <id>\ndata: <json>\n\n`.
pub fn encode_frame<T: Serialize>(id: i64, record: &T) -> Result<String, CzmlError> {
    let data = serde_json::to_string(record)?;
    Ok(format!("id: {}\ndata: {}\n\n", id, data))
}
