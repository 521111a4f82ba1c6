use serde::{Deserialize, Serialize};

/// Geodetic position as reported by the autopilot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub absolute_altitude_m: f64,
}

impl Position {
    pub fn new(longitude_deg: f64, latitude_deg: f64, absolute_altitude_m: f64) -> Self {
        Self {
            longitude_deg,
            latitude_deg,
            absolute_altitude_m,
        }
    }

    /// `[longitude, latitude, altitude]`, the order CZML cartographic degrees use.
    pub fn to_array(&self) -> [f64; 3] {
        [
            self.longitude_deg,
            self.latitude_deg,
            self.absolute_altitude_m,
        ]
    }
}

/// Attitude quaternion (x, y, z, w).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

/// Copy of the shared telemetry state taken at one instant.
///
/// Either field is `None` until the matching stream has delivered a sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub position: Option<Position>,
    pub orientation: Option<Quaternion>,
}

/// A decoded sample from one of the two subscriptions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryUpdate {
    Position(Position),
    Attitude(Quaternion),
}

impl From<Position> for TelemetryUpdate {
    fn from(position: Position) -> Self {
        TelemetryUpdate::Position(position)
    }
}

impl From<Quaternion> for TelemetryUpdate {
    fn from(quaternion: Quaternion) -> Self {
        TelemetryUpdate::Attitude(quaternion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Position,
    AttitudeQuaternion,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Position => "position",
            StreamKind::AttitudeQuaternion => "attitude_quaternion",
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
