use serde::{Deserialize, Serialize};

/// The document packet that opens every CZML stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub version: String,
    pub clock: Clock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clock {
    pub interval: String,
    pub current_time: String,
    pub multiplier: f64,
    pub range: String,
    pub step: String,
}

/// An entity packet. Properties left as `None` are not serialized, so a
/// packet only updates what it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<OrientationProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionProperty {
    pub epoch: String,
    pub cartographic_degrees: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationProperty {
    pub epoch: String,
    pub unit_quaternion: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathProperty {
    pub show: bool,
    pub width: u32,
    pub lead_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub solid_color: SolidColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidColor {
    pub rgba: [u8; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProperty {
    pub gltf: String,
    pub scale: f64,
    pub minimum_pixel_size: f64,
    pub show: bool,
}
