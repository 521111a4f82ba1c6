use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything a session needs to dress up the packets it emits.
///
/// Loaded from the `stream` section of the config file; every field has a
/// default that matches the bundled Cesium client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub document_id: String,
    pub entity_id: String,
    pub entity_name: String,
    /// How far before "now" the timeline starts.
    #[serde(with = "crate::utils::duration")]
    pub lead_in: Duration,
    /// How far after "now" the timeline and the entity availability extend.
    #[serde(with = "crate::utils::duration")]
    pub window: Duration,
    pub model: ModelStyle,
    pub path: PathStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelStyle {
    pub gltf: String,
    pub scale: f64,
    pub minimum_pixel_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathStyle {
    pub width: u32,
    pub color: [u8; 4],
    pub lead_time: f64,
    pub resolution: Option<f64>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            document_id: "document".to_string(),
            entity_id: "drone".to_string(),
            entity_name: "Cesium Drone".to_string(),
            lead_in: Duration::from_secs(3),
            window: Duration::from_secs(5 * 60 * 60),
            model: ModelStyle::default(),
            path: PathStyle::default(),
        }
    }
}

impl Default for ModelStyle {
    fn default() -> Self {
        Self {
            gltf: "CesiumDrone.gltf".to_string(),
            scale: 0.5,
            minimum_pixel_size: 100.0,
        }
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            width: 1,
            color: [0, 255, 255, 255],
            lead_time: 0.0,
            resolution: None,
        }
    }
}
