use crate::{
    container::image::MultiChannelImage,
    foundation::{
        core::Vec3,
        error::{OdsError, OdsResult},
    },
};

/// `{x, y, z}` position as written by the capture tools.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position3 {
    /// X.
    pub x: f32,
    /// Y.
    pub y: f32,
    /// Z.
    pub z: f32,
}

impl From<Position3> for Vec3 {
    fn from(p: Position3) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

impl From<Vec3> for Position3 {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Capture parameters stored as JSON in a container's `Note` attribute.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptureMetadata {
    /// Position of a single-view capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_position: Option<Position3>,
    /// Positions of a multi-view capture, parallel to the `multiView` list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub camera_positions: Vec<Position3>,
    /// Interpupillary distance the capture was rendered with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipd: Option<f32>,
    /// Projection sphere radius the capture was rendered with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_dist: Option<f32>,
    /// Near clip distance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub near: Option<f32>,
    /// Far clip distance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub far: Option<f32>,
}

impl CaptureMetadata {
    /// Parse the JSON text of a `Note` attribute.
    pub fn from_note(note: &str) -> OdsResult<Self> {
        serde_json::from_str(note)
            .map_err(|e| OdsError::serde(format!("capture metadata: {e}")))
    }

    /// Metadata of `image`, or `None` when it carries no `Note`.
    pub fn from_image(image: &MultiChannelImage) -> OdsResult<Option<Self>> {
        image.note().map(Self::from_note).transpose()
    }

    /// Position of view `index`, falling back to the single `camera_position` for view 0.
    pub fn position_of(&self, index: usize) -> Option<Vec3> {
        self.camera_positions
            .get(index)
            .copied()
            .or(if index == 0 { self.camera_position } else { None })
            .map(Vec3::from)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/collection/metadata.rs"]
mod tests;
