use crate::foundation::error::{OdsError, OdsResult};

pub use glam::Vec3;

/// Panorama dimensions in pixels (one equirectangular image, one eye).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Dims {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dims {
    /// Create validated dimensions (both sides non-zero).
    pub fn new(width: u32, height: u32) -> OdsResult<Self> {
        if width == 0 || height == 0 {
            return Err(OdsError::validation("Dims width and height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Dimensions of the stacked stereo output (`width × 2·height`).
    pub fn stereo(self) -> Self {
        Self {
            width: self.width,
            height: self.height.saturating_mul(2),
        }
    }
}

/// Rectangular pixel region used for readback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Region {
    /// Left column (inclusive).
    pub x: u32,
    /// Top row (inclusive).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// Region covering all of `dims`.
    pub fn full(dims: Dims) -> Self {
        Self {
            x: 0,
            y: 0,
            width: dims.width,
            height: dims.height,
        }
    }

    /// Return `true` when the region is non-empty and lies inside `dims`.
    pub fn fits(self, dims: Dims) -> bool {
        self.width > 0
            && self.height > 0
            && u64::from(self.x) + u64::from(self.width) <= u64::from(dims.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(dims.height)
    }
}

/// Stereo eye selector.
///
/// The left eye rotates its camera by `+acos(r/|v|)` around the rig center, the right eye by
/// `-acos(r/|v|)`. In stacked output buffers the left eye occupies the top half.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Eye {
    /// Left eye, top half of the stacked output.
    Left,
    /// Right eye, bottom half of the stacked output.
    Right,
}

impl Eye {
    /// Both eyes in stacking order.
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    /// Signed rotation direction used by the toroidal baseline.
    pub fn sign(self) -> f64 {
        match self {
            Eye::Left => 1.0,
            Eye::Right => -1.0,
        }
    }

    /// First output row of this eye's half in a stacked buffer of per-eye height `height`.
    pub fn row_offset(self, height: u32) -> u32 {
        match self {
            Eye::Left => 0,
            Eye::Right => height,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
