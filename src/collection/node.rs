use anyhow::Context;

use crate::{
    container::image::MultiChannelImage,
    foundation::{
        core::{Dims, Vec3},
        error::{OdsError, OdsResult},
    },
    tonemap::compose::{ChannelQuad, ToneMapOptions, compose_rgba, depth_samples},
};

/// Caller-provided RGB-D panorama, validated when the collection is built.
#[derive(Clone, Debug)]
pub struct NodeInput {
    /// Capture position in world space.
    pub position: Vec3,
    /// Equirectangular size.
    pub dims: Dims,
    /// Straight RGBA8, row 0 at the zenith.
    pub color: Vec<u8>,
    /// Radial distance per pixel, same layout as `color`.
    pub depth: Vec<f32>,
}

impl NodeInput {
    /// Bundle already decoded buffers.
    pub fn new(position: Vec3, dims: Dims, color: Vec<u8>, depth: Vec<f32>) -> Self {
        Self {
            position,
            dims,
            color,
            depth,
        }
    }

    /// Color from an encoded image (PNG or any format the `image` crate reads), depth from raw
    /// little-endian `f32` samples.
    pub fn from_png_and_depth(png: &[u8], depth_f32le: &[u8], position: Vec3) -> OdsResult<Self> {
        let rgba = image::load_from_memory(png)
            .context("decode color panorama")?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        let dims = Dims::new(width, height)?;

        if depth_f32le.len() != dims.pixel_count() * 4 {
            return Err(OdsError::validation(format!(
                "depth buffer has {} bytes, expected {} for {width}x{height}",
                depth_f32le.len(),
                dims.pixel_count() * 4
            )));
        }
        let depth = depth_f32le
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok(Self::new(position, dims, rgba.into_raw(), depth))
    }

    /// Color and depth from channels of a decoded container.
    pub fn from_image(
        image: &MultiChannelImage,
        channels: &NodeChannels,
        position: Vec3,
        opts: &ToneMapOptions,
    ) -> OdsResult<Self> {
        let dims = Dims::new(image.width(), image.height())?;
        let color = compose_rgba(image, &channels.quad, opts)?;
        let depth = depth_samples(image, &channels.depth)?;
        Ok(Self::new(position, dims, color, depth))
    }

    pub(crate) fn validate(&self, index: usize) -> OdsResult<()> {
        let n = self.dims.pixel_count();
        if self.color.len() != n * 4 {
            return Err(OdsError::validation(format!(
                "node {index}: color buffer has {} bytes, expected {}",
                self.color.len(),
                n * 4
            )));
        }
        if self.depth.len() != n {
            return Err(OdsError::validation(format!(
                "node {index}: depth buffer has {} samples, expected {n}",
                self.depth.len()
            )));
        }
        if !self.position.is_finite() {
            return Err(OdsError::validation(format!(
                "node {index}: position must be finite"
            )));
        }
        Ok(())
    }
}

/// Channel names that make up one node inside a container.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeChannels {
    /// Color channels.
    pub quad: ChannelQuad,
    /// Depth channel.
    pub depth: String,
}

impl Default for NodeChannels {
    fn default() -> Self {
        Self {
            quad: ChannelQuad::rgba(),
            depth: "Z".to_owned(),
        }
    }
}

impl NodeChannels {
    /// `Image.<view>.{R,G,B,A}` and `Depth.<view>.V`.
    pub fn for_view(view: &str) -> Self {
        Self {
            quad: ChannelQuad::prefixed(&format!("Image.{view}.")),
            depth: format!("Depth.{view}.V"),
        }
    }
}

/// One captured RGB-D panorama at a known position. Immutable.
#[derive(Debug)]
pub struct SourceNode {
    position: Vec3,
    dims: Dims,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl SourceNode {
    pub(crate) fn from_input(input: NodeInput) -> Self {
        Self {
            position: input.position,
            dims: input.dims,
            color: input.color,
            depth: input.depth,
        }
    }

    /// Capture position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Panorama size.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// RGBA8 pixels, row-major.
    pub fn color(&self) -> &[u8] {
        &self.color
    }

    /// Depth samples, row-major.
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// RGBA of pixel `(x, y)`.
    pub fn color_at(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.dims.width as usize + x as usize) * 4;
        [
            self.color[i],
            self.color[i + 1],
            self.color[i + 2],
            self.color[i + 3],
        ]
    }

    /// Depth of pixel `(x, y)`.
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[y as usize * self.dims.width as usize + x as usize]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/collection/node.rs"]
mod tests;
