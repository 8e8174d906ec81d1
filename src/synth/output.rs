use crate::foundation::{
    core::{Dims, Eye, Region},
    error::{OdsError, OdsResult},
};

/// Result of one synthesis call: a stacked stereo panorama, left eye on top.
///
/// Both buffers cover `width × 2·height` pixels, row 0 at the zenith of the left eye. Holes are
/// opaque black with depth `z_max`.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesizedPanorama {
    dims: Dims,
    rgba: Vec<u8>,
    depth: Vec<f32>,
}

impl SynthesizedPanorama {
    pub(crate) fn from_parts(dims: Dims, rgba: Vec<u8>, depth: Vec<f32>) -> OdsResult<Self> {
        let n = dims.stereo().pixel_count();
        if rgba.len() != n * 4 || depth.len() != n {
            return Err(OdsError::synthesis(format!(
                "output buffers hold {} color bytes and {} depths, expected {} and {n}",
                rgba.len(),
                depth.len(),
                n * 4
            )));
        }
        Ok(Self { dims, rgba, depth })
    }

    /// Per-eye panorama size.
    pub fn eye_dims(&self) -> Dims {
        self.dims
    }

    /// Size of the stacked buffer.
    pub fn dims(&self) -> Dims {
        self.dims.stereo()
    }

    /// Stacked RGBA8 pixels, row-major.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Stacked depths, row-major.
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// RGBA8 pixels of one eye.
    pub fn eye_rgba(&self, eye: Eye) -> &[u8] {
        let start = eye.row_offset(self.dims.height) as usize * self.dims.width as usize * 4;
        &self.rgba[start..start + self.dims.pixel_count() * 4]
    }

    /// Depths of one eye.
    pub fn eye_depth(&self, eye: Eye) -> &[f32] {
        let start = eye.row_offset(self.dims.height) as usize * self.dims.width as usize;
        &self.depth[start..start + self.dims.pixel_count()]
    }

    fn check_region(&self, region: Region) -> OdsResult<()> {
        if !region.fits(self.dims()) {
            let d = self.dims();
            return Err(OdsError::validation(format!(
                "readback region {}x{}+{}+{} is outside the {}x{} panorama",
                region.width, region.height, region.x, region.y, d.width, d.height
            )));
        }
        Ok(())
    }

    /// Copy an RGBA8 region of the stacked buffer, row-major.
    pub fn readback_rgba(&self, region: Region) -> OdsResult<Vec<u8>> {
        self.check_region(region)?;
        let stride = self.dims.width as usize * 4;
        let mut out = Vec::with_capacity(region.width as usize * region.height as usize * 4);
        for y in region.y..region.y + region.height {
            let start = y as usize * stride + region.x as usize * 4;
            out.extend_from_slice(&self.rgba[start..start + region.width as usize * 4]);
        }
        Ok(out)
    }

    /// Copy a depth region of the stacked buffer, row-major.
    pub fn readback_depth(&self, region: Region) -> OdsResult<Vec<f32>> {
        self.check_region(region)?;
        let stride = self.dims.width as usize;
        let mut out = Vec::with_capacity(region.width as usize * region.height as usize);
        for y in region.y..region.y + region.height {
            let start = y as usize * stride + region.x as usize;
            out.extend_from_slice(&self.depth[start..start + region.width as usize]);
        }
        Ok(out)
    }

    /// Stacked color as an `image` buffer, ready for PNG export.
    pub fn to_rgba_image(&self) -> OdsResult<image::RgbaImage> {
        let d = self.dims();
        image::RgbaImage::from_raw(d.width, d.height, self.rgba.clone())
            .ok_or_else(|| OdsError::synthesis("color buffer does not match panorama size"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/synth/output.rs"]
mod tests;
