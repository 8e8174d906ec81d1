use std::f64::consts::FRAC_PI_2;

use crate::foundation::{
    core::{Dims, Eye},
    error::{OdsError, OdsResult},
};

/// PSNR reported for identical inputs.
pub const PSNR_IDENTICAL: f64 = 100.0;

fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        return PSNR_IDENTICAL;
    }
    20.0 * (255.0 / mse.sqrt()).log10()
}

/// Peak signal-to-noise ratio over every byte of two equally sized 8-bit images.
pub fn psnr(a: &[u8], b: &[u8]) -> OdsResult<f64> {
    if a.len() != b.len() || a.is_empty() {
        return Err(OdsError::validation(format!(
            "psnr needs two non-empty images of equal size, got {} and {} bytes",
            a.len(),
            b.len()
        )));
    }
    let sum: u64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let e = i64::from(*x) - i64::from(*y);
            (e * e) as u64
        })
        .sum();
    Ok(psnr_from_mse(sum as f64 / a.len() as f64))
}

/// RGB PSNR of RGBA8 `synth` against `truth`, counting only pixels where `synth` is not pure
/// black, so holes do not drag the score down.
pub fn psnr_masked(truth: &[u8], synth: &[u8]) -> OdsResult<f64> {
    if truth.len() != synth.len() || truth.len() % 4 != 0 {
        return Err(OdsError::validation(format!(
            "psnr_masked needs two RGBA8 images of equal size, got {} and {} bytes",
            truth.len(),
            synth.len()
        )));
    }
    let mut sum = 0u64;
    let mut valid = 0u64;
    for (t, s) in truth.chunks_exact(4).zip(synth.chunks_exact(4)) {
        if s[..3] == [0, 0, 0] {
            continue;
        }
        for c in 0..3 {
            let e = i64::from(t[c]) - i64::from(s[c]);
            sum += (e * e) as u64;
        }
        valid += 1;
    }
    if valid == 0 {
        return Err(OdsError::validation("psnr_masked: every synthesized pixel is a hole"));
    }
    Ok(psnr_from_mse(sum as f64 / (valid * 3) as f64))
}

/// Disocclusion hole coverage of a stacked stereo panorama.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct HoleArea {
    /// Fraction of black pixels in the whole image.
    pub pixel_fraction: f64,
    /// Fraction of each eye's sphere covered by holes, left then right.
    pub sphere_fraction: [f64; 2],
}

impl HoleArea {
    /// Sphere coverage averaged over both eyes.
    pub fn mean_sphere_fraction(&self) -> f64 {
        0.5 * (self.sphere_fraction[0] + self.sphere_fraction[1])
    }
}

/// Measure black pixels in a stacked RGBA8 panorama of per-eye size `dims`.
///
/// Each row is weighted by the spherical band it covers, `(sin(lat_top) − sin(lat_bottom)) / 2`,
/// so polar rows count for less than equatorial ones.
pub fn hole_area(rgba: &[u8], dims: Dims) -> OdsResult<HoleArea> {
    let stacked = dims.stereo();
    if rgba.len() != stacked.pixel_count() * 4 {
        return Err(OdsError::validation(format!(
            "hole_area expects {}x{} RGBA8 pixels, got {} bytes",
            stacked.width,
            stacked.height,
            rgba.len()
        )));
    }
    let width = dims.width as usize;
    let h = f64::from(dims.height);
    let mut black_total = 0usize;
    let mut sphere_fraction = [0.0; 2];

    for (e, eye) in Eye::BOTH.into_iter().enumerate() {
        for row in 0..dims.height {
            let y = (eye.row_offset(dims.height) + row) as usize;
            let black = rgba[y * width * 4..(y + 1) * width * 4]
                .chunks_exact(4)
                .filter(|px| px[..3] == [0, 0, 0])
                .count();
            black_total += black;
            let lat_top = FRAC_PI_2 - std::f64::consts::PI * f64::from(row) / h;
            let lat_bottom = FRAC_PI_2 - std::f64::consts::PI * f64::from(row + 1) / h;
            let band = 0.5 * (lat_top.sin() - lat_bottom.sin());
            sphere_fraction[e] += band * black as f64 / width as f64;
        }
    }

    Ok(HoleArea {
        pixel_fraction: black_total as f64 / stacked.pixel_count() as f64,
        sphere_fraction,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/analysis/metrics.rs"]
mod tests;
