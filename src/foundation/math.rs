use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec3;

/// Below this magnitude an x/y component counts as lying on the polar axis.
pub(crate) const POLAR_EPSILON: f64 = 1e-6;

/// Floored modulo; the result carries the sign of `div`.
pub(crate) fn fmod(num: f64, div: f64) -> f64 {
    num - div * (num / div).floor()
}

/// Shader-style sign: `-1`, `0` or `1`.
pub(crate) fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Azimuth of `v` around the spherical z axis, in `[0, 2π)`.
///
/// On the polar axis the angle is undefined; it is pinned to `(1 - sign(z)/2)·π`.
pub(crate) fn azimuth(v: DVec3) -> f64 {
    if v.x.abs() < POLAR_EPSILON && v.y.abs() < POLAR_EPSILON {
        (1.0 - 0.5 * sign(v.z)) * PI
    } else {
        let a = fmod(v.y.atan2(v.x), TAU);
        if a >= TAU { 0.0 } else { a }
    }
}

/// Inclination of `v` measured from +z, given its magnitude.
pub(crate) fn inclination(v: DVec3, magnitude: f64) -> f64 {
    (v.z / magnitude).clamp(-1.0, 1.0).acos()
}

/// Point at `depth` along the equirectangular direction `(azimuth, inclination)`.
pub(crate) fn spherical_point(azimuth: f64, inclination: f64, depth: f64) -> DVec3 {
    let (sin_a, cos_a) = azimuth.sin_cos();
    let (sin_i, cos_i) = inclination.sin_cos();
    DVec3::new(depth * cos_a * sin_i, depth * sin_a * sin_i, depth * cos_i)
}

/// Relative solid angle of one equirectangular row centered at `inclination` in a panorama of
/// `rows` rows: `sin(lat + Δ) - sin(lat - Δ)` with `Δ` half a row.
pub(crate) fn spherical_pixel_size(inclination: f64, rows: u32) -> f64 {
    let latitude = inclination - FRAC_PI_2;
    let delta = 0.5 * PI / f64::from(rows.max(1));
    (latitude + delta).sin() - (latitude - delta).sin()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
