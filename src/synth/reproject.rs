//! Per-pixel depth-image-based reprojection into an omnidirectional stereo panorama.
//!
//! Angles follow the equirectangular convention: azimuth runs counter-clockwise around the
//! spherical z axis and maps to columns right to left, inclination is measured from +z and maps
//! to rows top to bottom. World vectors `(x, y, z)` with y up become spherical `(z, x, y)`.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

use crate::foundation::{
    core::{Dims, Eye, Vec3},
    math::{azimuth, inclination, spherical_pixel_size, spherical_point},
};

/// Largest footprint, in pixels per side.
pub const MAX_FOOTPRINT: u32 = 7;

/// Convert a world-space vector to the spherical frame.
pub fn world_to_spherical(v: Vec3) -> DVec3 {
    let v = v.as_dvec3();
    DVec3::new(v.z, v.x, v.y)
}

/// Convert a spherical-frame vector back to world space.
pub fn spherical_to_world(v: DVec3) -> DVec3 {
    DVec3::new(v.y, v.z, v.x)
}

/// Visibility cone test, precomputed from field of view and view direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConeTest {
    /// Unit view direction, world space.
    pub view_dir: DVec3,
    /// Cosine of the half diagonal field of view.
    pub cos_half_diagonal: f64,
}

impl ConeTest {
    /// Cone covering a viewport of vertical field of view `fov_y` (radians) and `aspect`
    /// (width / height), widened by a small margin. `None` for a degenerate direction.
    pub fn new(fov_y: f64, aspect: f64, view_dir: Vec3) -> Option<Self> {
        let view_dir = view_dir.as_dvec3().try_normalize()?;
        let diag_aspect = (aspect * aspect + 1.0).sqrt();
        let half_vertical = 0.5 * fov_y + 0.005;
        let half_diagonal = (half_vertical.tan() * diag_aspect).atan();
        Some(Self {
            view_dir,
            cos_half_diagonal: half_diagonal.cos(),
        })
    }

    /// `true` when the spherical-frame point lies inside the cone.
    pub fn contains(&self, spherical: DVec3) -> bool {
        spherical_to_world(spherical)
            .try_normalize()
            .is_some_and(|dir| dir.dot(self.view_dir) >= self.cos_half_diagonal)
    }
}

/// Everything the kernel needs for one (view, eye) pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParams {
    /// Panorama size, shared by source and destination eye halves.
    pub dims: Dims,
    /// Requested eye position minus the node position, in the spherical frame.
    pub camera_offset: DVec3,
    /// Interpupillary distance.
    pub ipd: f64,
    /// Radius of the destination projection sphere.
    pub focal_dist: f64,
    /// Distance that maps to the far end of the packed depth range.
    pub z_max: f64,
    /// Per-view tie-break bias added to every depth.
    pub depth_hint: f64,
    /// Destination eye.
    pub eye: Eye,
    /// Optional visibility cone.
    pub cone: Option<ConeTest>,
}

/// One source pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceSample {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Radial distance from the node.
    pub depth: f32,
    /// Color.
    pub rgb: [u8; 3],
}

/// A reprojected sample ready for compositing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Destination column.
    pub column: u32,
    /// Destination row within the eye half.
    pub row: u32,
    /// Destination eye.
    pub eye: Eye,
    /// Footprint side length, `1..=7`.
    pub footprint: u32,
    /// Distance from the eye camera plus the view's depth hint.
    pub depth: f64,
    /// `depth / z_max`, always in `[0, 1)`.
    pub depth_norm: f64,
    /// Destination azimuth in `[0, 2π)`.
    pub azimuth: f64,
    /// Destination inclination in `[0, π]`.
    pub inclination: f64,
    /// Source color.
    pub rgb: [u8; 3],
}

impl Candidate {
    /// Stacked-buffer cells `(column, row)` covered by the footprint. Columns wrap at the seam,
    /// rows are clipped to this eye's half.
    pub fn cells(&self, dims: Dims) -> impl Iterator<Item = (u32, u32)> + '_ {
        let s = self.footprint as i64;
        let (lo, hi) = (-(s / 2), (s + 1) / 2);
        let (w, h) = (i64::from(dims.width), i64::from(dims.height));
        let offset = self.eye.row_offset(dims.height);
        let (column, row) = (i64::from(self.column), i64::from(self.row));
        (lo..hi)
            .map(move |dy| row + dy)
            .filter(move |r| (0..h).contains(r))
            .flat_map(move |r| {
                (lo..hi).map(move |dx| {
                    let c = (column + dx).rem_euclid(w);
                    (c as u32, r as u32 + offset)
                })
            })
    }
}

/// Footprint side length for a sample: solid angle ratio between source and destination rows,
/// scaled by how much closer the eye camera is than the node, rounded and clamped to `[1, 7]`.
pub fn footprint(
    source_inclination: f64,
    dest_inclination: f64,
    source_depth: f64,
    camera_distance: f64,
    rows: u32,
) -> u32 {
    let area_ratio = spherical_pixel_size(source_inclination, rows)
        / spherical_pixel_size(dest_inclination, rows);
    let ratio = area_ratio * (source_depth / camera_distance);
    if ratio.is_nan() {
        return 1;
    }
    ratio.clamp(1.0, f64::from(MAX_FOOTPRINT)).round() as u32
}

/// Spherical angles of the center of source pixel `(x, y)`.
pub fn pixel_angles(x: u32, y: u32, dims: Dims) -> (f64, f64) {
    let az = TAU * (1.0 - (f64::from(x) + 0.5) / f64::from(dims.width));
    let inc = PI * (f64::from(y) + 0.5) / f64::from(dims.height);
    (az, inc)
}

/// Destination pixel of a direction: nearest pixel center in both axes.
///
/// Uses `floor` on the continuous pixel coordinate rather than rounding it, so a direction
/// lands in the pixel whose center it is closest to and the identity reprojection maps every
/// source pixel onto itself without a half-pixel shift.
pub fn pixel_of(az: f64, inc: f64, dims: Dims) -> (u32, u32) {
    let (w, h) = (f64::from(dims.width), f64::from(dims.height));
    let column = (w * (TAU - az) / TAU).floor() as i64;
    let row = (h * inc / PI).floor().clamp(0.0, h - 1.0) as u32;
    (column.rem_euclid(i64::from(dims.width)) as u32, row)
}

/// Reproject one source sample for one destination eye.
///
/// Returns `None` when the sample cannot contribute: non-finite or negative depth, a point at
/// the rig center, a point outside the visibility cone, or a depth not encodable under `z_max`.
pub fn reproject(params: &ViewParams, sample: SourceSample) -> Option<Candidate> {
    let d = f64::from(sample.depth);
    if !d.is_finite() || d < 0.0 {
        return None;
    }

    let (in_az, in_inc) = pixel_angles(sample.x, sample.y, params.dims);
    let pt = spherical_point(in_az, in_inc, d);

    let vertex = pt - params.camera_offset;
    let magnitude = vertex.length();
    if !magnitude.is_normal() {
        return None;
    }
    let center_az = azimuth(vertex);
    let center_inc = inclination(vertex, magnitude);

    // toroidal baseline: the eye circle shrinks toward the poles
    let radius = 0.5 * params.ipd * (center_inc - 0.5 * PI).cos();
    let camera_az = center_az + params.eye.sign() * (radius / magnitude).clamp(-1.0, 1.0).acos();
    let camera_pt = DVec3::new(radius * camera_az.cos(), radius * camera_az.sin(), 0.0);

    let to_point = vertex - camera_pt;
    let camera_distance = to_point.length();
    if !camera_distance.is_normal() {
        return None;
    }
    let ray = to_point / camera_distance;
    let sphere_dist = (params.focal_dist * params.focal_dist - radius * radius)
        .max(0.0)
        .sqrt();
    let projected = camera_pt + sphere_dist * ray;

    let out_az = azimuth(projected);
    let out_inc = (projected.z / params.focal_dist).clamp(-1.0, 1.0).acos();
    if !out_az.is_finite() || !out_inc.is_finite() {
        return None;
    }

    if let Some(cone) = &params.cone
        && !cone.contains(projected)
    {
        return None;
    }

    let depth = camera_distance + params.depth_hint;
    let depth_norm = depth / params.z_max;
    if !(0.0..1.0).contains(&depth_norm) {
        return None;
    }

    let (column, row) = pixel_of(out_az, out_inc, params.dims);
    Some(Candidate {
        column,
        row,
        eye: params.eye,
        footprint: footprint(in_inc, out_inc, d, camera_distance, params.dims.height),
        depth,
        depth_norm,
        azimuth: out_az,
        inclination: out_inc,
        rgb: sample.rgb,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/synth/reproject.rs"]
mod tests;
