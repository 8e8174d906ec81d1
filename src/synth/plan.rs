use crate::{
    collection::store::PanoramaCollection,
    foundation::{
        core::{Dims, Eye, Vec3},
        error::{OdsError, OdsResult},
    },
    synth::{
        reproject::{ConeTest, ViewParams, world_to_spherical},
        select::{select_views, select_views_axis_diverse},
    },
};

/// Depth bias added per position in the view list, so nearer views win exact ties.
pub const DEPTH_HINT_STEP: f64 = 0.015;

/// How source views are picked for a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Nearest nodes by Euclidean distance.
    #[default]
    Nearest,
    /// Nearest node first, then nodes that surround the eye.
    AxisDiverse,
}

/// Optional visibility cone for partial-panorama synthesis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewCone {
    /// Vertical field of view in radians.
    pub fov_y: f64,
    /// Viewport width over height.
    pub aspect: f64,
    /// World-space view direction.
    pub view_dir: Vec3,
}

/// Parameters of one synthesis call.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SynthesisRequest {
    /// World-space position of the synthesized rig center.
    pub eye_position: Vec3,
    /// Interpupillary distance, scene units.
    pub ipd: f64,
    /// Radius of the projection sphere.
    pub focal_dist: f64,
    /// Upper bound on source views used.
    pub max_views: usize,
    /// Depth mapped to the far end of the packed range; also the depth reported for holes.
    pub z_max: f64,
    /// Restrict output to a cone around a view direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cone: Option<ViewCone>,
    /// View selection strategy.
    pub strategy: SelectionStrategy,
}

impl Default for SynthesisRequest {
    fn default() -> Self {
        Self {
            eye_position: Vec3::ZERO,
            ipd: 0.065,
            focal_dist: 1.95,
            max_views: 4,
            z_max: 10.0,
            cone: None,
            strategy: SelectionStrategy::Nearest,
        }
    }
}

impl SynthesisRequest {
    /// Request for `eye_position` with default optics.
    pub fn at(eye_position: Vec3) -> Self {
        Self {
            eye_position,
            ..Self::default()
        }
    }

    /// Parse a request from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> OdsResult<Self> {
        serde_json::from_str(json).map_err(|e| OdsError::serde(e.to_string()))
    }

    /// Check numeric ranges.
    pub fn validate(&self) -> OdsResult<()> {
        if !self.eye_position.is_finite() {
            return Err(OdsError::validation("eye_position must be finite"));
        }
        if !self.ipd.is_finite() || self.ipd < 0.0 {
            return Err(OdsError::validation("ipd must be finite and >= 0"));
        }
        if !self.focal_dist.is_finite() || self.focal_dist <= 0.0 {
            return Err(OdsError::validation("focal_dist must be finite and > 0"));
        }
        if !self.z_max.is_finite() || self.z_max <= 0.0 {
            return Err(OdsError::validation("z_max must be finite and > 0"));
        }
        if self.max_views == 0 {
            return Err(OdsError::validation("max_views must be >= 1"));
        }
        if let Some(cone) = &self.cone {
            if !(cone.fov_y > 0.0 && cone.fov_y < std::f64::consts::PI) {
                return Err(OdsError::validation("cone fov_y must be in (0, pi)"));
            }
            if !cone.aspect.is_finite() || cone.aspect <= 0.0 {
                return Err(OdsError::validation("cone aspect must be finite and > 0"));
            }
            if ConeTest::new(cone.fov_y, cone.aspect, cone.view_dir).is_none() {
                return Err(OdsError::validation("cone view_dir must be non-zero"));
            }
        }
        Ok(())
    }
}

/// One source view in merge order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewJob {
    /// Node index in the collection.
    pub node: usize,
    /// Node position, world space.
    pub position: Vec3,
    /// Depth bias for this view.
    pub depth_hint: f64,
}

/// Resolved work for one synthesis call: which views, in which order, with which parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisPlan {
    /// Per-eye panorama size.
    pub dims: Dims,
    /// Views in merge order, nearest first.
    pub jobs: Vec<ViewJob>,
    /// The request this plan was built from.
    pub request: SynthesisRequest,
    cone: Option<ConeTest>,
}

impl SynthesisPlan {
    /// Kernel parameters for one (view, eye) pass.
    pub fn view_params(&self, job: &ViewJob, eye: Eye) -> ViewParams {
        ViewParams {
            dims: self.dims,
            camera_offset: world_to_spherical(self.request.eye_position - job.position),
            ipd: self.request.ipd,
            focal_dist: self.request.focal_dist,
            z_max: self.request.z_max,
            depth_hint: job.depth_hint,
            eye,
            cone: self.cone,
        }
    }

    /// Node indices in merge order.
    pub fn views(&self) -> impl Iterator<Item = usize> + '_ {
        self.jobs.iter().map(|j| j.node)
    }
}

/// Validate `request` and pick the views to merge.
///
/// A single-node collection is synthesized from that node alone without view selection.
pub fn plan_synthesis(
    collection: &PanoramaCollection,
    request: &SynthesisRequest,
) -> OdsResult<SynthesisPlan> {
    request.validate()?;
    if collection.is_empty() {
        return Err(OdsError::validation("collection has no nodes"));
    }

    let views = if collection.len() == 1 {
        vec![0]
    } else {
        match request.strategy {
            SelectionStrategy::Nearest => {
                select_views(collection, request.eye_position, request.max_views)
            }
            SelectionStrategy::AxisDiverse => {
                select_views_axis_diverse(collection, request.eye_position, request.max_views)
            }
        }
    };

    let jobs = views
        .into_iter()
        .enumerate()
        .filter_map(|(i, node)| {
            let position = collection.node(node)?.position();
            Some(ViewJob {
                node,
                position,
                depth_hint: i as f64 * DEPTH_HINT_STEP,
            })
        })
        .collect();

    let cone = request
        .cone
        .and_then(|c| ConeTest::new(c.fov_y, c.aspect, c.view_dir));

    Ok(SynthesisPlan {
        dims: collection.dims(),
        jobs,
        request: request.clone(),
        cone,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/synth/plan.rs"]
mod tests;
