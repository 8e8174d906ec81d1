use crate::{
    collection::{node::SourceNode, store::PanoramaCollection},
    foundation::{
        core::{Dims, Eye},
        error::{OdsError, OdsResult},
    },
    synth::{
        output::SynthesizedPanorama,
        plan::SynthesisPlan,
        reproject::{Candidate, SourceSample, ViewParams, reproject},
    },
};

/// A compositor that merges reprojected views into one stacked stereo buffer.
///
/// Calls happen in a fixed sequence: [`CompositorBackend::clear`], any number of
/// [`CompositorBackend::merge_view`], then [`CompositorBackend::extract`]. Most users go through
/// [`crate::Synthesizer`] instead of driving a backend directly.
pub trait CompositorBackend: Send {
    /// Which implementation this is.
    fn kind(&self) -> BackendKind;

    /// Reset the buffer to empty cells for per-eye size `dims`.
    fn clear(&mut self, dims: Dims);

    /// Reproject every pixel of `node` with `params` and merge the candidates.
    fn merge_view(&mut self, node: &SourceNode, params: &ViewParams) -> OdsResult<()>;

    /// Read the merged buffer back. Empty cells report black and `z_max`.
    fn extract(&self, z_max: f32) -> OdsResult<SynthesizedPanorama>;
}

/// Available compositor backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Order-independent packed depth/color with `AtomicU32::fetch_min`.
    AtomicMin,
    /// Serial merge in view order with an `f32` depth test and full 8-bit color.
    Ordered,
}

impl BackendKind {
    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::AtomicMin => "atomic-min",
            Self::Ordered => "ordered",
        }
    }
}

/// Create a compositor backend.
pub fn create_backend(kind: BackendKind) -> OdsResult<Box<dyn CompositorBackend>> {
    match kind {
        BackendKind::AtomicMin => Ok(Box::new(crate::synth::atomic::AtomicMinBackend::new())),
        BackendKind::Ordered => Ok(Box::new(crate::synth::ordered::OrderedBackend::new())),
    }
}

/// Pick a backend for the current rayon context: the atomic path when more than one worker is
/// available, the ordered path otherwise.
pub fn detect_backend() -> BackendKind {
    if rayon::current_num_threads() > 1 {
        BackendKind::AtomicMin
    } else {
        BackendKind::Ordered
    }
}

/// Candidates produced by source row `y` of `node`, in column order.
pub(crate) fn row_candidates<'a>(
    node: &'a SourceNode,
    params: &'a ViewParams,
    y: u32,
) -> impl Iterator<Item = Candidate> + 'a {
    (0..params.dims.width).filter_map(move |x| {
        let [r, g, b, _] = node.color_at(x, y);
        reproject(
            params,
            SourceSample {
                x,
                y,
                depth: node.depth_at(x, y),
                rgb: [r, g, b],
            },
        )
    })
}

pub(crate) fn cleared_dims(dims: Option<Dims>, op: &str) -> OdsResult<Dims> {
    dims.ok_or_else(|| OdsError::synthesis(format!("{op} called before clear")))
}

pub(crate) fn check_node(node: &SourceNode, dims: Option<Dims>) -> OdsResult<Dims> {
    let dims = cleared_dims(dims, "merge_view")?;
    if node.dims() != dims {
        return Err(OdsError::synthesis(format!(
            "node is {}x{}, buffer is {}x{}",
            node.dims().width,
            node.dims().height,
            dims.width,
            dims.height
        )));
    }
    Ok(dims)
}

/// Run a plan through a backend: clear, merge every view for both eyes, extract.
#[tracing::instrument(skip_all, fields(backend = backend.kind().name(), views = plan.jobs.len()))]
pub fn execute_synthesis(
    backend: &mut dyn CompositorBackend,
    collection: &PanoramaCollection,
    plan: &SynthesisPlan,
) -> OdsResult<SynthesizedPanorama> {
    backend.clear(plan.dims);
    for job in &plan.jobs {
        let node = collection.node(job.node).ok_or_else(|| {
            OdsError::synthesis(format!("plan references missing node {}", job.node))
        })?;
        for eye in Eye::BOTH {
            backend.merge_view(node, &plan.view_params(job, eye))?;
        }
        tracing::debug!(node = job.node, depth_hint = job.depth_hint, "merged view");
    }
    backend.extract(plan.request.z_max as f32)
}

#[cfg(test)]
#[path = "../../tests/unit/synth/backend.rs"]
mod tests;
