use rayon::prelude::*;

use crate::{
    collection::node::SourceNode,
    foundation::{core::Dims, error::OdsResult},
    synth::{
        backend::{BackendKind, CompositorBackend, check_node, cleared_dims, row_candidates},
        output::SynthesizedPanorama,
        reproject::{Candidate, ViewParams},
    },
};

/// Views merged serially in call order with a strict-less depth test.
///
/// Candidate generation for a view still runs in parallel; only the merge is sequential, so the
/// first candidate in (view, row, column) order wins exact depth ties.
#[derive(Debug, Default)]
pub struct OrderedBackend {
    dims: Option<Dims>,
    color: Vec<[u8; 3]>,
    depth: Vec<f32>,
}

impl OrderedBackend {
    /// Empty backend; call `clear` before merging.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CompositorBackend for OrderedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Ordered
    }

    fn clear(&mut self, dims: Dims) {
        let n = dims.stereo().pixel_count();
        self.color.clear();
        self.color.resize(n, [0; 3]);
        self.depth.clear();
        self.depth.resize(n, f32::INFINITY);
        self.dims = Some(dims);
    }

    fn merge_view(&mut self, node: &SourceNode, params: &ViewParams) -> OdsResult<()> {
        let dims = check_node(node, self.dims)?;
        let candidates: Vec<Candidate> = (0..dims.height)
            .into_par_iter()
            .flat_map_iter(|y| row_candidates(node, params, y))
            .collect();

        let width = dims.width as usize;
        for c in &candidates {
            let d = c.depth as f32;
            for (cx, cy) in c.cells(dims) {
                let i = cy as usize * width + cx as usize;
                if d < self.depth[i] {
                    self.depth[i] = d;
                    self.color[i] = c.rgb;
                }
            }
        }
        Ok(())
    }

    fn extract(&self, z_max: f32) -> OdsResult<SynthesizedPanorama> {
        let dims = cleared_dims(self.dims, "extract")?;
        let mut rgba = Vec::with_capacity(self.color.len() * 4);
        let mut depth = Vec::with_capacity(self.depth.len());
        for (rgb, d) in self.color.iter().zip(&self.depth) {
            if d.is_finite() {
                rgba.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
                depth.push(*d);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 255]);
                depth.push(z_max);
            }
        }
        SynthesizedPanorama::from_parts(dims, rgba, depth)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/synth/ordered.rs"]
mod tests;
