use std::sync::atomic::{AtomicU32, Ordering};

use rayon::prelude::*;

use crate::{
    collection::node::SourceNode,
    foundation::{core::Dims, error::OdsResult},
    synth::{
        backend::{BackendKind, CompositorBackend, check_node, cleared_dims, row_candidates},
        output::SynthesizedPanorama,
        pack::{CLEAR_SENTINEL, pack_rgb776d12, unpack_color, unpack_depth},
        reproject::ViewParams,
    },
};

/// Packed RGB776D12 cells resolved with `fetch_min`; merge order does not matter.
#[derive(Debug, Default)]
pub struct AtomicMinBackend {
    dims: Option<Dims>,
    cells: Vec<AtomicU32>,
}

impl AtomicMinBackend {
    /// Empty backend; call `clear` before merging.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CompositorBackend for AtomicMinBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::AtomicMin
    }

    fn clear(&mut self, dims: Dims) {
        let n = dims.stereo().pixel_count();
        if self.dims == Some(dims) && self.cells.len() == n {
            self.cells
                .par_iter()
                .for_each(|c| c.store(CLEAR_SENTINEL, Ordering::Relaxed));
        } else {
            self.cells = (0..n).map(|_| AtomicU32::new(CLEAR_SENTINEL)).collect();
        }
        self.dims = Some(dims);
    }

    fn merge_view(&mut self, node: &SourceNode, params: &ViewParams) -> OdsResult<()> {
        let dims = check_node(node, self.dims)?;
        let width = dims.width as usize;
        let cells = &self.cells;
        (0..dims.height).into_par_iter().for_each(|y| {
            for c in row_candidates(node, params, y) {
                let packed = pack_rgb776d12(c.rgb, c.depth_norm);
                for (cx, cy) in c.cells(dims) {
                    cells[cy as usize * width + cx as usize].fetch_min(packed, Ordering::Relaxed);
                }
            }
        });
        Ok(())
    }

    fn extract(&self, z_max: f32) -> OdsResult<SynthesizedPanorama> {
        let dims = cleared_dims(self.dims, "extract")?;
        let mut rgba = vec![0u8; self.cells.len() * 4];
        let mut depth = vec![0f32; self.cells.len()];
        rgba.par_chunks_mut(4)
            .zip(depth.par_iter_mut())
            .zip(self.cells.par_iter())
            .for_each(|((px, d), cell)| {
                let packed = cell.load(Ordering::Relaxed);
                px.copy_from_slice(&unpack_color(packed));
                *d = unpack_depth(packed, z_max);
            });
        SynthesizedPanorama::from_parts(dims, rgba, depth)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/synth/atomic.rs"]
mod tests;
