use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    collection::{
        metadata::CaptureMetadata,
        node::{NodeChannels, NodeInput, SourceNode},
    },
    container::{decode::decode_container, image::MultiChannelImage},
    foundation::{
        core::{Dims, Vec3},
        error::{OdsError, OdsResult},
    },
    tonemap::compose::ToneMapOptions,
};

/// Encoded container plus where its node sits.
#[derive(Clone, Debug)]
pub struct ContainerSource<'a> {
    /// Container bytes.
    pub bytes: &'a [u8],
    /// Explicit position; `None` reads `camera_position` from the `Note` metadata.
    pub position: Option<Vec3>,
}

/// Accumulates nodes before the collection is frozen.
#[derive(Debug, Default)]
pub struct CollectionBuilder {
    inputs: Vec<NodeInput>,
}

impl CollectionBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes added so far.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// `true` before any node was added.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Add one node.
    pub fn push(&mut self, input: NodeInput) -> &mut Self {
        self.inputs.push(input);
        self
    }

    /// Add one node per entry of the image's `multiView` list.
    ///
    /// View `i` takes its color from `Image.<view>.{R,G,B,A}`, its depth from `Depth.<view>.V`
    /// and its position from `metadata.camera_positions[i]`.
    pub fn add_multi_view(
        &mut self,
        image: &MultiChannelImage,
        metadata: &CaptureMetadata,
        opts: &ToneMapOptions,
    ) -> OdsResult<&mut Self> {
        let views = image
            .multi_view()
            .ok_or_else(|| OdsError::validation("image has no multiView attribute"))?;
        let mut added = Vec::with_capacity(views.len());
        for (i, view) in views.iter().enumerate() {
            let position = metadata.position_of(i).ok_or_else(|| {
                OdsError::validation(format!("no camera position for view '{view}'"))
            })?;
            added.push(NodeInput::from_image(
                image,
                &NodeChannels::for_view(view),
                position,
                opts,
            )?);
        }
        tracing::debug!(views = added.len(), "added multi-view nodes");
        self.inputs.append(&mut added);
        Ok(self)
    }

    /// Decode containers in parallel and add one node per container.
    ///
    /// Nothing is added unless every container decodes.
    #[tracing::instrument(skip_all, fields(count = sources.len()))]
    pub fn decode_nodes(
        &mut self,
        sources: &[ContainerSource<'_>],
        channels: &NodeChannels,
        opts: &ToneMapOptions,
    ) -> OdsResult<&mut Self> {
        let mut decoded = sources
            .par_iter()
            .map(|src| -> OdsResult<NodeInput> {
                let image = decode_container(src.bytes)?;
                let position = match src.position {
                    Some(p) => p,
                    None => CaptureMetadata::from_image(&image)?
                        .and_then(|m| m.position_of(0))
                        .ok_or_else(|| {
                            OdsError::validation("container has no position and no metadata")
                        })?,
                };
                NodeInput::from_image(&image, channels, position, opts)
            })
            .collect::<OdsResult<Vec<_>>>()?;
        self.inputs.append(&mut decoded);
        Ok(self)
    }

    /// Validate and freeze.
    #[tracing::instrument(skip(self), fields(nodes = self.inputs.len()))]
    pub fn build(self) -> OdsResult<PanoramaCollection> {
        let first = self
            .inputs
            .first()
            .ok_or_else(|| OdsError::validation("collection needs at least one node"))?;
        let dims = first.dims;
        for (i, input) in self.inputs.iter().enumerate() {
            input.validate(i)?;
            if input.dims != dims {
                return Err(OdsError::validation(format!(
                    "node {i} is {}x{}, collection is {}x{}",
                    input.dims.width, input.dims.height, dims.width, dims.height
                )));
            }
        }
        let nodes = self
            .inputs
            .into_iter()
            .map(|input| Arc::new(SourceNode::from_input(input)))
            .collect();
        Ok(PanoramaCollection { dims, nodes })
    }
}

/// Ordered, immutable set of nodes that share one panorama size.
#[derive(Clone, Debug)]
pub struct PanoramaCollection {
    dims: Dims,
    nodes: Vec<Arc<SourceNode>>,
}

impl PanoramaCollection {
    /// Build from a list of nodes; at least one is required.
    pub fn build(inputs: Vec<NodeInput>) -> OdsResult<Self> {
        CollectionBuilder { inputs }.build()
    }

    /// Shared panorama size.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Number of nodes (never zero).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node `index`.
    pub fn node(&self, index: usize) -> Option<&Arc<SourceNode>> {
        self.nodes.get(index)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Arc<SourceNode>] {
        &self.nodes
    }

    /// Node positions in insertion order.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.nodes.iter().map(|n| n.position())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/collection/store.rs"]
mod tests;
