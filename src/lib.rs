//! odsynth synthesizes omnidirectional-stereo (ODS) panoramas for arbitrary eye positions from a
//! handful of captured RGB-D panoramas.
//!
//! The pipeline is:
//!
//! - Decode scanline OpenEXR containers with [`decode_container`]
//! - Turn channels into 8-bit color and float depth with [`compose_rgba`] and [`depth_samples`]
//! - Freeze the nodes into a [`PanoramaCollection`]
//! - Create a [`Synthesizer`] and call [`Synthesizer::synthesize`] per eye position
//!
//! Each call reprojects the nearest views into a stacked stereo buffer (left eye on top) and
//! returns an owned [`SynthesizedPanorama`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod analysis;
pub mod codec;
pub mod collection;
pub mod container;
pub mod synth;
pub mod tonemap;

pub use crate::foundation::core::{Dims, Eye, Region, Vec3};
pub use crate::foundation::error::{DecodeError, DecodeErrorKind, OdsError, OdsResult};

pub use crate::analysis::metrics::{HoleArea, hole_area, psnr, psnr_masked};
pub use crate::codec::rvl::{RvlDepthImage, decode_rvl, encode_rvl};
pub use crate::collection::metadata::CaptureMetadata;
pub use crate::collection::node::{NodeChannels, NodeInput, SourceNode};
pub use crate::collection::store::{CollectionBuilder, ContainerSource, PanoramaCollection};
pub use crate::container::attribute::AttributeValue;
pub use crate::container::decode::{decode_container, decode_container_with, decode_many};
pub use crate::container::header::{ChannelDesc, Compression, DecodeOptions, PixelType};
pub use crate::container::image::{Channel, ChannelSamples, MultiChannelImage};
pub use crate::synth::backend::{BackendKind, CompositorBackend, create_backend, detect_backend};
pub use crate::synth::output::SynthesizedPanorama;
pub use crate::synth::plan::{SelectionStrategy, SynthesisRequest, ViewCone};
pub use crate::synth::select::select_views;
pub use crate::synth::session::{SynthesisOpts, Synthesizer, synthesize};
pub use crate::tonemap::compose::{ChannelQuad, ToneMapOptions, compose_rgba, depth_samples};
