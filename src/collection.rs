//! Immutable set of RGB-D panoramas with known capture positions.

/// Capture metadata stored in the container `Note` attribute.
pub mod metadata;
/// Node inputs and frozen source nodes.
pub mod node;
/// Collection building.
pub mod store;
