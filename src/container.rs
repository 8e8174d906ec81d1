//! Decoder for the single-part scanline subset of the OpenEXR container.

/// Typed header attribute values.
pub mod attribute;
pub(crate) mod block;
/// Bounds-checked little-endian reader.
pub mod cursor;
/// Whole-file decoding entry points.
pub mod decode;
pub mod half;
/// Header parsing and the enums it carries.
pub mod header;
/// Decoded images.
pub mod image;
