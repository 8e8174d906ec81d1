//! Channel quad to 8-bit RGBA conversion.

/// Tone mapping and channel extraction.
pub mod compose;
