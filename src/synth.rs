//! View selection, reprojection and compositing of novel-viewpoint stereo panoramas.

/// Compositor backed by atomic minimum over packed cells.
pub mod atomic;
/// Compositor trait, backend selection and plan execution.
pub mod backend;
/// Compositor that merges views serially.
pub mod ordered;
/// Synthesized stereo panoramas.
pub mod output;
pub mod pack;
/// Synthesis requests and per-view plans.
pub mod plan;
pub mod reproject;
/// Nearest-view selection.
pub mod select;
/// Long-lived synthesis sessions.
pub mod session;
