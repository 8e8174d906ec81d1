//! Image-quality measurements for synthesized panoramas.

/// PSNR and hole coverage.
pub mod metrics;
