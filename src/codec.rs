//! Compact depth-map storage.

pub mod rvl;
