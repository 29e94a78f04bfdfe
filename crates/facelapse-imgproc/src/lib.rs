#![deny(missing_docs)]
//! Image processing operations for the facelapse morphing pipeline.

/// linear cross-dissolve of two images.
pub mod blend;

/// image cropping with padding module.
pub mod crop;

/// sparse-to-dense vector field extrapolation module.
pub mod field;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallelization utilities.
pub mod parallel;

/// utility functions for resizing images.
pub mod resize;

/// rotation onto a bounding canvas module.
pub mod rotate;

/// image geometric transformations module.
pub mod warp;
