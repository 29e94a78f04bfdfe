#![deny(missing_docs)]
//! Image container types for the facelapse morphing pipeline.

/// image representation for the pipeline.
pub mod image;

/// Error types for the image module.
pub mod error;

/// Operations on whole images.
pub mod ops;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageDtype, ImageSize};
