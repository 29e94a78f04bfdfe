//! Pixel interpolation methods for image transformations.
//!
//! # Interpolation Modes
//!
//! - **Nearest**: fastest, uses the nearest pixel value (no interpolation)
//! - **Bilinear**: smooth linear interpolation between adjacent pixels

mod bilinear;
mod interpolate;
mod nearest;

pub use interpolate::{interpolate_pixel, InterpolationMode};
