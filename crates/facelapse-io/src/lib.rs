#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Video file writing backed by gstreamer.
#[cfg(feature = "gstreamer")]
pub mod video;

#[cfg(feature = "gstreamer")]
pub use video::{ImageFormat, VideoCodec, VideoWriter, VideoWriterError};
