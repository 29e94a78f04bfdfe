#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Face alignment strategies producing canvases with registered eyes.
pub mod aligner;

/// The landmark detector abstraction.
pub mod detector;

/// Error types for the crate.
pub mod error;

/// Facial landmark container and geometry helpers.
pub mod landmarks;

pub use aligner::{AlignedFace, AlignedSequence, AlignerConfig, AlignmentStrategy, FaceAligner};
pub use detector::LandmarkDetector;
pub use error::FaceError;
pub use landmarks::{Landmarks, LANDMARK_COUNT, LEFT_EYE_OUTER, RIGHT_EYE_OUTER};
