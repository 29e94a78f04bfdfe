use facelapse_image::ImageError;
use facelapse_linalg::rigid::RigidError;
use thiserror::Error;

/// Errors from landmark handling and face alignment.
#[derive(Debug, Error)]
pub enum FaceError {
    /// A landmark set had the wrong number of points.
    #[error("expected 68 landmarks, got {0}")]
    InvalidLandmarkCount(usize),

    /// Error from the image container or an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the rigid alignment solver.
    #[error(transparent)]
    Rigid(#[from] RigidError),

    /// Error raised by the landmark detector backend.
    #[error("landmark detector backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
