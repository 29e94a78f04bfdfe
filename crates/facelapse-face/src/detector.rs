use facelapse_image::Image;

use crate::{error::FaceError, landmarks::Landmarks};

/// Locates facial landmarks in an image.
///
/// Implementations wrap whatever detection backend is available; the
/// alignment and morphing code only depends on this trait.
pub trait LandmarkDetector {
    /// Detect the landmarks of the most prominent face in the image.
    ///
    /// Returns `Ok(None)` when no face is found.
    fn detect(&self, image: &Image<u8, 3>) -> Result<Option<Landmarks>, FaceError>;
}

impl<F> LandmarkDetector for F
where
    F: Fn(&Image<u8, 3>) -> Result<Option<Landmarks>, FaceError>,
{
    fn detect(&self, image: &Image<u8, 3>) -> Result<Option<Landmarks>, FaceError> {
        self(image)
    }
}
