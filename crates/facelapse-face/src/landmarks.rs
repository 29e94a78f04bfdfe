use glam::Vec2;

use crate::error::FaceError;
use facelapse_imgproc::warp::transform_point;

/// Number of points in the facial landmark model.
pub const LANDMARK_COUNT: usize = 68;

/// Index of the outer corner of the subject's right eye (viewer left).
pub const RIGHT_EYE_OUTER: usize = 36;

/// Index of the outer corner of the subject's left eye (viewer right).
pub const LEFT_EYE_OUTER: usize = 45;

/// A full set of facial landmarks in image pixel coordinates.
///
/// Coordinates follow the image convention: x grows to the right, y grows
/// downward.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks(Vec<Vec2>);

impl Landmarks {
    /// Create a landmark set, validating the point count.
    pub fn new(points: Vec<Vec2>) -> Result<Self, FaceError> {
        if points.len() != LANDMARK_COUNT {
            return Err(FaceError::InvalidLandmarkCount(points.len()));
        }
        Ok(Self(points))
    }

    /// All landmark points.
    pub fn points(&self) -> &[Vec2] {
        &self.0
    }

    /// Outer corner of the subject's right eye.
    pub fn eye_right(&self) -> Vec2 {
        self.0[RIGHT_EYE_OUTER]
    }

    /// Outer corner of the subject's left eye.
    pub fn eye_left(&self) -> Vec2 {
        self.0[LEFT_EYE_OUTER]
    }

    /// Distance between the outer eye corners.
    pub fn eye_distance(&self) -> f32 {
        self.eye_right().distance(self.eye_left())
    }

    /// Screen angle of the eye line in radians.
    ///
    /// Rotating the image by this angle about any center makes the eye line
    /// horizontal.
    pub fn eye_angle(&self) -> f32 {
        let d = self.eye_left() - self.eye_right();
        d.y.atan2(d.x)
    }

    /// Centroid of all landmark points.
    pub fn centroid(&self) -> Vec2 {
        self.0.iter().sum::<Vec2>() / LANDMARK_COUNT as f32
    }

    /// Uniformly scale every point about the origin.
    pub fn scaled(&self, factor: f32) -> Self {
        Self(self.0.iter().map(|p| *p * factor).collect())
    }

    /// Map every point through a 2x3 affine matrix.
    pub fn transformed(&self, m: &[f32; 6]) -> Self {
        Self(
            self.0
                .iter()
                .map(|p| {
                    let (x, y) = transform_point(p.x, p.y, m);
                    Vec2::new(x, y)
                })
                .collect(),
        )
    }
}
