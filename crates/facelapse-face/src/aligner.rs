use facelapse_image::{ops::cast_u8, Image, ImageSize};
use facelapse_imgproc::{
    crop::crop_with_padding, interpolation::InterpolationMode, resize::resize_native,
    rotate::rotate_bound,
};
use facelapse_linalg::rigid::{kabsch2, rotation_angle};
use glam::DVec2;

use crate::{detector::LandmarkDetector, error::FaceError, landmarks::Landmarks};

/// Eye pairs closer than this are treated as a failed detection.
const MIN_EYE_DISTANCE: f32 = 1e-3;

/// Geometry of the aligned face canvas.
#[derive(Debug, Clone, Copy)]
pub struct AlignerConfig {
    /// Target distance between the outer eye corners, in canvas pixels.
    pub eye_distance: f32,
    /// Horizontal offset of the eye center from the canvas left edge.
    pub left_margin: usize,
    /// Vertical offset of the eye center from the canvas top edge.
    pub top_margin: usize,
    /// Size of the output canvas.
    pub canvas: ImageSize,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            eye_distance: 150.0,
            left_margin: 400,
            top_margin: 260,
            canvas: ImageSize {
                width: 800,
                height: 600,
            },
        }
    }
}

/// How the in-plane rotation of each face is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentStrategy {
    /// Rotate each face independently so its eye line is horizontal.
    #[default]
    Eye,
    /// Rotate each face to minimize the squared landmark distance to the
    /// previously aligned face; the first face falls back to eye alignment.
    LeastSquares,
}

/// A face registered onto the output canvas.
#[derive(Debug, Clone)]
pub struct AlignedFace {
    /// The canvas image with the registered face.
    pub canvas: Image<u8, 3>,
    /// Landmarks re-detected on the canvas, in canvas coordinates.
    pub landmarks: Landmarks,
}

/// Result of aligning an ordered set of input images.
#[derive(Debug, Clone)]
pub struct AlignedSequence {
    /// Successfully aligned faces, in input order.
    pub faces: Vec<AlignedFace>,
    /// Indices of input images that yielded no usable face.
    pub dropped: Vec<usize>,
}

/// Registers faces onto a common canvas using a landmark detector.
///
/// Each input image is rotated, uniformly rescaled so the eye distance
/// matches the configured target, and cropped or padded onto the canvas.
/// Landmarks are then re-detected on the finished canvas so downstream
/// consumers see coordinates in canvas space.
pub struct FaceAligner<D> {
    detector: D,
    config: AlignerConfig,
    strategy: AlignmentStrategy,
}

impl<D: LandmarkDetector> FaceAligner<D> {
    /// Create an aligner from a detector, canvas geometry, and strategy.
    pub fn new(detector: D, config: AlignerConfig, strategy: AlignmentStrategy) -> Self {
        Self {
            detector,
            config,
            strategy,
        }
    }

    /// The canvas geometry this aligner produces.
    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Align an ordered sequence of face images.
    ///
    /// Images where no face is found, either in the input or after
    /// registration, are dropped and reported in the result.
    pub fn align_sequence(&self, images: &[Image<u8, 3>]) -> Result<AlignedSequence, FaceError> {
        let mut faces: Vec<AlignedFace> = Vec::with_capacity(images.len());
        let mut dropped = Vec::new();

        for (index, image) in images.iter().enumerate() {
            let aligned = match (self.strategy, faces.last()) {
                (AlignmentStrategy::LeastSquares, Some(prev)) => {
                    self.align_lse(image, &prev.landmarks)?
                }
                _ => self.align_eye(image)?,
            };
            match aligned {
                Some(face) => faces.push(face),
                None => {
                    log::warn!("no usable face in input image {index}, dropping it");
                    dropped.push(index);
                }
            }
        }

        Ok(AlignedSequence { faces, dropped })
    }

    /// Align one face by leveling its eye line.
    pub fn align_eye(&self, image: &Image<u8, 3>) -> Result<Option<AlignedFace>, FaceError> {
        let Some(lms) = self.detector.detect(image)? else {
            return Ok(None);
        };
        let eye_dist = lms.eye_distance();
        if !eye_dist.is_finite() || eye_dist < MIN_EYE_DISTANCE {
            return Ok(None);
        }

        let input = image.cast::<f32>()?;
        let (rotated, m) = rotate_bound(&input, lms.eye_angle())?;

        let sf = self.config.eye_distance / eye_dist;
        let scaled = self.rescale(&rotated, sf)?;
        let tracked = lms.transformed(&m).scaled(sf);

        let eye_center = 0.5 * (tracked.eye_right() + tracked.eye_left());
        let x0 = eye_center.x.round() as i64 - self.config.left_margin as i64;
        let y0 = eye_center.y.round() as i64 - self.config.top_margin as i64;

        self.finish(&scaled, x0, y0)
    }

    /// Align one face against the landmarks of an already aligned face.
    ///
    /// The rotation comes from a rigid least-squares fit of this face's
    /// landmarks onto the reference; the translation matches the landmark
    /// centroids.
    pub fn align_lse(
        &self,
        image: &Image<u8, 3>,
        reference: &Landmarks,
    ) -> Result<Option<AlignedFace>, FaceError> {
        let Some(lms) = self.detector.detect(image)? else {
            return Ok(None);
        };
        let eye_dist = lms.eye_distance();
        if !eye_dist.is_finite() || eye_dist < MIN_EYE_DISTANCE {
            return Ok(None);
        }

        let sf = self.config.eye_distance / eye_dist;
        let input = image.cast::<f32>()?;
        let scaled = self.rescale(&input, sf)?;
        let scaled_lms = lms.scaled(sf);

        let src: Vec<DVec2> = scaled_lms.points().iter().map(|p| p.as_dvec2()).collect();
        let dst: Vec<DVec2> = reference.points().iter().map(|p| p.as_dvec2()).collect();
        let r = kabsch2(&src, &dst)?;

        let (rotated, m) = rotate_bound(&scaled, rotation_angle(&r) as f32)?;
        let tracked = scaled_lms.transformed(&m);

        // translate so the landmark centroids coincide
        let offset = tracked.centroid() - reference.centroid();
        self.finish(&rotated, offset.x.round() as i64, offset.y.round() as i64)
    }

    fn rescale(&self, image: &Image<f32, 3>, sf: f32) -> Result<Image<f32, 3>, FaceError> {
        let size = ImageSize {
            width: ((image.width() as f32) * sf).round().max(1.0) as usize,
            height: ((image.height() as f32) * sf).round().max(1.0) as usize,
        };
        let mut scaled = Image::from_size_val(size, 0.0)?;
        resize_native(image, &mut scaled, InterpolationMode::Bilinear)?;
        Ok(scaled)
    }

    fn finish(
        &self,
        scaled: &Image<f32, 3>,
        x0: i64,
        y0: i64,
    ) -> Result<Option<AlignedFace>, FaceError> {
        let mut canvas_f32 = Image::from_size_val(self.config.canvas, 0.0)?;
        crop_with_padding(scaled, &mut canvas_f32, x0, y0)?;

        let mut canvas = Image::from_size_val(self.config.canvas, 0u8)?;
        cast_u8(&canvas_f32, &mut canvas)?;

        // landmarks on the finished canvas drive the morphing fields
        match self.detector.detect(&canvas)? {
            Some(landmarks) => Ok(Some(AlignedFace { canvas, landmarks })),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{LANDMARK_COUNT, LEFT_EYE_OUTER, RIGHT_EYE_OUTER};
    use glam::Vec2;

    fn fixed_landmarks(right: Vec2, left: Vec2) -> Landmarks {
        let mut points: Vec<Vec2> = (0..LANDMARK_COUNT)
            .map(|i| Vec2::new(2.0 + (i % 10) as f32, 2.0 + (i / 10) as f32))
            .collect();
        points[RIGHT_EYE_OUTER] = right;
        points[LEFT_EYE_OUTER] = left;
        Landmarks::new(points).unwrap()
    }

    fn small_config() -> AlignerConfig {
        AlignerConfig {
            eye_distance: 6.0,
            left_margin: 10,
            top_margin: 10,
            canvas: ImageSize {
                width: 20,
                height: 20,
            },
        }
    }

    #[test]
    fn align_eye_translates_face_onto_canvas() -> Result<(), FaceError> {
        // eyes already level with the target distance, so the pipeline
        // reduces to a pure translation
        let lms = fixed_landmarks(Vec2::new(1.0, 4.0), Vec2::new(7.0, 4.0));
        let detector =
            move |_img: &Image<u8, 3>| -> Result<Option<Landmarks>, FaceError> { Ok(Some(lms.clone())) };
        let aligner = FaceAligner::new(detector, small_config(), AlignmentStrategy::Eye);

        let source = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 8,
                height: 8,
            },
            255,
        )?;
        let face = aligner.align_eye(&source)?.unwrap();

        // eye center (4, 4) lands on (10, 10), so the 8x8 source covers
        // canvas rows and columns 6..14
        assert_eq!(*face.canvas.get_pixel(6, 6, 0)?, 255);
        assert_eq!(*face.canvas.get_pixel(13, 13, 2)?, 255);
        assert_eq!(*face.canvas.get_pixel(5, 6, 0)?, 0);
        assert_eq!(*face.canvas.get_pixel(6, 14, 0)?, 0);

        Ok(())
    }

    #[test]
    fn align_lse_identity_against_own_landmarks() -> Result<(), FaceError> {
        let lms = fixed_landmarks(Vec2::new(4.0, 4.0), Vec2::new(10.0, 4.0));
        let reference = lms.clone();
        let detector =
            move |_img: &Image<u8, 3>| -> Result<Option<Landmarks>, FaceError> { Ok(Some(lms.clone())) };
        let aligner = FaceAligner::new(detector, small_config(), AlignmentStrategy::LeastSquares);

        let size = ImageSize {
            width: 20,
            height: 20,
        };
        let source = Image::<u8, 3>::new(size, (0..(20 * 20 * 3)).map(|v| (v % 251) as u8).collect())?;
        let face = aligner.align_lse(&source, &reference)?.unwrap();

        // fitting a face against its own landmarks must not move it
        assert_eq!(face.canvas.as_slice(), source.as_slice());

        Ok(())
    }

    #[test]
    fn align_eye_rejects_degenerate_eye_distance() -> Result<(), FaceError> {
        let lms = fixed_landmarks(Vec2::new(4.0, 4.0), Vec2::new(4.0, 4.0));
        let detector =
            move |_img: &Image<u8, 3>| -> Result<Option<Landmarks>, FaceError> { Ok(Some(lms.clone())) };
        let aligner = FaceAligner::new(detector, small_config(), AlignmentStrategy::Eye);

        let source = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 8,
                height: 8,
            },
            255,
        )?;
        assert!(aligner.align_eye(&source)?.is_none());

        Ok(())
    }

    #[test]
    fn align_sequence_reports_dropped_inputs() -> Result<(), FaceError> {
        // images whose first byte is zero have "no face"
        let detector = |img: &Image<u8, 3>| -> Result<Option<Landmarks>, FaceError> {
            if *img.get_pixel(0, 0, 0)? == 0 && img.width() != 20 {
                Ok(None)
            } else {
                Ok(Some(fixed_landmarks(
                    Vec2::new(1.0, 4.0),
                    Vec2::new(7.0, 4.0),
                )))
            }
        };
        let aligner = FaceAligner::new(detector, small_config(), AlignmentStrategy::Eye);

        let size = ImageSize {
            width: 8,
            height: 8,
        };
        let good = Image::<u8, 3>::from_size_val(size, 255)?;
        let bad = Image::<u8, 3>::from_size_val(size, 0)?;
        let images = vec![good.clone(), bad, good];

        let sequence = aligner.align_sequence(&images)?;
        assert_eq!(sequence.faces.len(), 2);
        assert_eq!(sequence.dropped, vec![1]);

        Ok(())
    }

    #[test]
    fn align_sequence_propagates_detector_errors() {
        let detector = |_img: &Image<u8, 3>| -> Result<Option<Landmarks>, FaceError> {
            Err(FaceError::Backend(Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "model file missing",
            ))))
        };
        let aligner = FaceAligner::new(detector, small_config(), AlignmentStrategy::Eye);

        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0,
        )
        .unwrap();
        assert!(aligner.align_sequence(&[image]).is_err());
    }
}
