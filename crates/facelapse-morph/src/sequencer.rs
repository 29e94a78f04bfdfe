use facelapse_face::{AlignedFace, Landmarks};
use facelapse_image::{ops::cast_u8, Image, ImageError, ImageSize};
use facelapse_imgproc::{
    blend::cross_dissolve,
    field::{extrapolate, FieldError},
    warp::warp_field,
};
use thiserror::Error;

use crate::sink::{FrameSink, SinkError};

/// Timing of the generated sequence.
#[derive(Debug, Clone, Copy)]
pub struct MorphConfig {
    /// How long each face is held still, in seconds.
    pub pause_secs: f32,
    /// How long each morph transition lasts, in seconds.
    pub interval_secs: f32,
    /// Frames per second of the output.
    pub fps: f32,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            pause_secs: 0.5,
            interval_secs: 1.0,
            fps: 30.0,
        }
    }
}

impl MorphConfig {
    /// Number of hold frames per face.
    pub fn pause_frames(&self) -> usize {
        (self.pause_secs * self.fps).round() as usize
    }

    /// Number of frames per morph transition.
    pub fn interval_frames(&self) -> usize {
        (self.interval_secs * self.fps).round() as usize
    }

    /// Total frame count of a morph sequence over `faces` faces.
    pub fn total_frames(&self, faces: usize) -> usize {
        if faces == 0 {
            return 0;
        }
        (faces - 1) * self.interval_frames() + faces * self.pause_frames()
    }
}

/// Errors from the morph sequencer.
#[derive(Debug, Error)]
pub enum MorphError {
    /// Too few faces for the requested sequence.
    #[error("need at least {1} aligned faces, got {0}")]
    NotEnoughFaces(usize, usize),

    /// The aligned faces do not share one canvas size.
    #[error("aligned faces must share one canvas size, got {0} and {1}")]
    CanvasSizeMismatch(ImageSize, ImageSize),

    /// Error from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error while extrapolating a displacement field.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Error from the frame sink.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Stream a morphing timelapse over the aligned faces into the sink.
///
/// Each face is held for the configured pause, then morphed into the next
/// face over the configured interval: both faces are warped along
/// landmark-driven displacement fields and cross-dissolved. The sequence
/// ends with a final hold on the last face, so the total frame count is
/// `(k - 1) * interval_frames + k * pause_frames` for `k` faces.
pub fn make_morph_video<S: FrameSink>(
    faces: &[AlignedFace],
    config: &MorphConfig,
    sink: &mut S,
) -> Result<(), MorphError> {
    if faces.len() < 2 {
        return Err(MorphError::NotEnoughFaces(faces.len(), 2));
    }
    let size = faces[0].canvas.size();
    for face in &faces[1..] {
        if face.canvas.size() != size {
            return Err(MorphError::CanvasSizeMismatch(size, face.canvas.size()));
        }
    }

    let pause_frames = config.pause_frames();
    let interval_frames = config.interval_frames();
    log::info!(
        "morphing {} faces into {} frames",
        faces.len(),
        config.total_frames(faces.len())
    );

    let mut warped1 = Image::<f32, 3>::from_size_val(size, 0.0)?;
    let mut warped2 = Image::<f32, 3>::from_size_val(size, 0.0)?;
    let mut blended = Image::<f32, 3>::from_size_val(size, 0.0)?;
    let mut frame = Image::<u8, 3>::from_size_val(size, 0)?;

    for (index, pair) in faces.windows(2).enumerate() {
        let (face1, face2) = (&pair[0], &pair[1]);
        log::debug!("computing displacement fields for pair {index}");

        // field warping face1 toward face2, anchored at face2's landmarks
        let (fx1, fy1) = landmark_field(&face2.landmarks, &face1.landmarks, size)?;
        // and the reverse, anchored at face1's landmarks
        let (fx2, fy2) = landmark_field(&face1.landmarks, &face2.landmarks, size)?;

        for _ in 0..pause_frames {
            sink.write(&face1.canvas)?;
        }

        let canvas1 = face1.canvas.cast::<f32>()?;
        let canvas2 = face2.canvas.cast::<f32>()?;

        for j in 0..interval_frames {
            let t = if interval_frames == 1 {
                1.0
            } else {
                j as f32 / (interval_frames - 1) as f32
            };

            // out-of-field pixels stay black, so clear the previous frame
            warped1.as_slice_mut().fill(0.0);
            warped2.as_slice_mut().fill(0.0);
            warp_field(&canvas1, &mut warped1, &fx1, &fy1, t)?;
            warp_field(&canvas2, &mut warped2, &fx2, &fy2, 1.0 - t)?;
            cross_dissolve(&warped1, &warped2, &mut blended, t)?;

            cast_u8(&blended, &mut frame)?;
            sink.write(&frame)?;
        }
    }

    for _ in 0..pause_frames {
        sink.write(&faces[faces.len() - 1].canvas)?;
    }

    Ok(())
}

/// Stream a plain slideshow of the aligned faces, with no morphing.
///
/// Every face is held for the configured pause.
pub fn make_still_video<S: FrameSink>(
    faces: &[AlignedFace],
    config: &MorphConfig,
    sink: &mut S,
) -> Result<(), MorphError> {
    if faces.is_empty() {
        return Err(MorphError::NotEnoughFaces(0, 1));
    }

    let pause_frames = config.pause_frames();
    for face in faces {
        for _ in 0..pause_frames {
            sink.write(&face.canvas)?;
        }
    }

    Ok(())
}

/// Dense displacement field moving `target` landmarks onto `source` ones.
fn landmark_field(
    target: &Landmarks,
    source: &Landmarks,
    size: ImageSize,
) -> Result<(Image<f32, 1>, Image<f32, 1>), FieldError> {
    let points: Vec<[f32; 2]> = target.points().iter().map(|p| [p.x, p.y]).collect();
    let values: Vec<[f32; 2]> = source
        .points()
        .iter()
        .zip(target.points().iter())
        .map(|(s, t)| [s.x - t.x, s.y - t.y])
        .collect();
    extrapolate(&points, &values, size)
}
