use facelapse_image::{Image, ImageError, ImageSize};

use crate::interpolation::InterpolationMode;
use crate::warp::{get_rotation_matrix2d, warp_affine};

/// Rotate an image about its center without truncating content.
///
/// The output canvas is grown to bound the rotated corners and the rotated
/// content is centered on it; uncovered regions are black. The exact 2x3
/// affine matrix that was applied is returned so callers can track points
/// through the same transform instead of re-detecting them.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `angle` - The rotation angle in radians, applied about the image center.
///
/// # Returns
///
/// The rotated image and the 2x3 affine matrix mapping source pixel
/// coordinates into the rotated canvas.
pub fn rotate_bound<const C: usize>(
    src: &Image<f32, C>,
    angle: f32,
) -> Result<(Image<f32, C>, [f32; 6]), ImageError> {
    let (old_w, old_h) = (src.width() as f32, src.height() as f32);

    let (sin, cos) = (angle.sin().abs(), angle.cos().abs());
    let new_w = (sin * old_h + cos * old_w).ceil();
    let new_h = (sin * old_w + cos * old_h).ceil();

    let mut m = get_rotation_matrix2d((old_w / 2.0, old_h / 2.0), angle, 1.0);
    // recenter the rotated content on the grown canvas
    m[2] += (new_w - old_w) / 2.0;
    m[5] += (new_h - old_h) / 2.0;

    let size = ImageSize {
        width: new_w as usize,
        height: new_h as usize,
    };
    let mut dst = Image::from_size_val(size, 0.0)?;
    warp_affine(src, &mut dst, &m, InterpolationMode::Bilinear)?;

    Ok((dst, m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warp::transform_point;
    use facelapse_image::{Image, ImageError, ImageSize};

    #[test]
    fn rotate_bound_zero_angle_keeps_size() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 4,
                height: 3,
            },
            (0..12).map(|x| x as f32).collect(),
        )?;

        let (rotated, _m) = rotate_bound(&image, 0.0)?;
        assert_eq!(rotated.size(), image.size());
        for (a, b) in rotated.as_slice().iter().zip(image.as_slice().iter()) {
            assert!((a - b).abs() < 1e-4);
        }

        Ok(())
    }

    #[test]
    fn rotate_bound_right_angle_swaps_dimensions() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 6,
                height: 4,
            },
            1.0,
        )?;

        let (rotated, _m) = rotate_bound(&image, std::f32::consts::FRAC_PI_2)?;
        assert_eq!(rotated.width(), 4);
        assert_eq!(rotated.height(), 6);

        Ok(())
    }

    #[test]
    fn rotate_bound_corners_stay_inside() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 10,
            height: 7,
        };
        let image = Image::<f32, 1>::from_size_val(size, 1.0)?;

        let (rotated, m) = rotate_bound(&image, 0.6)?;

        for (x, y) in [
            (0.0, 0.0),
            (9.0, 0.0),
            (0.0, 6.0),
            (9.0, 6.0),
        ] {
            let (u, v) = transform_point(x, y, &m);
            assert!(u >= -0.5 && u <= rotated.width() as f32 + 0.5);
            assert!(v >= -0.5 && v <= rotated.height() as f32 + 0.5);
        }

        Ok(())
    }
}
