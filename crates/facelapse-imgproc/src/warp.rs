use facelapse_image::{Image, ImageError};

use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::parallel;

/// Inverts a 2x3 affine transformation matrix.
///
/// # Arguments
///
/// * `m` - The 2x3 affine transformation matrix.
///
/// # Returns
///
/// The inverted 2x3 affine transformation matrix.
pub fn invert_affine_transform(m: &[f32; 6]) -> [f32; 6] {
    let (a, b, c, d, e, f) = (m[0], m[1], m[2], m[3], m[4], m[5]);

    let determinant = a * e - b * d;
    let inv_determinant = if determinant != 0.0 {
        1.0 / determinant
    } else {
        0.0
    };

    let new_a = e * inv_determinant;
    let new_b = -b * inv_determinant;
    let new_d = -d * inv_determinant;
    let new_e = a * inv_determinant;
    let new_c = -(new_a * c + new_b * f);
    let new_f = -(new_d * c + new_e * f);

    [new_a, new_b, new_c, new_d, new_e, new_f]
}

/// Returns a 2x3 rotation matrix for a 2D rotation around a center point.
///
/// The rotation matrix is defined as:
///
/// | alpha  beta  tx |
/// | -beta  alpha ty |
///
/// where:
///
/// alpha = scale * cos(angle)
/// beta = scale * sin(angle)
/// tx = (1 - alpha) * center.x - beta * center.y
/// ty = beta * center.x + (1 - alpha) * center.y
///
/// With the image y axis pointing down, a positive angle maps a vector with a
/// positive slope onto the horizontal axis (it levels the vector).
///
/// # Arguments
///
/// * `center` - The center point of the rotation.
/// * `angle` - The angle of rotation in radians.
/// * `scale` - The uniform scale factor.
pub fn get_rotation_matrix2d(center: (f32, f32), angle: f32, scale: f32) -> [f32; 6] {
    let alpha = scale * angle.cos();
    let beta = scale * angle.sin();

    let tx = (1.0 - alpha) * center.0 - beta * center.1;
    let ty = beta * center.0 + (1.0 - alpha) * center.1;

    [alpha, beta, tx, -beta, alpha, ty]
}

/// Applies a 2x3 affine transformation to a point.
pub fn transform_point(x: f32, y: f32, m: &[f32; 6]) -> (f32, f32) {
    let u = m[0] * x + m[1] * y + m[2];
    let v = m[3] * x + m[4] * y + m[5];
    (u, v)
}

/// Applies an affine transformation to an image.
///
/// Destination pixels that map outside the source keep their initial value,
/// so a zero-filled destination yields a black background.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, C).
/// * `dst` - The output image with shape (height, width, C).
/// * `m` - The 2x3 affine transformation matrix.
/// * `interpolation` - The interpolation mode to use.
pub fn warp_affine<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    m: &[f32; 6],
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    // invert the affine transform to find the source position of each
    // destination pixel
    let m_inv = invert_affine_transform(m);

    let cols = dst.cols();
    let (src_cols, src_rows) = (src.cols() as f32, src.rows() as f32);

    use rayon::prelude::*;
    let dst_slice = dst.as_slice_mut();
    dst_slice
        .par_chunks_exact_mut(C * cols)
        .enumerate()
        .for_each(|(r, dst_row)| {
            dst_row
                .chunks_exact_mut(C)
                .enumerate()
                .for_each(|(c, dst_pixel)| {
                    let (u, v) = transform_point(c as f32, r as f32, &m_inv);
                    if u >= 0.0 && u < src_cols && v >= 0.0 && v < src_rows {
                        let pixel = interpolate_pixel(src, u, v, interpolation);
                        dst_pixel.copy_from_slice(&pixel);
                    }
                });
        });

    Ok(())
}

/// Warp an image with a dense per-pixel displacement field.
///
/// For every output pixel (r, c) the source is sampled at
/// `(c + amount * field_x[r, c], r + amount * field_y[r, c])` with bilinear
/// interpolation. `amount = 0` is the identity warp. Destination pixels whose
/// sample position falls outside the source keep their initial value, so a
/// zero-filled destination yields a black background.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, C).
/// * `dst` - The output image, same size as `src`.
/// * `field_x` - Dense x displacement, same size as `src`.
/// * `field_y` - Dense y displacement, same size as `src`.
/// * `amount` - Scale applied to the displacement field.
pub fn warp_field<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    field_x: &Image<f32, 1>,
    field_y: &Image<f32, 1>,
    amount: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    if field_x.size() != dst.size() || field_y.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            field_x.width(),
            field_x.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let cols = dst.cols();
    let (src_cols, src_rows) = (src.cols() as f32, src.rows() as f32);

    use rayon::prelude::*;
    let dst_slice = dst.as_slice_mut();
    let fx_slice = field_x.as_slice();
    let fy_slice = field_y.as_slice();

    dst_slice
        .par_chunks_exact_mut(C * cols)
        .zip(fx_slice.par_chunks_exact(cols))
        .zip(fy_slice.par_chunks_exact(cols))
        .enumerate()
        .for_each(|(r, ((dst_row, fx_row), fy_row))| {
            dst_row
                .chunks_exact_mut(C)
                .zip(fx_row.iter().zip(fy_row.iter()))
                .enumerate()
                .for_each(|(c, (dst_pixel, (fx, fy)))| {
                    let u = c as f32 + amount * fx;
                    let v = r as f32 + amount * fy;
                    if u >= 0.0 && u < src_cols && v >= 0.0 && v < src_rows {
                        let pixel =
                            interpolate_pixel(src, u, v, InterpolationMode::Bilinear);
                        dst_pixel.copy_from_slice(&pixel);
                    }
                });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use facelapse_image::{Image, ImageError, ImageSize};

    #[test]
    fn invert_affine_identity() {
        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        assert_eq!(invert_affine_transform(&m), m);
    }

    #[test]
    fn invert_affine_roundtrip() {
        let m = get_rotation_matrix2d((3.0, 4.0), 0.7, 1.3);
        let m_inv = invert_affine_transform(&m);
        let (x, y) = (5.0, -2.0);
        let (u, v) = transform_point(x, y, &m);
        let (x2, y2) = transform_point(u, v, &m_inv);
        assert_relative_eq!(x, x2, epsilon = 1e-4);
        assert_relative_eq!(y, y2, epsilon = 1e-4);
    }

    #[test]
    fn rotation_matrix_levels_positive_slope() {
        // a vector with positive slope in image coordinates must land on the
        // horizontal axis after rotating by its own angle
        let v = (3.0f32, 1.5f32);
        let angle = v.1.atan2(v.0);
        let m = get_rotation_matrix2d((0.0, 0.0), angle, 1.0);
        let (u, w) = transform_point(v.0, v.1, &m);
        assert_relative_eq!(w, 0.0, epsilon = 1e-5);
        assert!(u > 0.0);
    }

    #[test]
    fn warp_affine_identity() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 4,
                height: 5,
            },
            (0..20).map(|x| x as f32).collect(),
        )?;

        let mut warped = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
        warp_affine(
            &image,
            &mut warped,
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            InterpolationMode::Nearest,
        )?;

        assert_eq!(warped.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn warp_affine_translation_across_rows() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 3,
                height: 4,
            },
            (0..12).map(|x| x as f32).collect(),
        )?;

        // shift content one pixel down and one to the right
        let mut warped = Image::<f32, 1>::from_size_val(image.size(), -1.0)?;
        warp_affine(
            &image,
            &mut warped,
            &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0],
            InterpolationMode::Nearest,
        )?;

        #[rustfmt::skip]
        assert_eq!(warped.as_slice(), &[
            -1.0, -1.0, -1.0,
            -1.0,  0.0,  1.0,
            -1.0,  3.0,  4.0,
            -1.0,  6.0,  7.0,
        ]);

        Ok(())
    }

    #[test]
    fn warp_field_identity_amount_zero() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let image = Image::<f32, 3>::new(size, (0..36).map(|x| x as f32).collect())?;

        // an arbitrary field must not matter when amount is zero
        let field_x = Image::<f32, 1>::from_size_val(size, 17.0)?;
        let field_y = Image::<f32, 1>::from_size_val(size, -5.0)?;

        let mut warped = Image::<f32, 3>::from_size_val(size, 0.0)?;
        warp_field(&image, &mut warped, &field_x, &field_y, 0.0)?;

        assert_eq!(warped.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn warp_field_constant_shift() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 1,
        };
        let image = Image::<f32, 1>::new(size, vec![1.0, 2.0, 3.0])?;

        // shift sampling one pixel to the right
        let field_x = Image::<f32, 1>::from_size_val(size, 1.0)?;
        let field_y = Image::<f32, 1>::from_size_val(size, 0.0)?;

        let mut warped = Image::<f32, 1>::from_size_val(size, 0.0)?;
        warp_field(&image, &mut warped, &field_x, &field_y, 1.0)?;

        // the last pixel samples out of bounds and stays at the background
        assert_eq!(warped.as_slice(), &[2.0, 3.0, 0.0]);

        Ok(())
    }

    #[test]
    fn warp_field_amount_scales_displacement() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 1,
        };
        let image = Image::<f32, 1>::new(size, vec![0.0, 4.0, 8.0])?;

        let field_x = Image::<f32, 1>::from_size_val(size, 1.0)?;
        let field_y = Image::<f32, 1>::from_size_val(size, 0.0)?;

        let mut warped = Image::<f32, 1>::from_size_val(size, 0.0)?;
        warp_field(&image, &mut warped, &field_x, &field_y, 0.5)?;

        // samples at x + 0.5 interpolate halfway between neighbors
        assert_relative_eq!(warped.as_slice()[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(warped.as_slice()[1], 6.0, epsilon = 1e-6);

        Ok(())
    }

    #[test]
    fn warp_field_rejects_size_mismatch() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0.0,
        )?;
        let field = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0.0,
        )?;
        let mut out = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;

        let res = warp_field(&image, &mut out, &field, &field, 1.0);
        assert!(res.is_err());

        Ok(())
    }
}
