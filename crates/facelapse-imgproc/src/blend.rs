use facelapse_image::{Image, ImageError};

use crate::parallel;

/// Linear cross-dissolve of two images of the same size.
///
/// Computes `(1 - t) * a + t * b` per pixel channel. `t = 0` reproduces `a`
/// and `t = 1` reproduces `b`.
///
/// # Arguments
///
/// * `a` - The first image.
/// * `b` - The second image, same size as `a`.
/// * `dst` - The output image, same size as `a`.
/// * `t` - The blend factor, typically in `[0, 1]`.
pub fn cross_dissolve<const C: usize>(
    a: &Image<f32, C>,
    b: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    t: f32,
) -> Result<(), ImageError> {
    if a.size() != b.size() || a.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            a.width(),
            a.height(),
            b.width(),
            b.height(),
        ));
    }

    parallel::par_iter_rows_val_two(a, b, dst, |&x, &y, out| {
        *out = (1.0 - t) * x + t * y;
    });

    Ok(())
}
