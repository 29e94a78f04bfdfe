use facelapse_image::{Image, ImageError};

use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::parallel;

/// Resize an image to the size of the destination container.
///
/// The destination grid is mapped linearly onto the source grid so that the
/// first and last rows/columns of both images coincide.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container, pre-allocated at the target size.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use facelapse_image::{Image, ImageSize};
/// use facelapse_imgproc::resize::resize_native;
/// use facelapse_imgproc::interpolation::InterpolationMode;
///
/// let image = Image::<f32, 3>::new(
///     ImageSize { width: 4, height: 5 },
///     vec![0f32; 4 * 5 * 3],
/// ).unwrap();
///
/// let mut resized = Image::<f32, 3>::from_size_val(
///     ImageSize { width: 2, height: 3 },
///     0.0,
/// ).unwrap();
///
/// resize_native(&image, &mut resized, InterpolationMode::Bilinear).unwrap();
///
/// assert_eq!(resized.size().width, 2);
/// assert_eq!(resized.size().height, 3);
/// ```
pub fn resize_native<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.size() == dst.size() {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let (dst_cols, dst_rows) = (dst.cols(), dst.rows());

    let step_x = if dst_cols > 1 {
        (src.cols() - 1) as f32 / (dst_cols - 1) as f32
    } else {
        0.0
    };
    let step_y = if dst_rows > 1 {
        (src.rows() - 1) as f32 / (dst_rows - 1) as f32
    } else {
        0.0
    };

    // coordinate maps of the output grid expressed in source pixels
    let mut map_x = Vec::with_capacity(dst_rows * dst_cols);
    let mut map_y = Vec::with_capacity(dst_rows * dst_cols);
    for r in 0..dst_rows {
        for c in 0..dst_cols {
            map_x.push(c as f32 * step_x);
            map_y.push(r as f32 * step_y);
        }
    }
    let map_x = Image::<f32, 1>::new(dst.size(), map_x)?;
    let map_y = Image::<f32, 1>::new(dst.size(), map_y)?;

    parallel::par_iter_rows_resample(dst, &map_x, &map_y, |&x, &y, dst_pixel| {
        let pixel = interpolate_pixel(src, x, y, interpolation);
        dst_pixel.copy_from_slice(&pixel);
    });

    Ok(())
}
