use facelapse_image::{Image, ImageError};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Copy a window of the source image into the destination, padding the rest.
///
/// The window has the destination's size and its top-left corner sits at
/// `(x0, y0)` in source coordinates; the corner may be negative and the
/// window may exceed the source extent. Only the intersection of the window
/// with the source is copied; destination pixels outside the intersection
/// keep their initial value, so a pre-filled destination provides the
/// padding color.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination canvas, pre-filled with the padding value.
/// * `x0` - The x-coordinate of the window's top-left corner in the source.
/// * `y0` - The y-coordinate of the window's top-left corner in the source.
pub fn crop_with_padding<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x0: i64,
    y0: i64,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let (src_cols, src_rows) = (src.cols() as i64, src.rows() as i64);
    let dst_cols = dst.cols() as i64;

    // horizontal intersection of the window with the source extent
    let sx_begin = x0.max(0);
    let sx_end = (x0 + dst_cols).min(src_cols);
    if sx_end <= sx_begin {
        return Ok(());
    }
    let dx_begin = (-x0).max(0) as usize;
    let span = (sx_end - sx_begin) as usize;

    let dst_row_stride = dst.cols() * C;

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_row_stride)
        .enumerate()
        .for_each(|(i, dst_row)| {
            let sy = y0 + i as i64;
            if sy < 0 || sy >= src_rows {
                return;
            }
            let src_offset = (sy as usize * src.cols() + sx_begin as usize) * C;
            let src_slice = &src.as_slice()[src_offset..src_offset + span * C];
            dst_row[dx_begin * C..(dx_begin + span) * C].copy_from_slice(src_slice);
        });

    Ok(())
}
