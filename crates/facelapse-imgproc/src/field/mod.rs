//! Sparse to dense vector field extrapolation.
//!
//! Given displacement samples at scattered points, produces per-axis dense
//! fields over a pixel grid. The canvas border is pinned to zero displacement
//! so warps driven by the field leave the image edges untouched.

mod delaunay;

use facelapse_image::{Image, ImageError, ImageSize};
use thiserror::Error;

/// Inside-test tolerance for the barycentric rasterizer.
const BARY_EPS: f64 = 1e-9;

/// Errors that can occur when building a dense vector field.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The sample point and value slices disagree in length.
    #[error("got {0} sample points but {1} sample values")]
    LengthMismatch(usize, usize),

    /// No displacement samples were provided.
    #[error("at least one sample point is required")]
    EmptySamples,

    /// The target canvas cannot hold the zero border.
    #[error("canvas {0}x{1} is too small, need at least 2x2")]
    CanvasTooSmall(usize, usize),

    /// Error from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Extrapolate scattered displacement samples to a dense per-pixel field.
///
/// Sample `points[i]` is an `(x, y)` location and `values[i]` the
/// displacement `(dx, dy)` observed there. Zero-valued anchors are added on
/// every border pixel of the canvas, the augmented set is triangulated, and
/// each pixel inside a triangle gets the barycentric blend of its vertex
/// displacements. Pixels no triangle covers fall back to the nearest sample,
/// so the returned fields are defined everywhere.
///
/// Returns the horizontal and vertical displacement fields as single-channel
/// images of the canvas size.
pub fn extrapolate(
    points: &[[f32; 2]],
    values: &[[f32; 2]],
    size: ImageSize,
) -> Result<(Image<f32, 1>, Image<f32, 1>), FieldError> {
    if points.len() != values.len() {
        return Err(FieldError::LengthMismatch(points.len(), values.len()));
    }
    if points.is_empty() {
        return Err(FieldError::EmptySamples);
    }
    let (w, h) = (size.width, size.height);
    if w < 2 || h < 2 {
        return Err(FieldError::CanvasTooSmall(w, h));
    }

    // samples plus one zero anchor per border pixel
    let total = points.len() + 2 * (w + h) - 4;
    let mut pts: Vec<[f64; 2]> = Vec::with_capacity(total);
    let mut vals: Vec<[f64; 2]> = Vec::with_capacity(total);
    for (p, v) in points.iter().zip(values.iter()) {
        pts.push([p[0] as f64, p[1] as f64]);
        vals.push([v[0] as f64, v[1] as f64]);
    }
    for x in 0..w {
        pts.push([x as f64, 0.0]);
    }
    for y in 1..h {
        pts.push([0.0, y as f64]);
    }
    for y in 1..h {
        pts.push([(w - 1) as f64, y as f64]);
    }
    for x in 1..w - 1 {
        pts.push([x as f64, (h - 1) as f64]);
    }
    vals.resize(pts.len(), [0.0, 0.0]);

    let mut fx = vec![f32::NAN; w * h];
    let mut fy = vec![f32::NAN; w * h];

    let tri = delaunay::triangulate(&pts);
    for t in &tri.triangles {
        rasterize_triangle(&pts, &vals, *t, w, h, &mut fx, &mut fy);
    }

    // duplicate or collinear samples can leave slivers uncovered; fill the
    // leftovers from the nearest sample
    for (idx, out_x) in fx.iter_mut().enumerate() {
        if !out_x.is_nan() {
            continue;
        }
        let x = (idx % w) as f64;
        let y = (idx / w) as f64;
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (j, p) in pts.iter().enumerate() {
            let (dx, dy) = (p[0] - x, p[1] - y);
            let dist = dx * dx + dy * dy;
            if dist < best_dist {
                best_dist = dist;
                best = j;
            }
        }
        *out_x = vals[best][0] as f32;
        fy[idx] = vals[best][1] as f32;
    }

    let field_x = Image::new(size, fx)?;
    let field_y = Image::new(size, fy)?;
    Ok((field_x, field_y))
}

/// Fill both field channels for every grid cell inside one triangle.
fn rasterize_triangle(
    pts: &[[f64; 2]],
    vals: &[[f64; 2]],
    [a, b, c]: [usize; 3],
    w: usize,
    h: usize,
    fx: &mut [f32],
    fy: &mut [f32],
) {
    let (pa, pb, pc) = (pts[a], pts[b], pts[c]);
    let (va, vb, vc) = (vals[a], vals[b], vals[c]);

    let denom = (pb[1] - pc[1]) * (pa[0] - pc[0]) + (pc[0] - pb[0]) * (pa[1] - pc[1]);
    if denom.abs() < BARY_EPS {
        return;
    }

    let min_x = pa[0].min(pb[0]).min(pc[0]).floor().max(0.0) as usize;
    let max_x = (pa[0].max(pb[0]).max(pc[0]).ceil() as usize).min(w - 1);
    let min_y = pa[1].min(pb[1]).min(pc[1]).floor().max(0.0) as usize;
    let max_y = (pa[1].max(pb[1]).max(pc[1]).ceil() as usize).min(h - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (px, py) = (x as f64, y as f64);
            let w0 = ((pb[1] - pc[1]) * (px - pc[0]) + (pc[0] - pb[0]) * (py - pc[1])) / denom;
            let w1 = ((pc[1] - pa[1]) * (px - pc[0]) + (pa[0] - pc[0]) * (py - pc[1])) / denom;
            let w2 = 1.0 - w0 - w1;
            if w0 < -BARY_EPS || w1 < -BARY_EPS || w2 < -BARY_EPS {
                continue;
            }
            let idx = y * w + x;
            fx[idx] = (w0 * va[0] + w1 * vb[0] + w2 * vc[0]) as f32;
            fy[idx] = (w0 * va[1] + w1 * vb[1] + w2 * vc[1]) as f32;
        }
    }
}
