//! Bowyer-Watson incremental Delaunay triangulation.
//!
//! Operates in f64 to keep the circumcircle predicate stable for pixel-scale
//! coordinates. Near-duplicate points are skipped; the caller handles any
//! region left uncovered by the resulting triangles.

const DUPLICATE_EPS_SQ: f64 = 1e-12;

/// A triangulation over a slice of input points.
///
/// Triangle vertices are indices into the point slice passed to
/// [`triangulate`].
#[derive(Debug)]
pub(crate) struct Triangulation {
    pub(crate) triangles: Vec<[usize; 3]>,
}

/// Check whether `p` lies strictly inside the circumcircle of (a, b, c).
fn circumcircle_contains(a: [f64; 2], b: [f64; 2], c: [f64; 2], p: [f64; 2]) -> bool {
    let (ax, ay) = (a[0] - p[0], a[1] - p[1]);
    let (bx, by) = (b[0] - p[0], b[1] - p[1]);
    let (cx, cy) = (c[0] - p[0], c[1] - p[1]);

    let det = (ax * ax + ay * ay) * (bx * cy - cx * by)
        - (bx * bx + by * by) * (ax * cy - cx * ay)
        + (cx * cx + cy * cy) * (ax * by - bx * ay);

    // the sign of the incircle determinant depends on the triangle orientation
    let orient = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
    if orient >= 0.0 {
        det > 0.0
    } else {
        det < 0.0
    }
}

fn sorted_edge(i: usize, j: usize) -> (usize, usize) {
    if i < j {
        (i, j)
    } else {
        (j, i)
    }
}

/// Triangulate a set of 2-D points.
///
/// Points closer than a small epsilon to an already inserted point are
/// skipped, so degenerate duplicate samples never break the triangulation.
pub(crate) fn triangulate(points: &[[f64; 2]]) -> Triangulation {
    if points.len() < 3 {
        return Triangulation {
            triangles: Vec::new(),
        };
    }

    // bounding box of the input, used to place the enclosing super triangle
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p[0]);
        min_y = min_y.min(p[1]);
        max_x = max_x.max(p[0]);
        max_y = max_y.max(p[1]);
    }
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    let d = (max_x - min_x).max(max_y - min_y).max(1.0);

    let n = points.len();
    let mut all_points: Vec<[f64; 2]> = points.to_vec();
    all_points.push([cx - 20.0 * d, cy - d]);
    all_points.push([cx + 20.0 * d, cy - d]);
    all_points.push([cx, cy + 20.0 * d]);

    let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];

    let mut accepted: Vec<usize> = Vec::with_capacity(n);
    for i in 0..n {
        let p = all_points[i];

        let duplicate = accepted.iter().any(|&j| {
            let q = all_points[j];
            let (dx, dy) = (p[0] - q[0], p[1] - q[1]);
            dx * dx + dy * dy < DUPLICATE_EPS_SQ
        });
        if duplicate {
            continue;
        }
        accepted.push(i);

        // triangles whose circumcircle contains the new point are invalid
        let mut bad: Vec<[usize; 3]> = Vec::new();
        triangles.retain(|t| {
            if circumcircle_contains(all_points[t[0]], all_points[t[1]], all_points[t[2]], p) {
                bad.push(*t);
                false
            } else {
                true
            }
        });

        // the boundary of the carved cavity is the set of edges that belong
        // to exactly one invalid triangle
        let mut edges: Vec<((usize, usize), bool)> = Vec::with_capacity(bad.len() * 3);
        for t in &bad {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                let e = sorted_edge(a, b);
                match edges.iter_mut().find(|(other, _)| *other == e) {
                    Some((_, shared)) => *shared = true,
                    None => edges.push((e, false)),
                }
            }
        }

        for ((a, b), shared) in edges {
            if !shared {
                triangles.push([a, b, i]);
            }
        }
    }

    // drop every triangle touching the super triangle
    triangles.retain(|t| t.iter().all(|&v| v < n));

    Triangulation { triangles }
}
