//! Closed-form singular value decomposition of a 2x2 matrix.

use glam::{DMat2, DVec2};

/// SVD result of a 2x2 matrix, with `m = u * diag(s) * v.transpose()`.
///
/// `u` and `v` are orthogonal and the singular values satisfy
/// `s.x >= s.y >= 0`.
#[derive(Debug, Clone, Copy)]
pub struct Svd2 {
    /// Left singular vectors.
    pub u: DMat2,
    /// Singular values, descending.
    pub s: DVec2,
    /// Right singular vectors.
    pub v: DMat2,
}

/// Compute the SVD of a 2x2 matrix in closed form.
///
/// Any 2x2 matrix factors as a rotation, an axis-aligned scale, and another
/// rotation; the factors fall out of two `atan2` evaluations, so no
/// iteration is needed.
pub fn svd2(m: &DMat2) -> Svd2 {
    let (m00, m10) = (m.x_axis.x, m.x_axis.y);
    let (m01, m11) = (m.y_axis.x, m.y_axis.y);

    let e = (m00 + m11) / 2.0;
    let f = (m00 - m11) / 2.0;
    let g = (m10 + m01) / 2.0;
    let h = (m10 - m01) / 2.0;

    let q = e.hypot(h);
    let r = f.hypot(g);
    let sx = q + r;
    let mut sy = q - r;

    let a1 = g.atan2(f);
    let a2 = h.atan2(e);
    let theta = (a2 - a1) / 2.0;
    let phi = (a2 + a1) / 2.0;

    let u = DMat2::from_angle(phi);
    let mut v = DMat2::from_angle(-theta);

    // fold a negative second singular value into v
    if sy < 0.0 {
        sy = -sy;
        v.y_axis = -v.y_axis;
    }

    Svd2 {
        u,
        s: DVec2::new(sx, sy),
        v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reconstruct(svd: &Svd2) -> DMat2 {
        svd.u * DMat2::from_diagonal(svd.s) * svd.v.transpose()
    }

    fn assert_mat_eq(a: &DMat2, b: &DMat2) {
        assert_relative_eq!(a.x_axis.x, b.x_axis.x, epsilon = 1e-12);
        assert_relative_eq!(a.x_axis.y, b.x_axis.y, epsilon = 1e-12);
        assert_relative_eq!(a.y_axis.x, b.y_axis.x, epsilon = 1e-12);
        assert_relative_eq!(a.y_axis.y, b.y_axis.y, epsilon = 1e-12);
    }

    #[test]
    fn svd2_diagonal() {
        let m = DMat2::from_diagonal(DVec2::new(3.0, 2.0));
        let svd = svd2(&m);
        assert_relative_eq!(svd.s.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(svd.s.y, 2.0, epsilon = 1e-12);
        assert_mat_eq(&reconstruct(&svd), &m);
    }

    #[test]
    fn svd2_rotation() {
        let m = DMat2::from_angle(0.7);
        let svd = svd2(&m);
        assert_relative_eq!(svd.s.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(svd.s.y, 1.0, epsilon = 1e-12);
        assert_mat_eq(&reconstruct(&svd), &m);
    }

    #[test]
    fn svd2_general() {
        let m = DMat2::from_cols(DVec2::new(1.0, -2.5), DVec2::new(0.3, 4.0));
        let svd = svd2(&m);
        assert!(svd.s.x >= svd.s.y);
        assert!(svd.s.y >= 0.0);
        assert_mat_eq(&reconstruct(&svd), &m);
        // factors are orthogonal
        assert_mat_eq(&(svd.u * svd.u.transpose()), &DMat2::IDENTITY);
        assert_mat_eq(&(svd.v * svd.v.transpose()), &DMat2::IDENTITY);
    }

    #[test]
    fn svd2_reflection() {
        let m = DMat2::from_cols(DVec2::new(0.0, 1.0), DVec2::new(1.0, 0.0));
        let svd = svd2(&m);
        assert_relative_eq!(svd.s.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(svd.s.y, 1.0, epsilon = 1e-12);
        assert_mat_eq(&reconstruct(&svd), &m);
    }

    #[test]
    fn svd2_singular_matrix() {
        // rank one
        let m = DMat2::from_cols(DVec2::new(2.0, 4.0), DVec2::new(1.0, 2.0));
        let svd = svd2(&m);
        assert_relative_eq!(svd.s.y, 0.0, epsilon = 1e-12);
        assert_mat_eq(&reconstruct(&svd), &m);
    }
}
