//! Planar rigid alignment (Kabsch)

// We use f64 throughout for precision; callers cast to f32 at the boundary
use glam::{DMat2, DVec2};
use thiserror::Error;

/// Error type for rigid alignment operations.
#[derive(Debug, Error)]
pub enum RigidError {
    /// Source and destination arrays must have the same length
    #[error("Source and destination arrays must have the same length")]
    MismatchedInputLengths,

    /// At least two point pairs are required
    #[error("At least two point pairs are required, got {0}")]
    NotEnoughPoints(usize),
}

/// Kabsch algorithm for 2-D point sets.
///
/// Finds the rotation `R` minimizing `sum |dst_i - (R * src_i + t)|^2` over
/// all proper rotations, with the optimal translation implied by the
/// centroids. Reflections in the correlation are corrected, so the result
/// always has determinant `+1`.
pub fn kabsch2(src: &[DVec2], dst: &[DVec2]) -> Result<DMat2, RigidError> {
    if src.len() != dst.len() {
        return Err(RigidError::MismatchedInputLengths);
    }
    if src.len() < 2 {
        return Err(RigidError::NotEnoughPoints(src.len()));
    }
    let n = src.len() as f64;

    let mu_s = src.iter().sum::<DVec2>() / n;
    let mu_d = dst.iter().sum::<DVec2>() / n;

    // H_ij = sum( (dst_i - mu_d) * (src_j - mu_s) )
    let mut h = DMat2::ZERO;
    for (s, d) in src.iter().zip(dst.iter()) {
        let a = *s - mu_s;
        let b = *d - mu_d;
        h += DMat2::from_cols(b * a.x, b * a.y);
    }

    let svd = crate::svd::svd2(&h);
    let mut u = svd.u;
    let v = svd.v;

    // Handle reflection: R = U * diag(1, -1) * V^T
    if (u * v.transpose()).determinant() < 0.0 {
        u.y_axis = -u.y_axis;
    }

    Ok(u * v.transpose())
}

/// Extract the rotation angle of a proper rotation in image coordinates.
///
/// Image coordinates have y pointing down, so the returned angle is the
/// counter-clockwise screen angle a viewer observes; feeding it back into an
/// OpenCV-style rotation matrix reproduces `r`.
pub fn rotation_angle(r: &DMat2) -> f64 {
    (-r.x_axis.y).atan2(r.x_axis.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rot(angle: f64) -> DMat2 {
        DMat2::from_angle(angle)
    }

    #[test]
    fn kabsch2_identity() -> Result<(), RigidError> {
        let pts = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 1.0),
            DVec2::new(2.0, 5.0),
        ];
        let r = kabsch2(&pts, &pts)?;
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(r.x_axis.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(r.x_axis.y, 0.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn kabsch2_recovers_pure_rotation() -> Result<(), RigidError> {
        let src = vec![
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(-1.0, -1.0),
            DVec2::new(3.0, 2.0),
        ];
        let expected = rot(0.35);
        let dst: Vec<DVec2> = src.iter().map(|p| expected * *p).collect();

        let r = kabsch2(&src, &dst)?;
        assert_relative_eq!(r.x_axis.x, expected.x_axis.x, epsilon = 1e-9);
        assert_relative_eq!(r.x_axis.y, expected.x_axis.y, epsilon = 1e-9);
        assert_relative_eq!(r.y_axis.x, expected.y_axis.x, epsilon = 1e-9);
        assert_relative_eq!(r.y_axis.y, expected.y_axis.y, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn kabsch2_rotation_with_translation() -> Result<(), RigidError> {
        let src = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(0.0, 3.0),
        ];
        let expected = rot(-0.8);
        let t = DVec2::new(10.0, -4.0);
        let dst: Vec<DVec2> = src.iter().map(|p| expected * *p + t).collect();

        let r = kabsch2(&src, &dst)?;
        assert_relative_eq!(
            rotation_angle(&r),
            rotation_angle(&expected),
            epsilon = 1e-9
        );
        Ok(())
    }

    #[test]
    fn kabsch2_never_returns_reflection() -> Result<(), RigidError> {
        // mirrored correspondence would minimize with a reflection
        let src = vec![
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(-1.0, 0.0),
        ];
        let dst: Vec<DVec2> = src.iter().map(|p| DVec2::new(-p.x, p.y)).collect();

        let r = kabsch2(&src, &dst)?;
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn kabsch2_rejects_bad_input() {
        let pts = vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0)];
        assert!(matches!(
            kabsch2(&pts, &pts[..1]),
            Err(RigidError::MismatchedInputLengths)
        ));
        assert!(matches!(
            kabsch2(&pts[..1], &pts[..1]),
            Err(RigidError::NotEnoughPoints(1))
        ));
    }

    #[test]
    fn rotation_angle_matches_image_convention() {
        // y-down coordinates flip the sign of the matrix entry
        let r = rot(0.5);
        assert_relative_eq!(rotation_angle(&r), -0.5, epsilon = 1e-12);
    }
}
