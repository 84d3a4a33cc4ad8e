use crate::math::Real;

/// Inverts `val`, or returns zero if it is exactly zero.
pub fn inv(val: Real) -> Real {
    if val == 0.0 {
        0.0
    } else {
        1.0 / val
    }
}

/// Inverts a determinant, or returns zero if it is too close to zero to be inverted safely.
pub(crate) fn inv_det(det: Real) -> Real {
    if det.abs() <= Real::EPSILON * Real::EPSILON {
        0.0
    } else {
        1.0 / det
    }
}
