use crate::math::*;

/// Computes the direction pointing toward the right-hand-side of an oriented segment.
///
/// For the edges of a counter-clockwise polygon this is the outward normal.
/// Returns `None` if the segment is degenerate.
#[inline]
pub fn ccw_face_normal(pts: [&Point<Real>; 2]) -> Option<Vector<Real>> {
    let ab = *pts[1] - *pts[0];
    let res = Vector::new(ab.y, -ab.x);
    let norm = res.norm();

    if norm > DEFAULT_EPSILON {
        Some(res / norm)
    } else {
        None
    }
}
