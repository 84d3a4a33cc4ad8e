use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real};

/// Computes the Aabb of a set of points transformed by `m`.
pub fn point_cloud_aabb<'a, I>(m: &Isometry<Real>, pts: I) -> Aabb
where
    I: IntoIterator<Item = &'a Point<Real>>,
{
    let mut result = Aabb::new_invalid();

    for pt in pts {
        result.take_point(m * pt);
    }

    result
}
