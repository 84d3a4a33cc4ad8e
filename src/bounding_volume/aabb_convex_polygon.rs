use crate::bounding_volume::details::point_cloud_aabb;
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Isometry, Real};
use crate::shape::ConvexPolygon;

impl ConvexPolygon {
    /// Computes the world-space Aabb of this convex polygon, transformed by `pos`.
    ///
    /// The box includes the polygon skin radius.
    #[inline]
    pub fn aabb(&self, pos: &Isometry<Real>) -> Aabb {
        point_cloud_aabb(pos, self.points()).loosened(self.radius())
    }

    /// Computes the local-space Aabb of this convex polygon.
    #[inline]
    pub fn local_aabb(&self) -> Aabb {
        point_cloud_aabb(&Isometry::identity(), self.points()).loosened(self.radius())
    }
}
