use crate::math::{Isometry, Real, DEFAULT_EPSILON};
use crate::query::details::{
    contact_manifold_ball_ball, contact_manifold_polygon_ball, contact_manifold_polygon_polygon,
};
use crate::query::{distance, Manifold, Unsupported};
use crate::shape::{Shape, ShapeType};
use crate::utils::DEFAULT_LINEAR_SLOP;

/// Computes contact manifolds between pairs of shapes.
///
/// Contacts always present their shapes with `shape_a.shape_type() >= shape_b.shape_type()`, so
/// an implementation only needs to handle one ordering of each pair.
pub trait NarrowPhase: Send + Sync {
    /// Can this narrow-phase generate manifolds between shapes of these types?
    fn supports(&self, type_a: ShapeType, type_b: ShapeType) -> bool;

    /// Computes the local manifold between two shape children at the given poses.
    ///
    /// The manifold points are replaced and their accumulated impulses are left to zero.
    fn evaluate(
        &self,
        shape_a: &dyn Shape,
        child_a: usize,
        xf_a: &Isometry<Real>,
        shape_b: &dyn Shape,
        child_b: usize,
        xf_b: &Isometry<Real>,
        manifold: &mut Manifold,
    ) -> Result<(), Unsupported>;

    /// Tests whether two shape children overlap, including their skins.
    fn test_overlap(
        &self,
        shape_a: &dyn Shape,
        child_a: usize,
        xf_a: &Isometry<Real>,
        shape_b: &dyn Shape,
        child_b: usize,
        xf_b: &Isometry<Real>,
    ) -> bool {
        let proxy_a = shape_a.distance_proxy(child_a);
        let proxy_b = shape_b.distance_proxy(child_b);
        let out = distance(&proxy_a, xf_a, &proxy_b, xf_b);
        out.distance - proxy_a.radius - proxy_b.radius < 10.0 * DEFAULT_EPSILON
    }
}

/// A narrow-phase for balls and convex polygons.
#[derive(Copy, Clone, Debug)]
pub struct DefaultNarrowPhase {
    /// The collision tolerance, used for the reference-face hysteresis of polygon pairs.
    pub linear_slop: Real,
}

impl Default for DefaultNarrowPhase {
    fn default() -> Self {
        Self::new(DEFAULT_LINEAR_SLOP)
    }
}

impl DefaultNarrowPhase {
    /// Creates a narrow-phase with the given collision tolerance.
    pub fn new(linear_slop: Real) -> Self {
        Self { linear_slop }
    }
}

impl NarrowPhase for DefaultNarrowPhase {
    fn supports(&self, type_a: ShapeType, type_b: ShapeType) -> bool {
        matches!(
            (type_a, type_b),
            (ShapeType::Ball, ShapeType::Ball)
                | (ShapeType::ConvexPolygon, ShapeType::Ball)
                | (ShapeType::ConvexPolygon, ShapeType::ConvexPolygon)
        )
    }

    fn evaluate(
        &self,
        shape_a: &dyn Shape,
        _child_a: usize,
        xf_a: &Isometry<Real>,
        shape_b: &dyn Shape,
        _child_b: usize,
        xf_b: &Isometry<Real>,
        manifold: &mut Manifold,
    ) -> Result<(), Unsupported> {
        if let (Some(a), Some(b)) = (shape_a.as_ball(), shape_b.as_ball()) {
            contact_manifold_ball_ball(a, xf_a, b, xf_b, manifold);
        } else if let (Some(a), Some(b)) = (shape_a.as_convex_polygon(), shape_b.as_ball()) {
            contact_manifold_polygon_ball(a, xf_a, b, xf_b, manifold);
        } else if let (Some(a), Some(b)) =
            (shape_a.as_convex_polygon(), shape_b.as_convex_polygon())
        {
            contact_manifold_polygon_polygon(a, xf_a, b, xf_b, self.linear_slop, manifold);
        } else {
            return Err(Unsupported);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{DefaultNarrowPhase, NarrowPhase};
    use crate::math::Isometry;
    use crate::query::{Manifold, Unsupported};
    use crate::shape::{Ball, ConvexPolygon, ShapeType};

    #[test]
    fn supported_pairs() {
        let np = DefaultNarrowPhase::default();
        assert!(np.supports(ShapeType::ConvexPolygon, ShapeType::Ball));
        assert!(!np.supports(ShapeType::Ball, ShapeType::ConvexPolygon));
        assert!(!np.supports(ShapeType::Custom, ShapeType::Ball));
    }

    #[test]
    fn evaluate_and_overlap() {
        let np = DefaultNarrowPhase::default();
        let cube = ConvexPolygon::cuboid(0.5, 0.5);
        let ball = Ball::new(0.5);
        let mut manifold = Manifold::new();

        let close = Isometry::translation(0.0, 0.9);
        assert_eq!(
            np.evaluate(&cube, 0, &Isometry::identity(), &ball, 0, &close, &mut manifold),
            Ok(())
        );
        assert_eq!(manifold.len(), 1);
        assert!(np.test_overlap(&cube, 0, &Isometry::identity(), &ball, 0, &close));

        let far = Isometry::translation(0.0, 1.2);
        assert!(!np.test_overlap(&cube, 0, &Isometry::identity(), &ball, 0, &far));

        assert_eq!(
            np.evaluate(&ball, 0, &Isometry::identity(), &cube, 0, &close, &mut manifold),
            Err(Unsupported)
        );
    }
}
