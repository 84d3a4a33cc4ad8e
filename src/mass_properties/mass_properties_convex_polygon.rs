use crate::mass_properties::MassProperties;
use crate::math::{Point, Real, Vector};
use crate::utils::WCross;

const INV3: Real = 1.0 / 3.0;

impl MassProperties {
    /// Computes the mass properties of a convex polygon given as a counter-clockwise list of
    /// vertices.
    ///
    /// The polygon is decomposed into a triangle fan around its first vertex, which keeps the
    /// computation accurate for polygons far from the origin.
    pub fn from_convex_polygon(density: Real, vertices: &[Point<Real>]) -> MassProperties {
        if vertices.len() < 3 {
            return MassProperties::zero();
        }

        let reference = vertices[0];
        let mut center = Vector::zeros();
        let mut area = 0.0;
        let mut inertia = 0.0;

        for i in 0..vertices.len() {
            let e1 = vertices[i] - reference;
            let e2 = vertices[(i + 1) % vertices.len()] - reference;
            let d = e1.gcross(e2);
            let triangle_area = 0.5 * d;
            area += triangle_area;
            center += (e1 + e2) * (triangle_area * INV3);

            let intx2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
            let inty2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
            inertia += (0.25 * INV3 * d) * (intx2 + inty2);
        }

        if area <= 0.0 {
            return MassProperties::new(reference, 0.0, 0.0);
        }

        center /= area;
        let mass = density * area;
        // `inertia` is about the reference vertex. Shift it to the center of mass.
        let principal_inertia = density * inertia - mass * center.norm_squared();

        Self::new(reference + center, mass, principal_inertia)
    }
}

/// Computes the area and center-of-mass of a convex polygon.
pub fn convex_polygon_area_and_center_of_mass(
    convex_polygon: &[Point<Real>],
) -> (Real, Point<Real>) {
    let props = MassProperties::from_convex_polygon(1.0, convex_polygon);
    (props.mass, props.local_com)
}

#[cfg(test)]
mod test {
    use crate::mass_properties::MassProperties;
    use crate::math::Point;
    use crate::shape::ConvexPolygon;

    #[test]
    fn box_mass_properties() {
        let poly = ConvexPolygon::cuboid(1.0, 0.5);
        let props = MassProperties::from_convex_polygon(2.0, poly.points());

        // 2x1 box with density 2.
        assert_relative_eq!(props.mass, 4.0, epsilon = 1.0e-5);
        assert_relative_eq!(props.local_com, Point::origin(), epsilon = 1.0e-5);
        assert_relative_eq!(
            props.principal_inertia,
            4.0 * (4.0 + 1.0) / 12.0,
            epsilon = 1.0e-4
        );
    }

    #[test]
    fn offset_box_keeps_inertia_about_its_center() {
        let centered = ConvexPolygon::cuboid(0.5, 0.5);
        let offset = ConvexPolygon::cuboid_with_pose(0.5, 0.5, Point::new(10.0, -4.0), 0.0);
        let a = MassProperties::from_convex_polygon(1.0, centered.points());
        let b = MassProperties::from_convex_polygon(1.0, offset.points());

        assert_relative_eq!(b.local_com, Point::new(10.0, -4.0), epsilon = 1.0e-4);
        assert_relative_eq!(a.principal_inertia, b.principal_inertia, epsilon = 1.0e-3);
    }
}
