use crate::math::{Isometry, Real, DEFAULT_EPSILON};
use crate::query::{ContactId, Manifold, ManifoldPoint, ManifoldType};
use crate::shape::{Ball, ConvexPolygon};

/// Computes the contact manifold between a convex polygon and a ball.
///
/// The manifold is always of type `FaceA` and has at most one point.
pub fn contact_manifold_polygon_ball(
    polygon_a: &ConvexPolygon,
    xf_a: &Isometry<Real>,
    ball_b: &Ball,
    xf_b: &Isometry<Real>,
    manifold: &mut Manifold,
) {
    manifold.points.clear();

    // Ball center in the polygon frame.
    let c_local = xf_a.inverse_transform_point(&(xf_b * ball_b.center));

    let radius = polygon_a.radius() + ball_b.radius;
    let points = polygon_a.points();
    let normals = polygon_a.normals();

    let mut normal_index = 0;
    let mut separation = -Real::MAX;

    for (i, (pt, n)) in points.iter().zip(normals.iter()).enumerate() {
        let s = n.dot(&(c_local - pt));

        if s > radius {
            // Early out.
            return;
        }

        if s > separation {
            separation = s;
            normal_index = i;
        }
    }

    let v1 = points[normal_index];
    let v2 = points[(normal_index + 1) % points.len()];
    let point = ManifoldPoint::new(ball_b.center, ContactId::default());

    if separation < DEFAULT_EPSILON {
        // The center is inside the polygon.
        manifold.kind = ManifoldType::FaceA;
        manifold.local_normal = normals[normal_index];
        manifold.local_point = na::center(&v1, &v2);
        manifold.points.push(point);
        return;
    }

    // Voronoi regions of the reference edge.
    let u1 = (c_local - v1).dot(&(v2 - v1));
    let u2 = (c_local - v2).dot(&(v1 - v2));

    if u1 <= 0.0 {
        if na::distance_squared(&c_local, &v1) > radius * radius {
            return;
        }

        manifold.local_normal = (c_local - v1).normalize();
        manifold.local_point = v1;
    } else if u2 <= 0.0 {
        if na::distance_squared(&c_local, &v2) > radius * radius {
            return;
        }

        manifold.local_normal = (c_local - v2).normalize();
        manifold.local_point = v2;
    } else {
        let face_center = na::center(&v1, &v2);
        let s = (c_local - face_center).dot(&normals[normal_index]);
        if s > radius {
            return;
        }

        manifold.local_normal = normals[normal_index];
        manifold.local_point = face_center;
    }

    manifold.kind = ManifoldType::FaceA;
    manifold.points.push(point);
}

#[cfg(test)]
mod test {
    use super::contact_manifold_polygon_ball;
    use crate::math::{Isometry, Point, Vector};
    use crate::query::{Manifold, ManifoldType, WorldManifold};
    use crate::shape::{Ball, ConvexPolygon};

    #[test]
    fn ball_on_face() {
        let poly = ConvexPolygon::cuboid(1.0, 1.0);
        let ball = Ball::new(0.5);
        let xf_b = Isometry::translation(0.2, 1.4);
        let mut manifold = Manifold::new();
        contact_manifold_polygon_ball(&poly, &Isometry::identity(), &ball, &xf_b, &mut manifold);

        assert_eq!(manifold.len(), 1);
        assert_eq!(manifold.kind, ManifoldType::FaceA);
        assert_relative_eq!(manifold.local_normal, Vector::y());
        assert_relative_eq!(manifold.local_point, Point::new(0.0, 1.0));

        let world = WorldManifold::new(
            &manifold,
            &Isometry::identity(),
            poly.radius(),
            &xf_b,
            ball.radius,
        );
        assert_relative_eq!(world.separations[0], -0.1 - poly.radius(), epsilon = 1.0e-5);
    }

    #[test]
    fn ball_near_vertex() {
        let poly = ConvexPolygon::cuboid(1.0, 1.0);
        let ball = Ball::new(0.5);
        let mut manifold = Manifold::new();

        let close = Isometry::translation(1.3, 1.3);
        contact_manifold_polygon_ball(&poly, &Isometry::identity(), &ball, &close, &mut manifold);
        assert_eq!(manifold.len(), 1);
        assert_relative_eq!(manifold.local_point, Point::new(1.0, 1.0));
        assert_relative_eq!(
            manifold.local_normal,
            Vector::new(1.0, 1.0).normalize(),
            epsilon = 1.0e-5
        );

        let far = Isometry::translation(1.45, 1.45);
        contact_manifold_polygon_ball(&poly, &Isometry::identity(), &ball, &far, &mut manifold);
        assert!(manifold.is_empty());
    }
}
