use crate::math::{Isometry, Real};
use crate::query::details::{clip_segment_to_line, ClipVertex};
use crate::query::{ContactFeatureType, ContactId, Manifold, ManifoldPoint, ManifoldType};
use crate::shape::ConvexPolygon;
use crate::utils::WCross;

/// Finds the edge normal of `poly1` with the greatest separation from `poly2`.
fn find_max_separation(
    poly1: &ConvexPolygon,
    xf1: &Isometry<Real>,
    poly2: &ConvexPolygon,
    xf2: &Isometry<Real>,
) -> (usize, Real) {
    // Work in the frame of `poly2`.
    let xf = xf2.inv_mul(xf1);

    let mut best_index = 0;
    let mut max_separation = -Real::MAX;

    for (i, (n1, v1)) in poly1.normals().iter().zip(poly1.points()).enumerate() {
        let n = xf.rotation * n1;
        let v1 = xf * v1;

        let si = poly2
            .points()
            .iter()
            .map(|v2| n.dot(&(v2 - v1)))
            .fold(Real::MAX, Real::min);

        if si > max_separation {
            max_separation = si;
            best_index = i;
        }
    }

    (best_index, max_separation)
}

/// Finds the edge of `poly2` most anti-parallel to the reference edge `edge1` of `poly1`.
fn find_incident_edge(
    poly1: &ConvexPolygon,
    xf1: &Isometry<Real>,
    edge1: usize,
    poly2: &ConvexPolygon,
    xf2: &Isometry<Real>,
) -> [ClipVertex; 2] {
    // Reference edge normal in the frame of `poly2`.
    let normal1 = xf2.rotation.inverse() * (xf1.rotation * poly1.normals()[edge1]);

    let normals2 = poly2.normals();
    let mut index = 0;
    let mut min_dot = Real::MAX;
    for (i, n2) in normals2.iter().enumerate() {
        let dot = normal1.dot(n2);
        if dot < min_dot {
            min_dot = dot;
            index = i;
        }
    }

    let i1 = index;
    let i2 = (index + 1) % normals2.len();
    let vertex = |i: usize| ClipVertex {
        point: xf2 * poly2.points()[i],
        id: ContactId {
            index_a: edge1 as u8,
            index_b: i as u8,
            type_a: ContactFeatureType::Face,
            type_b: ContactFeatureType::Vertex,
        },
    };

    [vertex(i1), vertex(i2)]
}

/// Computes the contact manifold between two convex polygons.
///
/// The reference face is the edge with the greatest separation, with a preference for the first
/// polygon unless the second one separates better by more than `0.1 * linear_slop`. This keeps
/// the reference face stable from one frame to the next.
pub fn contact_manifold_polygon_polygon(
    poly_a: &ConvexPolygon,
    xf_a: &Isometry<Real>,
    poly_b: &ConvexPolygon,
    xf_b: &Isometry<Real>,
    linear_slop: Real,
    manifold: &mut Manifold,
) {
    manifold.points.clear();
    let total_radius = poly_a.radius() + poly_b.radius();

    let (edge_a, separation_a) = find_max_separation(poly_a, xf_a, poly_b, xf_b);
    if separation_a > total_radius {
        return;
    }

    let (edge_b, separation_b) = find_max_separation(poly_b, xf_b, poly_a, xf_a);
    if separation_b > total_radius {
        return;
    }

    let tol = 0.1 * linear_slop;
    let (poly1, xf1, poly2, xf2, edge1, flip) = if separation_b > separation_a + tol {
        manifold.kind = ManifoldType::FaceB;
        (poly_b, xf_b, poly_a, xf_a, edge_b, true)
    } else {
        manifold.kind = ManifoldType::FaceA;
        (poly_a, xf_a, poly_b, xf_b, edge_a, false)
    };

    let incident_edge = find_incident_edge(poly1, xf1, edge1, poly2, xf2);

    let vertices1 = poly1.points();
    let iv1 = edge1;
    let iv2 = (edge1 + 1) % vertices1.len();

    let v11 = vertices1[iv1];
    let v12 = vertices1[iv2];

    let local_tangent = (v12 - v11).normalize();
    let local_normal = local_tangent.gcross(1.0);
    let plane_point = na::center(&v11, &v12);

    let tangent = xf1.rotation * local_tangent;
    let normal = tangent.gcross(1.0);

    let v11 = xf1 * v11;
    let v12 = xf1 * v12;

    // Face offset.
    let front_offset = normal.dot(&v11.coords);

    // Side offsets, extended by the polytope skin thickness.
    let side_offset1 = -tangent.dot(&v11.coords) + total_radius;
    let side_offset2 = tangent.dot(&v12.coords) + total_radius;

    // Clip the incident edge against the extruded edge1 side edges.
    let mut clip_points1 = incident_edge;
    if clip_segment_to_line(
        &mut clip_points1,
        &incident_edge,
        &-tangent,
        side_offset1,
        iv1,
    ) < 2
    {
        return;
    }

    let mut clip_points2 = clip_points1;
    if clip_segment_to_line(&mut clip_points2, &clip_points1, &tangent, side_offset2, iv2) < 2 {
        return;
    }

    manifold.local_normal = local_normal;
    manifold.local_point = plane_point;

    for clip_point in &clip_points2 {
        let separation = normal.dot(&clip_point.point.coords) - front_offset;

        if separation <= total_radius {
            let id = if flip {
                clip_point.id.flipped()
            } else {
                clip_point.id
            };
            manifold.points.push(ManifoldPoint::new(
                xf2.inverse_transform_point(&clip_point.point),
                id,
            ));
        }
    }
}

#[cfg(test)]
mod test {
    use super::contact_manifold_polygon_polygon;
    use crate::math::{Isometry, Vector};
    use crate::query::{Manifold, ManifoldType, WorldManifold};
    use crate::shape::ConvexPolygon;
    use crate::utils::DEFAULT_LINEAR_SLOP;

    #[test]
    fn resting_box_has_two_points() {
        let ground = ConvexPolygon::cuboid(10.0, 0.5);
        let cube = ConvexPolygon::cuboid(0.5, 0.5);
        let xf_cube = Isometry::translation(0.0, 0.99);
        let mut manifold = Manifold::new();

        contact_manifold_polygon_polygon(
            &ground,
            &Isometry::identity(),
            &cube,
            &xf_cube,
            DEFAULT_LINEAR_SLOP,
            &mut manifold,
        );

        assert_eq!(manifold.len(), 2);
        assert_eq!(manifold.kind, ManifoldType::FaceA);
        assert_ne!(manifold.points[0].id.key(), manifold.points[1].id.key());

        let world = WorldManifold::new(
            &manifold,
            &Isometry::identity(),
            ground.radius(),
            &xf_cube,
            cube.radius(),
        );
        assert_relative_eq!(world.normal, Vector::y(), epsilon = 1.0e-5);
        for sep in &world.separations {
            assert_relative_eq!(
                *sep,
                -0.01 - ground.radius() - cube.radius(),
                epsilon = 1.0e-4
            );
        }
    }

    #[test]
    fn ties_keep_the_first_polygon_as_reference() {
        let cube = ConvexPolygon::cuboid(0.5, 0.5);
        let ground = ConvexPolygon::cuboid(10.0, 0.5);
        let xf_ground = Isometry::translation(0.0, -0.99);
        let mut manifold = Manifold::new();

        contact_manifold_polygon_polygon(
            &cube,
            &Isometry::identity(),
            &ground,
            &xf_ground,
            DEFAULT_LINEAR_SLOP,
            &mut manifold,
        );

        assert_eq!(manifold.len(), 2);
        let world = WorldManifold::new(
            &manifold,
            &Isometry::identity(),
            cube.radius(),
            &xf_ground,
            ground.radius(),
        );
        assert_relative_eq!(world.normal, -Vector::y(), epsilon = 1.0e-5);
    }

    #[test]
    fn separated_boxes() {
        let cube = ConvexPolygon::cuboid(0.5, 0.5);
        let mut manifold = Manifold::new();
        contact_manifold_polygon_polygon(
            &cube,
            &Isometry::identity(),
            &cube,
            &Isometry::translation(1.1, 0.0),
            DEFAULT_LINEAR_SLOP,
            &mut manifold,
        );
        assert!(manifold.is_empty());
    }
}
