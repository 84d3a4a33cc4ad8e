use crate::math::{Isometry, Point, Real, Vector};
use crate::shape::MAX_POLYGON_VERTICES;
use crate::utils::WCross;
use arrayvec::ArrayVec;

/// The core of a convex shape as seen by distance queries: a point, a segment, or a convex
/// polygon, inflated by a skin radius.
#[derive(Copy, Clone, Debug)]
pub struct DistanceProxy<'a> {
    /// The counter-clockwise vertices of the core.
    pub vertices: &'a [Point<Real>],
    /// The skin radius around the core.
    pub radius: Real,
}

impl<'a> DistanceProxy<'a> {
    /// Creates a new distance proxy.
    pub fn new(vertices: &'a [Point<Real>], radius: Real) -> Self {
        Self { vertices, radius }
    }

    /// The greatest distance between `center` and a vertex of this proxy.
    pub fn max_distance_to(&self, center: &Point<Real>) -> Real {
        self.vertices
            .iter()
            .map(|v| na::distance(v, center))
            .fold(0.0, Real::max)
    }
}

/// The result of a [`distance`] query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceOutput {
    /// The closest point on the core of the first proxy.
    pub point_a: Point<Real>,
    /// The closest point on the core of the second proxy.
    pub point_b: Point<Real>,
    /// The distance between both cores, ignoring the skin radii.
    ///
    /// This is zero when the cores overlap.
    pub distance: Real,
}

type WorldVertices = ArrayVec<Point<Real>, MAX_POLYGON_VERTICES>;

fn world_vertices(proxy: &DistanceProxy, pos: &Isometry<Real>) -> WorldVertices {
    proxy
        .vertices
        .iter()
        .take(MAX_POLYGON_VERTICES)
        .map(|v| pos * v)
        .collect()
}

fn edges(vertices: &[Point<Real>]) -> impl Iterator<Item = (Point<Real>, Point<Real>)> + '_ {
    let n = match vertices.len() {
        0 | 1 => 0,
        2 => 1,
        len => len,
    };
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % vertices.len()]))
}

/// Is every vertex of `b` strictly outside one of the edges of the polygon `a`?
fn has_separating_edge(a: &[Point<Real>], b: &[Point<Real>]) -> bool {
    if a.len() < 3 {
        return false;
    }

    edges(a).any(|(v1, v2)| {
        let normal = (v2 - v1).gcross(1.0);
        b.iter().all(|p| normal.dot(&(p - v1)) > 0.0)
    })
}

fn closest_point_on_segment(a: &Point<Real>, b: &Point<Real>, p: &Point<Real>) -> Point<Real> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return *a;
    }

    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

fn closest_point_on_shape(vertices: &[Point<Real>], p: &Point<Real>) -> Point<Real> {
    if vertices.len() == 1 {
        return vertices[0];
    }

    let mut best = vertices[0];
    let mut best_dist = Real::MAX;
    for (v1, v2) in edges(vertices) {
        let candidate = closest_point_on_segment(&v1, &v2, p);
        let dist = na::distance_squared(&candidate, p);
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
    }

    best
}

/// Computes the distance between the cores of two proxies at the given poses.
///
/// The cores are treated as solid: if one core overlaps the other (checked with a separating
/// axis test over the polygon edges), the distance is zero. Otherwise the distance is the
/// smallest vertex-to-edge distance between both cores.
pub fn distance(
    proxy_a: &DistanceProxy,
    pos_a: &Isometry<Real>,
    proxy_b: &DistanceProxy,
    pos_b: &Isometry<Real>,
) -> DistanceOutput {
    let verts_a = world_vertices(proxy_a, pos_a);
    let verts_b = world_vertices(proxy_b, pos_b);

    if verts_a.is_empty() || verts_b.is_empty() {
        return DistanceOutput {
            point_a: pos_a.translation.vector.into(),
            point_b: pos_b.translation.vector.into(),
            distance: 0.0,
        };
    }

    let overlapping = match (verts_a.len() >= 3, verts_b.len() >= 3) {
        (true, true) => {
            !has_separating_edge(&verts_a, &verts_b) && !has_separating_edge(&verts_b, &verts_a)
        }
        (true, false) => verts_b.iter().any(|p| contains_point(&verts_a, p)),
        (false, true) => verts_a.iter().any(|p| contains_point(&verts_b, p)),
        (false, false) => false,
    };

    if overlapping {
        return DistanceOutput {
            point_a: verts_a[0],
            point_b: verts_a[0],
            distance: 0.0,
        };
    }

    let mut result = DistanceOutput {
        point_a: verts_a[0],
        point_b: verts_b[0],
        distance: Real::MAX,
    };

    for p in &verts_a {
        let q = closest_point_on_shape(&verts_b, p);
        let d = na::distance(p, &q);
        if d < result.distance {
            result = DistanceOutput {
                point_a: *p,
                point_b: q,
                distance: d,
            };
        }
    }

    for q in &verts_b {
        let p = closest_point_on_shape(&verts_a, q);
        let d = na::distance(&p, q);
        if d < result.distance {
            result = DistanceOutput {
                point_a: p,
                point_b: *q,
                distance: d,
            };
        }
    }

    result
}

fn contains_point(polygon: &[Point<Real>], p: &Point<Real>) -> bool {
    edges(polygon).all(|(v1, v2)| {
        let normal: Vector<Real> = (v2 - v1).gcross(1.0);
        normal.dot(&(p - v1)) <= 0.0
    })
}

#[cfg(test)]
mod test {
    use super::{distance, DistanceProxy};
    use crate::math::{Isometry, Point};
    use crate::shape::{Ball, ConvexPolygon, Shape};

    #[test]
    fn distance_between_boxes() {
        let cube = ConvexPolygon::cuboid(0.5, 0.5);
        let proxy = cube.distance_proxy(0);
        let out = distance(
            &proxy,
            &Isometry::identity(),
            &proxy,
            &Isometry::translation(3.0, 0.25),
        );
        assert_relative_eq!(out.distance, 2.0, epsilon = 1.0e-5);
        assert_relative_eq!(out.point_b.x - out.point_a.x, 2.0, epsilon = 1.0e-5);
    }

    #[test]
    fn overlapping_boxes_have_zero_distance() {
        let cube = ConvexPolygon::cuboid(0.5, 0.5);
        let proxy = cube.distance_proxy(0);
        let out = distance(
            &proxy,
            &Isometry::identity(),
            &proxy,
            &Isometry::new(na::Vector2::new(0.3, 0.2), 0.5),
        );
        assert_eq!(out.distance, 0.0);
    }

    #[test]
    fn point_inside_and_outside_polygon() {
        let cube = ConvexPolygon::cuboid(1.0, 1.0);
        let ball = Ball::new(0.25);
        let inside = distance(
            &cube.distance_proxy(0),
            &Isometry::identity(),
            &ball.distance_proxy(0),
            &Isometry::translation(0.5, 0.0),
        );
        assert_eq!(inside.distance, 0.0);

        let outside = distance(
            &cube.distance_proxy(0),
            &Isometry::identity(),
            &ball.distance_proxy(0),
            &Isometry::translation(0.0, 3.0),
        );
        assert_relative_eq!(outside.distance, 2.0, epsilon = 1.0e-5);
        assert_relative_eq!(outside.point_a, Point::new(0.0, 1.0), epsilon = 1.0e-5);
    }

    #[test]
    fn point_to_point() {
        let pt = [Point::origin()];
        let proxy = DistanceProxy::new(&pt, 0.5);
        let out = distance(
            &proxy,
            &Isometry::translation(1.0, 0.0),
            &proxy,
            &Isometry::translation(4.0, 4.0),
        );
        assert_relative_eq!(out.distance, 5.0, epsilon = 1.0e-5);
    }
}
