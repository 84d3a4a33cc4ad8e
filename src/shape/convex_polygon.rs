use crate::math::{Isometry, Point, Real, Vector, DEFAULT_EPSILON};
use crate::utils::{self, WCross, DEFAULT_LINEAR_SLOP};
use arrayvec::ArrayVec;

/// The maximum number of vertices of a convex polygon.
pub const MAX_POLYGON_VERTICES: usize = 8;

/// The default skin radius of polygons, twice the default linear slop.
///
/// The skin keeps polygons slightly apart so that contact manifolds are generated
/// before the cores actually touch.
pub const DEFAULT_POLYGON_RADIUS: Real = 2.0 * DEFAULT_LINEAR_SLOP;

/// A 2D convex polygon.
///
/// Vertices are stored in counter-clockwise order and each edge `i` (from vertex `i` to vertex
/// `i + 1`) has an outward unit normal `normals[i]`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct ConvexPolygon {
    points: ArrayVec<Point<Real>, MAX_POLYGON_VERTICES>,
    normals: ArrayVec<Vector<Real>, MAX_POLYGON_VERTICES>,
    centroid: Point<Real>,
    radius: Real,
}

impl ConvexPolygon {
    /// Creates an axis-aligned box centered at the origin, with the given half-extents.
    pub fn cuboid(hx: Real, hy: Real) -> Self {
        let points = [
            Point::new(-hx, -hy),
            Point::new(hx, -hy),
            Point::new(hx, hy),
            Point::new(-hx, hy),
        ];
        let normals = [
            Vector::new(0.0, -1.0),
            Vector::new(1.0, 0.0),
            Vector::new(0.0, 1.0),
            Vector::new(-1.0, 0.0),
        ];

        ConvexPolygon {
            points: points.into_iter().collect(),
            normals: normals.into_iter().collect(),
            centroid: Point::origin(),
            radius: DEFAULT_POLYGON_RADIUS,
        }
    }

    /// Creates a box with the given half-extents, centered at `center` and rotated by `angle`
    /// relative to the body origin.
    pub fn cuboid_with_pose(hx: Real, hy: Real, center: Point<Real>, angle: Real) -> Self {
        let pose = Isometry::new(center.coords, angle);
        let mut result = Self::cuboid(hx, hy);
        result.points.iter_mut().for_each(|pt| *pt = pose * *pt);
        result
            .normals
            .iter_mut()
            .for_each(|n| *n = pose.rotation * *n);
        result.centroid = center;
        result
    }

    /// Creates a new 2D convex polygon from an arbitrary set of points.
    ///
    /// The convex hull of the points is computed with gift wrapping, after welding points closer
    /// than half the linear slop. Returns `None` if the hull is degenerate or if there are more
    /// than [`MAX_POLYGON_VERTICES`] input points.
    pub fn from_convex_hull(points: &[Point<Real>]) -> Option<Self> {
        if points.len() < 3 || points.len() > MAX_POLYGON_VERTICES {
            return None;
        }

        let weld_dist = 0.5 * DEFAULT_LINEAR_SLOP;
        let mut welded = ArrayVec::<Point<Real>, MAX_POLYGON_VERTICES>::new();
        for pt in points {
            if welded
                .iter()
                .all(|w| na::distance_squared(w, pt) >= weld_dist * weld_dist)
            {
                welded.push(*pt);
            }
        }

        if welded.len() < 3 {
            return None;
        }

        // Start from the right-most point, with the lowest y on ties.
        let mut i0 = 0;
        for (i, pt) in welded.iter().enumerate().skip(1) {
            let best = welded[i0];
            if pt.x > best.x || (pt.x == best.x && pt.y < best.y) {
                i0 = i;
            }
        }

        let mut hull = ArrayVec::<usize, MAX_POLYGON_VERTICES>::new();
        let mut ih = i0;

        loop {
            if hull.is_full() {
                return None;
            }
            hull.push(ih);

            let mut ie = 0;
            for j in 1..welded.len() {
                if ie == ih {
                    ie = j;
                    continue;
                }

                let r = welded[ie] - welded[ih];
                let v = welded[j] - welded[ih];
                let c = r.gcross(v);
                if c < 0.0 || (c == 0.0 && v.norm_squared() > r.norm_squared()) {
                    ie = j;
                }
            }

            ih = ie;
            if ie == i0 {
                break;
            }
        }

        if hull.len() < 3 {
            return None;
        }

        Self::from_convex_polyline(hull.iter().map(|i| welded[*i]).collect())
    }

    /// Creates a new 2D convex polygon from a set of points assumed to describe a
    /// counter-clockwise convex polyline.
    ///
    /// Vertices on collinear edges are removed. Returns `None` if the polyline has fewer than
    /// three non-collinear vertices, more than [`MAX_POLYGON_VERTICES`] vertices, or degenerate
    /// edges.
    pub fn from_convex_polyline(mut points: Vec<Point<Real>>) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }

        let eps = DEFAULT_EPSILON.sqrt();
        let mut normals = Vec::with_capacity(points.len());

        for i1 in 0..points.len() {
            let i2 = (i1 + 1) % points.len();
            normals.push(utils::ccw_face_normal([&points[i1], &points[i2]])?);
        }

        let mut nremoved = 0;
        if normals[0].dot(&normals[normals.len() - 1]) > 1.0 - eps {
            nremoved = 1;
        }

        for i2 in 1..points.len() {
            let i1 = i2 - 1;
            if normals[i1].dot(&normals[i2]) > 1.0 - eps {
                nremoved += 1;
            } else {
                points[i2 - nremoved] = points[i2];
                normals[i2 - nremoved] = normals[i2];
            }
        }

        let new_length = points.len() - nremoved;
        points.truncate(new_length);
        normals.truncate(new_length);

        if points.len() < 3 || points.len() > MAX_POLYGON_VERTICES {
            return None;
        }

        // Every vertex must be on the inner side of every edge.
        for (i, n) in normals.iter().enumerate() {
            if points
                .iter()
                .any(|pt| n.dot(&(pt - points[i])) > DEFAULT_EPSILON.sqrt())
            {
                return None;
            }
        }

        let centroid = Self::compute_centroid(&points)?;

        Some(ConvexPolygon {
            points: points.into_iter().collect(),
            normals: normals.into_iter().collect(),
            centroid,
            radius: DEFAULT_POLYGON_RADIUS,
        })
    }

    fn compute_centroid(points: &[Point<Real>]) -> Option<Point<Real>> {
        let mut center = Vector::zeros();
        let mut area = 0.0;
        let reference = points[0];

        for i in 1..points.len() - 1 {
            let e1 = points[i] - reference;
            let e2 = points[i + 1] - reference;
            let triangle_area = 0.5 * e1.gcross(e2);
            area += triangle_area;
            center += (e1 + e2) * (triangle_area / 3.0);
        }

        if area <= DEFAULT_EPSILON {
            return None;
        }

        Some(reference + center / area)
    }

    /// Sets the skin radius of this polygon.
    pub fn with_radius(mut self, radius: Real) -> Self {
        self.radius = radius;
        self
    }

    /// The vertices of this convex polygon.
    #[inline]
    pub fn points(&self) -> &[Point<Real>] {
        &self.points
    }

    /// The outward normals of the edges of this convex polygon.
    #[inline]
    pub fn normals(&self) -> &[Vector<Real>] {
        &self.normals
    }

    /// The centroid of this convex polygon.
    #[inline]
    pub fn centroid(&self) -> Point<Real> {
        self.centroid
    }

    /// The skin radius of this convex polygon.
    #[inline]
    pub fn radius(&self) -> Real {
        self.radius
    }
}

#[cfg(test)]
mod test {
    use super::ConvexPolygon;
    use crate::math::{Point, Vector};

    #[test]
    fn convex_hull_drops_interior_points() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(1.0, 0.5),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ];
        let poly = ConvexPolygon::from_convex_hull(&points).unwrap();
        assert_eq!(poly.points().len(), 4);
        assert_relative_eq!(poly.centroid(), Point::new(1.0, 1.0), epsilon = 1.0e-5);

        for (i, n) in poly.normals().iter().enumerate() {
            for pt in poly.points() {
                assert!(n.dot(&(pt - poly.points()[i])) <= 1.0e-5);
            }
        }
    }

    #[test]
    fn degenerate_hulls_are_rejected() {
        let collinear = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        assert!(ConvexPolygon::from_convex_hull(&collinear).is_none());

        let welded = [
            Point::new(0.0, 0.0),
            Point::new(0.0001, 0.0),
            Point::new(0.0, 0.0001),
        ];
        assert!(ConvexPolygon::from_convex_hull(&welded).is_none());
    }

    #[test]
    fn posed_cuboid_normals_follow_the_rotation() {
        let poly = ConvexPolygon::cuboid_with_pose(
            1.0,
            0.5,
            Point::new(1.0, 2.0),
            core::f32::consts::FRAC_PI_2 as crate::math::Real,
        );
        assert_relative_eq!(poly.normals()[1], Vector::new(0.0, 1.0), epsilon = 1.0e-5);
        assert_relative_eq!(poly.centroid(), Point::new(1.0, 2.0));
    }
}
