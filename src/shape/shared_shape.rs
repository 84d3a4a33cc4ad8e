use crate::math::{Point, Real};
use crate::shape::{Ball, ConvexPolygon, Shape};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Deref;

/// A reference-counted, shareable geometric shape.
///
/// `SharedShape` is a wrapper around [`Arc<dyn Shape>`] that lets many fixtures share the same
/// geometry. Cloning a `SharedShape` only increments a reference count.
///
/// # Example
///
/// ```
/// use impulse2d::shape::SharedShape;
///
/// let shape = SharedShape::ball(1.0);
/// let shape_clone = shape.clone();
///
/// assert_eq!(shape.as_ball().unwrap().radius, 1.0);
/// assert_eq!(shape_clone.as_ball().unwrap().radius, 1.0);
/// ```
#[derive(Clone)]
pub struct SharedShape(pub Arc<dyn Shape>);

impl Deref for SharedShape {
    type Target = dyn Shape;
    fn deref(&self) -> &dyn Shape {
        &*self.0
    }
}

impl AsRef<dyn Shape> for SharedShape {
    fn as_ref(&self) -> &dyn Shape {
        &*self.0
    }
}

impl fmt::Debug for SharedShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let shape: &dyn Shape = &*self.0;
        write!(f, "SharedShape ( Arc<{:?}> )", shape.shape_type())
    }
}

impl SharedShape {
    /// Wraps the given shape as a shared shape.
    pub fn new(shape: impl Shape) -> Self {
        Self(Arc::new(shape))
    }

    /// Initialize a ball shape defined by its radius.
    pub fn ball(radius: Real) -> Self {
        SharedShape(Arc::new(Ball::new(radius)))
    }

    /// Initialize a cuboid shape defined by its half-extents.
    pub fn cuboid(hx: Real, hy: Real) -> Self {
        SharedShape(Arc::new(ConvexPolygon::cuboid(hx, hy)))
    }

    /// Initialize a cuboid shape defined by its half-extents, offset and rotated relative to the
    /// body origin.
    pub fn cuboid_with_pose(hx: Real, hy: Real, center: Point<Real>, angle: Real) -> Self {
        SharedShape(Arc::new(ConvexPolygon::cuboid_with_pose(
            hx, hy, center, angle,
        )))
    }

    /// Creates a new shared shape that is the convex-hull of the given points.
    pub fn convex_hull(points: &[Point<Real>]) -> Option<Self> {
        ConvexPolygon::from_convex_hull(points).map(|ch| SharedShape(Arc::new(ch)))
    }

    /// Creates a new shared shape that is a 2D convex polygon from a set of points assumed to
    /// describe a counter-clockwise convex polyline.
    pub fn convex_polyline(points: Vec<Point<Real>>) -> Option<Self> {
        ConvexPolygon::from_convex_polyline(points).map(|ch| SharedShape(Arc::new(ch)))
    }
}
