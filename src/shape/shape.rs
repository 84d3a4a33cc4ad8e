use crate::bounding_volume::Aabb;
use crate::mass_properties::MassProperties;
use crate::math::{Isometry, Real};
use crate::query::DistanceProxy;
use crate::shape::{Ball, ConvexPolygon};
use core::fmt::Debug;
use downcast_rs::{impl_downcast, DowncastSync};

/// Enum representing the type of a shape.
///
/// The variants are ordered: when a contact is created between two fixtures, the fixture with
/// the greatest shape type always becomes the first fixture of the contact.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ShapeType {
    /// A ball shape.
    Ball = 0,
    /// A convex polygon.
    ConvexPolygon,
    /// A user-defined shape.
    Custom,
}

/// Trait implemented by shapes usable as fixtures.
pub trait Shape: DowncastSync + Debug {
    /// Gets the type tag of this shape.
    fn shape_type(&self) -> ShapeType;

    /// The number of children this shape is made of.
    ///
    /// Each child gets its own broad-phase proxy.
    fn child_count(&self) -> usize {
        1
    }

    /// Computes the AABB of the given child of this shape with the given position.
    fn compute_aabb(&self, position: &Isometry<Real>, child_index: usize) -> Aabb;

    /// Compute the mass-properties of this shape given its uniform density.
    fn mass_properties(&self, density: Real) -> MassProperties;

    /// The vertices and skin radius of the given child, used by distance and time-of-impact
    /// queries.
    fn distance_proxy(&self, child_index: usize) -> DistanceProxy<'_>;

    /// The skin radius around this shape's core.
    fn radius(&self) -> Real;
}

impl_downcast!(sync Shape);

impl dyn Shape {
    /// Converts this abstract shape to the given shape, if it is one.
    pub fn as_shape<T: Shape>(&self) -> Option<&T> {
        self.downcast_ref()
    }

    /// Converts this abstract shape to a ball, if it is one.
    pub fn as_ball(&self) -> Option<&Ball> {
        self.downcast_ref()
    }

    /// Converts this abstract shape to a convex polygon, if it is one.
    pub fn as_convex_polygon(&self) -> Option<&ConvexPolygon> {
        self.downcast_ref()
    }
}

impl Shape for Ball {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Ball
    }

    fn compute_aabb(&self, position: &Isometry<Real>, _child_index: usize) -> Aabb {
        self.aabb(position)
    }

    fn mass_properties(&self, density: Real) -> MassProperties {
        MassProperties::from_ball(density, self.center, self.radius)
    }

    fn distance_proxy(&self, _child_index: usize) -> DistanceProxy<'_> {
        DistanceProxy::new(core::slice::from_ref(&self.center), self.radius)
    }

    fn radius(&self) -> Real {
        self.radius
    }
}

impl Shape for ConvexPolygon {
    fn shape_type(&self) -> ShapeType {
        ShapeType::ConvexPolygon
    }

    fn compute_aabb(&self, position: &Isometry<Real>, _child_index: usize) -> Aabb {
        self.aabb(position)
    }

    fn mass_properties(&self, density: Real) -> MassProperties {
        MassProperties::from_convex_polygon(density, self.points())
    }

    fn distance_proxy(&self, _child_index: usize) -> DistanceProxy<'_> {
        DistanceProxy::new(self.points(), self.radius())
    }

    fn radius(&self) -> Real {
        ConvexPolygon::radius(self)
    }
}
