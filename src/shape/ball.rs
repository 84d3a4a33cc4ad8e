use crate::math::{Point, Real};

/// A Ball shape.
///
/// Unlike most shapes, a ball can be offset from the origin of the body it is attached to.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Ball {
    /// The center of the ball, in the local-space of its body.
    pub center: Point<Real>,
    /// The radius of the ball.
    pub radius: Real,
}

impl Ball {
    /// Creates a new ball with the given radius, centered at the origin.
    #[inline]
    pub fn new(radius: Real) -> Ball {
        Ball {
            center: Point::origin(),
            radius,
        }
    }

    /// Creates a new ball with the given radius and center.
    #[inline]
    pub fn with_center(center: Point<Real>, radius: Real) -> Ball {
        Ball { center, radius }
    }
}
