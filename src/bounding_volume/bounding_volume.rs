//! Trait of bounding volumes.

use crate::math::{Point, Real};

/// A conservative enclosure of a shape, cheap to overlap-test.
///
/// The broad-phase stores fattened bounding volumes and only re-inserts a proxy once its tight
/// volume escapes the fat one.
pub trait BoundingVolume: Sized {
    /// The center of this volume.
    fn center(&self) -> Point<Real>;

    /// Whether `self` and `other` overlap, touching boundaries included.
    fn intersects(&self, other: &Self) -> bool;

    /// Whether `other` lies entirely inside `self`.
    fn contains(&self, other: &Self) -> bool;

    /// The smallest volume enclosing both `self` and `other`.
    fn merged(&self, other: &Self) -> Self;

    /// A copy of `self` grown by `margin` in every direction.
    ///
    /// `margin` must be non-negative.
    fn loosened(&self, margin: Real) -> Self;
}
