//! Miscellaneous operations on 2D vectors and scalars.

use crate::math::{Real, Vector, DEFAULT_EPSILON};

/// The 2D cross-product between vectors and scalars.
///
/// - `Vector × Vector` is the scalar `a.x * b.y - a.y * b.x`.
/// - `Real × Vector` is the vector `(-s * v.y, s * v.x)`.
/// - `Vector × Real` is the vector `(s * v.y, -s * v.x)`.
pub trait WCross<Rhs>: Sized {
    /// The result of the cross product.
    type Result;
    /// Computes the cross product of `self` with `rhs`.
    fn gcross(&self, rhs: Rhs) -> Self::Result;
}

impl WCross<Vector<Real>> for Vector<Real> {
    type Result = Real;

    #[inline]
    fn gcross(&self, rhs: Vector<Real>) -> Self::Result {
        self.x * rhs.y - self.y * rhs.x
    }
}

impl WCross<Vector<Real>> for Real {
    type Result = Vector<Real>;

    #[inline]
    fn gcross(&self, rhs: Vector<Real>) -> Self::Result {
        Vector::new(-rhs.y * *self, rhs.x * *self)
    }
}

impl WCross<Real> for Vector<Real> {
    type Result = Vector<Real>;

    #[inline]
    fn gcross(&self, rhs: Real) -> Self::Result {
        Vector::new(rhs * self.y, -rhs * self.x)
    }
}

/// Normalizes `v` in-place and returns its original length.
///
/// If the length is smaller than the default epsilon, `v` is left unchanged and zero is returned.
#[inline]
pub fn normalize(v: &mut Vector<Real>) -> Real {
    let length = v.norm();
    if length < DEFAULT_EPSILON {
        return 0.0;
    }

    *v /= length;
    length
}
