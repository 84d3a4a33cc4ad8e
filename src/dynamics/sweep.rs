use crate::math::{Isometry, Point, Real, Rotation, Translation};
use na::RealField;

/// The motion of a body's center of mass over one time step.
///
/// Shapes are attached to the body origin, which may differ from the center of mass. The sweep
/// interpolates in center-of-mass space and converts back to a body-origin transform.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Sweep {
    /// The center of mass in the body local-space.
    pub local_center: Point<Real>,
    /// The world-space center of mass at time `alpha0`.
    pub c0: Point<Real>,
    /// The world-space center of mass at the end of the step.
    pub c: Point<Real>,
    /// The world angle at time `alpha0`.
    pub a0: Real,
    /// The world angle at the end of the step.
    pub a: Real,
    /// The fraction of the current time step in `[0, 1]` where `c0` and `a0` are.
    pub alpha0: Real,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            local_center: Point::origin(),
            c0: Point::origin(),
            c: Point::origin(),
            a0: 0.0,
            a: 0.0,
            alpha0: 0.0,
        }
    }
}

impl Sweep {
    /// A sweep at rest, matching the given body transform and local center of mass.
    pub fn at_rest(position: &Isometry<Real>, local_center: Point<Real>) -> Self {
        let c = position * local_center;
        let a = position.rotation.angle();
        Self {
            local_center,
            c0: c,
            c,
            a0: a,
            a,
            alpha0: 0.0,
        }
    }

    /// The interpolated body-origin transform at `beta ∈ [0, 1]`, where zero maps to `alpha0`.
    pub fn transform(&self, beta: Real) -> Isometry<Real> {
        let c = self.c0 * (1.0 - beta) + self.c.coords * beta;
        let a = (1.0 - beta) * self.a0 + beta * self.a;
        transform_from_center(c, a, self.local_center)
    }

    /// The body-origin transform at the end of the step.
    pub fn final_transform(&self) -> Isometry<Real> {
        transform_from_center(self.c, self.a, self.local_center)
    }

    /// Advances the start of the sweep forward to the normalized time `alpha`.
    ///
    /// The end of the sweep is unchanged.
    pub fn advance(&mut self, alpha: Real) {
        debug_assert!(self.alpha0 < 1.0);
        let beta = (alpha - self.alpha0) / (1.0 - self.alpha0);
        self.c0 += (self.c - self.c0) * beta;
        self.a0 += beta * (self.a - self.a0);
        self.alpha0 = alpha;
    }

    /// Wraps `a0` into `[0, 2π)` and shifts `a` by the same amount.
    pub fn normalize(&mut self) {
        let two_pi = Real::two_pi();
        let d = two_pi * (self.a0 / two_pi).floor();
        self.a0 -= d;
        self.a -= d;
    }
}

/// The body-origin transform of a body with the given center-of-mass pose.
pub(crate) fn transform_from_center(
    c: Point<Real>,
    a: Real,
    local_center: Point<Real>,
) -> Isometry<Real> {
    let rotation = Rotation::new(a);
    let origin = c - rotation * local_center.coords;
    Isometry::from_parts(Translation::from(origin.coords), rotation)
}

#[cfg(test)]
mod test {
    use super::Sweep;
    use crate::math::{Point, Real, Vector};
    use na::RealField;

    fn sweep() -> Sweep {
        Sweep {
            local_center: Point::new(1.0, 0.0),
            c0: Point::new(0.0, 0.0),
            c: Point::new(4.0, 2.0),
            a0: 0.0,
            a: 1.0,
            alpha0: 0.0,
        }
    }

    #[test]
    fn transform_interpolates_the_center_of_mass() {
        let s = sweep();
        let xf = s.transform(0.5);
        let com = xf * s.local_center;
        assert_relative_eq!(com, Point::new(2.0, 1.0), epsilon = 1.0e-5);
        assert_relative_eq!(xf.rotation.angle(), 0.5, epsilon = 1.0e-5);

        let end = s.transform(1.0);
        assert_relative_eq!(end, s.final_transform(), epsilon = 1.0e-5);
    }

    #[test]
    fn advance_keeps_the_end_pose() {
        let mut s = sweep();
        s.advance(0.25);
        assert_relative_eq!(s.alpha0, 0.25);
        assert_relative_eq!(s.c0, Point::new(1.0, 0.5), epsilon = 1.0e-5);
        assert_relative_eq!(s.a0, 0.25, epsilon = 1.0e-5);

        s.advance(0.625);
        assert_relative_eq!(s.c0, Point::new(2.5, 1.25), epsilon = 1.0e-5);
        assert_relative_eq!(s.c, Point::new(4.0, 2.0));
        assert_relative_eq!(s.c0 - Point::origin(), Vector::new(2.5, 1.25), epsilon = 1.0e-5);
    }

    #[test]
    fn normalize_wraps_both_angles() {
        let mut s = sweep();
        s.a0 = 7.0;
        s.a = 7.5;
        s.normalize();
        let two_pi = Real::two_pi();
        assert_relative_eq!(s.a0, 7.0 - two_pi, epsilon = 1.0e-5);
        assert_relative_eq!(s.a, 7.5 - two_pi, epsilon = 1.0e-5);

        s.a0 = -1.0;
        s.a = -0.5;
        s.normalize();
        assert_relative_eq!(s.a0, two_pi - 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(s.a - s.a0, 0.5, epsilon = 1.0e-5);
    }
}
