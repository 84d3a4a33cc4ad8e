use crate::mass_properties::MassProperties;
use crate::math::{Point, Real};
use na::RealField;

impl MassProperties {
    pub(crate) fn ball_area_unit_angular_inertia(radius: Real) -> (Real, Real) {
        let area = Real::pi() * radius * radius;
        let i = radius * radius / 2.0;
        (area, i)
    }

    /// Computes the mass properties of a ball of the given radius centered at `center`.
    ///
    /// The angular inertia is `m * r² / 2`, expressed about the ball center.
    pub fn from_ball(density: Real, center: Point<Real>, radius: Real) -> Self {
        let (area, unit_i) = Self::ball_area_unit_angular_inertia(radius);
        let mass = area * density;
        Self::new(center, mass, unit_i * mass)
    }
}
