use crate::math::{Isometry, Point, Real};
use crate::utils;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
/// The local mass properties of a shape or of a whole rigid-body.
pub struct MassProperties {
    /// The center of mass expressed in the local-space of the body.
    pub local_com: Point<Real>,
    /// The mass.
    ///
    /// Zero means the body carries no mass from its fixtures.
    pub mass: Real,
    /// The angular inertia about the center of mass.
    pub principal_inertia: Real,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self::zero()
    }
}

impl MassProperties {
    /// Initializes the mass properties with the given center-of-mass, mass, and angular inertia
    /// about that center-of-mass.
    pub fn new(local_com: Point<Real>, mass: Real, principal_inertia: Real) -> Self {
        Self {
            local_com,
            mass,
            principal_inertia,
        }
    }

    /// Mass properties with zero mass and inertia, centered at the origin.
    pub fn zero() -> Self {
        Self::new(Point::origin(), 0.0, 0.0)
    }

    /// The inverse mass, or zero if the mass is zero.
    pub fn inv_mass(&self) -> Real {
        utils::inv(self.mass)
    }

    /// The angular inertia about the local-space origin instead of the center of mass.
    pub fn inertia_about_origin(&self) -> Real {
        self.principal_inertia + self.mass * self.local_com.coords.norm_squared()
    }

    /// The world-space center of mass.
    pub fn world_com(&self, pos: &Isometry<Real>) -> Point<Real> {
        pos * self.local_com
    }
}

impl Add<MassProperties> for MassProperties {
    type Output = Self;

    fn add(self, other: MassProperties) -> Self {
        if self.mass == 0.0 {
            return other;
        }
        if other.mass == 0.0 {
            return self;
        }

        let mass = self.mass + other.mass;
        let local_com = (self.local_com * self.mass + other.local_com.coords * other.mass) / mass;

        // Parallel-axis theorem to move both inertias to the common center of mass.
        let inertia1 =
            self.principal_inertia + self.mass * (self.local_com - local_com).norm_squared();
        let inertia2 =
            other.principal_inertia + other.mass * (other.local_com - local_com).norm_squared();

        Self::new(local_com, mass, inertia1 + inertia2)
    }
}

impl AddAssign<MassProperties> for MassProperties {
    fn add_assign(&mut self, rhs: MassProperties) {
        *self = *self + rhs
    }
}

impl Sum<MassProperties> for MassProperties {
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = Self>,
    {
        iter.fold(Self::zero(), |acc, props| acc + props)
    }
}

#[cfg(test)]
mod test {
    use super::MassProperties;
    use crate::math::{Point, Real};

    #[test]
    fn sum_uses_the_parallel_axis_theorem() {
        let a = MassProperties::from_ball(1.0, Point::new(-1.0, 0.0), 0.5);
        let b = MassProperties::from_ball(1.0, Point::new(1.0, 0.0), 0.5);
        let total: MassProperties = [a, b].into_iter().sum();

        assert_relative_eq!(total.mass, a.mass * 2.0);
        assert_relative_eq!(total.local_com, Point::origin());
        assert_relative_eq!(
            total.principal_inertia,
            2.0 * (a.principal_inertia + a.mass),
            epsilon = 1.0e-5
        );
    }

    #[test]
    fn zero_mass_is_neutral() {
        let a = MassProperties::new(Point::new(3.0, 1.0), 2.0, 0.5 as Real);
        assert_eq!(a + MassProperties::zero(), a);
        assert_eq!(MassProperties::zero() + a, a);
    }
}
