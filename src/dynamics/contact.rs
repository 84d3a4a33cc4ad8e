use crate::dynamics::{BodyHandle, Fixture, FixtureHandle};
use crate::math::Real;
use crate::query::Manifold;
use thunderdome::Index;

/// The handle of a contact managed by a [`ContactManager`](crate::dynamics::ContactManager).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContactHandle(pub(crate) Index);

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct ContactFlags(u8);

bitflags::bitflags! {
    impl ContactFlags: u8 {
        /// The contact has been added to the current island.
        const ISLAND = 1;
        /// The manifold has at least one point, or the sensor fixtures overlap.
        const TOUCHING = 1 << 1;
        /// The contact takes part in the current step. Reset by every manifold update.
        const ENABLED = 1 << 2;
        /// The collision filter must be checked again before the next update.
        const FILTER = 1 << 3;
        /// `toi` holds a valid time of impact.
        const TOI = 1 << 4;
    }
}

/// Mixes the friction of two fixtures.
///
/// A fixture with zero friction makes the mixed friction zero.
#[inline]
pub fn mix_friction(friction_a: Real, friction_b: Real) -> Real {
    (friction_a * friction_b).sqrt()
}

/// Mixes the restitution of two fixtures.
///
/// Anything bouncing off a bouncy surface bounces.
#[inline]
pub fn mix_restitution(restitution_a: Real, restitution_b: Real) -> Real {
    restitution_a.max(restitution_b)
}

/// The persistent contact between two fixture children whose broad-phase proxies overlap.
///
/// A contact exists as long as the proxies overlap, even if the shapes are not touching. The
/// first fixture always has a shape type greater or equal to the shape type of the second.
#[derive(Clone, Debug)]
pub struct Contact {
    pub(crate) flags: ContactFlags,
    pub(crate) fixture_a: FixtureHandle,
    pub(crate) fixture_b: FixtureHandle,
    pub(crate) child_a: usize,
    pub(crate) child_b: usize,
    pub(crate) body_a: BodyHandle,
    pub(crate) body_b: BodyHandle,
    pub(crate) manifold: Manifold,
    pub(crate) toi_count: u32,
    pub(crate) toi: Real,
    pub(crate) friction: Real,
    pub(crate) restitution: Real,
    pub(crate) tangent_speed: Real,
}

impl Contact {
    pub(crate) fn new(
        handle_a: FixtureHandle,
        fixture_a: &Fixture,
        child_a: usize,
        handle_b: FixtureHandle,
        fixture_b: &Fixture,
        child_b: usize,
    ) -> Self {
        Self {
            flags: ContactFlags::ENABLED,
            fixture_a: handle_a,
            fixture_b: handle_b,
            child_a,
            child_b,
            body_a: fixture_a.body(),
            body_b: fixture_b.body(),
            manifold: Manifold::new(),
            toi_count: 0,
            toi: 0.0,
            friction: mix_friction(fixture_a.friction(), fixture_b.friction()),
            restitution: mix_restitution(fixture_a.restitution(), fixture_b.restitution()),
            tangent_speed: 0.0,
        }
    }

    /// The first fixture.
    #[inline]
    pub fn fixture_a(&self) -> FixtureHandle {
        self.fixture_a
    }

    /// The shape child of the first fixture.
    #[inline]
    pub fn child_a(&self) -> usize {
        self.child_a
    }

    /// The second fixture.
    #[inline]
    pub fn fixture_b(&self) -> FixtureHandle {
        self.fixture_b
    }

    /// The shape child of the second fixture.
    #[inline]
    pub fn child_b(&self) -> usize {
        self.child_b
    }

    /// The body of the first fixture.
    #[inline]
    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    /// The body of the second fixture.
    #[inline]
    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    /// The local contact manifold.
    #[inline]
    pub fn manifold(&self) -> &Manifold {
        &self.manifold
    }

    /// Are the fixtures touching?
    #[inline]
    pub fn is_touching(&self) -> bool {
        self.flags.contains(ContactFlags::TOUCHING)
    }

    /// Is this contact enabled for the current step?
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ContactFlags::ENABLED)
    }

    /// Enables or disables this contact for the current step.
    ///
    /// The contact is enabled again by the next manifold update, so this is meant to be called
    /// from [`ContactListener::pre_solve`](crate::dynamics::ContactListener::pre_solve).
    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.flags.set(ContactFlags::ENABLED, enabled);
    }

    /// The mixed friction of both fixtures.
    #[inline]
    pub fn friction(&self) -> Real {
        self.friction
    }

    /// Overrides the mixed friction. It persists until the contact is destroyed.
    #[inline]
    pub fn set_friction(&mut self, friction: Real) {
        self.friction = friction;
    }

    /// The mixed restitution of both fixtures.
    #[inline]
    pub fn restitution(&self) -> Real {
        self.restitution
    }

    /// Overrides the mixed restitution. It persists until the contact is destroyed.
    #[inline]
    pub fn set_restitution(&mut self, restitution: Real) {
        self.restitution = restitution;
    }

    /// The target speed along the contact tangent, for conveyor belts.
    #[inline]
    pub fn tangent_speed(&self) -> Real {
        self.tangent_speed
    }

    /// Sets the target speed along the contact tangent.
    #[inline]
    pub fn set_tangent_speed(&mut self, speed: Real) {
        self.tangent_speed = speed;
    }

    /// The number of time-of-impact sub-steps this contact went through during the current
    /// step.
    #[inline]
    pub fn toi_count(&self) -> u32 {
        self.toi_count
    }

    /// Flags this contact so that its collision filter is checked again on the next update.
    #[inline]
    pub(crate) fn flag_for_filtering(&mut self) {
        self.flags.insert(ContactFlags::FILTER);
    }

    /// Does this contact join the two given fixture children, in any order?
    pub(crate) fn joins(
        &self,
        fixture_a: FixtureHandle,
        child_a: usize,
        fixture_b: FixtureHandle,
        child_b: usize,
    ) -> bool {
        (self.fixture_a == fixture_a
            && self.child_a == child_a
            && self.fixture_b == fixture_b
            && self.child_b == child_b)
            || (self.fixture_a == fixture_b
                && self.child_a == child_b
                && self.fixture_b == fixture_a
                && self.child_b == child_a)
    }
}

#[cfg(test)]
mod test {
    use super::{mix_friction, mix_restitution, Contact};
    use crate::dynamics::{BodyHandle, Fixture, FixtureDef, FixtureHandle};
    use crate::shape::SharedShape;

    #[test]
    fn material_mixing() {
        assert_relative_eq!(mix_friction(0.5, 0.5), 0.5);
        assert_relative_eq!(mix_friction(0.0, 0.9), 0.0);
        assert_relative_eq!(mix_restitution(0.1, 0.6), 0.6);
    }

    #[test]
    fn contacts_join_pairs_in_any_order() {
        let mut slots = thunderdome::Arena::new();
        let [body_a, body_b] = [(); 2].map(|_| BodyHandle(slots.insert(())));
        let [fixture_a, fixture_b] = [(); 2].map(|_| FixtureHandle(slots.insert(())));

        let fa = Fixture::new(
            body_a,
            FixtureDef::new(SharedShape::cuboid(1.0, 1.0)).friction(0.4),
        );
        let fb = Fixture::new(
            body_b,
            FixtureDef::new(SharedShape::ball(1.0)).friction(0.9),
        );
        let contact = Contact::new(fixture_a, &fa, 0, fixture_b, &fb, 0);

        assert!(contact.is_enabled());
        assert!(!contact.is_touching());
        assert_eq!(contact.body_b(), body_b);
        assert_relative_eq!(contact.friction(), 0.6, epsilon = 1.0e-6);
        assert!(contact.joins(fixture_b, 0, fixture_a, 0));
        assert!(!contact.joins(fixture_b, 1, fixture_a, 0));
    }
}
