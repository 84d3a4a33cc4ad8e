use crate::dynamics::{Contact, Fixture, FixtureHandle, JointHandle};
use crate::math::Real;
use crate::query::{Manifold, MAX_MANIFOLD_POINTS};

/// Decides whether two fixtures may generate a contact.
pub trait ContactFilter: Send + Sync {
    /// Returns `true` if a contact should be created between both fixtures.
    ///
    /// This is called when their broad-phase proxies start overlapping, and again whenever the
    /// filter of one of them changes.
    fn should_collide(&self, fixture_a: &Fixture, fixture_b: &Fixture) -> bool;
}

/// Filters contacts with the [`CollisionFilter`](crate::dynamics::CollisionFilter) of both
/// fixtures.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultContactFilter;

impl ContactFilter for DefaultContactFilter {
    fn should_collide(&self, fixture_a: &Fixture, fixture_b: &Fixture) -> bool {
        fixture_a.filter().test(fixture_b.filter())
    }
}

/// The impulses applied by the solver to the points of a contact.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ContactImpulse {
    /// The non-penetration impulse of each point.
    pub normal_impulses: [Real; MAX_MANIFOLD_POINTS],
    /// The friction impulse of each point.
    pub tangent_impulses: [Real; MAX_MANIFOLD_POINTS],
    /// The number of valid points.
    pub count: usize,
}

/// Receives the contact events of a time step.
///
/// Listeners are not given access to the world: creating or destroying bodies, fixtures or
/// joints has to wait until the end of the step.
pub trait ContactListener: Send + Sync {
    /// Two fixtures started touching.
    fn begin_contact(&mut self, _contact: &Contact) {}

    /// Two fixtures stopped touching.
    ///
    /// This is also called when a touching contact is destroyed.
    fn end_contact(&mut self, _contact: &Contact) {}

    /// Called after the manifold of a touching contact was updated, before it is solved.
    ///
    /// `old_manifold` is the manifold of the previous step. The contact can be disabled for the
    /// current step with [`Contact::set_enabled`].
    fn pre_solve(&mut self, _contact: &mut Contact, _old_manifold: &Manifold) {}

    /// Reports the impulses applied to a contact by the solver.
    fn post_solve(&mut self, _contact: &Contact, _impulse: &ContactImpulse) {}
}

/// A contact listener that ignores every event.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopContactListener;

impl ContactListener for NoopContactListener {}

/// Notified of the joints and fixtures destroyed implicitly when their body is destroyed.
pub trait DestructionListener: Send + Sync {
    /// The joint is about to be destroyed because one of its bodies is being destroyed.
    fn say_goodbye_joint(&mut self, _joint: JointHandle) {}

    /// The fixture is about to be destroyed because its body is being destroyed.
    fn say_goodbye_fixture(&mut self, _fixture: FixtureHandle) {}
}

/// A destruction listener that ignores every event.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopDestructionListener;

impl DestructionListener for NoopDestructionListener {}
