use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::dynamics::BodyHandle;
use crate::math::{Isometry, Real};
use crate::partitioning::{BroadPhase, ProxyId};
use crate::shape::{Shape, SharedShape};
use smallvec::SmallVec;
use thunderdome::Index;

/// The handle of a fixture inserted into a [`World`](crate::dynamics::World).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FixtureHandle(pub(crate) Index);

/// The payload of the broad-phase proxies: one shape child of a fixture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FixtureProxy {
    /// The fixture.
    pub fixture: FixtureHandle,
    /// The index of the shape child.
    pub child_index: usize,
}

/// The broad-phase state of one shape child of a fixture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProxyInfo {
    /// The tight AABB of the child at its last synchronization.
    pub aabb: Aabb,
    /// The broad-phase proxy.
    pub proxy_id: ProxyId,
    /// The index of the shape child.
    pub child_index: usize,
}

/// Decides which fixtures may collide.
///
/// Two fixtures in the same nonzero group always collide if the group is positive and never
/// collide if it is negative. Otherwise they collide if the category of each one is in the mask
/// of the other.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CollisionFilter {
    /// The collision categories this fixture belongs to.
    pub category_bits: u16,
    /// The collision categories this fixture accepts.
    pub mask_bits: u16,
    /// The collision group.
    pub group_index: i16,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category_bits: 0x0001,
            mask_bits: 0xFFFF,
            group_index: 0,
        }
    }
}

impl CollisionFilter {
    /// Can fixtures with these two filters collide?
    pub fn test(&self, other: &CollisionFilter) -> bool {
        if self.group_index == other.group_index && self.group_index != 0 {
            return self.group_index > 0;
        }

        (self.mask_bits & other.category_bits) != 0 && (self.category_bits & other.mask_bits) != 0
    }
}

/// The description of a fixture to create.
#[derive(Clone, Debug)]
pub struct FixtureDef {
    /// The shape of the fixture.
    pub shape: SharedShape,
    /// The friction coefficient, usually in `[0, 1]`.
    pub friction: Real,
    /// The restitution coefficient, usually in `[0, 1]`.
    pub restitution: Real,
    /// The density, in kg/m².
    pub density: Real,
    /// A sensor detects contacts without generating a collision response.
    pub is_sensor: bool,
    /// The collision filter.
    pub filter: CollisionFilter,
    /// Data associated to the fixture by the user.
    pub user_data: u128,
}

impl FixtureDef {
    /// A fixture description with the given shape and default material.
    pub fn new(shape: SharedShape) -> Self {
        Self {
            shape,
            friction: 0.2,
            restitution: 0.0,
            density: 0.0,
            is_sensor: false,
            filter: CollisionFilter::default(),
            user_data: 0,
        }
    }

    /// Sets the friction coefficient.
    pub fn friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    /// Sets the restitution coefficient.
    pub fn restitution(mut self, restitution: Real) -> Self {
        self.restitution = restitution;
        self
    }

    /// Sets the density.
    pub fn density(mut self, density: Real) -> Self {
        self.density = density;
        self
    }

    /// Sets whether this fixture is a sensor.
    pub fn sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }

    /// Sets the collision filter.
    pub fn filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the user data.
    pub fn user_data(mut self, user_data: u128) -> Self {
        self.user_data = user_data;
        self
    }
}

/// A shape attached to a body, with its material and collision filter.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub(crate) body: BodyHandle,
    pub(crate) shape: SharedShape,
    pub(crate) density: Real,
    pub(crate) friction: Real,
    pub(crate) restitution: Real,
    pub(crate) is_sensor: bool,
    pub(crate) filter: CollisionFilter,
    pub(crate) proxies: SmallVec<[ProxyInfo; 1]>,
    pub(crate) user_data: u128,
}

impl Fixture {
    pub(crate) fn new(body: BodyHandle, def: FixtureDef) -> Self {
        debug_assert!(def.density >= 0.0);
        Self {
            body,
            shape: def.shape,
            density: def.density,
            friction: def.friction,
            restitution: def.restitution,
            is_sensor: def.is_sensor,
            filter: def.filter,
            proxies: SmallVec::new(),
            user_data: def.user_data,
        }
    }

    /// The body this fixture is attached to.
    #[inline]
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// The shape of this fixture.
    #[inline]
    pub fn shape(&self) -> &dyn Shape {
        &*self.shape.0
    }

    /// The shared shape of this fixture.
    #[inline]
    pub fn shared_shape(&self) -> &SharedShape {
        &self.shape
    }

    /// The density of this fixture.
    #[inline]
    pub fn density(&self) -> Real {
        self.density
    }

    /// Sets the density of this fixture.
    ///
    /// The mass of the body is not updated until
    /// [`World::reset_mass_data`](crate::dynamics::World::reset_mass_data) is called.
    #[inline]
    pub fn set_density(&mut self, density: Real) {
        debug_assert!(density.is_finite() && density >= 0.0);
        self.density = density;
    }

    /// The friction coefficient of this fixture.
    #[inline]
    pub fn friction(&self) -> Real {
        self.friction
    }

    /// Sets the friction coefficient. Existing contacts keep their mixed friction.
    #[inline]
    pub fn set_friction(&mut self, friction: Real) {
        self.friction = friction;
    }

    /// The restitution coefficient of this fixture.
    #[inline]
    pub fn restitution(&self) -> Real {
        self.restitution
    }

    /// Sets the restitution coefficient. Existing contacts keep their mixed restitution.
    #[inline]
    pub fn set_restitution(&mut self, restitution: Real) {
        self.restitution = restitution;
    }

    /// Is this fixture a sensor?
    #[inline]
    pub fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    /// The collision filter of this fixture.
    #[inline]
    pub fn filter(&self) -> &CollisionFilter {
        &self.filter
    }

    /// The broad-phase proxies of this fixture, one per shape child.
    #[inline]
    pub fn proxies(&self) -> &[ProxyInfo] {
        &self.proxies
    }

    /// The fat AABB of the given child, as stored by the broad-phase.
    pub fn fat_aabb<'a>(
        &self,
        broad_phase: &'a dyn BroadPhase<FixtureProxy>,
        child_index: usize,
    ) -> Option<&'a Aabb> {
        let proxy = self.proxies.iter().find(|p| p.child_index == child_index)?;
        broad_phase.fat_aabb(proxy.proxy_id)
    }

    /// The user data of this fixture.
    #[inline]
    pub fn user_data(&self) -> u128 {
        self.user_data
    }

    /// Sets the user data of this fixture.
    #[inline]
    pub fn set_user_data(&mut self, user_data: u128) {
        self.user_data = user_data;
    }

    pub(crate) fn create_proxies(
        &mut self,
        handle: FixtureHandle,
        broad_phase: &mut dyn BroadPhase<FixtureProxy>,
        xf: &Isometry<Real>,
    ) {
        debug_assert!(self.proxies.is_empty());

        for child_index in 0..self.shape.child_count() {
            let aabb = self.shape.compute_aabb(xf, child_index);
            let proxy_id = broad_phase.create_proxy(
                &aabb,
                FixtureProxy {
                    fixture: handle,
                    child_index,
                },
            );
            self.proxies.push(ProxyInfo {
                aabb,
                proxy_id,
                child_index,
            });
        }
    }

    pub(crate) fn destroy_proxies(&mut self, broad_phase: &mut dyn BroadPhase<FixtureProxy>) {
        for proxy in self.proxies.drain(..) {
            broad_phase.destroy_proxy(proxy.proxy_id);
        }
    }

    /// Updates the proxies so that they enclose the motion of the fixture from `xf1` to `xf2`.
    pub(crate) fn synchronize(
        &mut self,
        broad_phase: &mut dyn BroadPhase<FixtureProxy>,
        xf1: &Isometry<Real>,
        xf2: &Isometry<Real>,
    ) {
        let displacement = xf2.translation.vector - xf1.translation.vector;

        for proxy in &mut self.proxies {
            let aabb1 = self.shape.compute_aabb(xf1, proxy.child_index);
            let aabb2 = self.shape.compute_aabb(xf2, proxy.child_index);
            proxy.aabb = aabb1.merged(&aabb2);
            let _ = broad_phase.move_proxy(proxy.proxy_id, &proxy.aabb, &displacement);
        }
    }

    pub(crate) fn touch_proxies(&self, broad_phase: &mut dyn BroadPhase<FixtureProxy>) {
        for proxy in &self.proxies {
            broad_phase.touch_proxy(proxy.proxy_id);
        }
    }
}

#[cfg(test)]
mod test {
    use super::{CollisionFilter, Fixture, FixtureDef, FixtureHandle, FixtureProxy};
    use crate::dynamics::BodyHandle;
    use crate::math::{Isometry, Point};
    use crate::partitioning::{BroadPhase, DefaultBroadPhase};
    use crate::shape::SharedShape;

    #[test]
    fn filter_rules() {
        let default = CollisionFilter::default();
        assert!(default.test(&default));

        let positive = CollisionFilter {
            group_index: 3,
            mask_bits: 0,
            ..Default::default()
        };
        // The shared positive group overrides the empty mask.
        assert!(positive.test(&positive));

        let negative = CollisionFilter {
            group_index: -3,
            ..Default::default()
        };
        assert!(!negative.test(&negative));
        // Different groups fall back to the categories.
        assert!(negative.test(&default));

        let picky = CollisionFilter {
            category_bits: 0x0002,
            mask_bits: 0x0004,
            group_index: 0,
        };
        assert!(!picky.test(&default));
        let matching = CollisionFilter {
            category_bits: 0x0004,
            mask_bits: 0x0002,
            group_index: 0,
        };
        assert!(picky.test(&matching));
    }

    #[test]
    fn proxies_follow_the_fixture() {
        let mut bp = DefaultBroadPhase::<FixtureProxy>::default();
        let def = FixtureDef::new(SharedShape::ball(0.5)).density(2.0);
        let mut slots = thunderdome::Arena::new();
        let mut fixture = Fixture::new(BodyHandle(slots.insert(())), def);
        let handle = FixtureHandle(slots.insert(()));

        fixture.create_proxies(handle, &mut bp, &Isometry::identity());
        assert_eq!(fixture.proxies().len(), 1);
        let proxy = fixture.proxies()[0].proxy_id;
        assert_eq!(
            bp.proxy_data(proxy),
            Some(FixtureProxy {
                fixture: handle,
                child_index: 0
            })
        );

        let xf2 = Isometry::translation(3.0, 0.0);
        fixture.synchronize(&mut bp, &Isometry::identity(), &xf2);
        let fat = fixture.fat_aabb(&bp, 0).copied().unwrap();
        assert!(fat.contains_local_point(&(xf2 * Point::origin())));
        assert!(fat.mins.x <= -0.5 && fat.maxs.x >= 3.5);

        fixture.destroy_proxies(&mut bp);
        assert!(fixture.proxies().is_empty());
        assert_eq!(bp.proxy_count(), 0);
    }
}
