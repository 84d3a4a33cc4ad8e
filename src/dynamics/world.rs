use crate::bounding_volume::Aabb;
use crate::dynamics::body::BodyFlags;
use crate::dynamics::contact::ContactFlags;
use crate::dynamics::island::Island;
use crate::dynamics::{
    Body, BodyDef, BodyHandle, BodyType, CollisionFilter, Contact, ContactFilter, ContactHandle,
    ContactListener, ContactManager, DestructionListener, Fixture, FixtureDef, FixtureHandle,
    FixtureProxy, IntegrationParameters, Joint, JointConstraint, JointDef, JointEdge, JointHandle,
    NoopDestructionListener, TimeStep, WorldError,
};
use crate::mass_properties::MassProperties;
use crate::math::{Isometry, Point, Real, Vector};
use crate::partitioning::{BroadPhase, DefaultBroadPhase};
use crate::query::{
    DefaultNarrowPhase, DefaultTimeOfImpact, TimeOfImpact, ToiInput, ToiState, WorldManifold,
};
use alloc::boxed::Box;
use alloc::vec::Vec;
use thunderdome::Arena;
use smallvec::SmallVec;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct WorldFlags(u8);

bitflags::bitflags! {
    impl WorldFlags: u8 {
        /// Fixtures were added since the last step.
        const NEW_FIXTURE = 1 << 0;
        /// A step is in progress.
        const LOCKED = 1 << 1;
        /// Forces are cleared at the end of each step.
        const CLEAR_FORCES = 1 << 2;
    }
}

/// The physics world: owns every body, fixture, joint and contact, and advances them in time.
///
/// Every structural operation returns [`WorldError::Locked`] if it is called while a step is in
/// progress.
pub struct World {
    bodies: Arena<Body>,
    fixtures: Arena<Fixture>,
    joints: Arena<Joint>,
    contact_manager: ContactManager,
    destruction_listener: Box<dyn DestructionListener>,
    time_of_impact: Box<dyn TimeOfImpact>,
    gravity: Vector<Real>,
    params: IntegrationParameters,
    flags: WorldFlags,
    warm_starting: bool,
    continuous_physics: bool,
    sub_stepping: bool,
    allow_sleep: bool,
    step_complete: bool,
    // The inverse of the previous time step, used to compute the ratio of two steps.
    inv_dt0: Real,
    island: Island,
    stack: Vec<BodyHandle>,
    seeds: Vec<BodyHandle>,
}

impl World {
    /// An empty world with the given gravity and the default integration parameters.
    pub fn new(gravity: Vector<Real>) -> Self {
        Self::with_parameters(gravity, IntegrationParameters::default())
    }

    /// An empty world with the given gravity and integration parameters.
    pub fn with_parameters(gravity: Vector<Real>, params: IntegrationParameters) -> Self {
        let contact_manager = ContactManager::new(
            Box::new(DefaultBroadPhase::new(
                params.aabb_extension,
                params.aabb_multiplier,
            )),
            Box::new(DefaultNarrowPhase::new(params.linear_slop)),
        );
        Self::with_contact_manager(gravity, params, contact_manager)
    }

    /// An empty world that uses the broad-phase and narrow-phase of `contact_manager`.
    pub fn with_contact_manager(
        gravity: Vector<Real>,
        params: IntegrationParameters,
        contact_manager: ContactManager,
    ) -> Self {
        Self {
            bodies: Arena::new(),
            fixtures: Arena::new(),
            joints: Arena::new(),
            contact_manager,
            destruction_listener: Box::new(NoopDestructionListener),
            time_of_impact: Box::new(DefaultTimeOfImpact),
            gravity,
            params,
            flags: WorldFlags::CLEAR_FORCES,
            warm_starting: true,
            continuous_physics: true,
            sub_stepping: false,
            allow_sleep: true,
            step_complete: true,
            inv_dt0: 0.0,
            island: Island::default(),
            stack: Vec::new(),
            seeds: Vec::new(),
        }
    }

    fn check_unlocked(&self) -> Result<(), WorldError> {
        if self.is_locked() {
            Err(WorldError::Locked)
        } else {
            Ok(())
        }
    }

    /*
     * Listeners and collaborators.
     */
    /// Sets the listener notified of the contact events.
    pub fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>) {
        self.contact_manager.contact_listener = listener;
    }

    /// Sets the filter deciding which fixtures may collide.
    pub fn set_contact_filter(&mut self, filter: Box<dyn ContactFilter>) {
        self.contact_manager.contact_filter = filter;
    }

    /// Sets the listener notified of the joints and fixtures destroyed implicitly.
    pub fn set_destruction_listener(&mut self, listener: Box<dyn DestructionListener>) {
        self.destruction_listener = listener;
    }

    /// Sets the time-of-impact query used by continuous collision detection.
    pub fn set_time_of_impact(&mut self, time_of_impact: Box<dyn TimeOfImpact>) {
        self.time_of_impact = time_of_impact;
    }

    /*
     * Bodies.
     */
    /// Creates a rigid body.
    ///
    /// The body has no fixture, and thus no mass, until [`World::create_fixture`] is called.
    pub fn create_body(&mut self, def: &BodyDef) -> Result<BodyHandle, WorldError> {
        self.check_unlocked()?;
        debug_assert!(def.is_valid());
        let handle = BodyHandle(self.bodies.insert(Body::new(def)));
        log::trace!("Created body {:?}.", handle);
        Ok(handle)
    }

    /// Destroys a body together with its fixtures, joints and contacts.
    ///
    /// The destruction listener is told about every joint and fixture destroyed this way.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), WorldError> {
        self.check_unlocked()?;
        let body = self
            .bodies
            .get(handle.0)
            .ok_or(WorldError::InvalidBodyHandle(handle))?;

        let joint_edges: SmallVec<[JointEdge; 4]> = body.joint_edges.clone();
        for edge in joint_edges {
            self.destruction_listener.say_goodbye_joint(edge.joint);
            self.remove_joint(edge.joint);
        }

        let contact_edges = self.bodies[handle.0].contact_edges.clone();
        for edge in contact_edges {
            self.contact_manager
                .destroy(edge.contact, &mut self.bodies, &self.fixtures);
        }

        let fixtures = core::mem::take(&mut self.bodies[handle.0].fixtures);
        for fixture_handle in fixtures {
            self.destruction_listener.say_goodbye_fixture(fixture_handle);
            if let Some(mut fixture) = self.fixtures.remove(fixture_handle.0) {
                fixture.destroy_proxies(&mut *self.contact_manager.broad_phase);
            }
        }

        let _ = self.bodies.remove(handle.0);
        log::trace!("Destroyed body {:?}.", handle);
        Ok(())
    }

    /// The body with the given handle.
    #[inline]
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.0)
    }

    /// A mutable reference to the body with the given handle.
    #[inline]
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.0)
    }

    /// Iterates through all the bodies of this world.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter().map(|(i, b)| (BodyHandle(i), b))
    }

    /// The number of bodies.
    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn body_checked(&mut self, handle: BodyHandle) -> Result<&mut Body, WorldError> {
        self.bodies
            .get_mut(handle.0)
            .ok_or(WorldError::InvalidBodyHandle(handle))
    }

    /// Changes the type of a body.
    ///
    /// This resets its mass and destroys its contacts; they are recreated by the next step.
    pub fn set_body_type(
        &mut self,
        handle: BodyHandle,
        body_type: BodyType,
    ) -> Result<(), WorldError> {
        self.check_unlocked()?;
        let body = self.body_checked(handle)?;
        if body.body_type == body_type {
            return Ok(());
        }

        body.body_type = body_type;
        self.reset_mass(handle);

        let body = &mut self.bodies[handle.0];
        if body_type == BodyType::Static {
            body.linvel = Vector::zeros();
            body.angvel = 0.0;
            body.sweep.a0 = body.sweep.a;
            body.sweep.c0 = body.sweep.c;
            synchronize_fixtures(
                body,
                &mut self.fixtures,
                &mut *self.contact_manager.broad_phase,
            );
        }

        body.set_awake(true);
        body.force = Vector::zeros();
        body.torque = 0.0;

        let contact_edges = body.contact_edges.clone();
        for edge in contact_edges {
            self.contact_manager
                .destroy(edge.contact, &mut self.bodies, &self.fixtures);
        }

        // Touch the proxies so that new contacts are created when appropriate.
        for fixture in &self.bodies[handle.0].fixtures {
            if let Some(fixture) = self.fixtures.get(fixture.0) {
                fixture.touch_proxies(&mut *self.contact_manager.broad_phase);
            }
        }

        Ok(())
    }

    /// Teleports a body to the given origin position and angle.
    ///
    /// The contacts of the body are updated during the next step.
    pub fn set_transform(
        &mut self,
        handle: BodyHandle,
        position: Point<Real>,
        angle: Real,
    ) -> Result<(), WorldError> {
        self.check_unlocked()?;
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(WorldError::InvalidBodyHandle(handle))?;

        body.xf = Isometry::new(position.coords, angle);
        body.sweep.c = body.xf * body.sweep.local_center;
        body.sweep.c0 = body.sweep.c;
        body.sweep.a = angle;
        body.sweep.a0 = angle;

        let xf = body.xf;
        for fixture in &body.fixtures {
            if let Some(fixture) = self.fixtures.get_mut(fixture.0) {
                fixture.synchronize(&mut *self.contact_manager.broad_phase, &xf, &xf);
            }
        }

        self.contact_manager
            .find_new_contacts(&mut self.bodies, &self.fixtures);
        Ok(())
    }

    /// Activates or deactivates a body.
    ///
    /// An inactive body has no broad-phase proxy, no contact, and is not simulated. Its joints
    /// are kept but ignored by the solver.
    pub fn set_body_active(&mut self, handle: BodyHandle, active: bool) -> Result<(), WorldError> {
        self.check_unlocked()?;
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(WorldError::InvalidBodyHandle(handle))?;
        if body.is_active() == active {
            return Ok(());
        }

        if active {
            body.flags.insert(BodyFlags::ACTIVE);
            let xf = body.xf;
            for fixture_handle in &body.fixtures {
                if let Some(fixture) = self.fixtures.get_mut(fixture_handle.0) {
                    fixture.create_proxies(
                        *fixture_handle,
                        &mut *self.contact_manager.broad_phase,
                        &xf,
                    );
                }
            }
            // Contacts are created the next time step.
            self.flags.insert(WorldFlags::NEW_FIXTURE);
        } else {
            body.flags.remove(BodyFlags::ACTIVE);
            for fixture_handle in &body.fixtures {
                if let Some(fixture) = self.fixtures.get_mut(fixture_handle.0) {
                    fixture.destroy_proxies(&mut *self.contact_manager.broad_phase);
                }
            }

            let contact_edges = body.contact_edges.clone();
            for edge in contact_edges {
                self.contact_manager
                    .destroy(edge.contact, &mut self.bodies, &self.fixtures);
            }
        }

        Ok(())
    }

    /// Prevents or allows the rotation of a body.
    pub fn set_fixed_rotation(
        &mut self,
        handle: BodyHandle,
        fixed_rotation: bool,
    ) -> Result<(), WorldError> {
        self.check_unlocked()?;
        let body = self.body_checked(handle)?;
        if body.is_fixed_rotation() == fixed_rotation {
            return Ok(());
        }

        body.flags.set(BodyFlags::FIXED_ROTATION, fixed_rotation);
        body.angvel = 0.0;
        self.reset_mass(handle);
        Ok(())
    }

    /// Overrides the mass properties of a dynamic body.
    ///
    /// The inertia of `props` is relative to its center of mass. This has no effect on static
    /// and kinematic bodies. The mass computed from the fixtures is restored by
    /// [`World::reset_mass_data`].
    pub fn set_mass_data(
        &mut self,
        handle: BodyHandle,
        props: &MassProperties,
    ) -> Result<(), WorldError> {
        self.check_unlocked()?;
        let body = self.body_checked(handle)?;
        if body.is_dynamic() {
            body.apply_mass_properties(props);
        }
        Ok(())
    }

    /// Recomputes the mass properties of a body from the density of its fixtures.
    pub fn reset_mass_data(&mut self, handle: BodyHandle) -> Result<(), WorldError> {
        self.check_unlocked()?;
        let _ = self.body_checked(handle)?;
        self.reset_mass(handle);
        Ok(())
    }

    fn reset_mass(&mut self, handle: BodyHandle) {
        let Some(body) = self.bodies.get_mut(handle.0) else {
            return;
        };

        if !body.is_dynamic() {
            body.clear_mass_properties();
            return;
        }

        let props: MassProperties = body
            .fixtures
            .iter()
            .filter_map(|h| self.fixtures.get(h.0))
            .filter(|f| f.density > 0.0)
            .map(|f| f.shape().mass_properties(f.density))
            .sum();
        body.apply_mass_properties(&props);
    }

    /*
     * Fixtures.
     */
    /// Attaches a new fixture to a body.
    ///
    /// The mass of the body is updated if the fixture has a positive density. Contacts involving
    /// the new fixture are created at the beginning of the next step.
    pub fn create_fixture(
        &mut self,
        body_handle: BodyHandle,
        def: FixtureDef,
    ) -> Result<FixtureHandle, WorldError> {
        self.check_unlocked()?;
        let body = self
            .bodies
            .get_mut(body_handle.0)
            .ok_or(WorldError::InvalidBodyHandle(body_handle))?;

        let fixture = Fixture::new(body_handle, def);
        let has_mass = fixture.density > 0.0;
        let handle = FixtureHandle(self.fixtures.insert(fixture));

        if body.is_active() {
            self.fixtures[handle.0].create_proxies(
                handle,
                &mut *self.contact_manager.broad_phase,
                &body.xf,
            );
        }

        body.fixtures.push(handle);

        if has_mass {
            self.reset_mass(body_handle);
        }

        self.flags.insert(WorldFlags::NEW_FIXTURE);
        Ok(handle)
    }

    /// Detaches and destroys a fixture, along with its contacts.
    ///
    /// The mass of the body is recomputed.
    pub fn destroy_fixture(&mut self, handle: FixtureHandle) -> Result<(), WorldError> {
        self.check_unlocked()?;
        let body_handle = self
            .fixtures
            .get(handle.0)
            .ok_or(WorldError::InvalidFixtureHandle(handle))?
            .body;

        let contact_edges = self.bodies[body_handle.0].contact_edges.clone();
        for edge in contact_edges {
            let involved = self
                .contact_manager
                .contacts
                .get(edge.contact.0)
                .is_some_and(|c| c.fixture_a == handle || c.fixture_b == handle);

            if involved {
                self.contact_manager
                    .destroy(edge.contact, &mut self.bodies, &self.fixtures);
            }
        }

        if let Some(mut fixture) = self.fixtures.remove(handle.0) {
            fixture.destroy_proxies(&mut *self.contact_manager.broad_phase);
        }

        let body = &mut self.bodies[body_handle.0];
        if let Some(i) = body.fixtures.iter().position(|h| *h == handle) {
            let _ = body.fixtures.remove(i);
        }

        self.reset_mass(body_handle);
        Ok(())
    }

    /// The fixture with the given handle.
    #[inline]
    pub fn fixture(&self, handle: FixtureHandle) -> Option<&Fixture> {
        self.fixtures.get(handle.0)
    }

    /// A mutable reference to the fixture with the given handle.
    ///
    /// Changing the density of a fixture does not change the mass of its body until
    /// [`World::reset_mass_data`] is called.
    #[inline]
    pub fn fixture_mut(&mut self, handle: FixtureHandle) -> Option<&mut Fixture> {
        self.fixtures.get_mut(handle.0)
    }

    /// Iterates through all the fixtures of this world.
    pub fn fixtures(&self) -> impl Iterator<Item = (FixtureHandle, &Fixture)> {
        self.fixtures.iter().map(|(i, f)| (FixtureHandle(i), f))
    }

    /// The number of fixtures.
    #[inline]
    pub fn fixture_count(&self) -> usize {
        self.fixtures.len()
    }

    /// Changes the collision filter of a fixture.
    ///
    /// Its existing contacts are filtered again during the next step.
    pub fn set_fixture_filter(
        &mut self,
        handle: FixtureHandle,
        filter: CollisionFilter,
    ) -> Result<(), WorldError> {
        self.check_unlocked()?;
        let fixture = self
            .fixtures
            .get_mut(handle.0)
            .ok_or(WorldError::InvalidFixtureHandle(handle))?;
        fixture.filter = filter;

        let Some(body) = self.bodies.get(fixture.body.0) else {
            return Ok(());
        };

        for edge in &body.contact_edges {
            if let Some(contact) = self.contact_manager.contacts.get_mut(edge.contact.0) {
                if contact.fixture_a == handle || contact.fixture_b == handle {
                    contact.flag_for_filtering();
                }
            }
        }

        fixture.touch_proxies(&mut *self.contact_manager.broad_phase);
        Ok(())
    }

    /// Turns a fixture into a sensor, or back into a solid fixture.
    pub fn set_fixture_sensor(
        &mut self,
        handle: FixtureHandle,
        is_sensor: bool,
    ) -> Result<(), WorldError> {
        self.check_unlocked()?;
        let fixture = self
            .fixtures
            .get_mut(handle.0)
            .ok_or(WorldError::InvalidFixtureHandle(handle))?;

        if fixture.is_sensor != is_sensor {
            fixture.is_sensor = is_sensor;
            if let Some(body) = self.bodies.get_mut(fixture.body.0) {
                body.set_awake(true);
            }
        }

        Ok(())
    }

    /*
     * Joints.
     */
    /// Creates a joint between two bodies.
    ///
    /// Unless the joint allows it, the contacts between both bodies are destroyed during the
    /// next step.
    pub fn create_joint(&mut self, def: JointDef) -> Result<JointHandle, WorldError> {
        self.check_unlocked()?;
        let (body_a, body_b) = (def.body_a, def.body_b);
        let _ = self.body_checked(body_a)?;
        let _ = self.body_checked(body_b)?;
        debug_assert_ne!(body_a, body_b);

        let collide_connected = def.collide_connected;
        let handle = JointHandle(self.joints.insert(Joint::new(def)));

        self.bodies[body_a.0].joint_edges.push(JointEdge {
            joint: handle,
            other: body_b,
            collide_connected,
        });
        self.bodies[body_b.0].joint_edges.push(JointEdge {
            joint: handle,
            other: body_a,
            collide_connected,
        });

        if !collide_connected {
            self.contact_manager
                .flag_contacts_between(&self.bodies, body_b, body_a);
        }

        log::trace!("Created joint {:?}.", handle);
        Ok(handle)
    }

    /// Destroys a joint and wakes up the bodies it was attached to.
    pub fn destroy_joint(&mut self, handle: JointHandle) -> Result<(), WorldError> {
        self.check_unlocked()?;
        if !self.joints.contains(handle.0) {
            return Err(WorldError::InvalidJointHandle(handle));
        }

        self.remove_joint(handle);
        Ok(())
    }

    fn remove_joint(&mut self, handle: JointHandle) {
        let Some(joint) = self.joints.remove(handle.0) else {
            return;
        };

        for body in [joint.body_a, joint.body_b] {
            if let Some(body) = self.bodies.get_mut(body.0) {
                body.set_awake(true);
                body.unlink_joint(handle);
            }
        }

        if !joint.collide_connected {
            self.contact_manager
                .flag_contacts_between(&self.bodies, joint.body_b, joint.body_a);
        }

        log::trace!("Destroyed joint {:?}.", handle);
    }

    /// The joint with the given handle.
    #[inline]
    pub fn joint(&self, handle: JointHandle) -> Option<&Joint> {
        self.joints.get(handle.0)
    }

    /// A mutable reference to the joint with the given handle.
    ///
    /// Only the user data can be changed this way. Use [`World::modify_joint`] to change the
    /// constraint itself.
    #[inline]
    pub fn joint_mut(&mut self, handle: JointHandle) -> Option<&mut Joint> {
        self.joints.get_mut(handle.0)
    }

    /// Iterates through all the joints of this world.
    pub fn joints(&self) -> impl Iterator<Item = (JointHandle, &Joint)> {
        self.joints.iter().map(|(i, j)| (JointHandle(i), j))
    }

    /// The number of joints.
    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Modifies the constraint of a joint of type `T`, and wakes up both its bodies.
    ///
    /// Returns [`WorldError::JointTypeMismatch`] if the joint is not a `T`.
    pub fn modify_joint<T: JointConstraint, R>(
        &mut self,
        handle: JointHandle,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, WorldError> {
        self.check_unlocked()?;
        let joint = self
            .joints
            .get_mut(handle.0)
            .ok_or(WorldError::InvalidJointHandle(handle))?;
        let constraint = joint
            .constraint
            .downcast_mut::<T>()
            .ok_or(WorldError::JointTypeMismatch(handle))?;
        let result = f(constraint);

        for body in [joint.body_a, joint.body_b] {
            if let Some(body) = self.bodies.get_mut(body.0) {
                body.set_awake(true);
            }
        }

        Ok(result)
    }

    /*
     * Contacts.
     */
    /// The contact with the given handle.
    #[inline]
    pub fn contact(&self, handle: ContactHandle) -> Option<&Contact> {
        self.contact_manager.get(handle)
    }

    /// A mutable reference to the contact with the given handle.
    ///
    /// Changes made to a contact only last until its next update.
    #[inline]
    pub fn contact_mut(&mut self, handle: ContactHandle) -> Option<&mut Contact> {
        self.contact_manager.contacts.get_mut(handle.0)
    }

    /// Iterates through all the contacts, in creation order.
    pub fn contacts(&self) -> impl Iterator<Item = (ContactHandle, &Contact)> {
        self.contact_manager.iter()
    }

    /// The number of contacts.
    #[inline]
    pub fn contact_count(&self) -> usize {
        self.contact_manager.len()
    }

    /// The contact manager.
    #[inline]
    pub fn contact_manager(&self) -> &ContactManager {
        &self.contact_manager
    }

    /// The world-space manifold of a contact.
    pub fn world_manifold(&self, handle: ContactHandle) -> Result<WorldManifold, WorldError> {
        let contact = self
            .contact_manager
            .get(handle)
            .ok_or(WorldError::InvalidContactHandle(handle))?;
        let body_a = &self.bodies[contact.body_a.0];
        let body_b = &self.bodies[contact.body_b.0];
        let radius_a = self.fixtures[contact.fixture_a.0].shape().radius();
        let radius_b = self.fixtures[contact.fixture_b.0].shape().radius();

        Ok(WorldManifold::new(
            &contact.manifold,
            &body_a.xf,
            radius_a,
            &body_b.xf,
            radius_b,
        ))
    }

    /*
     * Queries and global operations.
     */
    /// Calls `callback` with every fixture child whose fat AABB overlaps `aabb`.
    ///
    /// The query stops as soon as `callback` returns `false`.
    pub fn query_aabb(&self, aabb: &Aabb, mut callback: impl FnMut(FixtureHandle, usize) -> bool) {
        let broad_phase = &*self.contact_manager.broad_phase;
        broad_phase.query(aabb, &mut |proxy_id| match broad_phase.proxy_data(proxy_id) {
            Some(proxy) => callback(proxy.fixture, proxy.child_index),
            None => true,
        });
    }

    /// Resets the force and torque accumulated on every body.
    pub fn clear_forces(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.force = Vector::zeros();
            body.torque = 0.0;
        }
    }

    /// Moves the world origin to `new_origin`, for large worlds.
    ///
    /// Every position is translated by `-new_origin`.
    pub fn shift_origin(&mut self, new_origin: &Vector<Real>) -> Result<(), WorldError> {
        self.check_unlocked()?;

        for (_, body) in self.bodies.iter_mut() {
            body.xf.translation.vector -= new_origin;
            body.sweep.c0 -= new_origin;
            body.sweep.c -= new_origin;
        }

        for (_, joint) in self.joints.iter_mut() {
            joint.constraint.shift_origin(new_origin);
        }

        self.contact_manager.broad_phase.shift_origin(new_origin);
        Ok(())
    }

    /// The number of broad-phase proxies.
    #[inline]
    pub fn proxy_count(&self) -> usize {
        self.contact_manager.broad_phase.proxy_count()
    }

    /*
     * Settings.
     */
    /// The gravity applied to dynamic bodies.
    #[inline]
    pub fn gravity(&self) -> Vector<Real> {
        self.gravity
    }

    /// Sets the gravity applied to dynamic bodies.
    #[inline]
    pub fn set_gravity(&mut self, gravity: Vector<Real>) {
        self.gravity = gravity;
    }

    /// The integration parameters.
    #[inline]
    pub fn integration_parameters(&self) -> &IntegrationParameters {
        &self.params
    }

    /// A mutable reference to the integration parameters.
    #[inline]
    pub fn integration_parameters_mut(&mut self) -> &mut IntegrationParameters {
        &mut self.params
    }

    /// Is a step in progress?
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.flags.contains(WorldFlags::LOCKED)
    }

    /// Are the impulses of the previous step used as a starting point by the solver?
    #[inline]
    pub fn is_warm_starting(&self) -> bool {
        self.warm_starting
    }

    /// Enables or disables warm starting.
    #[inline]
    pub fn set_warm_starting(&mut self, enabled: bool) {
        self.warm_starting = enabled;
    }

    /// Is continuous collision detection enabled?
    #[inline]
    pub fn is_continuous_physics(&self) -> bool {
        self.continuous_physics
    }

    /// Enables or disables continuous collision detection.
    #[inline]
    pub fn set_continuous_physics(&mut self, enabled: bool) {
        self.continuous_physics = enabled;
    }

    /// Is a step interrupted after each time-of-impact event?
    #[inline]
    pub fn is_sub_stepping(&self) -> bool {
        self.sub_stepping
    }

    /// Enables or disables sub-stepping.
    ///
    /// With sub-stepping, a step stops after resolving a single time of impact. The following
    /// steps resume the time-of-impact resolution before simulating anything else.
    #[inline]
    pub fn set_sub_stepping(&mut self, enabled: bool) {
        self.sub_stepping = enabled;
    }

    /// Was the last step fully completed?
    ///
    /// This is always `true` without sub-stepping.
    #[inline]
    pub fn is_step_complete(&self) -> bool {
        self.step_complete
    }

    /// Can bodies fall asleep?
    #[inline]
    pub fn is_sleeping_allowed(&self) -> bool {
        self.allow_sleep
    }

    /// Allows or prevents bodies from falling asleep.
    ///
    /// Disabling sleep wakes up every body.
    pub fn set_sleeping_allowed(&mut self, allowed: bool) {
        if allowed == self.allow_sleep {
            return;
        }

        self.allow_sleep = allowed;
        if !allowed {
            for (_, body) in self.bodies.iter_mut() {
                body.set_awake(true);
            }
        }
    }

    /// Are forces cleared automatically at the end of each step?
    #[inline]
    pub fn is_auto_clearing_forces(&self) -> bool {
        self.flags.contains(WorldFlags::CLEAR_FORCES)
    }

    /// Enables or disables the automatic clearing of forces at the end of each step.
    #[inline]
    pub fn set_auto_clear_forces(&mut self, enabled: bool) {
        self.flags.set(WorldFlags::CLEAR_FORCES, enabled);
    }

    /*
     * Simulation.
     */
    /// Advances the world by `dt` seconds.
    ///
    /// This updates the contacts, solves the velocity and position constraints of every awake
    /// island, then resolves the time of impacts of fast bodies if continuous physics is
    /// enabled. A zero `dt` only updates the contacts.
    pub fn step(&mut self, dt: Real, velocity_iterations: usize, position_iterations: usize) {
        // Create the contacts of the fixtures added since the last step.
        if self.flags.contains(WorldFlags::NEW_FIXTURE) {
            self.contact_manager
                .find_new_contacts(&mut self.bodies, &self.fixtures);
            self.flags.remove(WorldFlags::NEW_FIXTURE);
        }

        self.flags.insert(WorldFlags::LOCKED);

        let inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };
        let step = TimeStep {
            dt,
            inv_dt,
            dt_ratio: self.inv_dt0 * dt,
            velocity_iterations,
            position_iterations,
            warm_starting: self.warm_starting,
        };

        self.contact_manager
            .collide(&mut self.bodies, &self.fixtures);

        if self.step_complete && dt > 0.0 {
            self.solve(&step);
        }

        if self.continuous_physics && dt > 0.0 {
            self.solve_toi(&step);
        }

        if dt > 0.0 {
            self.inv_dt0 = inv_dt;
        }

        if self.flags.contains(WorldFlags::CLEAR_FORCES) {
            self.clear_forces();
        }

        self.flags.remove(WorldFlags::LOCKED);

        log::trace!(
            "Stepped {} bodies, {} contacts and {} joints.",
            self.bodies.len(),
            self.contact_manager.len(),
            self.joints.len()
        );
    }

    /// Finds the islands of awake bodies and solves each of them.
    fn solve(&mut self, step: &TimeStep) {
        let World {
            bodies,
            fixtures,
            joints,
            contact_manager,
            island,
            stack,
            seeds,
            params,
            gravity,
            allow_sleep,
            ..
        } = self;

        for (_, body) in bodies.iter_mut() {
            body.flags.remove(BodyFlags::ISLAND);
        }
        for (_, contact) in contact_manager.contacts.iter_mut() {
            contact.flags.remove(ContactFlags::ISLAND);
        }
        for (_, joint) in joints.iter_mut() {
            joint.island_flag = false;
        }

        seeds.clear();
        seeds.extend(bodies.iter().map(|(i, _)| BodyHandle(i)));

        for seed in seeds.iter().copied() {
            let body = &mut bodies[seed.0];
            if body.flags.contains(BodyFlags::ISLAND)
                || !body.is_awake()
                || !body.is_active()
                || body.is_static()
            {
                continue;
            }

            // Depth-first search through the constraint graph.
            island.clear();
            stack.clear();
            stack.push(seed);
            body.flags.insert(BodyFlags::ISLAND);

            while let Some(handle) = stack.pop() {
                let _ = island.add_body(handle);
                let body = &mut bodies[handle.0];
                debug_assert!(body.is_active());
                body.set_awake(true);

                // Static bodies do not propagate islands.
                if body.is_static() {
                    continue;
                }

                for i in 0..bodies[handle.0].contact_edges.len() {
                    let edge = bodies[handle.0].contact_edges[i];
                    let Some(contact) = contact_manager.contacts.get_mut(edge.contact.0) else {
                        continue;
                    };

                    if contact.flags.contains(ContactFlags::ISLAND)
                        || !contact.flags.contains(ContactFlags::ENABLED | ContactFlags::TOUCHING)
                    {
                        continue;
                    }

                    if fixtures[contact.fixture_a.0].is_sensor
                        || fixtures[contact.fixture_b.0].is_sensor
                    {
                        continue;
                    }

                    island.add_contact(edge.contact);
                    contact.flags.insert(ContactFlags::ISLAND);

                    let other = &mut bodies[edge.other.0];
                    if !other.flags.contains(BodyFlags::ISLAND) {
                        other.flags.insert(BodyFlags::ISLAND);
                        stack.push(edge.other);
                    }
                }

                for i in 0..bodies[handle.0].joint_edges.len() {
                    let edge = bodies[handle.0].joint_edges[i];
                    let joint = &mut joints[edge.joint.0];
                    if joint.island_flag {
                        continue;
                    }

                    let other = &mut bodies[edge.other.0];
                    if !other.is_active() {
                        continue;
                    }

                    island.add_joint(edge.joint);
                    joint.island_flag = true;

                    if !other.flags.contains(BodyFlags::ISLAND) {
                        other.flags.insert(BodyFlags::ISLAND);
                        stack.push(edge.other);
                    }
                }
            }

            island.solve(
                step,
                params,
                gravity,
                *allow_sleep,
                bodies,
                fixtures,
                &mut contact_manager.contacts,
                joints,
                &mut *contact_manager.contact_listener,
            );

            // Static bodies may take part in other islands.
            for handle in &island.bodies {
                let body = &mut bodies[handle.0];
                if body.is_static() {
                    body.flags.remove(BodyFlags::ISLAND);
                }
            }
        }

        // Bodies that were not part of an island did not move.
        for (_, body) in bodies.iter() {
            if body.flags.contains(BodyFlags::ISLAND) && !body.is_static() {
                synchronize_fixtures(body, fixtures, &mut *contact_manager.broad_phase);
            }
        }

        contact_manager.find_new_contacts(bodies, fixtures);
    }

    /// Finds the earliest time of impact, advances the involved bodies to it and solves the
    /// resulting sub-step. Repeats until no impact remains in the step.
    fn solve_toi(&mut self, step: &TimeStep) {
        let World {
            bodies,
            fixtures,
            contact_manager,
            island,
            time_of_impact,
            params,
            sub_stepping,
            step_complete,
            ..
        } = self;

        if *step_complete {
            for (_, body) in bodies.iter_mut() {
                body.flags.remove(BodyFlags::ISLAND);
                body.sweep.alpha0 = 0.0;
            }

            for (_, contact) in contact_manager.contacts.iter_mut() {
                contact.flags.remove(ContactFlags::TOI | ContactFlags::ISLAND);
                contact.toi_count = 0;
                contact.toi = 1.0;
            }
        }

        loop {
            // Find the first time of impact.
            let mut min_contact = None;
            let mut min_alpha = 1.0;

            for &handle in &contact_manager.contact_list {
                let Some(contact) = contact_manager.contacts.get_mut(handle.0) else {
                    continue;
                };

                if !contact.is_enabled() || contact.toi_count > params.max_sub_steps {
                    continue;
                }

                let alpha = if contact.flags.contains(ContactFlags::TOI) {
                    contact.toi
                } else {
                    let fixture_a = &fixtures[contact.fixture_a.0];
                    let fixture_b = &fixtures[contact.fixture_b.0];

                    if fixture_a.is_sensor || fixture_b.is_sensor {
                        continue;
                    }

                    if contact.body_a == contact.body_b {
                        continue;
                    }

                    let (Some(body_a), Some(body_b)) =
                        bodies.get2_mut(contact.body_a.0, contact.body_b.0)
                    else {
                        continue;
                    };

                    let active_a = body_a.is_awake() && !body_a.is_static();
                    let active_b = body_b.is_awake() && !body_b.is_static();
                    if !active_a && !active_b {
                        continue;
                    }

                    // Only bullets and non-dynamic bodies get continuous collision against
                    // dynamic bodies.
                    let collide_a = body_a.is_bullet() || !body_a.is_dynamic();
                    let collide_b = body_b.is_bullet() || !body_b.is_dynamic();
                    if !collide_a && !collide_b {
                        continue;
                    }

                    // Put the sweeps onto the same time interval.
                    let mut alpha0 = body_a.sweep.alpha0;
                    if body_a.sweep.alpha0 < body_b.sweep.alpha0 {
                        alpha0 = body_b.sweep.alpha0;
                        body_a.sweep.advance(alpha0);
                    } else if body_b.sweep.alpha0 < body_a.sweep.alpha0 {
                        alpha0 = body_a.sweep.alpha0;
                        body_b.sweep.advance(alpha0);
                    }

                    debug_assert!(alpha0 < 1.0);

                    let input = ToiInput {
                        proxy_a: fixture_a.shape().distance_proxy(contact.child_a),
                        proxy_b: fixture_b.shape().distance_proxy(contact.child_b),
                        sweep_a: body_a.sweep,
                        sweep_b: body_b.sweep,
                        t_max: 1.0,
                        linear_slop: params.linear_slop,
                    };
                    let output = time_of_impact.time_of_impact(&input);

                    // The sweeps are relative to alpha0.
                    let alpha = if output.state == ToiState::Touching {
                        (alpha0 + (1.0 - alpha0) * output.t).min(1.0)
                    } else {
                        1.0
                    };

                    contact.toi = alpha;
                    contact.flags.insert(ContactFlags::TOI);
                    alpha
                };

                if alpha < min_alpha {
                    min_contact = Some(handle);
                    min_alpha = alpha;
                }
            }

            let Some(min_contact) = min_contact else {
                *step_complete = true;
                break;
            };

            if 1.0 - 10.0 * Real::EPSILON < min_alpha {
                *step_complete = true;
                break;
            }

            let contact = &contact_manager.contacts[min_contact.0];
            let (handle_a, handle_b) = (contact.body_a, contact.body_b);
            let backup_a = bodies[handle_a.0].sweep;
            let backup_b = bodies[handle_b.0].sweep;

            bodies[handle_a.0].advance(min_alpha);
            bodies[handle_b.0].advance(min_alpha);

            // The impact likely produced new contact points.
            contact_manager.update_contact(min_contact, bodies, fixtures);
            let contact = &mut contact_manager.contacts[min_contact.0];
            contact.flags.remove(ContactFlags::TOI);
            contact.toi_count += 1;

            if !contact.is_enabled() || !contact.is_touching() {
                // The contact was disabled or is not solid: restore the sweeps.
                contact.set_enabled(false);
                for (handle, backup) in [(handle_a, backup_a), (handle_b, backup_b)] {
                    let body = &mut bodies[handle.0];
                    body.sweep = backup;
                    body.synchronize_transform();
                }
                continue;
            }

            contact.flags.insert(ContactFlags::ISLAND);

            // Build the island of the impact.
            island.clear();
            for handle in [handle_a, handle_b] {
                let body = &mut bodies[handle.0];
                body.set_awake(true);
                body.flags.insert(BodyFlags::ISLAND);
                let _ = island.add_body(handle);
            }
            island.add_contact(min_contact);

            // Add the contacts against static, kinematic and bullet bodies.
            for handle in [handle_a, handle_b] {
                if !bodies[handle.0].is_dynamic() {
                    continue;
                }

                let is_bullet = bodies[handle.0].is_bullet();

                for i in 0..bodies[handle.0].contact_edges.len() {
                    if island.body_count() == 2 * params.max_toi_contacts
                        || island.contact_count() == params.max_toi_contacts
                    {
                        break;
                    }

                    let edge = bodies[handle.0].contact_edges[i];
                    let Some(contact) = contact_manager.contacts.get(edge.contact.0) else {
                        continue;
                    };

                    if contact.flags.contains(ContactFlags::ISLAND) {
                        continue;
                    }

                    let other = &mut bodies[edge.other.0];
                    if other.is_dynamic() && !is_bullet && !other.is_bullet() {
                        continue;
                    }

                    if fixtures[contact.fixture_a.0].is_sensor
                        || fixtures[contact.fixture_b.0].is_sensor
                    {
                        continue;
                    }

                    // Tentatively advance the other body to the time of impact.
                    let backup = other.sweep;
                    if !other.flags.contains(BodyFlags::ISLAND) {
                        other.advance(min_alpha);
                    }

                    contact_manager.update_contact(edge.contact, bodies, fixtures);
                    let contact = &mut contact_manager.contacts[edge.contact.0];

                    if !contact.is_enabled() || !contact.is_touching() {
                        let other = &mut bodies[edge.other.0];
                        other.sweep = backup;
                        other.synchronize_transform();
                        continue;
                    }

                    contact.flags.insert(ContactFlags::ISLAND);
                    island.add_contact(edge.contact);

                    let other = &mut bodies[edge.other.0];
                    if other.flags.contains(BodyFlags::ISLAND) {
                        continue;
                    }

                    other.flags.insert(BodyFlags::ISLAND);
                    if !other.is_static() {
                        other.set_awake(true);
                    }
                    let _ = island.add_body(edge.other);
                }
            }

            let dt = (1.0 - min_alpha) * step.dt;
            let sub_step = TimeStep {
                dt,
                inv_dt: 1.0 / dt,
                dt_ratio: 1.0,
                velocity_iterations: step.velocity_iterations,
                position_iterations: params.toi_position_iterations,
                warm_starting: false,
            };

            island.solve_toi(
                &sub_step,
                params,
                handle_a,
                handle_b,
                bodies,
                fixtures,
                &contact_manager.contacts,
                &mut *contact_manager.contact_listener,
            );

            log::debug!(
                "Resolved time of impact {} between {:?} and {:?}.",
                min_alpha,
                handle_a,
                handle_b
            );

            // Reset the island flags and synchronize the broad-phase proxies.
            for handle in &island.bodies {
                let body = &mut bodies[handle.0];
                body.flags.remove(BodyFlags::ISLAND);

                if !body.is_dynamic() {
                    continue;
                }

                synchronize_fixtures(body, fixtures, &mut *contact_manager.broad_phase);

                // The body moved: the time of impact of its contacts must be recomputed.
                for edge in &body.contact_edges {
                    if let Some(contact) = contact_manager.contacts.get_mut(edge.contact.0) {
                        contact.flags.remove(ContactFlags::TOI | ContactFlags::ISLAND);
                    }
                }
            }

            // Commit the proxy movements so that new contacts are created.
            contact_manager.find_new_contacts(bodies, fixtures);

            if *sub_stepping {
                *step_complete = false;
                break;
            }
        }
    }
}

/// Updates the broad-phase proxies of a body so they enclose its motion over the step.
fn synchronize_fixtures(
    body: &Body,
    fixtures: &mut Arena<Fixture>,
    broad_phase: &mut dyn BroadPhase<FixtureProxy>,
) {
    let xf1 = body.sweep.transform(0.0);
    for handle in &body.fixtures {
        if let Some(fixture) = fixtures.get_mut(handle.0) {
            fixture.synchronize(broad_phase, &xf1, &body.xf);
        }
    }
}
