use crate::dynamics::sweep::transform_from_center;
use crate::dynamics::{ContactHandle, FixtureHandle, JointHandle, Sweep};
use crate::mass_properties::MassProperties;
use crate::math::{Isometry, Point, Real, Rotation, Translation, Vector};
use crate::utils::WCross;
use smallvec::SmallVec;
use thunderdome::Index;

/// The handle of a body inserted into a [`World`](crate::dynamics::World).
///
/// Handles are generational: once the body is destroyed, its handle stays invalid even after
/// another body reuses its storage slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) Index);

/// How a body reacts to forces and contacts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum BodyType {
    /// Zero mass, zero velocity, may be moved manually.
    #[default]
    Static,
    /// Zero mass, velocity set by the user, moved by the solver.
    Kinematic,
    /// Positive mass, velocity determined by forces, moved by the solver.
    Dynamic,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub(crate) struct BodyFlags(u16);

bitflags::bitflags! {
    impl BodyFlags: u16 {
        /// The body has been visited by the current island search.
        const ISLAND = 1;
        const AWAKE = 1 << 1;
        const AUTO_SLEEP = 1 << 2;
        const BULLET = 1 << 3;
        const FIXED_ROTATION = 1 << 4;
        const ACTIVE = 1 << 5;
    }
}

/// Links a body to one of its contacts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContactEdge {
    /// The contact.
    pub contact: ContactHandle,
    /// The other body of the contact.
    pub other: BodyHandle,
}

/// Links a body to one of its joints.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct JointEdge {
    /// The joint.
    pub joint: JointHandle,
    /// The other body of the joint.
    pub other: BodyHandle,
    /// Can the bodies attached to this joint collide?
    pub collide_connected: bool,
}

/// The description of a body to create.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BodyDef {
    /// The body type.
    pub body_type: BodyType,
    /// The world position of the body origin.
    pub position: Point<Real>,
    /// The world angle of the body, in radians.
    pub angle: Real,
    /// The linear velocity of the body origin.
    pub linear_velocity: Vector<Real>,
    /// The angular velocity of the body.
    pub angular_velocity: Real,
    /// Reduces the linear velocity over time.
    pub linear_damping: Real,
    /// Reduces the angular velocity over time.
    pub angular_damping: Real,
    /// Can this body fall asleep?
    pub allow_sleep: bool,
    /// Is this body initially awake?
    pub awake: bool,
    /// Prevents the body from rotating.
    pub fixed_rotation: bool,
    /// Enables continuous collision against other dynamic bodies.
    pub bullet: bool,
    /// Does this body start out active?
    pub active: bool,
    /// Scales the gravity applied to this body.
    pub gravity_scale: Real,
    /// Data associated to the body by the user.
    pub user_data: u128,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self::new(BodyType::Static)
    }
}

impl BodyDef {
    /// A description of a body of the given type, at rest at the origin.
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            position: Point::origin(),
            angle: 0.0,
            linear_velocity: Vector::zeros(),
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            allow_sleep: true,
            awake: true,
            fixed_rotation: false,
            bullet: false,
            active: true,
            gravity_scale: 1.0,
            user_data: 0,
        }
    }

    /// A description of a dynamic body.
    pub fn dynamic() -> Self {
        Self::new(BodyType::Dynamic)
    }

    /// A description of a kinematic body.
    pub fn kinematic() -> Self {
        Self::new(BodyType::Kinematic)
    }

    /// A description of a static body.
    pub fn fixed() -> Self {
        Self::new(BodyType::Static)
    }

    /// Sets the world position of the body origin.
    pub fn position(mut self, position: Point<Real>) -> Self {
        self.position = position;
        self
    }

    /// Sets the world angle of the body.
    pub fn angle(mut self, angle: Real) -> Self {
        self.angle = angle;
        self
    }

    /// Sets the initial linear velocity.
    pub fn linear_velocity(mut self, linear_velocity: Vector<Real>) -> Self {
        self.linear_velocity = linear_velocity;
        self
    }

    /// Sets the initial angular velocity.
    pub fn angular_velocity(mut self, angular_velocity: Real) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Sets the linear damping.
    pub fn linear_damping(mut self, damping: Real) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Sets the angular damping.
    pub fn angular_damping(mut self, damping: Real) -> Self {
        self.angular_damping = damping;
        self
    }

    /// Sets whether the body can fall asleep.
    pub fn allow_sleep(mut self, allow_sleep: bool) -> Self {
        self.allow_sleep = allow_sleep;
        self
    }

    /// Sets whether the body starts awake.
    pub fn awake(mut self, awake: bool) -> Self {
        self.awake = awake;
        self
    }

    /// Sets whether the body is prevented from rotating.
    pub fn fixed_rotation(mut self, fixed_rotation: bool) -> Self {
        self.fixed_rotation = fixed_rotation;
        self
    }

    /// Sets whether the body is a bullet.
    pub fn bullet(mut self, bullet: bool) -> Self {
        self.bullet = bullet;
        self
    }

    /// Sets whether the body starts active.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets the gravity scale.
    pub fn gravity_scale(mut self, gravity_scale: Real) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    /// Sets the user data.
    pub fn user_data(mut self, user_data: u128) -> Self {
        self.user_data = user_data;
        self
    }

    /// Are all the numerical fields of this description finite and in range?
    pub fn is_valid(&self) -> bool {
        self.position.coords.iter().all(|e| e.is_finite())
            && self.angle.is_finite()
            && self.linear_velocity.iter().all(|e| e.is_finite())
            && self.angular_velocity.is_finite()
            && self.angular_damping.is_finite()
            && self.angular_damping >= 0.0
            && self.linear_damping.is_finite()
            && self.linear_damping >= 0.0
            && self.gravity_scale.is_finite()
    }
}

/// A rigid body.
///
/// Bodies are created by the [`World`](crate::dynamics::World) and carry the fixtures, contact
/// edges and joint edges attached to them.
#[derive(Clone, Debug)]
pub struct Body {
    pub(crate) body_type: BodyType,
    pub(crate) flags: BodyFlags,
    pub(crate) xf: Isometry<Real>,
    pub(crate) sweep: Sweep,
    pub(crate) linvel: Vector<Real>,
    pub(crate) angvel: Real,
    pub(crate) force: Vector<Real>,
    pub(crate) torque: Real,
    pub(crate) mass: Real,
    pub(crate) inv_mass: Real,
    // Rotational inertia about the center of mass.
    pub(crate) inertia: Real,
    pub(crate) inv_inertia: Real,
    pub(crate) linear_damping: Real,
    pub(crate) angular_damping: Real,
    pub(crate) gravity_scale: Real,
    pub(crate) sleep_time: Real,
    pub(crate) user_data: u128,
    pub(crate) fixtures: SmallVec<[FixtureHandle; 4]>,
    pub(crate) contact_edges: SmallVec<[ContactEdge; 8]>,
    pub(crate) joint_edges: SmallVec<[JointEdge; 4]>,
}

impl Body {
    pub(crate) fn new(def: &BodyDef) -> Self {
        debug_assert!(def.is_valid());

        let mut flags = BodyFlags::empty();
        flags.set(BodyFlags::BULLET, def.bullet);
        flags.set(BodyFlags::FIXED_ROTATION, def.fixed_rotation);
        flags.set(BodyFlags::AUTO_SLEEP, def.allow_sleep);
        flags.set(BodyFlags::AWAKE, def.awake);
        flags.set(BodyFlags::ACTIVE, def.active);

        let xf = Isometry::from_parts(
            Translation::from(def.position.coords),
            Rotation::new(def.angle),
        );

        let (mass, inv_mass) = if def.body_type == BodyType::Dynamic {
            (1.0, 1.0)
        } else {
            (0.0, 0.0)
        };

        Self {
            body_type: def.body_type,
            flags,
            xf,
            sweep: Sweep::at_rest(&xf, Point::origin()),
            linvel: def.linear_velocity,
            angvel: def.angular_velocity,
            force: Vector::zeros(),
            torque: 0.0,
            mass,
            inv_mass,
            inertia: 0.0,
            inv_inertia: 0.0,
            linear_damping: def.linear_damping,
            angular_damping: def.angular_damping,
            gravity_scale: def.gravity_scale,
            sleep_time: 0.0,
            user_data: def.user_data,
            fixtures: SmallVec::new(),
            contact_edges: SmallVec::new(),
            joint_edges: SmallVec::new(),
        }
    }

    /// The type of this body.
    #[inline]
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Is this body dynamic?
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// Is this body static?
    #[inline]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// The world transform of the body origin.
    #[inline]
    pub fn transform(&self) -> &Isometry<Real> {
        &self.xf
    }

    /// The world position of the body origin.
    #[inline]
    pub fn position(&self) -> Point<Real> {
        self.xf.translation.vector.into()
    }

    /// The world angle of the body, in radians.
    ///
    /// Unlike the rotation of [`Body::transform`], this is not wrapped to `[-π, π]`.
    #[inline]
    pub fn angle(&self) -> Real {
        self.sweep.a
    }

    /// The world position of the center of mass.
    #[inline]
    pub fn world_center(&self) -> Point<Real> {
        self.sweep.c
    }

    /// The local position of the center of mass.
    #[inline]
    pub fn local_center(&self) -> Point<Real> {
        self.sweep.local_center
    }

    /// The motion of the center of mass over the current step.
    #[inline]
    pub fn sweep(&self) -> &Sweep {
        &self.sweep
    }

    /// The linear velocity of the center of mass.
    #[inline]
    pub fn linear_velocity(&self) -> Vector<Real> {
        self.linvel
    }

    /// The angular velocity.
    #[inline]
    pub fn angular_velocity(&self) -> Real {
        self.angvel
    }

    /// Sets the linear velocity of the center of mass.
    ///
    /// This has no effect on static bodies, and wakes up the body if the velocity is not zero.
    pub fn set_linear_velocity(&mut self, linvel: Vector<Real>) {
        if self.body_type == BodyType::Static {
            return;
        }

        if linvel.norm_squared() > 0.0 {
            self.set_awake(true);
        }

        self.linvel = linvel;
    }

    /// Sets the angular velocity.
    ///
    /// This has no effect on static bodies, and wakes up the body if the velocity is not zero.
    pub fn set_angular_velocity(&mut self, angvel: Real) {
        if self.body_type == BodyType::Static {
            return;
        }

        if angvel * angvel > 0.0 {
            self.set_awake(true);
        }

        self.angvel = angvel;
    }

    /// The force accumulated since the last clearing.
    #[inline]
    pub fn force(&self) -> Vector<Real> {
        self.force
    }

    /// The torque accumulated since the last clearing.
    #[inline]
    pub fn torque(&self) -> Real {
        self.torque
    }

    /// Applies a force at a world point.
    ///
    /// If the force is not applied at the center of mass, it also generates a torque. Sleeping
    /// bodies ignore the force unless `wake` is `true`.
    pub fn apply_force(&mut self, force: Vector<Real>, point: Point<Real>, wake: bool) {
        if self.body_type != BodyType::Dynamic {
            return;
        }

        if wake && !self.is_awake() {
            self.set_awake(true);
        }

        if self.is_awake() {
            self.force += force;
            self.torque += (point - self.sweep.c).gcross(force);
        }
    }

    /// Applies a force at the center of mass.
    pub fn apply_force_to_center(&mut self, force: Vector<Real>, wake: bool) {
        if self.body_type != BodyType::Dynamic {
            return;
        }

        if wake && !self.is_awake() {
            self.set_awake(true);
        }

        if self.is_awake() {
            self.force += force;
        }
    }

    /// Applies a torque.
    pub fn apply_torque(&mut self, torque: Real, wake: bool) {
        if self.body_type != BodyType::Dynamic {
            return;
        }

        if wake && !self.is_awake() {
            self.set_awake(true);
        }

        if self.is_awake() {
            self.torque += torque;
        }
    }

    /// Applies an impulse at a world point, immediately modifying the velocity.
    pub fn apply_linear_impulse(&mut self, impulse: Vector<Real>, point: Point<Real>, wake: bool) {
        if self.body_type != BodyType::Dynamic {
            return;
        }

        if wake && !self.is_awake() {
            self.set_awake(true);
        }

        if self.is_awake() {
            self.linvel += impulse * self.inv_mass;
            self.angvel += self.inv_inertia * (point - self.sweep.c).gcross(impulse);
        }
    }

    /// Applies an angular impulse, immediately modifying the angular velocity.
    pub fn apply_angular_impulse(&mut self, impulse: Real, wake: bool) {
        if self.body_type != BodyType::Dynamic {
            return;
        }

        if wake && !self.is_awake() {
            self.set_awake(true);
        }

        if self.is_awake() {
            self.angvel += self.inv_inertia * impulse;
        }
    }

    /// The mass of this body.
    #[inline]
    pub fn mass(&self) -> Real {
        self.mass
    }

    /// The inverse mass of this body, or zero for static and kinematic bodies.
    #[inline]
    pub fn inv_mass(&self) -> Real {
        self.inv_mass
    }

    /// The rotational inertia of this body about its local origin.
    #[inline]
    pub fn inertia(&self) -> Real {
        self.inertia + self.mass * self.sweep.local_center.coords.norm_squared()
    }

    /// The inverse rotational inertia about the center of mass.
    #[inline]
    pub fn inv_inertia(&self) -> Real {
        self.inv_inertia
    }

    /// The mass, center of mass, and inertia about the center of mass of this body.
    pub fn mass_properties(&self) -> MassProperties {
        MassProperties::new(self.sweep.local_center, self.mass, self.inertia)
    }

    /// Applies the given mass properties, moving the center of mass while preserving the
    /// velocity of the points of the body.
    pub(crate) fn apply_mass_properties(&mut self, props: &MassProperties) {
        self.inv_mass = 0.0;
        self.inertia = 0.0;
        self.inv_inertia = 0.0;

        self.mass = props.mass;
        if self.mass <= 0.0 {
            self.mass = 1.0;
        }
        self.inv_mass = 1.0 / self.mass;

        if props.principal_inertia > 0.0 && !self.is_fixed_rotation() {
            self.inertia = props.principal_inertia;
            self.inv_inertia = 1.0 / self.inertia;
        }

        let old_center = self.sweep.c;
        self.sweep.local_center = props.local_com;
        self.sweep.c = self.xf * props.local_com;
        self.sweep.c0 = self.sweep.c;

        self.linvel += self.angvel.gcross(self.sweep.c - old_center);
    }

    /// Resets the mass of a static or kinematic body.
    pub(crate) fn clear_mass_properties(&mut self) {
        self.mass = 0.0;
        self.inv_mass = 0.0;
        self.inertia = 0.0;
        self.inv_inertia = 0.0;
        self.sweep.local_center = Point::origin();
        self.sweep.c = self.xf.translation.vector.into();
        self.sweep.c0 = self.sweep.c;
        self.sweep.a0 = self.sweep.a;
    }

    /// The linear damping.
    #[inline]
    pub fn linear_damping(&self) -> Real {
        self.linear_damping
    }

    /// Sets the linear damping.
    #[inline]
    pub fn set_linear_damping(&mut self, damping: Real) {
        self.linear_damping = damping;
    }

    /// The angular damping.
    #[inline]
    pub fn angular_damping(&self) -> Real {
        self.angular_damping
    }

    /// Sets the angular damping.
    #[inline]
    pub fn set_angular_damping(&mut self, damping: Real) {
        self.angular_damping = damping;
    }

    /// The gravity scale.
    #[inline]
    pub fn gravity_scale(&self) -> Real {
        self.gravity_scale
    }

    /// Sets the gravity scale.
    #[inline]
    pub fn set_gravity_scale(&mut self, scale: Real) {
        self.gravity_scale = scale;
    }

    /// Is this body treated as a bullet by continuous collision detection?
    #[inline]
    pub fn is_bullet(&self) -> bool {
        self.flags.contains(BodyFlags::BULLET)
    }

    /// Sets whether this body is treated as a bullet by continuous collision detection.
    #[inline]
    pub fn set_bullet(&mut self, bullet: bool) {
        self.flags.set(BodyFlags::BULLET, bullet);
    }

    /// Can this body fall asleep?
    #[inline]
    pub fn is_sleeping_allowed(&self) -> bool {
        self.flags.contains(BodyFlags::AUTO_SLEEP)
    }

    /// Sets whether this body can fall asleep. Disallowing sleep wakes the body up.
    pub fn set_sleeping_allowed(&mut self, allowed: bool) {
        if allowed {
            self.flags.insert(BodyFlags::AUTO_SLEEP);
        } else {
            self.flags.remove(BodyFlags::AUTO_SLEEP);
            self.set_awake(true);
        }
    }

    /// Is this body awake?
    #[inline]
    pub fn is_awake(&self) -> bool {
        self.flags.contains(BodyFlags::AWAKE)
    }

    /// Wakes up or puts to sleep this body.
    ///
    /// A sleeping body has zero velocity and no accumulated force.
    pub fn set_awake(&mut self, awake: bool) {
        if awake {
            if !self.is_awake() {
                self.flags.insert(BodyFlags::AWAKE);
                self.sleep_time = 0.0;
            }
        } else {
            self.flags.remove(BodyFlags::AWAKE);
            self.sleep_time = 0.0;
            self.linvel = Vector::zeros();
            self.angvel = 0.0;
            self.force = Vector::zeros();
            self.torque = 0.0;
        }
    }

    /// The time this body has been still, in seconds.
    #[inline]
    pub fn sleep_time(&self) -> Real {
        self.sleep_time
    }

    /// Is this body active?
    ///
    /// Inactive bodies are not simulated and do not collide.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.flags.contains(BodyFlags::ACTIVE)
    }

    /// Is this body prevented from rotating?
    #[inline]
    pub fn is_fixed_rotation(&self) -> bool {
        self.flags.contains(BodyFlags::FIXED_ROTATION)
    }

    /// The fixtures attached to this body.
    #[inline]
    pub fn fixtures(&self) -> &[FixtureHandle] {
        &self.fixtures
    }

    /// The contacts involving this body.
    #[inline]
    pub fn contact_edges(&self) -> &[ContactEdge] {
        &self.contact_edges
    }

    /// The joints attached to this body.
    #[inline]
    pub fn joint_edges(&self) -> &[JointEdge] {
        &self.joint_edges
    }

    /// The user data of this body.
    #[inline]
    pub fn user_data(&self) -> u128 {
        self.user_data
    }

    /// Sets the user data of this body.
    #[inline]
    pub fn set_user_data(&mut self, user_data: u128) {
        self.user_data = user_data;
    }

    /// Transforms a point from the body local-space to world-space.
    #[inline]
    pub fn world_point(&self, local_point: &Point<Real>) -> Point<Real> {
        self.xf * local_point
    }

    /// Rotates a vector from the body local-space to world-space.
    #[inline]
    pub fn world_vector(&self, local_vector: &Vector<Real>) -> Vector<Real> {
        self.xf.rotation * local_vector
    }

    /// Transforms a point from world-space to the body local-space.
    #[inline]
    pub fn local_point(&self, world_point: &Point<Real>) -> Point<Real> {
        self.xf.inverse_transform_point(world_point)
    }

    /// Rotates a vector from world-space to the body local-space.
    #[inline]
    pub fn local_vector(&self, world_vector: &Vector<Real>) -> Vector<Real> {
        self.xf.inverse_transform_vector(world_vector)
    }

    /// The velocity of the body material at the given world point.
    pub fn linear_velocity_from_world_point(&self, world_point: &Point<Real>) -> Vector<Real> {
        self.linvel + self.angvel.gcross(world_point - self.sweep.c)
    }

    /// The velocity of the body material at the given local point.
    pub fn linear_velocity_from_local_point(&self, local_point: &Point<Real>) -> Vector<Real> {
        self.linear_velocity_from_world_point(&self.world_point(local_point))
    }

    /// Recomputes the transform from the end of the sweep.
    pub(crate) fn synchronize_transform(&mut self) {
        self.xf = self.sweep.final_transform();
    }

    /// Rewinds the end of the sweep to the normalized time `alpha`.
    pub(crate) fn advance(&mut self, alpha: Real) {
        self.sweep.advance(alpha);
        self.sweep.c = self.sweep.c0;
        self.sweep.a = self.sweep.a0;
        self.xf = transform_from_center(self.sweep.c, self.sweep.a, self.sweep.local_center);
    }

    /// Can this body collide with `other`, as far as body types and joints are concerned?
    pub(crate) fn should_collide(&self, other_handle: BodyHandle, other: &Body) -> bool {
        if self.body_type != BodyType::Dynamic && other.body_type != BodyType::Dynamic {
            return false;
        }

        !self
            .joint_edges
            .iter()
            .any(|edge| edge.other == other_handle && !edge.collide_connected)
    }

    /// Removes the edge to `contact`.
    pub(crate) fn unlink_contact(&mut self, contact: ContactHandle) {
        if let Some(i) = self.contact_edges.iter().position(|e| e.contact == contact) {
            let _ = self.contact_edges.remove(i);
        }
    }

    /// Removes the edge to `joint`.
    pub(crate) fn unlink_joint(&mut self, joint: JointHandle) {
        if let Some(i) = self.joint_edges.iter().position(|e| e.joint == joint) {
            let _ = self.joint_edges.remove(i);
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Body, BodyDef};
    use crate::mass_properties::MassProperties;
    use crate::math::{Point, Vector};

    #[test]
    fn static_bodies_ignore_forces_and_velocities() {
        let mut body = Body::new(&BodyDef::default());
        body.apply_force_to_center(Vector::new(1.0, 0.0), true);
        body.set_linear_velocity(Vector::new(1.0, 0.0));
        assert_eq!(body.force(), Vector::zeros());
        assert_eq!(body.linear_velocity(), Vector::zeros());
        assert_eq!(body.inv_mass(), 0.0);
    }

    #[test]
    fn sleeping_clears_the_motion() {
        let mut body = Body::new(&BodyDef::dynamic().linear_velocity(Vector::new(1.0, 2.0)));
        body.apply_torque(3.0, true);
        body.set_awake(false);
        assert!(!body.is_awake());
        assert_eq!(body.linear_velocity(), Vector::zeros());
        assert_eq!(body.torque(), 0.0);

        // Forces on a sleeping body are ignored unless they wake it.
        body.apply_force_to_center(Vector::new(1.0, 0.0), false);
        assert_eq!(body.force(), Vector::zeros());
        body.apply_force_to_center(Vector::new(1.0, 0.0), true);
        assert!(body.is_awake());
        assert_eq!(body.force(), Vector::new(1.0, 0.0));
    }

    #[test]
    fn moving_the_center_of_mass_preserves_point_velocities() {
        let mut body = Body::new(&BodyDef::dynamic().angular_velocity(2.0));
        let point = Point::new(3.0, 1.0);
        let before = body.linear_velocity_from_world_point(&point);

        body.apply_mass_properties(&MassProperties::new(Point::new(1.0, 0.0), 2.0, 0.5));
        assert_relative_eq!(body.world_center(), Point::new(1.0, 0.0));
        assert_relative_eq!(body.inv_mass(), 0.5);
        assert_relative_eq!(
            body.linear_velocity_from_world_point(&point),
            before,
            epsilon = 1.0e-5
        );
    }

    #[test]
    fn zero_mass_defaults_to_one() {
        let mut body = Body::new(&BodyDef::dynamic());
        body.apply_mass_properties(&MassProperties::zero());
        assert_eq!(body.mass(), 1.0);
        assert_eq!(body.inv_mass(), 1.0);
        assert_eq!(body.inv_inertia(), 0.0);
    }
}
