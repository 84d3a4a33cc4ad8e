use crate::dynamics::{BodyHandle, Position, SolverBody, SolverData, Velocity};
use crate::math::{Isometry, Point, Real, Vector};
use crate::utils::inv;
use alloc::boxed::Box;
use core::fmt::Debug;
use downcast_rs::{impl_downcast, DowncastSync};
use na::RealField;
use thunderdome::Index;

/// The handle of a joint inserted into a [`World`](crate::dynamics::World).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct JointHandle(pub(crate) Index);

/// The type of a joint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum JointType {
    /// A [`DistanceJoint`](crate::dynamics::DistanceJoint).
    Distance,
    /// A [`RevoluteJoint`](crate::dynamics::RevoluteJoint).
    Revolute,
    /// A [`PrismaticJoint`](crate::dynamics::PrismaticJoint).
    Prismatic,
    /// A [`WheelJoint`](crate::dynamics::WheelJoint).
    Wheel,
    /// A [`WeldJoint`](crate::dynamics::WeldJoint).
    Weld,
    /// A [`MouseJoint`](crate::dynamics::MouseJoint).
    Mouse,
    /// A [`FrictionJoint`](crate::dynamics::FrictionJoint).
    Friction,
    /// A [`MotorJoint`](crate::dynamics::MotorJoint).
    Motor,
    /// A [`RopeJoint`](crate::dynamics::RopeJoint).
    Rope,
    /// A [`PulleyJoint`](crate::dynamics::PulleyJoint).
    Pulley,
    /// A user-defined joint.
    Custom,
}

/// The state of a joint limit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum LimitState {
    /// The limit does not constrain the motion.
    #[default]
    Inactive,
    /// The joint is at or below its lower limit.
    AtLower,
    /// The joint is at or above its upper limit.
    AtUpper,
    /// Both limits are equal: the joint is locked.
    Equal,
}

/// The solver-side interface of a joint.
///
/// Each time step, the island solver calls [`JointConstraint::init_velocity_constraints`]
/// once, then [`JointConstraint::solve_velocity_constraints`] once per velocity iteration, and
/// finally [`JointConstraint::solve_position_constraints`] once per position iteration until
/// every constraint of the island reports it is satisfied.
pub trait JointConstraint: DowncastSync + Debug {
    /// The type of this joint.
    fn joint_type(&self) -> JointType;

    /// The world anchor on the first body, given the transform of this body.
    fn anchor_a(&self, xf_a: &Isometry<Real>) -> Point<Real>;

    /// The world anchor on the second body, given the transform of this body.
    fn anchor_b(&self, xf_b: &Isometry<Real>) -> Point<Real>;

    /// The reaction force applied on the second body at its anchor.
    fn reaction_force(&self, inv_dt: Real) -> Vector<Real>;

    /// The reaction torque applied on the second body.
    fn reaction_torque(&self, inv_dt: Real) -> Real;

    /// Translates the world-space data of this joint so that `new_origin` becomes the origin.
    fn shift_origin(&mut self, _new_origin: &Vector<Real>) {}

    /// Computes the Jacobians and effective masses from the current positions, and applies the
    /// warm-starting impulses.
    fn init_velocity_constraints(
        &mut self,
        body_a: &SolverBody,
        body_b: &SolverBody,
        data: &mut SolverData,
    );

    /// Runs one iteration of the velocity solver.
    fn solve_velocity_constraints(&mut self, data: &mut SolverData);

    /// Runs one iteration of the position solver.
    ///
    /// Returns `true` if the position error is within tolerance.
    fn solve_position_constraints(&mut self, data: &mut SolverData) -> bool;
}

impl_downcast!(sync JointConstraint);

/// The solver data of both bodies attached to a joint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyPair {
    /// The island index of the first body.
    pub index_a: usize,
    /// The island index of the second body.
    pub index_b: usize,
    /// The local center of mass of the first body.
    pub local_center_a: Point<Real>,
    /// The local center of mass of the second body.
    pub local_center_b: Point<Real>,
    /// The inverse mass of the first body.
    pub inv_mass_a: Real,
    /// The inverse mass of the second body.
    pub inv_mass_b: Real,
    /// The inverse angular inertia of the first body.
    pub inv_i_a: Real,
    /// The inverse angular inertia of the second body.
    pub inv_i_b: Real,
}

impl Default for BodyPair {
    fn default() -> Self {
        Self {
            index_a: 0,
            index_b: 0,
            local_center_a: Point::origin(),
            local_center_b: Point::origin(),
            inv_mass_a: 0.0,
            inv_mass_b: 0.0,
            inv_i_a: 0.0,
            inv_i_b: 0.0,
        }
    }
}

impl BodyPair {
    /// Gathers the solver data of both bodies.
    pub fn new(body_a: &SolverBody, body_b: &SolverBody) -> Self {
        Self {
            index_a: body_a.index,
            index_b: body_b.index,
            local_center_a: body_a.local_center,
            local_center_b: body_b.local_center,
            inv_mass_a: body_a.inv_mass,
            inv_mass_b: body_b.inv_mass,
            inv_i_a: body_a.inv_inertia,
            inv_i_b: body_b.inv_inertia,
        }
    }

    /// The working positions of both bodies.
    #[inline]
    pub fn positions(&self, data: &SolverData) -> (Position, Position) {
        (data.positions[self.index_a], data.positions[self.index_b])
    }

    /// The working velocities of both bodies.
    #[inline]
    pub fn velocities(&self, data: &SolverData) -> (Velocity, Velocity) {
        (data.velocities[self.index_a], data.velocities[self.index_b])
    }

    /// Writes the working positions of both bodies.
    #[inline]
    pub fn set_positions(&self, data: &mut SolverData, a: Position, b: Position) {
        data.positions[self.index_a] = a;
        data.positions[self.index_b] = b;
    }

    /// Writes the working velocities of both bodies.
    #[inline]
    pub fn set_velocities(&self, data: &mut SolverData, a: Velocity, b: Velocity) {
        data.velocities[self.index_a] = a;
        data.velocities[self.index_b] = b;
    }
}

/// The coefficients `(gamma, beta)` of a soft constraint with the given effective mass,
/// stiffness and damping, discretized as an implicit spring.
///
/// `gamma` softens the effective mass and `beta` converts the position error into a velocity
/// bias.
pub fn soft_constraint_coefficients(
    mass: Real,
    frequency_hz: Real,
    damping_ratio: Real,
    dt: Real,
) -> (Real, Real) {
    let omega = Real::two_pi() * frequency_hz;
    let d = 2.0 * mass * damping_ratio * omega;
    let k = mass * omega * omega;
    let gamma = inv(dt * (d + dt * k));
    (gamma, dt * k * gamma)
}

/// The description of a joint to create.
#[derive(Debug)]
pub struct JointDef {
    /// The first attached body.
    pub body_a: BodyHandle,
    /// The second attached body.
    pub body_b: BodyHandle,
    /// Can the attached bodies collide with each other?
    pub collide_connected: bool,
    /// Data associated to the joint by the user.
    pub user_data: u128,
    /// The joint type-specific data.
    pub constraint: Box<dyn JointConstraint>,
}

impl JointDef {
    /// A joint attaching the given bodies.
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, constraint: impl JointConstraint) -> Self {
        Self {
            body_a,
            body_b,
            collide_connected: false,
            user_data: 0,
            constraint: Box::new(constraint),
        }
    }

    /// Sets whether the attached bodies can collide.
    pub fn collide_connected(mut self, collide_connected: bool) -> Self {
        self.collide_connected = collide_connected;
        self
    }

    /// Sets the user data.
    pub fn user_data(mut self, user_data: u128) -> Self {
        self.user_data = user_data;
        self
    }
}

/// A constraint between two bodies.
#[derive(Debug)]
pub struct Joint {
    pub(crate) body_a: BodyHandle,
    pub(crate) body_b: BodyHandle,
    pub(crate) collide_connected: bool,
    pub(crate) island_flag: bool,
    pub(crate) user_data: u128,
    pub(crate) constraint: Box<dyn JointConstraint>,
}

impl Joint {
    pub(crate) fn new(def: JointDef) -> Self {
        Self {
            body_a: def.body_a,
            body_b: def.body_b,
            collide_connected: def.collide_connected,
            island_flag: false,
            user_data: def.user_data,
            constraint: def.constraint,
        }
    }

    /// The first attached body.
    #[inline]
    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    /// The second attached body.
    #[inline]
    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    /// Can the attached bodies collide with each other?
    #[inline]
    pub fn collide_connected(&self) -> bool {
        self.collide_connected
    }

    /// The type of this joint.
    #[inline]
    pub fn joint_type(&self) -> JointType {
        self.constraint.joint_type()
    }

    /// The type-specific data of this joint.
    #[inline]
    pub fn constraint(&self) -> &dyn JointConstraint {
        &*self.constraint
    }

    /// Converts this joint to the given joint type, if it is one.
    #[inline]
    pub fn as_joint<T: JointConstraint>(&self) -> Option<&T> {
        self.constraint.downcast_ref()
    }

    /// The user data of this joint.
    #[inline]
    pub fn user_data(&self) -> u128 {
        self.user_data
    }

    /// Sets the user data of this joint.
    #[inline]
    pub fn set_user_data(&mut self, user_data: u128) {
        self.user_data = user_data;
    }
}

#[cfg(test)]
mod test {
    use super::soft_constraint_coefficients;
    use crate::math::Real;
    use na::RealField;

    #[test]
    fn soft_constraint_matches_an_implicit_spring() {
        let (mass, hz, zeta, dt) = (2.0, 4.0, 0.5, 1.0 / 60.0);
        let (gamma, beta) = soft_constraint_coefficients(mass, hz, zeta, dt);

        let omega = Real::two_pi() * hz;
        let k = mass * omega * omega;
        let c = 2.0 * mass * zeta * omega;
        assert_relative_eq!(gamma, 1.0 / (dt * (c + dt * k)), epsilon = 1.0e-4);
        assert_relative_eq!(beta, dt * k * gamma, epsilon = 1.0e-5);

        // A zero frequency gives a rigid constraint.
        assert_eq!(soft_constraint_coefficients(mass, 0.0, zeta, dt), (0.0, 0.0));
    }
}
