//! Joints between pairs of bodies.
//!
//! Every joint type implements [`JointConstraint`], the interface used by the island solver.
//! The bodies attached by a joint never collide with each other unless the joint was created
//! with [`JointDef::collide_connected`].

pub use self::distance_joint::DistanceJoint;
pub use self::friction_joint::FrictionJoint;
pub use self::joint::{
    soft_constraint_coefficients, BodyPair, Joint, JointConstraint, JointDef, JointHandle,
    JointType, LimitState,
};
pub use self::motor_joint::MotorJoint;
pub use self::mouse_joint::MouseJoint;
pub use self::prismatic_joint::PrismaticJoint;
pub use self::pulley_joint::PulleyJoint;
pub use self::revolute_joint::RevoluteJoint;
pub use self::rope_joint::RopeJoint;
pub use self::weld_joint::WeldJoint;
pub use self::wheel_joint::WheelJoint;

mod distance_joint;
mod friction_joint;
mod joint;
mod motor_joint;
mod mouse_joint;
mod prismatic_joint;
mod pulley_joint;
mod revolute_joint;
mod rope_joint;
mod weld_joint;
mod wheel_joint;
