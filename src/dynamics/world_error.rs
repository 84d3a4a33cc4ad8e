use crate::dynamics::{BodyHandle, ContactHandle, FixtureHandle, JointHandle};

/// Errors returned by the structural operations of a [`World`](crate::dynamics::World).
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The world is in the middle of a time step.
    #[error("the world is locked during a time step")]
    Locked,
    /// The body handle does not refer to a body of this world.
    #[error("invalid body handle {0:?}")]
    InvalidBodyHandle(BodyHandle),
    /// The fixture handle does not refer to a fixture of this world.
    #[error("invalid fixture handle {0:?}")]
    InvalidFixtureHandle(FixtureHandle),
    /// The joint handle does not refer to a joint of this world.
    #[error("invalid joint handle {0:?}")]
    InvalidJointHandle(JointHandle),
    /// The contact handle does not refer to a contact of this world.
    #[error("invalid contact handle {0:?}")]
    InvalidContactHandle(ContactHandle),
    /// The joint does not have the requested type.
    #[error("joint {0:?} does not have the requested type")]
    JointTypeMismatch(JointHandle),
}
