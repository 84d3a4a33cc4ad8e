//! Rigid bodies, their fixtures and joints, and the world that simulates them.
//!
//! A [`World`] owns every simulated object and hands out handles to them. Each call to
//! [`World::step`]:
//!
//! * updates the contacts between overlapping fixtures through the [`ContactManager`],
//! * groups the awake bodies into islands connected by touching contacts and joints,
//! * solves the velocity and position constraints of each island with sequential impulses,
//! * puts to sleep the islands that stayed still long enough,
//! * resolves the time of impact of bullets and of bodies hitting static geometry.

pub use self::body::{Body, BodyDef, BodyHandle, BodyType, ContactEdge, JointEdge};
pub use self::contact::{mix_friction, mix_restitution, Contact, ContactHandle};
pub use self::contact_manager::ContactManager;
pub use self::contact_solver::ContactSolver;
pub use self::fixture::{
    CollisionFilter, Fixture, FixtureDef, FixtureHandle, FixtureProxy, ProxyInfo,
};
pub use self::integration_parameters::IntegrationParameters;
pub use self::joint::{
    DistanceJoint, FrictionJoint, Joint, JointConstraint, JointDef, JointHandle, JointType,
    LimitState, MotorJoint, MouseJoint, PrismaticJoint, PulleyJoint, RevoluteJoint, RopeJoint,
    WeldJoint, WheelJoint,
};
pub use self::listener::{
    ContactFilter, ContactImpulse, ContactListener, DefaultContactFilter, DestructionListener,
    NoopContactListener, NoopDestructionListener,
};
pub use self::sweep::Sweep;
pub use self::time_step::{Position, SolverBody, SolverData, TimeStep, Velocity};
pub use self::world::World;
pub use self::world_error::WorldError;

pub mod joint;

mod body;
mod contact;
mod contact_manager;
mod contact_solver;
mod fixture;
mod integration_parameters;
mod island;
mod listener;
mod sweep;
mod time_step;
mod world;
mod world_error;
