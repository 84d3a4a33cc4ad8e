use crate::dynamics::IntegrationParameters;
use crate::math::{Point, Real, Vector};

/// The per-step scalars shared by every solver of a time step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeStep {
    /// The time step, in seconds.
    pub dt: Real,
    /// The inverse time step, or zero if `dt` is zero.
    pub inv_dt: Real,
    /// `dt * inv_dt0`, the ratio between this step and the previous one.
    pub dt_ratio: Real,
    /// The number of velocity iterations.
    pub velocity_iterations: usize,
    /// The number of position iterations.
    pub position_iterations: usize,
    /// Are accumulated impulses re-applied at the beginning of the step?
    pub warm_starting: bool,
}

/// The working position of a body's center of mass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position {
    /// The center of mass.
    pub c: Point<Real>,
    /// The angle.
    pub a: Real,
}

/// The working velocity of a body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Velocity {
    /// The linear velocity of the center of mass.
    pub v: Vector<Real>,
    /// The angular velocity.
    pub w: Real,
}

/// The body data a constraint needs from the island solving it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverBody {
    /// The index of the body in the island position and velocity arrays.
    pub index: usize,
    /// The center of mass in the body local-space.
    pub local_center: Point<Real>,
    /// The inverse mass.
    pub inv_mass: Real,
    /// The inverse angular inertia about the center of mass.
    pub inv_inertia: Real,
}

/// The state shared by every constraint solved in an island.
pub struct SolverData<'a> {
    /// The time step scalars.
    pub step: TimeStep,
    /// The solver tolerances.
    pub params: &'a IntegrationParameters,
    /// The working positions, indexed by [`SolverBody::index`].
    pub positions: &'a mut [Position],
    /// The working velocities, indexed by [`SolverBody::index`].
    pub velocities: &'a mut [Velocity],
}
