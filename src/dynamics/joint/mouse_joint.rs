use crate::dynamics::joint::{soft_constraint_coefficients, BodyPair};
use crate::dynamics::{Body, JointConstraint, JointType, SolverBody, SolverData, Velocity};
use crate::math::{Isometry, Point, Real, Rotation, Vector};
use crate::utils::{inv, SdpMatrix2, WCross};

/// Pulls a point of the second body toward a world target with a soft, force-limited spring.
///
/// The first body is only used as a reference and is usually a static ground body. This is
/// typically used to drag bodies around with a pointer.
#[derive(Copy, Clone, Debug)]
pub struct MouseJoint {
    target: Point<Real>,
    local_anchor_b: Point<Real>,
    frequency_hz: Real,
    damping_ratio: Real,
    max_force: Real,
    impulse: Vector<Real>,

    // Solver temporaries.
    bodies: BodyPair,
    r_b: Vector<Real>,
    mass: SdpMatrix2,
    c: Vector<Real>,
    beta: Real,
    gamma: Real,
}

impl MouseJoint {
    /// A mouse joint dragging the point of `body_b` currently at `target`.
    pub fn new(body_b: &Body, target: &Point<Real>) -> Self {
        Self {
            target: *target,
            local_anchor_b: body_b.local_point(target),
            frequency_hz: 5.0,
            damping_ratio: 0.7,
            max_force: 0.0,
            impulse: Vector::zeros(),
            bodies: BodyPair::default(),
            r_b: Vector::zeros(),
            mass: SdpMatrix2::zero(),
            c: Vector::zeros(),
            beta: 0.0,
            gamma: 0.0,
        }
    }

    /// Sets the maximum force applied to the body.
    pub fn with_max_force(mut self, max_force: Real) -> Self {
        self.max_force = max_force;
        self
    }

    /// The target point, in world-space.
    pub fn target(&self) -> Point<Real> {
        self.target
    }

    /// Moves the target point.
    pub fn set_target(&mut self, target: Point<Real>) {
        self.target = target;
    }

    /// The dragged point in the local-space of the second body.
    pub fn local_anchor_b(&self) -> Point<Real> {
        self.local_anchor_b
    }

    /// The maximum force applied to the body.
    pub fn max_force(&self) -> Real {
        self.max_force
    }

    /// Sets the maximum force applied to the body.
    pub fn set_max_force(&mut self, max_force: Real) {
        self.max_force = max_force;
    }

    /// The response frequency, in Hertz.
    pub fn frequency(&self) -> Real {
        self.frequency_hz
    }

    /// Sets the response frequency.
    pub fn set_frequency(&mut self, hz: Real) {
        self.frequency_hz = hz;
    }

    /// The damping ratio.
    pub fn damping_ratio(&self) -> Real {
        self.damping_ratio
    }

    /// Sets the damping ratio.
    pub fn set_damping_ratio(&mut self, ratio: Real) {
        self.damping_ratio = ratio;
    }
}

impl JointConstraint for MouseJoint {
    fn joint_type(&self) -> JointType {
        JointType::Mouse
    }

    fn anchor_a(&self, _xf_a: &Isometry<Real>) -> Point<Real> {
        self.target
    }

    fn anchor_b(&self, xf_b: &Isometry<Real>) -> Point<Real> {
        xf_b * self.local_anchor_b
    }

    fn reaction_force(&self, inv_dt: Real) -> Vector<Real> {
        self.impulse * inv_dt
    }

    fn reaction_torque(&self, _inv_dt: Real) -> Real {
        0.0
    }

    fn shift_origin(&mut self, new_origin: &Vector<Real>) {
        self.target -= *new_origin;
    }

    fn init_velocity_constraints(
        &mut self,
        body_a: &SolverBody,
        body_b: &SolverBody,
        data: &mut SolverData,
    ) {
        self.bodies = BodyPair::new(body_a, body_b);
        let m_b = self.bodies.inv_mass_b;
        let i_b = self.bodies.inv_i_b;

        let (_, pos_b) = self.bodies.positions(data);
        let (vel_a, Velocity { v: mut v_b, w: mut w_b }) = self.bodies.velocities(data);

        let (gamma, beta) = soft_constraint_coefficients(
            inv(m_b),
            self.frequency_hz,
            self.damping_ratio,
            data.step.dt,
        );
        self.gamma = gamma;
        self.beta = beta;

        self.r_b = Rotation::new(pos_b.a) * (self.local_anchor_b - self.bodies.local_center_b);
        let r_b = self.r_b;

        // K = [(1/m1 + 1/m2) * eye(2) - skew(r1) * invI1 * skew(r1) - skew(r2) * invI2 * skew(r2)]
        let k = SdpMatrix2::new(
            m_b + i_b * r_b.y * r_b.y + self.gamma,
            -i_b * r_b.x * r_b.y,
            m_b + i_b * r_b.x * r_b.x + self.gamma,
        );
        self.mass = k.inverse();

        self.c = (pos_b.c + r_b - self.target) * self.beta;

        // Cheat with some damping.
        w_b *= 0.98;

        if data.step.warm_starting {
            self.impulse *= data.step.dt_ratio;
            v_b += self.impulse * m_b;
            w_b += i_b * r_b.gcross(self.impulse);
        } else {
            self.impulse = Vector::zeros();
        }

        self.bodies
            .set_velocities(data, vel_a, Velocity { v: v_b, w: w_b });
    }

    fn solve_velocity_constraints(&mut self, data: &mut SolverData) {
        let m_b = self.bodies.inv_mass_b;
        let i_b = self.bodies.inv_i_b;
        let (vel_a, Velocity { v: mut v_b, w: mut w_b }) = self.bodies.velocities(data);

        let cdot = v_b + w_b.gcross(self.r_b);
        let mut impulse = self.mass * -(cdot + self.c + self.impulse * self.gamma);

        let old_impulse = self.impulse;
        self.impulse += impulse;
        let max_impulse = data.step.dt * self.max_force;
        if self.impulse.norm_squared() > max_impulse * max_impulse {
            self.impulse *= max_impulse / self.impulse.norm();
        }
        impulse = self.impulse - old_impulse;

        v_b += impulse * m_b;
        w_b += i_b * self.r_b.gcross(impulse);

        self.bodies
            .set_velocities(data, vel_a, Velocity { v: v_b, w: w_b });
    }

    fn solve_position_constraints(&mut self, _data: &mut SolverData) -> bool {
        true
    }
}
