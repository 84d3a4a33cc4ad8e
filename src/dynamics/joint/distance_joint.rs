use crate::dynamics::joint::{soft_constraint_coefficients, BodyPair};
use crate::dynamics::{
    Body, JointConstraint, JointType, Position, SolverBody, SolverData, Velocity,
};
use crate::math::{Isometry, Point, Real, Rotation, Vector};
use crate::utils::{inv, normalize, WCross};

/// Keeps two anchor points at a fixed distance, like a massless rigid rod.
///
/// With a positive frequency, the rod becomes a damped spring.
#[derive(Copy, Clone, Debug)]
pub struct DistanceJoint {
    local_anchor_a: Point<Real>,
    local_anchor_b: Point<Real>,
    length: Real,
    frequency_hz: Real,
    damping_ratio: Real,
    impulse: Real,

    // Solver temporaries.
    bodies: BodyPair,
    u: Vector<Real>,
    r_a: Vector<Real>,
    r_b: Vector<Real>,
    mass: Real,
    gamma: Real,
    bias: Real,
}

impl DistanceJoint {
    /// A rigid distance joint between two world anchors, with the current distance between
    /// them as length.
    pub fn new(
        body_a: &Body,
        body_b: &Body,
        anchor_a: &Point<Real>,
        anchor_b: &Point<Real>,
    ) -> Self {
        Self::with_local_anchors(
            body_a.local_point(anchor_a),
            body_b.local_point(anchor_b),
            na::distance(anchor_a, anchor_b),
        )
    }

    /// A rigid distance joint between two local anchors.
    pub fn with_local_anchors(
        local_anchor_a: Point<Real>,
        local_anchor_b: Point<Real>,
        length: Real,
    ) -> Self {
        Self {
            local_anchor_a,
            local_anchor_b,
            length,
            frequency_hz: 0.0,
            damping_ratio: 0.0,
            impulse: 0.0,
            bodies: BodyPair::default(),
            u: Vector::zeros(),
            r_a: Vector::zeros(),
            r_b: Vector::zeros(),
            mass: 0.0,
            gamma: 0.0,
            bias: 0.0,
        }
    }

    /// The anchor in the local-space of the first body.
    pub fn local_anchor_a(&self) -> Point<Real> {
        self.local_anchor_a
    }

    /// The anchor in the local-space of the second body.
    pub fn local_anchor_b(&self) -> Point<Real> {
        self.local_anchor_b
    }

    /// The rest length.
    pub fn length(&self) -> Real {
        self.length
    }

    /// Sets the rest length.
    pub fn set_length(&mut self, length: Real) {
        self.length = length;
    }

    /// The mass-spring-damper frequency, in Hertz. Zero means rigid.
    pub fn frequency(&self) -> Real {
        self.frequency_hz
    }

    /// Sets the mass-spring-damper frequency.
    pub fn set_frequency(&mut self, hz: Real) {
        self.frequency_hz = hz;
    }

    /// The damping ratio. Zero means no damping, one means critical damping.
    pub fn damping_ratio(&self) -> Real {
        self.damping_ratio
    }

    /// Sets the damping ratio.
    pub fn set_damping_ratio(&mut self, ratio: Real) {
        self.damping_ratio = ratio;
    }
}

impl JointConstraint for DistanceJoint {
    fn joint_type(&self) -> JointType {
        JointType::Distance
    }

    fn anchor_a(&self, xf_a: &Isometry<Real>) -> Point<Real> {
        xf_a * self.local_anchor_a
    }

    fn anchor_b(&self, xf_b: &Isometry<Real>) -> Point<Real> {
        xf_b * self.local_anchor_b
    }

    fn reaction_force(&self, inv_dt: Real) -> Vector<Real> {
        self.u * (inv_dt * self.impulse)
    }

    fn reaction_torque(&self, _inv_dt: Real) -> Real {
        0.0
    }

    fn init_velocity_constraints(
        &mut self,
        body_a: &SolverBody,
        body_b: &SolverBody,
        data: &mut SolverData,
    ) {
        self.bodies = BodyPair::new(body_a, body_b);
        let BodyPair {
            inv_mass_a: m_a,
            inv_mass_b: m_b,
            inv_i_a: i_a,
            inv_i_b: i_b,
            ..
        } = self.bodies;

        let (pos_a, pos_b) = self.bodies.positions(data);
        let (Velocity { v: mut v_a, w: mut w_a }, Velocity { v: mut v_b, w: mut w_b }) =
            self.bodies.velocities(data);

        self.r_a = Rotation::new(pos_a.a) * (self.local_anchor_a - self.bodies.local_center_a);
        self.r_b = Rotation::new(pos_b.a) * (self.local_anchor_b - self.bodies.local_center_b);
        self.u = pos_b.c + self.r_b - pos_a.c - self.r_a;

        let length = self.u.norm();
        if length > data.params.linear_slop {
            self.u /= length;
        } else {
            self.u = Vector::zeros();
        }

        let cr_a = self.r_a.gcross(self.u);
        let cr_b = self.r_b.gcross(self.u);
        let mut inv_mass = m_a + i_a * cr_a * cr_a + m_b + i_b * cr_b * cr_b;
        self.mass = inv(inv_mass);

        if self.frequency_hz > 0.0 {
            let c = length - self.length;
            let (gamma, beta) = soft_constraint_coefficients(
                self.mass,
                self.frequency_hz,
                self.damping_ratio,
                data.step.dt,
            );
            self.gamma = gamma;
            self.bias = c * beta;
            inv_mass += self.gamma;
            self.mass = inv(inv_mass);
        } else {
            self.gamma = 0.0;
            self.bias = 0.0;
        }

        if data.step.warm_starting {
            self.impulse *= data.step.dt_ratio;
            let p = self.u * self.impulse;
            v_a -= p * m_a;
            w_a -= i_a * self.r_a.gcross(p);
            v_b += p * m_b;
            w_b += i_b * self.r_b.gcross(p);
        } else {
            self.impulse = 0.0;
        }

        self.bodies.set_velocities(
            data,
            Velocity { v: v_a, w: w_a },
            Velocity { v: v_b, w: w_b },
        );
    }

    fn solve_velocity_constraints(&mut self, data: &mut SolverData) {
        let BodyPair {
            inv_mass_a: m_a,
            inv_mass_b: m_b,
            inv_i_a: i_a,
            inv_i_b: i_b,
            ..
        } = self.bodies;
        let (Velocity { v: mut v_a, w: mut w_a }, Velocity { v: mut v_b, w: mut w_b }) =
            self.bodies.velocities(data);

        let vp_a = v_a + w_a.gcross(self.r_a);
        let vp_b = v_b + w_b.gcross(self.r_b);
        let cdot = self.u.dot(&(vp_b - vp_a));

        let impulse = -self.mass * (cdot + self.bias + self.gamma * self.impulse);
        self.impulse += impulse;

        let p = self.u * impulse;
        v_a -= p * m_a;
        w_a -= i_a * self.r_a.gcross(p);
        v_b += p * m_b;
        w_b += i_b * self.r_b.gcross(p);

        self.bodies.set_velocities(
            data,
            Velocity { v: v_a, w: w_a },
            Velocity { v: v_b, w: w_b },
        );
    }

    fn solve_position_constraints(&mut self, data: &mut SolverData) -> bool {
        // Soft constraints do not correct positions.
        if self.frequency_hz > 0.0 {
            return true;
        }

        let BodyPair {
            inv_mass_a: m_a,
            inv_mass_b: m_b,
            inv_i_a: i_a,
            inv_i_b: i_b,
            ..
        } = self.bodies;
        let (Position { c: mut c_a, a: mut a_a }, Position { c: mut c_b, a: mut a_b }) =
            self.bodies.positions(data);

        let r_a = Rotation::new(a_a) * (self.local_anchor_a - self.bodies.local_center_a);
        let r_b = Rotation::new(a_b) * (self.local_anchor_b - self.bodies.local_center_b);
        let mut u = c_b + r_b - c_a - r_a;

        let length = normalize(&mut u);
        let max_correction = data.params.max_linear_correction;
        let c = (length - self.length).clamp(-max_correction, max_correction);

        let impulse = -self.mass * c;
        let p = u * impulse;

        c_a -= p * m_a;
        a_a -= i_a * r_a.gcross(p);
        c_b += p * m_b;
        a_b += i_b * r_b.gcross(p);

        self.bodies.set_positions(
            data,
            Position { c: c_a, a: a_a },
            Position { c: c_b, a: a_b },
        );

        c.abs() < data.params.linear_slop
    }
}
