use crate::dynamics::joint::BodyPair;
use crate::dynamics::{
    Body, JointConstraint, JointType, LimitState, Position, SolverBody, SolverData, Velocity,
};
use crate::math::{Isometry, Point, Real, Rotation, Vector};
use crate::utils::{inv, normalize, WCross};

/// Bounds the distance between two anchor points from above, like a rope.
#[derive(Copy, Clone, Debug)]
pub struct RopeJoint {
    local_anchor_a: Point<Real>,
    local_anchor_b: Point<Real>,
    max_length: Real,
    length: Real,
    impulse: Real,
    state: LimitState,

    // Solver temporaries.
    bodies: BodyPair,
    u: Vector<Real>,
    r_a: Vector<Real>,
    r_b: Vector<Real>,
    mass: Real,
}

impl RopeJoint {
    /// A rope between two world anchors, with the current distance between them as maximum
    /// length.
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

    /// A rope between two local anchors.
    pub fn with_local_anchors(
        local_anchor_a: Point<Real>,
        local_anchor_b: Point<Real>,
        max_length: Real,
    ) -> Self {
        Self {
            local_anchor_a,
            local_anchor_b,
            max_length,
            length: 0.0,
            impulse: 0.0,
            state: LimitState::Inactive,
            bodies: BodyPair::default(),
            u: Vector::zeros(),
            r_a: Vector::zeros(),
            r_b: Vector::zeros(),
            mass: 0.0,
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

    /// The maximum distance between both anchors.
    pub fn max_length(&self) -> Real {
        self.max_length
    }

    /// Sets the maximum distance between both anchors.
    pub fn set_max_length(&mut self, length: Real) {
        self.max_length = length;
    }

    /// Is the rope taut?
    pub fn limit_state(&self) -> LimitState {
        self.state
    }
}

impl JointConstraint for RopeJoint {
    fn joint_type(&self) -> JointType {
        JointType::Rope
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

        self.length = self.u.norm();
        self.state = if self.length > self.max_length {
            LimitState::AtUpper
        } else {
            LimitState::Inactive
        };

        if self.length > data.params.linear_slop {
            self.u /= self.length;
        } else {
            self.u = Vector::zeros();
            self.mass = 0.0;
            self.impulse = 0.0;
            return;
        }

        let cr_a = self.r_a.gcross(self.u);
        let cr_b = self.r_b.gcross(self.u);
        self.mass = inv(m_a + i_a * cr_a * cr_a + m_b + i_b * cr_b * cr_b);

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
        let c = self.length - self.max_length;
        let mut cdot = self.u.dot(&(vp_b - vp_a));

        // Predictive constraint.
        if c < 0.0 {
            cdot += data.step.inv_dt * c;
        }

        let impulse = -self.mass * cdot;
        let old_impulse = self.impulse;
        self.impulse = (self.impulse + impulse).min(0.0);
        let impulse = self.impulse - old_impulse;

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
        let c = (length - self.max_length).clamp(0.0, data.params.max_linear_correction);

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

        length - self.max_length < data.params.linear_slop
    }
}
