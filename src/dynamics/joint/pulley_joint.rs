use crate::dynamics::joint::BodyPair;
use crate::dynamics::{
    Body, JointConstraint, JointType, Position, SolverBody, SolverData, Velocity,
};
use crate::math::{Isometry, Point, Real, Rotation, Vector, DEFAULT_EPSILON};
use crate::utils::{inv, WCross};

/// Two bodies hanging from fixed ground anchors by a rope running over a pulley.
///
/// The joint maintains `length_a + ratio * length_b` constant, where each length is measured
/// between a ground anchor and the matching body anchor.
#[derive(Copy, Clone, Debug)]
pub struct PulleyJoint {
    ground_anchor_a: Point<Real>,
    ground_anchor_b: Point<Real>,
    local_anchor_a: Point<Real>,
    local_anchor_b: Point<Real>,
    length_a: Real,
    length_b: Real,
    ratio: Real,
    constant: Real,
    impulse: Real,

    // Solver temporaries.
    bodies: BodyPair,
    u_a: Vector<Real>,
    u_b: Vector<Real>,
    r_a: Vector<Real>,
    r_b: Vector<Real>,
    mass: Real,
}

impl PulleyJoint {
    /// A pulley from the current configuration of both bodies.
    ///
    /// The ground anchors and body anchors are in world-space. `ratio` must be positive.
    pub fn new(
        body_a: &Body,
        body_b: &Body,
        ground_anchor_a: &Point<Real>,
        ground_anchor_b: &Point<Real>,
        anchor_a: &Point<Real>,
        anchor_b: &Point<Real>,
        ratio: Real,
    ) -> Self {
        debug_assert!(ratio > DEFAULT_EPSILON);
        let length_a = na::distance(anchor_a, ground_anchor_a);
        let length_b = na::distance(anchor_b, ground_anchor_b);

        Self {
            ground_anchor_a: *ground_anchor_a,
            ground_anchor_b: *ground_anchor_b,
            local_anchor_a: body_a.local_point(anchor_a),
            local_anchor_b: body_b.local_point(anchor_b),
            length_a,
            length_b,
            ratio,
            constant: length_a + ratio * length_b,
            impulse: 0.0,
            bodies: BodyPair::default(),
            u_a: Vector::zeros(),
            u_b: Vector::zeros(),
            r_a: Vector::zeros(),
            r_b: Vector::zeros(),
            mass: 0.0,
        }
    }

    /// The first ground anchor, in world-space.
    pub fn ground_anchor_a(&self) -> Point<Real> {
        self.ground_anchor_a
    }

    /// The second ground anchor, in world-space.
    pub fn ground_anchor_b(&self) -> Point<Real> {
        self.ground_anchor_b
    }

    /// The initial length of the first segment.
    pub fn length_a(&self) -> Real {
        self.length_a
    }

    /// The initial length of the second segment.
    pub fn length_b(&self) -> Real {
        self.length_b
    }

    /// The pulley ratio.
    pub fn ratio(&self) -> Real {
        self.ratio
    }

    /// The current length of the first segment.
    pub fn current_length_a(&self, body_a: &Body) -> Real {
        na::distance(&body_a.world_point(&self.local_anchor_a), &self.ground_anchor_a)
    }

    /// The current length of the second segment.
    pub fn current_length_b(&self, body_b: &Body) -> Real {
        na::distance(&body_b.world_point(&self.local_anchor_b), &self.ground_anchor_b)
    }

    fn segment_directions(
        &self,
        c_a: &Point<Real>,
        c_b: &Point<Real>,
        r_a: &Vector<Real>,
        r_b: &Vector<Real>,
        slop: Real,
    ) -> (Vector<Real>, Real, Vector<Real>, Real) {
        let mut u_a = c_a + r_a - self.ground_anchor_a;
        let mut u_b = c_b + r_b - self.ground_anchor_b;
        let length_a = u_a.norm();
        let length_b = u_b.norm();

        if length_a > 10.0 * slop {
            u_a /= length_a;
        } else {
            u_a = Vector::zeros();
        }

        if length_b > 10.0 * slop {
            u_b /= length_b;
        } else {
            u_b = Vector::zeros();
        }

        (u_a, length_a, u_b, length_b)
    }

    fn effective_mass(
        &self,
        r_a: &Vector<Real>,
        r_b: &Vector<Real>,
        u_a: &Vector<Real>,
        u_b: &Vector<Real>,
    ) -> Real {
        let ru_a = r_a.gcross(*u_a);
        let ru_b = r_b.gcross(*u_b);
        let m_a = self.bodies.inv_mass_a + self.bodies.inv_i_a * ru_a * ru_a;
        let m_b = self.bodies.inv_mass_b + self.bodies.inv_i_b * ru_b * ru_b;
        inv(m_a + self.ratio * self.ratio * m_b)
    }
}

impl JointConstraint for PulleyJoint {
    fn joint_type(&self) -> JointType {
        JointType::Pulley
    }

    fn anchor_a(&self, xf_a: &Isometry<Real>) -> Point<Real> {
        xf_a * self.local_anchor_a
    }

    fn anchor_b(&self, xf_b: &Isometry<Real>) -> Point<Real> {
        xf_b * self.local_anchor_b
    }

    fn reaction_force(&self, inv_dt: Real) -> Vector<Real> {
        self.u_b * (inv_dt * self.impulse)
    }

    fn reaction_torque(&self, _inv_dt: Real) -> Real {
        0.0
    }

    fn shift_origin(&mut self, new_origin: &Vector<Real>) {
        self.ground_anchor_a -= *new_origin;
        self.ground_anchor_b -= *new_origin;
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

        let (u_a, _, u_b, _) = self.segment_directions(
            &pos_a.c,
            &pos_b.c,
            &self.r_a,
            &self.r_b,
            data.params.linear_slop,
        );
        self.u_a = u_a;
        self.u_b = u_b;
        self.mass = self.effective_mass(&self.r_a, &self.r_b, &u_a, &u_b);

        if data.step.warm_starting {
            self.impulse *= data.step.dt_ratio;

            let p_a = u_a * -self.impulse;
            let p_b = u_b * (-self.ratio * self.impulse);
            v_a += p_a * m_a;
            w_a += i_a * self.r_a.gcross(p_a);
            v_b += p_b * m_b;
            w_b += i_b * self.r_b.gcross(p_b);
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

        let cdot = -self.u_a.dot(&vp_a) - self.ratio * self.u_b.dot(&vp_b);
        let impulse = -self.mass * cdot;
        self.impulse += impulse;

        let p_a = self.u_a * -impulse;
        let p_b = self.u_b * (-self.ratio * impulse);
        v_a += p_a * m_a;
        w_a += i_a * self.r_a.gcross(p_a);
        v_b += p_b * m_b;
        w_b += i_b * self.r_b.gcross(p_b);

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

        let (u_a, length_a, u_b, length_b) =
            self.segment_directions(&c_a, &c_b, &r_a, &r_b, data.params.linear_slop);
        let mass = self.effective_mass(&r_a, &r_b, &u_a, &u_b);

        let c = self.constant - length_a - self.ratio * length_b;
        let linear_error = c.abs();

        let impulse = -mass * c;
        let p_a = u_a * -impulse;
        let p_b = u_b * (-self.ratio * impulse);

        c_a += p_a * m_a;
        a_a += i_a * r_a.gcross(p_a);
        c_b += p_b * m_b;
        a_b += i_b * r_b.gcross(p_b);

        self.bodies.set_positions(
            data,
            Position { c: c_a, a: a_a },
            Position { c: c_b, a: a_b },
        );

        linear_error < data.params.linear_slop
    }
}
