use crate::dynamics::joint::{soft_constraint_coefficients, BodyPair};
use crate::dynamics::{
    Body, JointConstraint, JointType, Position, SolverBody, SolverData, Velocity,
};
use crate::math::{Isometry, Point, Real, Rotation, Vector, Vector3};
use crate::utils::{inv, SdpMatrix3, WCross};

/// Glues two bodies together.
///
/// With a positive frequency, the relative rotation becomes a damped angular spring.
#[derive(Copy, Clone, Debug)]
pub struct WeldJoint {
    local_anchor_a: Point<Real>,
    local_anchor_b: Point<Real>,
    reference_angle: Real,
    frequency_hz: Real,
    damping_ratio: Real,
    impulse: Vector3<Real>,

    // Solver temporaries.
    bodies: BodyPair,
    r_a: Vector<Real>,
    r_b: Vector<Real>,
    mass: SdpMatrix3,
    gamma: Real,
    bias: Real,
}

impl WeldJoint {
    /// Welds both bodies at the world `anchor`, in their current relative pose.
    pub fn new(body_a: &Body, body_b: &Body, anchor: &Point<Real>) -> Self {
        Self::with_local_anchors(
            body_a.local_point(anchor),
            body_b.local_point(anchor),
            body_b.angle() - body_a.angle(),
        )
    }

    /// Welds both bodies at the given local anchors, with the given relative angle.
    pub fn with_local_anchors(
        local_anchor_a: Point<Real>,
        local_anchor_b: Point<Real>,
        reference_angle: Real,
    ) -> Self {
        Self {
            local_anchor_a,
            local_anchor_b,
            reference_angle,
            frequency_hz: 0.0,
            damping_ratio: 0.0,
            impulse: Vector3::zeros(),
            bodies: BodyPair::default(),
            r_a: Vector::zeros(),
            r_b: Vector::zeros(),
            mass: SdpMatrix3::zero(),
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

    /// The relative angle of both bodies maintained by this joint.
    pub fn reference_angle(&self) -> Real {
        self.reference_angle
    }

    /// The angular spring frequency, in Hertz. Zero means rigid.
    pub fn frequency(&self) -> Real {
        self.frequency_hz
    }

    /// Sets the angular spring frequency.
    pub fn set_frequency(&mut self, hz: Real) {
        self.frequency_hz = hz;
    }

    /// The angular spring damping ratio.
    pub fn damping_ratio(&self) -> Real {
        self.damping_ratio
    }

    /// Sets the angular spring damping ratio.
    pub fn set_damping_ratio(&mut self, ratio: Real) {
        self.damping_ratio = ratio;
    }

    fn effective_mass(
        r_a: &Vector<Real>,
        r_b: &Vector<Real>,
        bodies: &BodyPair,
    ) -> SdpMatrix3 {
        let (m_a, m_b, i_a, i_b) = (
            bodies.inv_mass_a,
            bodies.inv_mass_b,
            bodies.inv_i_a,
            bodies.inv_i_b,
        );
        SdpMatrix3::new(
            m_a + m_b + r_a.y * r_a.y * i_a + r_b.y * r_b.y * i_b,
            -r_a.y * r_a.x * i_a - r_b.y * r_b.x * i_b,
            -r_a.y * i_a - r_b.y * i_b,
            m_a + m_b + r_a.x * r_a.x * i_a + r_b.x * r_b.x * i_b,
            r_a.x * i_a + r_b.x * i_b,
            i_a + i_b,
        )
    }
}

impl JointConstraint for WeldJoint {
    fn joint_type(&self) -> JointType {
        JointType::Weld
    }

    fn anchor_a(&self, xf_a: &Isometry<Real>) -> Point<Real> {
        xf_a * self.local_anchor_a
    }

    fn anchor_b(&self, xf_b: &Isometry<Real>) -> Point<Real> {
        xf_b * self.local_anchor_b
    }

    fn reaction_force(&self, inv_dt: Real) -> Vector<Real> {
        Vector::new(self.impulse.x, self.impulse.y) * inv_dt
    }

    fn reaction_torque(&self, inv_dt: Real) -> Real {
        inv_dt * self.impulse.z
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

        let k = Self::effective_mass(&self.r_a, &self.r_b, &self.bodies);

        self.gamma = 0.0;
        self.bias = 0.0;

        if self.frequency_hz > 0.0 {
            self.mass = k.inverse22();

            let inv_m = i_a + i_b;
            let c = pos_b.a - pos_a.a - self.reference_angle;
            let (gamma, beta) = soft_constraint_coefficients(
                inv(inv_m),
                self.frequency_hz,
                self.damping_ratio,
                data.step.dt,
            );
            self.gamma = gamma;
            self.bias = c * beta;
            self.mass.m33 = inv(inv_m + gamma);
        } else if k.m33 == 0.0 {
            self.mass = k.inverse22();
        } else {
            self.mass = k.inverse();
        }

        if data.step.warm_starting {
            self.impulse *= data.step.dt_ratio;

            let p = Vector::new(self.impulse.x, self.impulse.y);
            v_a -= p * m_a;
            w_a -= i_a * (self.r_a.gcross(p) + self.impulse.z);
            v_b += p * m_b;
            w_b += i_b * (self.r_b.gcross(p) + self.impulse.z);
        } else {
            self.impulse = Vector3::zeros();
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
        let (r_a, r_b) = (self.r_a, self.r_b);

        if self.frequency_hz > 0.0 {
            let cdot2 = w_b - w_a;
            let impulse2 = -self.mass.m33 * (cdot2 + self.bias + self.gamma * self.impulse.z);
            self.impulse.z += impulse2;

            w_a -= i_a * impulse2;
            w_b += i_b * impulse2;

            let cdot1 = v_b + w_b.gcross(r_b) - v_a - w_a.gcross(r_a);
            let impulse1 = -self.mass.mul22(&cdot1);
            self.impulse.x += impulse1.x;
            self.impulse.y += impulse1.y;

            v_a -= impulse1 * m_a;
            w_a -= i_a * r_a.gcross(impulse1);
            v_b += impulse1 * m_b;
            w_b += i_b * r_b.gcross(impulse1);
        } else {
            let cdot1 = v_b + w_b.gcross(r_b) - v_a - w_a.gcross(r_a);
            let cdot2 = w_b - w_a;
            let impulse = -(self.mass * Vector3::new(cdot1.x, cdot1.y, cdot2));
            self.impulse += impulse;

            let p = Vector::new(impulse.x, impulse.y);
            v_a -= p * m_a;
            w_a -= i_a * (r_a.gcross(p) + impulse.z);
            v_b += p * m_b;
            w_b += i_b * (r_b.gcross(p) + impulse.z);
        }

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
        let k = Self::effective_mass(&r_a, &r_b, &self.bodies);

        let c1 = c_b + r_b - c_a - r_a;
        let position_error = c1.norm();
        let angular_error;

        if self.frequency_hz > 0.0 {
            angular_error = 0.0;

            let p = -k.solve22(&c1);
            c_a -= p * m_a;
            a_a -= i_a * r_a.gcross(p);
            c_b += p * m_b;
            a_b += i_b * r_b.gcross(p);
        } else {
            let c2 = a_b - a_a - self.reference_angle;
            angular_error = c2.abs();

            let impulse = if k.m33 > 0.0 {
                -k.solve(&Vector3::new(c1.x, c1.y, c2))
            } else {
                let impulse2 = -k.solve22(&c1);
                Vector3::new(impulse2.x, impulse2.y, 0.0)
            };

            let p = Vector::new(impulse.x, impulse.y);
            c_a -= p * m_a;
            a_a -= i_a * (r_a.gcross(p) + impulse.z);
            c_b += p * m_b;
            a_b += i_b * (r_b.gcross(p) + impulse.z);
        }

        self.bodies.set_positions(
            data,
            Position { c: c_a, a: a_a },
            Position { c: c_b, a: a_b },
        );

        position_error <= data.params.linear_slop && angular_error <= data.params.angular_slop
    }
}
