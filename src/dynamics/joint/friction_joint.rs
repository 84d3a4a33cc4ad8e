use crate::dynamics::joint::BodyPair;
use crate::dynamics::{Body, JointConstraint, JointType, SolverBody, SolverData, Velocity};
use crate::math::{Isometry, Point, Real, Rotation, Vector};
use crate::utils::{inv, SdpMatrix2, WCross};

/// Top-down friction: resists the relative motion of two bodies with a bounded force and
/// torque.
#[derive(Copy, Clone, Debug)]
pub struct FrictionJoint {
    local_anchor_a: Point<Real>,
    local_anchor_b: Point<Real>,
    max_force: Real,
    max_torque: Real,
    linear_impulse: Vector<Real>,
    angular_impulse: Real,

    // Solver temporaries.
    bodies: BodyPair,
    r_a: Vector<Real>,
    r_b: Vector<Real>,
    linear_mass: SdpMatrix2,
    angular_mass: Real,
}

impl FrictionJoint {
    /// A friction joint acting at the world `anchor`.
    pub fn new(body_a: &Body, body_b: &Body, anchor: &Point<Real>) -> Self {
        Self::with_local_anchors(body_a.local_point(anchor), body_b.local_point(anchor))
    }

    /// A friction joint acting at the given local anchors.
    pub fn with_local_anchors(local_anchor_a: Point<Real>, local_anchor_b: Point<Real>) -> Self {
        Self {
            local_anchor_a,
            local_anchor_b,
            max_force: 0.0,
            max_torque: 0.0,
            linear_impulse: Vector::zeros(),
            angular_impulse: 0.0,
            bodies: BodyPair::default(),
            r_a: Vector::zeros(),
            r_b: Vector::zeros(),
            linear_mass: SdpMatrix2::zero(),
            angular_mass: 0.0,
        }
    }

    /// Sets the maximum friction force and torque.
    pub fn limits(mut self, max_force: Real, max_torque: Real) -> Self {
        self.max_force = max_force;
        self.max_torque = max_torque;
        self
    }

    /// The anchor in the local-space of the first body.
    pub fn local_anchor_a(&self) -> Point<Real> {
        self.local_anchor_a
    }

    /// The anchor in the local-space of the second body.
    pub fn local_anchor_b(&self) -> Point<Real> {
        self.local_anchor_b
    }

    /// The maximum friction force.
    pub fn max_force(&self) -> Real {
        self.max_force
    }

    /// Sets the maximum friction force.
    pub fn set_max_force(&mut self, force: Real) {
        debug_assert!(force >= 0.0);
        self.max_force = force;
    }

    /// The maximum friction torque.
    pub fn max_torque(&self) -> Real {
        self.max_torque
    }

    /// Sets the maximum friction torque.
    pub fn set_max_torque(&mut self, torque: Real) {
        debug_assert!(torque >= 0.0);
        self.max_torque = torque;
    }
}

impl JointConstraint for FrictionJoint {
    fn joint_type(&self) -> JointType {
        JointType::Friction
    }

    fn anchor_a(&self, xf_a: &Isometry<Real>) -> Point<Real> {
        xf_a * self.local_anchor_a
    }

    fn anchor_b(&self, xf_b: &Isometry<Real>) -> Point<Real> {
        xf_b * self.local_anchor_b
    }

    fn reaction_force(&self, inv_dt: Real) -> Vector<Real> {
        self.linear_impulse * inv_dt
    }

    fn reaction_torque(&self, inv_dt: Real) -> Real {
        inv_dt * self.angular_impulse
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
        let (r_a, r_b) = (self.r_a, self.r_b);

        let k = SdpMatrix2::new(
            m_a + m_b + i_a * r_a.y * r_a.y + i_b * r_b.y * r_b.y,
            -i_a * r_a.x * r_a.y - i_b * r_b.x * r_b.y,
            m_a + m_b + i_a * r_a.x * r_a.x + i_b * r_b.x * r_b.x,
        );
        self.linear_mass = k.inverse();
        self.angular_mass = inv(i_a + i_b);

        if data.step.warm_starting {
            self.linear_impulse *= data.step.dt_ratio;
            self.angular_impulse *= data.step.dt_ratio;

            let p = self.linear_impulse;
            v_a -= p * m_a;
            w_a -= i_a * (r_a.gcross(p) + self.angular_impulse);
            v_b += p * m_b;
            w_b += i_b * (r_b.gcross(p) + self.angular_impulse);
        } else {
            self.linear_impulse = Vector::zeros();
            self.angular_impulse = 0.0;
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
        let h = data.step.dt;

        // Angular friction.
        {
            let cdot = w_b - w_a;
            let impulse = -self.angular_mass * cdot;

            let old_impulse = self.angular_impulse;
            let max_impulse = h * self.max_torque;
            self.angular_impulse = (old_impulse + impulse).clamp(-max_impulse, max_impulse);
            let impulse = self.angular_impulse - old_impulse;

            w_a -= i_a * impulse;
            w_b += i_b * impulse;
        }

        // Linear friction.
        {
            let cdot = v_b + w_b.gcross(r_b) - v_a - w_a.gcross(r_a);
            let impulse = -(self.linear_mass * cdot);

            let old_impulse = self.linear_impulse;
            self.linear_impulse += impulse;
            let max_impulse = h * self.max_force;
            if self.linear_impulse.norm_squared() > max_impulse * max_impulse {
                self.linear_impulse = self.linear_impulse.normalize() * max_impulse;
            }
            let impulse = self.linear_impulse - old_impulse;

            v_a -= impulse * m_a;
            w_a -= i_a * r_a.gcross(impulse);
            v_b += impulse * m_b;
            w_b += i_b * r_b.gcross(impulse);
        }

        self.bodies.set_velocities(
            data,
            Velocity { v: v_a, w: w_a },
            Velocity { v: v_b, w: w_b },
        );
    }

    fn solve_position_constraints(&mut self, _data: &mut SolverData) -> bool {
        true
    }
}
