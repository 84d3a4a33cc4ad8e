use crate::dynamics::joint::BodyPair;
use crate::dynamics::{
    Body, JointConstraint, JointType, LimitState, Position, SolverBody, SolverData, Velocity,
};
use crate::math::{Isometry, Point, Real, Rotation, Vector, Vector3};
use crate::utils::{inv, SdpMatrix2, SdpMatrix3, WCross};

/// A slider: the second body translates along an axis fixed on the first body, without
/// relative rotation.
///
/// The translation can be limited to a range and driven by a motor with a maximum force.
#[derive(Copy, Clone, Debug)]
pub struct PrismaticJoint {
    local_anchor_a: Point<Real>,
    local_anchor_b: Point<Real>,
    local_x_axis_a: Vector<Real>,
    local_y_axis_a: Vector<Real>,
    reference_angle: Real,
    impulse: Vector3<Real>,
    motor_impulse: Real,
    lower_translation: Real,
    upper_translation: Real,
    max_motor_force: Real,
    motor_speed: Real,
    enable_limit: bool,
    enable_motor: bool,
    limit_state: LimitState,

    // Solver temporaries.
    bodies: BodyPair,
    axis: Vector<Real>,
    perp: Vector<Real>,
    s1: Real,
    s2: Real,
    a1: Real,
    a2: Real,
    k: SdpMatrix3,
    motor_mass: Real,
}

fn perpendicular(v: &Vector<Real>) -> Vector<Real> {
    Vector::new(-v.y, v.x)
}

impl PrismaticJoint {
    /// A slider along the world `axis`, passing through the world `anchor`.
    pub fn new(body_a: &Body, body_b: &Body, anchor: &Point<Real>, axis: &Vector<Real>) -> Self {
        Self::with_local_anchors(
            body_a.local_point(anchor),
            body_b.local_point(anchor),
            body_a.local_vector(axis),
            body_b.angle() - body_a.angle(),
        )
    }

    /// A slider along `local_axis_a`, expressed in the local-space of the first body.
    pub fn with_local_anchors(
        local_anchor_a: Point<Real>,
        local_anchor_b: Point<Real>,
        local_axis_a: Vector<Real>,
        reference_angle: Real,
    ) -> Self {
        let local_x_axis_a = local_axis_a.try_normalize(0.0).unwrap_or_else(Vector::x);
        Self {
            local_anchor_a,
            local_anchor_b,
            local_x_axis_a,
            local_y_axis_a: perpendicular(&local_x_axis_a),
            reference_angle,
            impulse: Vector3::zeros(),
            motor_impulse: 0.0,
            lower_translation: 0.0,
            upper_translation: 0.0,
            max_motor_force: 0.0,
            motor_speed: 0.0,
            enable_limit: false,
            enable_motor: false,
            limit_state: LimitState::Inactive,
            bodies: BodyPair::default(),
            axis: Vector::zeros(),
            perp: Vector::zeros(),
            s1: 0.0,
            s2: 0.0,
            a1: 0.0,
            a2: 0.0,
            k: SdpMatrix3::zero(),
            motor_mass: 0.0,
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

    /// The unit translation axis in the local-space of the first body.
    pub fn local_axis_a(&self) -> Vector<Real> {
        self.local_x_axis_a
    }

    /// The relative angle of both bodies maintained by this joint.
    pub fn reference_angle(&self) -> Real {
        self.reference_angle
    }

    /// The current translation of the second anchor along the axis, relative to the first
    /// anchor.
    pub fn joint_translation(&self, body_a: &Body, body_b: &Body) -> Real {
        let p_a = body_a.world_point(&self.local_anchor_a);
        let p_b = body_b.world_point(&self.local_anchor_b);
        let axis = body_a.world_vector(&self.local_x_axis_a);
        (p_b - p_a).dot(&axis)
    }

    /// The current translation speed along the axis.
    pub fn joint_speed(&self, body_a: &Body, body_b: &Body) -> Real {
        let r_a = body_a.world_vector(&(self.local_anchor_a - body_a.local_center()));
        let r_b = body_b.world_vector(&(self.local_anchor_b - body_b.local_center()));
        let d = (body_b.world_center() + r_b) - (body_a.world_center() + r_a);
        let axis = body_a.world_vector(&self.local_x_axis_a);

        let (v_a, w_a) = (body_a.linear_velocity(), body_a.angular_velocity());
        let (v_b, w_b) = (body_b.linear_velocity(), body_b.angular_velocity());

        d.dot(&w_a.gcross(axis))
            + axis.dot(&(v_b + w_b.gcross(r_b) - v_a - w_a.gcross(r_a)))
    }

    /// Is the translation limit enabled?
    pub fn is_limit_enabled(&self) -> bool {
        self.enable_limit
    }

    /// Enables or disables the translation limit.
    pub fn enable_limit(&mut self, enable: bool) {
        if enable != self.enable_limit {
            self.enable_limit = enable;
            self.impulse.z = 0.0;
        }
    }

    /// The lower translation limit.
    pub fn lower_limit(&self) -> Real {
        self.lower_translation
    }

    /// The upper translation limit.
    pub fn upper_limit(&self) -> Real {
        self.upper_translation
    }

    /// Sets the translation limits.
    pub fn set_limits(&mut self, lower: Real, upper: Real) {
        debug_assert!(lower <= upper);
        if lower != self.lower_translation || upper != self.upper_translation {
            self.lower_translation = lower;
            self.upper_translation = upper;
            self.impulse.z = 0.0;
        }
    }

    /// Enables the translation limit with the given bounds.
    pub fn limits(mut self, lower: Real, upper: Real) -> Self {
        self.set_limits(lower, upper);
        self.enable_limit(true);
        self
    }

    /// Is the motor enabled?
    pub fn is_motor_enabled(&self) -> bool {
        self.enable_motor
    }

    /// Enables or disables the motor.
    pub fn enable_motor(&mut self, enable: bool) {
        self.enable_motor = enable;
    }

    /// The motor target speed, in meters per second.
    pub fn motor_speed(&self) -> Real {
        self.motor_speed
    }

    /// Sets the motor target speed.
    pub fn set_motor_speed(&mut self, speed: Real) {
        self.motor_speed = speed;
    }

    /// The maximum motor force.
    pub fn max_motor_force(&self) -> Real {
        self.max_motor_force
    }

    /// Sets the maximum motor force.
    pub fn set_max_motor_force(&mut self, force: Real) {
        self.max_motor_force = force;
    }

    /// Enables the motor with the given target speed and maximum force.
    pub fn motor(mut self, speed: Real, max_force: Real) -> Self {
        self.enable_motor = true;
        self.motor_speed = speed;
        self.max_motor_force = max_force;
        self
    }

    /// The force applied by the motor.
    pub fn motor_force(&self, inv_dt: Real) -> Real {
        inv_dt * self.motor_impulse
    }

    /// The state of the translation limit at the last step.
    pub fn limit_state(&self) -> LimitState {
        self.limit_state
    }

    fn apply(
        &self,
        (v_a, w_a): (&mut Vector<Real>, &mut Real),
        (v_b, w_b): (&mut Vector<Real>, &mut Real),
        linear: Vector<Real>,
        l_a: Real,
        l_b: Real,
    ) {
        *v_a -= linear * self.bodies.inv_mass_a;
        *w_a -= self.bodies.inv_i_a * l_a;
        *v_b += linear * self.bodies.inv_mass_b;
        *w_b += self.bodies.inv_i_b * l_b;
    }
}

impl JointConstraint for PrismaticJoint {
    fn joint_type(&self) -> JointType {
        JointType::Prismatic
    }

    fn anchor_a(&self, xf_a: &Isometry<Real>) -> Point<Real> {
        xf_a * self.local_anchor_a
    }

    fn anchor_b(&self, xf_b: &Isometry<Real>) -> Point<Real> {
        xf_b * self.local_anchor_b
    }

    fn reaction_force(&self, inv_dt: Real) -> Vector<Real> {
        (self.perp * self.impulse.x + self.axis * (self.motor_impulse + self.impulse.z)) * inv_dt
    }

    fn reaction_torque(&self, inv_dt: Real) -> Real {
        inv_dt * self.impulse.y
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

        let rot_a = Rotation::new(pos_a.a);
        let r_a = rot_a * (self.local_anchor_a - self.bodies.local_center_a);
        let r_b = Rotation::new(pos_b.a) * (self.local_anchor_b - self.bodies.local_center_b);
        let d = (pos_b.c - pos_a.c) + r_b - r_a;

        // Motor Jacobian and effective mass.
        self.axis = rot_a * self.local_x_axis_a;
        self.a1 = (d + r_a).gcross(self.axis);
        self.a2 = r_b.gcross(self.axis);
        self.motor_mass = inv(m_a + m_b + i_a * self.a1 * self.a1 + i_b * self.a2 * self.a2);

        // Prismatic constraint.
        self.perp = rot_a * self.local_y_axis_a;
        self.s1 = (d + r_a).gcross(self.perp);
        self.s2 = r_b.gcross(self.perp);

        let (s1, s2, a1, a2) = (self.s1, self.s2, self.a1, self.a2);
        let mut k22 = i_a + i_b;
        if k22 == 0.0 {
            // Both bodies have fixed rotation.
            k22 = 1.0;
        }

        self.k = SdpMatrix3::new(
            m_a + m_b + i_a * s1 * s1 + i_b * s2 * s2,
            i_a * s1 + i_b * s2,
            i_a * s1 * a1 + i_b * s2 * a2,
            k22,
            i_a * a1 + i_b * a2,
            m_a + m_b + i_a * a1 * a1 + i_b * a2 * a2,
        );

        if self.enable_limit {
            let translation = self.axis.dot(&d);
            if (self.upper_translation - self.lower_translation).abs()
                < 2.0 * data.params.linear_slop
            {
                self.limit_state = LimitState::Equal;
            } else if translation <= self.lower_translation {
                if self.limit_state != LimitState::AtLower {
                    self.limit_state = LimitState::AtLower;
                    self.impulse.z = 0.0;
                }
            } else if translation >= self.upper_translation {
                if self.limit_state != LimitState::AtUpper {
                    self.limit_state = LimitState::AtUpper;
                    self.impulse.z = 0.0;
                }
            } else {
                self.limit_state = LimitState::Inactive;
                self.impulse.z = 0.0;
            }
        } else {
            self.limit_state = LimitState::Inactive;
            self.impulse.z = 0.0;
        }

        if !self.enable_motor {
            self.motor_impulse = 0.0;
        }

        if data.step.warm_starting {
            self.impulse *= data.step.dt_ratio;
            self.motor_impulse *= data.step.dt_ratio;

            let axial = self.motor_impulse + self.impulse.z;
            let p = self.perp * self.impulse.x + self.axis * axial;
            let l_a = self.impulse.x * s1 + self.impulse.y + axial * a1;
            let l_b = self.impulse.x * s2 + self.impulse.y + axial * a2;
            self.apply((&mut v_a, &mut w_a), (&mut v_b, &mut w_b), p, l_a, l_b);
        } else {
            self.impulse = Vector3::zeros();
            self.motor_impulse = 0.0;
        }

        self.bodies.set_velocities(
            data,
            Velocity { v: v_a, w: w_a },
            Velocity { v: v_b, w: w_b },
        );
    }

    fn solve_velocity_constraints(&mut self, data: &mut SolverData) {
        let (Velocity { v: mut v_a, w: mut w_a }, Velocity { v: mut v_b, w: mut w_b }) =
            self.bodies.velocities(data);
        let (s1, s2, a1, a2) = (self.s1, self.s2, self.a1, self.a2);

        // Motor.
        if self.enable_motor && self.limit_state != LimitState::Equal {
            let cdot = self.axis.dot(&(v_b - v_a)) + a2 * w_b - a1 * w_a;
            let mut impulse = self.motor_mass * (self.motor_speed - cdot);
            let old_impulse = self.motor_impulse;
            let max_impulse = data.step.dt * self.max_motor_force;
            self.motor_impulse = (old_impulse + impulse).clamp(-max_impulse, max_impulse);
            impulse = self.motor_impulse - old_impulse;

            let p = self.axis * impulse;
            self.apply(
                (&mut v_a, &mut w_a),
                (&mut v_b, &mut w_b),
                p,
                impulse * a1,
                impulse * a2,
            );
        }

        let cdot1 = Vector::new(
            self.perp.dot(&(v_b - v_a)) + s2 * w_b - s1 * w_a,
            w_b - w_a,
        );

        if self.enable_limit && self.limit_state != LimitState::Inactive {
            let cdot2 = self.axis.dot(&(v_b - v_a)) + a2 * w_b - a1 * w_a;
            let cdot = Vector3::new(cdot1.x, cdot1.y, cdot2);

            let f1 = self.impulse;
            self.impulse += self.k.solve(&-cdot);

            match self.limit_state {
                LimitState::AtLower => self.impulse.z = self.impulse.z.max(0.0),
                LimitState::AtUpper => self.impulse.z = self.impulse.z.min(0.0),
                LimitState::Equal | LimitState::Inactive => {}
            }

            // Re-solve the first two rows with the clamped third impulse:
            // f2(1:2) = K(1:2, 1:2)⁻¹ * (-Cdot(1:2) - K(1:2, 3) * (f2(3) - f1(3))) + f1(1:2)
            let b = -cdot1 - Vector::new(self.k.m13, self.k.m23) * (self.impulse.z - f1.z);
            let f2r = self.k.solve22(&b) + Vector::new(f1.x, f1.y);
            self.impulse.x = f2r.x;
            self.impulse.y = f2r.y;

            let df = self.impulse - f1;
            let p = self.perp * df.x + self.axis * df.z;
            let l_a = df.x * s1 + df.y + df.z * a1;
            let l_b = df.x * s2 + df.y + df.z * a2;
            self.apply((&mut v_a, &mut w_a), (&mut v_b, &mut w_b), p, l_a, l_b);
        } else {
            let df = self.k.solve22(&-cdot1);
            self.impulse.x += df.x;
            self.impulse.y += df.y;

            let p = self.perp * df.x;
            let l_a = df.x * s1 + df.y;
            let l_b = df.x * s2 + df.y;
            self.apply((&mut v_a, &mut w_a), (&mut v_b, &mut w_b), p, l_a, l_b);
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
        let params = data.params;

        let rot_a = Rotation::new(a_a);
        let r_a = rot_a * (self.local_anchor_a - self.bodies.local_center_a);
        let r_b = Rotation::new(a_b) * (self.local_anchor_b - self.bodies.local_center_b);
        let d = c_b + r_b - c_a - r_a;

        let axis = rot_a * self.local_x_axis_a;
        let a1 = (d + r_a).gcross(axis);
        let a2 = r_b.gcross(axis);
        let perp = rot_a * self.local_y_axis_a;
        let s1 = (d + r_a).gcross(perp);
        let s2 = r_b.gcross(perp);

        let c1 = Vector::new(perp.dot(&d), a_b - a_a - self.reference_angle);

        let mut linear_error = c1.x.abs();
        let angular_error = c1.y.abs();

        let max_correction = params.max_linear_correction;
        let mut c2 = None;
        if self.enable_limit {
            let translation = axis.dot(&d);
            if (self.upper_translation - self.lower_translation).abs() < 2.0 * params.linear_slop
            {
                let error = translation - self.lower_translation;
                c2 = Some(error.clamp(-max_correction, max_correction));
                linear_error = linear_error.max(error.abs());
            } else if translation <= self.lower_translation {
                c2 = Some(
                    (translation - self.lower_translation + params.linear_slop)
                        .clamp(-max_correction, 0.0),
                );
                linear_error = linear_error.max(self.lower_translation - translation);
            } else if translation >= self.upper_translation {
                c2 = Some(
                    (translation - self.upper_translation - params.linear_slop)
                        .clamp(0.0, max_correction),
                );
                linear_error = linear_error.max(translation - self.upper_translation);
            }
        }

        let mut k22 = i_a + i_b;
        if k22 == 0.0 {
            k22 = 1.0;
        }
        let k11 = m_a + m_b + i_a * s1 * s1 + i_b * s2 * s2;
        let k12 = i_a * s1 + i_b * s2;

        let impulse = if let Some(c2) = c2 {
            let k = SdpMatrix3::new(
                k11,
                k12,
                i_a * s1 * a1 + i_b * s2 * a2,
                k22,
                i_a * a1 + i_b * a2,
                m_a + m_b + i_a * a1 * a1 + i_b * a2 * a2,
            );
            k.solve(&-Vector3::new(c1.x, c1.y, c2))
        } else {
            let k = SdpMatrix2::new(k11, k12, k22);
            let impulse = k.solve(&-c1);
            Vector3::new(impulse.x, impulse.y, 0.0)
        };

        let p = perp * impulse.x + axis * impulse.z;
        let l_a = impulse.x * s1 + impulse.y + impulse.z * a1;
        let l_b = impulse.x * s2 + impulse.y + impulse.z * a2;

        c_a -= p * m_a;
        a_a -= i_a * l_a;
        c_b += p * m_b;
        a_b += i_b * l_b;

        self.bodies.set_positions(
            data,
            Position { c: c_a, a: a_a },
            Position { c: c_b, a: a_b },
        );

        linear_error <= params.linear_slop && angular_error <= params.angular_slop
    }
}
