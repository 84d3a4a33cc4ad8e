use crate::dynamics::joint::BodyPair;
use crate::dynamics::{
    Body, JointConstraint, JointType, LimitState, Position, SolverBody, SolverData, Velocity,
};
use crate::math::{Isometry, Point, Real, Rotation, Vector, Vector3};
use crate::utils::{inv, SdpMatrix2, SdpMatrix3, WCross};

/// A hinge: both anchors coincide and the bodies rotate freely relative to each other.
///
/// The relative angle can be limited to a range and driven by a motor with a maximum torque.
#[derive(Copy, Clone, Debug)]
pub struct RevoluteJoint {
    local_anchor_a: Point<Real>,
    local_anchor_b: Point<Real>,
    reference_angle: Real,
    enable_limit: bool,
    lower_angle: Real,
    upper_angle: Real,
    enable_motor: bool,
    motor_speed: Real,
    max_motor_torque: Real,
    impulse: Vector3<Real>,
    motor_impulse: Real,

    // Solver temporaries.
    bodies: BodyPair,
    r_a: Vector<Real>,
    r_b: Vector<Real>,
    // Not inverted: solved with the zero-safe `SdpMatrix3` solvers.
    mass: SdpMatrix3,
    motor_mass: Real,
    limit_state: LimitState,
}

impl RevoluteJoint {
    /// A hinge around a world anchor, keeping the current relative angle as reference.
    pub fn new(body_a: &Body, body_b: &Body, anchor: &Point<Real>) -> Self {
        Self::with_local_anchors(
            body_a.local_point(anchor),
            body_b.local_point(anchor),
            body_b.angle() - body_a.angle(),
        )
    }

    /// A hinge between two local anchors, with the given reference relative angle.
    pub fn with_local_anchors(
        local_anchor_a: Point<Real>,
        local_anchor_b: Point<Real>,
        reference_angle: Real,
    ) -> Self {
        Self {
            local_anchor_a,
            local_anchor_b,
            reference_angle,
            enable_limit: false,
            lower_angle: 0.0,
            upper_angle: 0.0,
            enable_motor: false,
            motor_speed: 0.0,
            max_motor_torque: 0.0,
            impulse: Vector3::zeros(),
            motor_impulse: 0.0,
            bodies: BodyPair::default(),
            r_a: Vector::zeros(),
            r_b: Vector::zeros(),
            mass: SdpMatrix3::zero(),
            motor_mass: 0.0,
            limit_state: LimitState::Inactive,
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

    /// The relative angle of both bodies for which the joint angle is zero.
    pub fn reference_angle(&self) -> Real {
        self.reference_angle
    }

    /// The current joint angle, in radians.
    pub fn joint_angle(&self, body_a: &Body, body_b: &Body) -> Real {
        body_b.angle() - body_a.angle() - self.reference_angle
    }

    /// The current joint angular speed, in radians per second.
    pub fn joint_speed(&self, body_a: &Body, body_b: &Body) -> Real {
        body_b.angular_velocity() - body_a.angular_velocity()
    }

    /// Is the angle limit enabled?
    pub fn is_limit_enabled(&self) -> bool {
        self.enable_limit
    }

    /// Enables or disables the angle limit.
    pub fn enable_limit(&mut self, enable: bool) {
        if enable != self.enable_limit {
            self.enable_limit = enable;
            self.impulse.z = 0.0;
        }
    }

    /// The lower angle limit.
    pub fn lower_limit(&self) -> Real {
        self.lower_angle
    }

    /// The upper angle limit.
    pub fn upper_limit(&self) -> Real {
        self.upper_angle
    }

    /// Sets the angle limits, in radians.
    pub fn set_limits(&mut self, lower: Real, upper: Real) {
        debug_assert!(lower <= upper);
        if lower != self.lower_angle || upper != self.upper_angle {
            self.impulse.z = 0.0;
            self.lower_angle = lower;
            self.upper_angle = upper;
        }
    }

    /// Enables the angle limit with the given bounds.
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

    /// The motor target speed, in radians per second.
    pub fn motor_speed(&self) -> Real {
        self.motor_speed
    }

    /// Sets the motor target speed.
    pub fn set_motor_speed(&mut self, speed: Real) {
        self.motor_speed = speed;
    }

    /// The maximum motor torque.
    pub fn max_motor_torque(&self) -> Real {
        self.max_motor_torque
    }

    /// Sets the maximum motor torque.
    pub fn set_max_motor_torque(&mut self, torque: Real) {
        self.max_motor_torque = torque;
    }

    /// Enables the motor with the given target speed and maximum torque.
    pub fn motor(mut self, speed: Real, max_torque: Real) -> Self {
        self.enable_motor = true;
        self.motor_speed = speed;
        self.max_motor_torque = max_torque;
        self
    }

    /// The torque applied by the motor.
    pub fn motor_torque(&self, inv_dt: Real) -> Real {
        inv_dt * self.motor_impulse
    }

    /// The state of the angle limit at the last step.
    pub fn limit_state(&self) -> LimitState {
        self.limit_state
    }
}

impl JointConstraint for RevoluteJoint {
    fn joint_type(&self) -> JointType {
        JointType::Revolute
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
        let (r_a, r_b) = (self.r_a, self.r_b);

        // J = [-I -r1_skew I r2_skew]
        //     [ 0       -1 0       1]
        let fixed_rotation = i_a + i_b == 0.0;

        self.mass = SdpMatrix3::new(
            m_a + m_b + r_a.y * r_a.y * i_a + r_b.y * r_b.y * i_b,
            -r_a.y * r_a.x * i_a - r_b.y * r_b.x * i_b,
            -r_a.y * i_a - r_b.y * i_b,
            m_a + m_b + r_a.x * r_a.x * i_a + r_b.x * r_b.x * i_b,
            r_a.x * i_a + r_b.x * i_b,
            i_a + i_b,
        );

        self.motor_mass = inv(i_a + i_b);

        if !self.enable_motor || fixed_rotation {
            self.motor_impulse = 0.0;
        }

        if self.enable_limit && !fixed_rotation {
            let joint_angle = pos_b.a - pos_a.a - self.reference_angle;
            if (self.upper_angle - self.lower_angle).abs() < 2.0 * data.params.angular_slop {
                self.limit_state = LimitState::Equal;
            } else if joint_angle <= self.lower_angle {
                if self.limit_state != LimitState::AtLower {
                    self.impulse.z = 0.0;
                }
                self.limit_state = LimitState::AtLower;
            } else if joint_angle >= self.upper_angle {
                if self.limit_state != LimitState::AtUpper {
                    self.impulse.z = 0.0;
                }
                self.limit_state = LimitState::AtUpper;
            } else {
                self.limit_state = LimitState::Inactive;
                self.impulse.z = 0.0;
            }
        } else {
            self.limit_state = LimitState::Inactive;
        }

        if data.step.warm_starting {
            self.impulse *= data.step.dt_ratio;
            self.motor_impulse *= data.step.dt_ratio;

            let p = Vector::new(self.impulse.x, self.impulse.y);
            v_a -= p * m_a;
            w_a -= i_a * (r_a.gcross(p) + self.motor_impulse + self.impulse.z);
            v_b += p * m_b;
            w_b += i_b * (r_b.gcross(p) + self.motor_impulse + self.impulse.z);
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

        let fixed_rotation = i_a + i_b == 0.0;

        // Motor.
        if self.enable_motor && self.limit_state != LimitState::Equal && !fixed_rotation {
            let cdot = w_b - w_a - self.motor_speed;
            let mut impulse = -self.motor_mass * cdot;
            let old_impulse = self.motor_impulse;
            let max_impulse = data.step.dt * self.max_motor_torque;
            self.motor_impulse = (old_impulse + impulse).clamp(-max_impulse, max_impulse);
            impulse = self.motor_impulse - old_impulse;

            w_a -= i_a * impulse;
            w_b += i_b * impulse;
        }

        if self.enable_limit && self.limit_state != LimitState::Inactive && !fixed_rotation {
            // Limit and point constraints together.
            let cdot1 = v_b + w_b.gcross(r_b) - v_a - w_a.gcross(r_a);
            let cdot2 = w_b - w_a;
            let cdot = Vector3::new(cdot1.x, cdot1.y, cdot2);

            let mut impulse = -self.mass.solve(&cdot);

            match self.limit_state {
                LimitState::Equal => self.impulse += impulse,
                LimitState::AtLower | LimitState::AtUpper => {
                    let new_impulse = self.impulse.z + impulse.z;
                    let violates = if self.limit_state == LimitState::AtLower {
                        new_impulse < 0.0
                    } else {
                        new_impulse > 0.0
                    };

                    if violates {
                        // Release the limit and solve the point constraint only.
                        let rhs = -cdot1
                            + Vector::new(self.mass.m13, self.mass.m23) * self.impulse.z;
                        let reduced = self.mass.solve22(&rhs);
                        impulse.x = reduced.x;
                        impulse.y = reduced.y;
                        impulse.z = -self.impulse.z;
                        self.impulse.x += reduced.x;
                        self.impulse.y += reduced.y;
                        self.impulse.z = 0.0;
                    } else {
                        self.impulse += impulse;
                    }
                }
                LimitState::Inactive => {}
            }

            let p = Vector::new(impulse.x, impulse.y);
            v_a -= p * m_a;
            w_a -= i_a * (r_a.gcross(p) + impulse.z);
            v_b += p * m_b;
            w_b += i_b * (r_b.gcross(p) + impulse.z);
        } else {
            // Point constraint only.
            let cdot = v_b + w_b.gcross(r_b) - v_a - w_a.gcross(r_a);
            let impulse = self.mass.solve22(&-cdot);

            self.impulse.x += impulse.x;
            self.impulse.y += impulse.y;

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

        let mut angular_error = 0.0;
        let fixed_rotation = i_a + i_b == 0.0;

        // Angle limit.
        if self.enable_limit && self.limit_state != LimitState::Inactive && !fixed_rotation {
            let angle = a_b - a_a - self.reference_angle;
            let max_correction = params.max_angular_correction;

            let c = match self.limit_state {
                LimitState::Equal => {
                    let c = (angle - self.lower_angle).clamp(-max_correction, max_correction);
                    angular_error = c.abs();
                    c
                }
                LimitState::AtLower => {
                    let c = angle - self.lower_angle;
                    angular_error = -c;
                    (c + params.angular_slop).clamp(-max_correction, 0.0)
                }
                LimitState::AtUpper => {
                    let c = angle - self.upper_angle;
                    angular_error = c;
                    (c - params.angular_slop).clamp(0.0, max_correction)
                }
                LimitState::Inactive => 0.0,
            };

            let limit_impulse = -self.motor_mass * c;
            a_a -= i_a * limit_impulse;
            a_b += i_b * limit_impulse;
        }

        // Point-to-point.
        let r_a = Rotation::new(a_a) * (self.local_anchor_a - self.bodies.local_center_a);
        let r_b = Rotation::new(a_b) * (self.local_anchor_b - self.bodies.local_center_b);

        let c = c_b + r_b - c_a - r_a;
        let position_error = c.norm();

        let k = SdpMatrix2::new(
            m_a + m_b + i_a * r_a.y * r_a.y + i_b * r_b.y * r_b.y,
            -i_a * r_a.x * r_a.y - i_b * r_b.x * r_b.y,
            m_a + m_b + i_a * r_a.x * r_a.x + i_b * r_b.x * r_b.x,
        );
        let impulse = -k.solve(&c);

        c_a -= impulse * m_a;
        a_a -= i_a * r_a.gcross(impulse);
        c_b += impulse * m_b;
        a_b += i_b * r_b.gcross(impulse);

        self.bodies.set_positions(
            data,
            Position { c: c_a, a: a_a },
            Position { c: c_b, a: a_b },
        );

        position_error <= params.linear_slop && angular_error <= params.angular_slop
    }
}

#[cfg(test)]
mod test {
    use super::RevoluteJoint;
    use crate::dynamics::{
        IntegrationParameters, JointConstraint, Position, SolverBody, SolverData, TimeStep,
        Velocity,
    };
    use crate::math::{Point, Vector};

    fn time_step(warm_starting: bool) -> TimeStep {
        TimeStep {
            dt: 1.0 / 60.0,
            inv_dt: 60.0,
            dt_ratio: 1.0,
            velocity_iterations: 8,
            position_iterations: 3,
            warm_starting,
        }
    }

    // A fixed pivot at the origin holding a unit mass at (1, 0) that falls at 1 m/s.
    fn pendulum() -> (RevoluteJoint, SolverBody, SolverBody, [Position; 2], [Velocity; 2]) {
        let joint = RevoluteJoint::with_local_anchors(Point::origin(), Point::new(-1.0, 0.0), 0.0);
        let pivot = SolverBody {
            index: 0,
            local_center: Point::origin(),
            inv_mass: 0.0,
            inv_inertia: 0.0,
        };
        let weight = SolverBody {
            index: 1,
            local_center: Point::origin(),
            inv_mass: 1.0,
            inv_inertia: 1.0,
        };
        let positions = [
            Position { c: Point::origin(), a: 0.0 },
            Position { c: Point::new(1.0, 0.0), a: 0.0 },
        ];
        let velocities = [
            Velocity { v: Vector::zeros(), w: 0.0 },
            Velocity { v: Vector::new(0.0, -1.0), w: 0.0 },
        ];
        (joint, pivot, weight, positions, velocities)
    }

    fn solve(
        joint: &mut RevoluteJoint,
        pivot: &SolverBody,
        weight: &SolverBody,
        positions: &mut [Position; 2],
        velocities: &mut [Velocity; 2],
    ) {
        let params = IntegrationParameters::default();
        let mut data = SolverData {
            step: time_step(true),
            params: &params,
            positions,
            velocities,
        };
        joint.init_velocity_constraints(pivot, weight, &mut data);
        for _ in 0..8 {
            joint.solve_velocity_constraints(&mut data);
        }
    }

    #[test]
    fn cold_start_discards_the_accumulated_impulse() {
        let (mut joint, pivot, weight, mut positions, falling) = pendulum();
        let mut velocities = falling;
        solve(&mut joint, &pivot, &weight, &mut positions, &mut velocities);
        assert!(joint.reaction_force(1.0).norm() > 0.0);

        let params = IntegrationParameters::default();
        let mut velocities = falling;
        let mut data = SolverData {
            step: time_step(false),
            params: &params,
            positions: &mut positions,
            velocities: &mut velocities,
        };
        joint.init_velocity_constraints(&pivot, &weight, &mut data);

        assert_eq!(joint.reaction_force(1.0), Vector::zeros());
        assert_eq!(joint.reaction_torque(1.0), 0.0);
        assert_eq!(velocities, falling);
    }

    #[test]
    fn warm_start_reapplies_the_accumulated_impulse() {
        let (mut joint, pivot, weight, mut positions, falling) = pendulum();
        let mut velocities = falling;
        solve(&mut joint, &pivot, &weight, &mut positions, &mut velocities);
        let impulse = joint.reaction_force(1.0);

        let params = IntegrationParameters::default();
        let mut velocities = falling;
        let mut data = SolverData {
            step: time_step(true),
            params: &params,
            positions: &mut positions,
            velocities: &mut velocities,
        };
        joint.init_velocity_constraints(&pivot, &weight, &mut data);

        assert_eq!(joint.reaction_force(1.0), impulse);
        assert_ne!(velocities[1], falling[1]);
    }
}
