use crate::dynamics::joint::{soft_constraint_coefficients, BodyPair};
use crate::dynamics::{
    Body, JointConstraint, JointType, Position, SolverBody, SolverData, Velocity,
};
use crate::math::{Isometry, Point, Real, Rotation, Vector};
use crate::utils::{inv, WCross};

/// A wheel suspension: the second body slides along an axis of the first body, attached by a
/// spring, and rotates freely.
///
/// The rotation can be driven by a motor with a maximum torque.
#[derive(Copy, Clone, Debug)]
pub struct WheelJoint {
    local_anchor_a: Point<Real>,
    local_anchor_b: Point<Real>,
    local_x_axis_a: Vector<Real>,
    local_y_axis_a: Vector<Real>,
    impulse: Real,
    motor_impulse: Real,
    spring_impulse: Real,
    max_motor_torque: Real,
    motor_speed: Real,
    enable_motor: bool,
    frequency_hz: Real,
    damping_ratio: Real,

    // Solver temporaries.
    bodies: BodyPair,
    ax: Vector<Real>,
    ay: Vector<Real>,
    s_ax: Real,
    s_bx: Real,
    s_ay: Real,
    s_by: Real,
    mass: Real,
    motor_mass: Real,
    spring_mass: Real,
    bias: Real,
    gamma: Real,
}

impl WheelJoint {
    /// A wheel attached at the world `anchor`, sliding along the world `axis`.
    pub fn new(body_a: &Body, body_b: &Body, anchor: &Point<Real>, axis: &Vector<Real>) -> Self {
        Self::with_local_anchors(
            body_a.local_point(anchor),
            body_b.local_point(anchor),
            body_a.local_vector(axis),
        )
    }

    /// A wheel sliding along `local_axis_a`, expressed in the local-space of the first body.
    pub fn with_local_anchors(
        local_anchor_a: Point<Real>,
        local_anchor_b: Point<Real>,
        local_axis_a: Vector<Real>,
    ) -> Self {
        let local_x_axis_a = local_axis_a.try_normalize(0.0).unwrap_or_else(Vector::x);
        Self {
            local_anchor_a,
            local_anchor_b,
            local_x_axis_a,
            local_y_axis_a: Vector::new(-local_x_axis_a.y, local_x_axis_a.x),
            impulse: 0.0,
            motor_impulse: 0.0,
            spring_impulse: 0.0,
            max_motor_torque: 0.0,
            motor_speed: 0.0,
            enable_motor: false,
            frequency_hz: 2.0,
            damping_ratio: 0.7,
            bodies: BodyPair::default(),
            ax: Vector::zeros(),
            ay: Vector::zeros(),
            s_ax: 0.0,
            s_bx: 0.0,
            s_ay: 0.0,
            s_by: 0.0,
            mass: 0.0,
            motor_mass: 0.0,
            spring_mass: 0.0,
            bias: 0.0,
            gamma: 0.0,
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

    /// The unit suspension axis in the local-space of the first body.
    pub fn local_axis_a(&self) -> Vector<Real> {
        self.local_x_axis_a
    }

    /// The current suspension translation.
    pub fn joint_translation(&self, body_a: &Body, body_b: &Body) -> Real {
        let p_a = body_a.world_point(&self.local_anchor_a);
        let p_b = body_b.world_point(&self.local_anchor_b);
        let axis = body_a.world_vector(&self.local_x_axis_a);
        (p_b - p_a).dot(&axis)
    }

    /// The current relative angular speed of the wheel.
    pub fn joint_angular_speed(&self, body_a: &Body, body_b: &Body) -> Real {
        body_b.angular_velocity() - body_a.angular_velocity()
    }

    /// Is the motor enabled?
    pub fn is_motor_enabled(&self) -> bool {
        self.enable_motor
    }

    /// Enables or disables the motor.
    pub fn enable_motor(&mut self, enable: bool) {
        self.enable_motor = enable;
    }

    /// The motor target angular speed, in radians per second.
    pub fn motor_speed(&self) -> Real {
        self.motor_speed
    }

    /// Sets the motor target angular speed.
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

    /// The suspension spring frequency, in Hertz. Zero disables the spring.
    pub fn spring_frequency(&self) -> Real {
        self.frequency_hz
    }

    /// Sets the suspension spring frequency.
    pub fn set_spring_frequency(&mut self, hz: Real) {
        self.frequency_hz = hz;
    }

    /// The suspension spring damping ratio.
    pub fn spring_damping_ratio(&self) -> Real {
        self.damping_ratio
    }

    /// Sets the suspension spring damping ratio.
    pub fn set_spring_damping_ratio(&mut self, ratio: Real) {
        self.damping_ratio = ratio;
    }

    /// Sets the suspension spring frequency and damping ratio.
    pub fn spring(mut self, hz: Real, damping_ratio: Real) -> Self {
        self.frequency_hz = hz;
        self.damping_ratio = damping_ratio;
        self
    }
}

impl JointConstraint for WheelJoint {
    fn joint_type(&self) -> JointType {
        JointType::Wheel
    }

    fn anchor_a(&self, xf_a: &Isometry<Real>) -> Point<Real> {
        xf_a * self.local_anchor_a
    }

    fn anchor_b(&self, xf_b: &Isometry<Real>) -> Point<Real> {
        xf_b * self.local_anchor_b
    }

    fn reaction_force(&self, inv_dt: Real) -> Vector<Real> {
        (self.ay * self.impulse + self.ax * self.spring_impulse) * inv_dt
    }

    fn reaction_torque(&self, inv_dt: Real) -> Real {
        inv_dt * self.motor_impulse
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
        let d = pos_b.c + r_b - pos_a.c - r_a;

        // Point to line constraint.
        self.ay = rot_a * self.local_y_axis_a;
        self.s_ay = (d + r_a).gcross(self.ay);
        self.s_by = r_b.gcross(self.ay);
        self.mass =
            inv(m_a + m_b + i_a * self.s_ay * self.s_ay + i_b * self.s_by * self.s_by);

        // Spring constraint.
        self.ax = rot_a * self.local_x_axis_a;
        self.s_ax = (d + r_a).gcross(self.ax);
        self.s_bx = r_b.gcross(self.ax);
        self.spring_mass = 0.0;
        self.bias = 0.0;
        self.gamma = 0.0;

        if self.frequency_hz > 0.0 {
            let inv_mass = m_a + m_b + i_a * self.s_ax * self.s_ax + i_b * self.s_bx * self.s_bx;
            if inv_mass > 0.0 {
                let c = d.dot(&self.ax);
                let (gamma, beta) = soft_constraint_coefficients(
                    1.0 / inv_mass,
                    self.frequency_hz,
                    self.damping_ratio,
                    data.step.dt,
                );
                self.gamma = gamma;
                self.bias = c * beta;
                self.spring_mass = inv(inv_mass + gamma);
            }
        } else {
            self.spring_impulse = 0.0;
        }

        // Rotational motor.
        if self.enable_motor {
            self.motor_mass = inv(i_a + i_b);
        } else {
            self.motor_mass = 0.0;
            self.motor_impulse = 0.0;
        }

        if data.step.warm_starting {
            self.impulse *= data.step.dt_ratio;
            self.spring_impulse *= data.step.dt_ratio;
            self.motor_impulse *= data.step.dt_ratio;

            let p = self.ay * self.impulse + self.ax * self.spring_impulse;
            let l_a = self.impulse * self.s_ay + self.spring_impulse * self.s_ax + self.motor_impulse;
            let l_b = self.impulse * self.s_by + self.spring_impulse * self.s_bx + self.motor_impulse;

            v_a -= p * m_a;
            w_a -= i_a * l_a;
            v_b += p * m_b;
            w_b += i_b * l_b;
        } else {
            self.impulse = 0.0;
            self.spring_impulse = 0.0;
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

        // Spring.
        {
            let cdot = self.ax.dot(&(v_b - v_a)) + self.s_bx * w_b - self.s_ax * w_a;
            let impulse =
                -self.spring_mass * (cdot + self.bias + self.gamma * self.spring_impulse);
            self.spring_impulse += impulse;

            let p = self.ax * impulse;
            v_a -= p * m_a;
            w_a -= i_a * impulse * self.s_ax;
            v_b += p * m_b;
            w_b += i_b * impulse * self.s_bx;
        }

        // Rotational motor.
        {
            let cdot = w_b - w_a - self.motor_speed;
            let mut impulse = -self.motor_mass * cdot;
            let old_impulse = self.motor_impulse;
            let max_impulse = data.step.dt * self.max_motor_torque;
            self.motor_impulse = (old_impulse + impulse).clamp(-max_impulse, max_impulse);
            impulse = self.motor_impulse - old_impulse;

            w_a -= i_a * impulse;
            w_b += i_b * impulse;
        }

        // Point to line.
        {
            let cdot = self.ay.dot(&(v_b - v_a)) + self.s_by * w_b - self.s_ay * w_a;
            let impulse = -self.mass * cdot;
            self.impulse += impulse;

            let p = self.ay * impulse;
            v_a -= p * m_a;
            w_a -= i_a * impulse * self.s_ay;
            v_b += p * m_b;
            w_b += i_b * impulse * self.s_by;
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

        let rot_a = Rotation::new(a_a);
        let r_a = rot_a * (self.local_anchor_a - self.bodies.local_center_a);
        let r_b = Rotation::new(a_b) * (self.local_anchor_b - self.bodies.local_center_b);
        let d = c_b + r_b - c_a - r_a;

        let ay = rot_a * self.local_y_axis_a;
        let s_ay = (d + r_a).gcross(ay);
        let s_by = r_b.gcross(ay);

        let c = d.dot(&ay);
        let k = m_a + m_b + i_a * s_ay * s_ay + i_b * s_by * s_by;
        let impulse = if k != 0.0 { -c / k } else { 0.0 };

        let p = ay * impulse;
        c_a -= p * m_a;
        a_a -= i_a * impulse * s_ay;
        c_b += p * m_b;
        a_b += i_b * impulse * s_by;

        self.bodies.set_positions(
            data,
            Position { c: c_a, a: a_a },
            Position { c: c_b, a: a_b },
        );

        c.abs() <= data.params.linear_slop
    }
}
