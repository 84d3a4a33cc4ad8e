use crate::dynamics::body::BodyFlags;
use crate::dynamics::{
    Body, BodyHandle, BodyType, Contact, ContactHandle, ContactListener, ContactSolver, Fixture,
    IntegrationParameters, Joint, JointHandle, Position, SolverBody, SolverData, TimeStep,
    Velocity,
};
use crate::math::{Real, Vector};
use alloc::vec::Vec;
use hashbrown::HashMap;
use thunderdome::Arena;

/// A group of bodies, contacts and joints solved together.
///
/// Islands are rebuilt at each step by the world. Their buffers are kept between solves to
/// avoid reallocations.
#[derive(Default)]
pub(crate) struct Island {
    // The island index of every body, used to address the solver arrays.
    body_index: HashMap<BodyHandle, usize>,
    pub(crate) bodies: Vec<BodyHandle>,
    pub(crate) contacts: Vec<ContactHandle>,
    pub(crate) joints: Vec<JointHandle>,
    positions: Vec<Position>,
    velocities: Vec<Velocity>,
    contact_solver: ContactSolver,
}

impl Island {
    pub fn clear(&mut self) {
        self.body_index.clear();
        self.bodies.clear();
        self.contacts.clear();
        self.joints.clear();
    }

    /// Adds a body to this island and returns its island index.
    pub fn add_body(&mut self, handle: BodyHandle) -> usize {
        let index = self.bodies.len();
        let _ = self.body_index.insert(handle, index);
        self.bodies.push(handle);
        index
    }

    pub fn add_contact(&mut self, handle: ContactHandle) {
        self.contacts.push(handle);
    }

    pub fn add_joint(&mut self, handle: JointHandle) {
        self.joints.push(handle);
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    fn add_contact_constraints(
        &mut self,
        step: &TimeStep,
        bodies: &Arena<Body>,
        contacts: &Arena<Contact>,
        fixtures: &Arena<Fixture>,
    ) {
        self.contact_solver.clear();

        for handle in &self.contacts {
            let contact = &contacts[handle.0];
            let radius_a = fixtures[contact.fixture_a.0].shape().radius();
            let radius_b = fixtures[contact.fixture_b.0].shape().radius();
            let body_a = solver_body(&self.body_index, bodies, contact.body_a);
            let body_b = solver_body(&self.body_index, bodies, contact.body_b);

            self.contact_solver
                .add_contact(step, *handle, contact, body_a, radius_a, body_b, radius_b);
        }
    }

    /// Solves the velocities and positions of every body of this island over a full time step,
    /// then puts the island to sleep if all its bodies have been still long enough.
    pub fn solve(
        &mut self,
        step: &TimeStep,
        params: &IntegrationParameters,
        gravity: &Vector<Real>,
        allow_sleep: bool,
        bodies: &mut Arena<Body>,
        fixtures: &Arena<Fixture>,
        contacts: &mut Arena<Contact>,
        joints: &mut Arena<Joint>,
        listener: &mut dyn ContactListener,
    ) {
        let h = step.dt;

        // Integrate velocities.
        self.positions.clear();
        self.velocities.clear();

        for handle in &self.bodies {
            let body = &mut bodies[handle.0];
            let c = body.sweep.c;
            let a = body.sweep.a;
            let mut v = body.linvel;
            let mut w = body.angvel;

            // Store positions for continuous collision.
            body.sweep.c0 = c;
            body.sweep.a0 = a;

            if body.body_type == BodyType::Dynamic {
                v += (gravity * body.gravity_scale + body.force * body.inv_mass) * h;
                w += h * body.inv_inertia * body.torque;

                // Pade approximation of the exponential decay, clamped for large damping.
                v *= (1.0 - h * body.linear_damping).clamp(0.0, 1.0);
                w *= (1.0 - h * body.angular_damping).clamp(0.0, 1.0);
            }

            self.positions.push(Position { c, a });
            self.velocities.push(Velocity { v, w });
        }

        self.add_contact_constraints(step, bodies, contacts, fixtures);
        self.contact_solver
            .initialize_velocity_constraints(params, &self.positions, &self.velocities);
        self.contact_solver.warm_start(&mut self.velocities);

        let mut data = SolverData {
            step: *step,
            params,
            positions: &mut self.positions,
            velocities: &mut self.velocities,
        };

        for handle in &self.joints {
            let joint = &mut joints[handle.0];
            let body_a = solver_body(&self.body_index, bodies, joint.body_a);
            let body_b = solver_body(&self.body_index, bodies, joint.body_b);
            joint
                .constraint
                .init_velocity_constraints(&body_a, &body_b, &mut data);
        }

        // Joints are solved first within each iteration.
        for _ in 0..step.velocity_iterations {
            for handle in &self.joints {
                joints[handle.0]
                    .constraint
                    .solve_velocity_constraints(&mut data);
            }

            self.contact_solver
                .solve_velocity_constraints(data.velocities);
        }

        // Store impulses for warm starting.
        self.contact_solver.store_impulses(contacts);

        // Integrate positions.
        for (position, velocity) in data.positions.iter_mut().zip(data.velocities.iter_mut()) {
            clamp_and_integrate(params, h, position, velocity);
        }

        // Solve position constraints.
        let mut position_solved = false;
        for _ in 0..step.position_iterations {
            let contacts_okay = self
                .contact_solver
                .solve_position_constraints(params, data.positions);

            let mut joints_okay = true;
            for handle in &self.joints {
                joints_okay &= joints[handle.0]
                    .constraint
                    .solve_position_constraints(&mut data);
            }

            if contacts_okay && joints_okay {
                // Exit early if the position errors are small.
                position_solved = true;
                break;
            }
        }

        // Copy state buffers back to the bodies.
        for (i, handle) in self.bodies.iter().enumerate() {
            let body = &mut bodies[handle.0];
            body.sweep.c = self.positions[i].c;
            body.sweep.a = self.positions[i].a;
            body.linvel = self.velocities[i].v;
            body.angvel = self.velocities[i].w;
            body.synchronize_transform();
        }

        self.report(contacts, listener);

        if allow_sleep {
            let lin_tol_sqr = params.linear_sleep_tolerance * params.linear_sleep_tolerance;
            let ang_tol_sqr = params.angular_sleep_tolerance * params.angular_sleep_tolerance;
            let mut min_sleep_time = Real::MAX;

            for handle in &self.bodies {
                let body = &mut bodies[handle.0];
                if body.is_static() {
                    continue;
                }

                if !body.flags.contains(BodyFlags::AUTO_SLEEP)
                    || body.angvel * body.angvel > ang_tol_sqr
                    || body.linvel.norm_squared() > lin_tol_sqr
                {
                    body.sleep_time = 0.0;
                    min_sleep_time = 0.0;
                } else {
                    body.sleep_time += h;
                    min_sleep_time = min_sleep_time.min(body.sleep_time);
                }
            }

            if min_sleep_time >= params.time_to_sleep && position_solved {
                for handle in &self.bodies {
                    bodies[handle.0].set_awake(false);
                }
            }
        }
    }

    /// Solves the time-of-impact sub-step of this island.
    ///
    /// The positions of the two bodies of the impact are corrected first and become their new
    /// sweep start. Then the velocities of every body are solved, without warm starting, and
    /// positions are integrated over the remainder of the step.
    pub fn solve_toi(
        &mut self,
        sub_step: &TimeStep,
        params: &IntegrationParameters,
        toi_body_a: BodyHandle,
        toi_body_b: BodyHandle,
        bodies: &mut Arena<Body>,
        fixtures: &Arena<Fixture>,
        contacts: &Arena<Contact>,
        listener: &mut dyn ContactListener,
    ) {
        debug_assert!(!sub_step.warm_starting);
        let toi_index_a = self.body_index[&toi_body_a];
        let toi_index_b = self.body_index[&toi_body_b];

        self.positions.clear();
        self.velocities.clear();

        for handle in &self.bodies {
            let body = &bodies[handle.0];
            self.positions.push(Position {
                c: body.sweep.c,
                a: body.sweep.a,
            });
            self.velocities.push(Velocity {
                v: body.linvel,
                w: body.angvel,
            });
        }

        self.add_contact_constraints(sub_step, bodies, contacts, fixtures);

        // Solve position constraints.
        for _ in 0..sub_step.position_iterations {
            if self.contact_solver.solve_toi_position_constraints(
                params,
                &mut self.positions,
                toi_index_a,
                toi_index_b,
            ) {
                break;
            }
        }

        // Leap of faith to the new safe state.
        for (handle, index) in [(toi_body_a, toi_index_a), (toi_body_b, toi_index_b)] {
            let body = &mut bodies[handle.0];
            body.sweep.c0 = self.positions[index].c;
            body.sweep.a0 = self.positions[index].a;
        }

        // Warm starting impulses were applied by the discrete solver already.
        self.contact_solver
            .initialize_velocity_constraints(params, &self.positions, &self.velocities);

        for _ in 0..sub_step.velocity_iterations {
            self.contact_solver
                .solve_velocity_constraints(&mut self.velocities);
        }

        // The impulses are not stored: they can be very large for impacts.

        for (i, handle) in self.bodies.iter().enumerate() {
            clamp_and_integrate(
                params,
                sub_step.dt,
                &mut self.positions[i],
                &mut self.velocities[i],
            );

            let body = &mut bodies[handle.0];
            body.sweep.c = self.positions[i].c;
            body.sweep.a = self.positions[i].a;
            body.linvel = self.velocities[i].v;
            body.angvel = self.velocities[i].w;
            body.synchronize_transform();
        }

        self.report(contacts, listener);
    }

    fn report(&self, contacts: &Arena<Contact>, listener: &mut dyn ContactListener) {
        for (handle, impulse) in self.contact_solver.impulses() {
            if let Some(contact) = contacts.get(handle.0) {
                listener.post_solve(contact, &impulse);
            }
        }
    }
}

fn solver_body(
    body_index: &HashMap<BodyHandle, usize>,
    bodies: &Arena<Body>,
    handle: BodyHandle,
) -> SolverBody {
    let body = &bodies[handle.0];
    SolverBody {
        index: body_index[&handle],
        local_center: body.sweep.local_center,
        inv_mass: body.inv_mass,
        inv_inertia: body.inv_inertia,
    }
}

/// Clamps the velocity so that one step cannot move the body too far, then integrates the
/// position.
fn clamp_and_integrate(
    params: &IntegrationParameters,
    h: Real,
    position: &mut Position,
    velocity: &mut Velocity,
) {
    let translation = velocity.v * h;
    if translation.norm_squared() > params.max_translation * params.max_translation {
        velocity.v *= params.max_translation / translation.norm();
    }

    let rotation = h * velocity.w;
    if rotation * rotation > params.max_rotation * params.max_rotation {
        velocity.w *= params.max_rotation / rotation.abs();
    }

    position.c += velocity.v * h;
    position.a += h * velocity.w;
}
