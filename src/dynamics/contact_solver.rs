use crate::dynamics::{
    Contact, ContactHandle, ContactImpulse, IntegrationParameters, Position, SolverBody,
    TimeStep, Velocity,
};
use crate::dynamics::sweep::transform_from_center;
use crate::math::{Isometry, Point, Real, Vector};
use crate::query::{Manifold, ManifoldType, WorldManifold, MAX_MANIFOLD_POINTS};
use crate::utils::{normalize, SdpMatrix2, WCross};
use alloc::vec::Vec;
use thunderdome::Arena;

#[derive(Copy, Clone, Debug, Default)]
struct VelocityConstraintPoint {
    r_a: Vector<Real>,
    r_b: Vector<Real>,
    normal_impulse: Real,
    tangent_impulse: Real,
    normal_mass: Real,
    tangent_mass: Real,
    velocity_bias: Real,
}

#[derive(Clone, Debug)]
struct ContactVelocityConstraint {
    points: [VelocityConstraintPoint; MAX_MANIFOLD_POINTS],
    normal: Vector<Real>,
    normal_mass: SdpMatrix2,
    k: SdpMatrix2,
    body_a: SolverBody,
    body_b: SolverBody,
    friction: Real,
    restitution: Real,
    tangent_speed: Real,
    point_count: usize,
    contact: ContactHandle,
}

#[derive(Clone, Debug)]
struct ContactPositionConstraint {
    manifold: Manifold,
    body_a: SolverBody,
    body_b: SolverBody,
    radius_a: Real,
    radius_b: Real,
}

/// A sequential-impulse solver for the contacts of an island.
///
/// The constraint buffers are kept between solves to avoid reallocations.
#[derive(Clone, Debug, Default)]
pub struct ContactSolver {
    velocity_constraints: Vec<ContactVelocityConstraint>,
    position_constraints: Vec<ContactPositionConstraint>,
}

impl ContactSolver {
    /// Removes every constraint.
    pub fn clear(&mut self) {
        self.velocity_constraints.clear();
        self.position_constraints.clear();
    }

    /// The number of contact constraints.
    pub fn len(&self) -> usize {
        self.velocity_constraints.len()
    }

    /// Does this solver have no constraint?
    pub fn is_empty(&self) -> bool {
        self.velocity_constraints.is_empty()
    }

    /// Adds the constraints of a touching contact.
    ///
    /// The accumulated impulses of the manifold are scaled by `dt_ratio` if warm starting is
    /// enabled, and discarded otherwise.
    pub fn add_contact(
        &mut self,
        step: &TimeStep,
        handle: ContactHandle,
        contact: &Contact,
        body_a: SolverBody,
        radius_a: Real,
        body_b: SolverBody,
        radius_b: Real,
    ) {
        let manifold = contact.manifold();
        debug_assert!(!manifold.is_empty());

        let mut points = [VelocityConstraintPoint::default(); MAX_MANIFOLD_POINTS];
        if step.warm_starting {
            for (vcp, mp) in points.iter_mut().zip(manifold.points.iter()) {
                vcp.normal_impulse = step.dt_ratio * mp.normal_impulse;
                vcp.tangent_impulse = step.dt_ratio * mp.tangent_impulse;
            }
        }

        self.velocity_constraints.push(ContactVelocityConstraint {
            points,
            normal: Vector::zeros(),
            normal_mass: SdpMatrix2::zero(),
            k: SdpMatrix2::zero(),
            body_a,
            body_b,
            friction: contact.friction(),
            restitution: contact.restitution(),
            tangent_speed: contact.tangent_speed(),
            point_count: manifold.len(),
            contact: handle,
        });

        self.position_constraints.push(ContactPositionConstraint {
            manifold: manifold.clone(),
            body_a,
            body_b,
            radius_a,
            radius_b,
        });
    }

    /// Computes the parts of the velocity constraints that depend on the current positions.
    pub fn initialize_velocity_constraints(
        &mut self,
        params: &IntegrationParameters,
        positions: &[Position],
        velocities: &[Velocity],
    ) {
        for (vc, pc) in self
            .velocity_constraints
            .iter_mut()
            .zip(self.position_constraints.iter())
        {
            let (m_a, i_a) = (vc.body_a.inv_mass, vc.body_a.inv_inertia);
            let (m_b, i_b) = (vc.body_b.inv_mass, vc.body_b.inv_inertia);

            let Position { c: c_a, a: a_a } = positions[vc.body_a.index];
            let Velocity { v: v_a, w: w_a } = velocities[vc.body_a.index];
            let Position { c: c_b, a: a_b } = positions[vc.body_b.index];
            let Velocity { v: v_b, w: w_b } = velocities[vc.body_b.index];

            let xf_a = transform_from_center(c_a, a_a, vc.body_a.local_center);
            let xf_b = transform_from_center(c_b, a_b, vc.body_b.local_center);

            let world_manifold =
                WorldManifold::new(&pc.manifold, &xf_a, pc.radius_a, &xf_b, pc.radius_b);
            vc.normal = world_manifold.normal;
            let tangent = vc.normal.gcross(1.0);

            for (vcp, point) in vc
                .points
                .iter_mut()
                .zip(world_manifold.points.iter())
                .take(vc.point_count)
            {
                vcp.r_a = point - c_a;
                vcp.r_b = point - c_b;

                let rn_a = vcp.r_a.gcross(vc.normal);
                let rn_b = vcp.r_b.gcross(vc.normal);
                let k_normal = m_a + m_b + i_a * rn_a * rn_a + i_b * rn_b * rn_b;
                vcp.normal_mass = if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 };

                let rt_a = vcp.r_a.gcross(tangent);
                let rt_b = vcp.r_b.gcross(tangent);
                let k_tangent = m_a + m_b + i_a * rt_a * rt_a + i_b * rt_b * rt_b;
                vcp.tangent_mass = if k_tangent > 0.0 {
                    1.0 / k_tangent
                } else {
                    0.0
                };

                // Restitution only applies above the velocity threshold.
                vcp.velocity_bias = 0.0;
                let v_rel = vc
                    .normal
                    .dot(&(v_b + w_b.gcross(vcp.r_b) - v_a - w_a.gcross(vcp.r_a)));
                if v_rel < -params.velocity_threshold {
                    vcp.velocity_bias = -vc.restitution * v_rel;
                }
            }

            if vc.point_count == 2 {
                let [vcp1, vcp2] = &vc.points;

                let rn1_a = vcp1.r_a.gcross(vc.normal);
                let rn1_b = vcp1.r_b.gcross(vc.normal);
                let rn2_a = vcp2.r_a.gcross(vc.normal);
                let rn2_b = vcp2.r_b.gcross(vc.normal);

                let k11 = m_a + m_b + i_a * rn1_a * rn1_a + i_b * rn1_b * rn1_b;
                let k22 = m_a + m_b + i_a * rn2_a * rn2_a + i_b * rn2_b * rn2_b;
                let k12 = m_a + m_b + i_a * rn1_a * rn2_a + i_b * rn1_b * rn2_b;

                if k11 * k11 < params.max_condition_number * (k11 * k22 - k12 * k12) {
                    vc.k = SdpMatrix2::new(k11, k12, k22);
                    vc.normal_mass = vc.k.inverse();
                } else {
                    // The points are redundant, keep only the first one.
                    vc.point_count = 1;
                }
            }
        }
    }

    /// Applies the accumulated impulses to the velocities.
    pub fn warm_start(&self, velocities: &mut [Velocity]) {
        for vc in &self.velocity_constraints {
            let (m_a, i_a) = (vc.body_a.inv_mass, vc.body_a.inv_inertia);
            let (m_b, i_b) = (vc.body_b.inv_mass, vc.body_b.inv_inertia);
            let Velocity { v: mut v_a, w: mut w_a } = velocities[vc.body_a.index];
            let Velocity { v: mut v_b, w: mut w_b } = velocities[vc.body_b.index];

            let normal = vc.normal;
            let tangent = normal.gcross(1.0);

            for vcp in &vc.points[..vc.point_count] {
                let p = normal * vcp.normal_impulse + tangent * vcp.tangent_impulse;
                w_a -= i_a * vcp.r_a.gcross(p);
                v_a -= p * m_a;
                w_b += i_b * vcp.r_b.gcross(p);
                v_b += p * m_b;
            }

            velocities[vc.body_a.index] = Velocity { v: v_a, w: w_a };
            velocities[vc.body_b.index] = Velocity { v: v_b, w: w_b };
        }
    }

    /// Runs one iteration of the velocity solver over every contact.
    pub fn solve_velocity_constraints(&mut self, velocities: &mut [Velocity]) {
        for vc in &mut self.velocity_constraints {
            let (m_a, i_a) = (vc.body_a.inv_mass, vc.body_a.inv_inertia);
            let (m_b, i_b) = (vc.body_b.inv_mass, vc.body_b.inv_inertia);
            let Velocity { v: mut v_a, w: mut w_a } = velocities[vc.body_a.index];
            let Velocity { v: mut v_b, w: mut w_b } = velocities[vc.body_b.index];

            let normal = vc.normal;
            let tangent = normal.gcross(1.0);
            let friction = vc.friction;

            debug_assert!(vc.point_count == 1 || vc.point_count == 2);

            // Friction first: non-penetration matters more.
            for vcp in &mut vc.points[..vc.point_count] {
                let dv = v_b + w_b.gcross(vcp.r_b) - v_a - w_a.gcross(vcp.r_a);

                let vt = dv.dot(&tangent) - vc.tangent_speed;
                let mut lambda = vcp.tangent_mass * (-vt);

                let max_friction = friction * vcp.normal_impulse;
                let new_impulse =
                    (vcp.tangent_impulse + lambda).clamp(-max_friction, max_friction);
                lambda = new_impulse - vcp.tangent_impulse;
                vcp.tangent_impulse = new_impulse;

                let p = tangent * lambda;
                v_a -= p * m_a;
                w_a -= i_a * vcp.r_a.gcross(p);
                v_b += p * m_b;
                w_b += i_b * vcp.r_b.gcross(p);
            }

            if vc.point_count == 1 {
                let vcp = &mut vc.points[0];
                let dv = v_b + w_b.gcross(vcp.r_b) - v_a - w_a.gcross(vcp.r_a);

                let vn = dv.dot(&normal);
                let mut lambda = -vcp.normal_mass * (vn - vcp.velocity_bias);

                let new_impulse = (vcp.normal_impulse + lambda).max(0.0);
                lambda = new_impulse - vcp.normal_impulse;
                vcp.normal_impulse = new_impulse;

                let p = normal * lambda;
                v_a -= p * m_a;
                w_a -= i_a * vcp.r_a.gcross(p);
                v_b += p * m_b;
                w_b += i_b * vcp.r_b.gcross(p);
            } else {
                // Block solver for the 2-point mini LCP:
                //
                // vn = A * x + b, vn >= 0, x >= 0 and vn_i * x_i = 0 with i = 1..2
                //
                // solved by total enumeration on the total impulse x = a + d, where a is the
                // accumulated impulse and d the increment. This gives vn = A * x + b' with
                // b' = b - A * a.
                let [cp1, cp2] = &mut vc.points;
                let a = Vector::new(cp1.normal_impulse, cp2.normal_impulse);
                debug_assert!(a.x >= 0.0 && a.y >= 0.0);

                let dv1 = v_b + w_b.gcross(cp1.r_b) - v_a - w_a.gcross(cp1.r_a);
                let dv2 = v_b + w_b.gcross(cp2.r_b) - v_a - w_a.gcross(cp2.r_a);

                let vn1 = dv1.dot(&normal);
                let vn2 = dv2.dot(&normal);

                let b = Vector::new(vn1 - cp1.velocity_bias, vn2 - cp2.velocity_bias) - vc.k * a;

                let solution = block_solve(&vc.k, &vc.normal_mass, cp1, cp2, &b);

                if let Some(x) = solution {
                    let d = x - a;
                    let p1 = normal * d.x;
                    let p2 = normal * d.y;
                    v_a -= (p1 + p2) * m_a;
                    w_a -= i_a * (cp1.r_a.gcross(p1) + cp2.r_a.gcross(p2));
                    v_b += (p1 + p2) * m_b;
                    w_b += i_b * (cp1.r_b.gcross(p1) + cp2.r_b.gcross(p2));

                    cp1.normal_impulse = x.x;
                    cp2.normal_impulse = x.y;
                }
            }

            velocities[vc.body_a.index] = Velocity { v: v_a, w: w_a };
            velocities[vc.body_b.index] = Velocity { v: v_b, w: w_b };
        }
    }

    /// Writes the accumulated impulses back to the contact manifolds, for warm starting.
    pub fn store_impulses(&self, contacts: &mut Arena<Contact>) {
        for vc in &self.velocity_constraints {
            if let Some(contact) = contacts.get_mut(vc.contact.0) {
                for (mp, vcp) in contact
                    .manifold
                    .points
                    .iter_mut()
                    .zip(vc.points.iter())
                    .take(vc.point_count)
                {
                    mp.normal_impulse = vcp.normal_impulse;
                    mp.tangent_impulse = vcp.tangent_impulse;
                }
            }
        }
    }

    /// The impulses applied to each contact, in the order they were added.
    pub fn impulses(&self) -> impl Iterator<Item = (ContactHandle, ContactImpulse)> + '_ {
        self.velocity_constraints.iter().map(|vc| {
            let mut impulse = ContactImpulse {
                count: vc.point_count,
                ..Default::default()
            };
            for (k, vcp) in vc.points[..vc.point_count].iter().enumerate() {
                impulse.normal_impulses[k] = vcp.normal_impulse;
                impulse.tangent_impulses[k] = vcp.tangent_impulse;
            }
            (vc.contact, impulse)
        })
    }

    /// Runs one iteration of the position solver over every contact.
    ///
    /// Returns `true` if the deepest penetration is within tolerance.
    pub fn solve_position_constraints(
        &self,
        params: &IntegrationParameters,
        positions: &mut [Position],
    ) -> bool {
        let mut min_separation: Real = 0.0;

        for pc in &self.position_constraints {
            let separation = solve_position_constraint(
                pc,
                positions,
                params.baumgarte,
                params,
                (pc.body_a.inv_mass, pc.body_a.inv_inertia),
                (pc.body_b.inv_mass, pc.body_b.inv_inertia),
            );
            min_separation = min_separation.min(separation);
        }

        // The separation is never pushed above -linear_slop.
        min_separation >= -3.0 * params.linear_slop
    }

    /// Runs one iteration of the position solver, moving only the two bodies of a
    /// time-of-impact event.
    pub fn solve_toi_position_constraints(
        &self,
        params: &IntegrationParameters,
        positions: &mut [Position],
        toi_index_a: usize,
        toi_index_b: usize,
    ) -> bool {
        let mut min_separation: Real = 0.0;
        let is_toi_body = |index: usize| index == toi_index_a || index == toi_index_b;

        for pc in &self.position_constraints {
            let mass_a = if is_toi_body(pc.body_a.index) {
                (pc.body_a.inv_mass, pc.body_a.inv_inertia)
            } else {
                (0.0, 0.0)
            };
            let mass_b = if is_toi_body(pc.body_b.index) {
                (pc.body_b.inv_mass, pc.body_b.inv_inertia)
            } else {
                (0.0, 0.0)
            };

            let separation = solve_position_constraint(
                pc,
                positions,
                params.toi_baumgarte,
                params,
                mass_a,
                mass_b,
            );
            min_separation = min_separation.min(separation);
        }

        min_separation >= -1.5 * params.linear_slop
    }
}

fn block_solve(
    k: &SdpMatrix2,
    normal_mass: &SdpMatrix2,
    cp1: &VelocityConstraintPoint,
    cp2: &VelocityConstraintPoint,
    b: &Vector<Real>,
) -> Option<Vector<Real>> {
    // Case 1: vn = 0, both points active.
    let x = -(*normal_mass * *b);
    if x.x >= 0.0 && x.y >= 0.0 {
        return Some(x);
    }

    // Case 2: vn1 = 0 and x2 = 0.
    let x = Vector::new(-cp1.normal_mass * b.x, 0.0);
    let vn2 = k.m12 * x.x + b.y;
    if x.x >= 0.0 && vn2 >= 0.0 {
        return Some(x);
    }

    // Case 3: vn2 = 0 and x1 = 0.
    let x = Vector::new(0.0, -cp2.normal_mass * b.y);
    let vn1 = k.m12 * x.y + b.x;
    if x.y >= 0.0 && vn1 >= 0.0 {
        return Some(x);
    }

    // Case 4: x1 = 0 and x2 = 0.
    if b.x >= 0.0 && b.y >= 0.0 {
        return Some(Vector::zeros());
    }

    // No solution. This happens occasionally and is harmless.
    None
}

/// The world normal, contact point and separation of one point of a position constraint.
fn position_solver_manifold(
    pc: &ContactPositionConstraint,
    xf_a: &Isometry<Real>,
    xf_b: &Isometry<Real>,
    index: usize,
) -> (Vector<Real>, Point<Real>, Real) {
    let manifold = &pc.manifold;
    let radii = pc.radius_a + pc.radius_b;

    match manifold.kind {
        ManifoldType::Circles => {
            let point_a = xf_a * manifold.local_point;
            let point_b = xf_b * manifold.points[0].local_point;
            let mut normal = point_b - point_a;
            let _ = normalize(&mut normal);
            let point = na::center(&point_a, &point_b);
            let separation = (point_b - point_a).dot(&normal) - radii;
            (normal, point, separation)
        }
        ManifoldType::FaceA => {
            let normal = xf_a.rotation * manifold.local_normal;
            let plane_point = xf_a * manifold.local_point;
            let clip_point = xf_b * manifold.points[index].local_point;
            let separation = (clip_point - plane_point).dot(&normal) - radii;
            (normal, clip_point, separation)
        }
        ManifoldType::FaceB => {
            let normal = xf_b.rotation * manifold.local_normal;
            let plane_point = xf_b * manifold.local_point;
            let clip_point = xf_a * manifold.points[index].local_point;
            let separation = (clip_point - plane_point).dot(&normal) - radii;
            // The normal points from A to B.
            (-normal, clip_point, separation)
        }
    }
}

fn solve_position_constraint(
    pc: &ContactPositionConstraint,
    positions: &mut [Position],
    baumgarte: Real,
    params: &IntegrationParameters,
    (m_a, i_a): (Real, Real),
    (m_b, i_b): (Real, Real),
) -> Real {
    let Position { c: mut c_a, a: mut a_a } = positions[pc.body_a.index];
    let Position { c: mut c_b, a: mut a_b } = positions[pc.body_b.index];
    let mut min_separation = Real::MAX;

    for index in 0..pc.manifold.len() {
        let xf_a = transform_from_center(c_a, a_a, pc.body_a.local_center);
        let xf_b = transform_from_center(c_b, a_b, pc.body_b.local_center);

        let (normal, point, separation) = position_solver_manifold(pc, &xf_a, &xf_b, index);
        let r_a = point - c_a;
        let r_b = point - c_b;

        min_separation = min_separation.min(separation);

        // Allow some slop and prevent large corrections.
        let c = (baumgarte * (separation + params.linear_slop))
            .clamp(-params.max_linear_correction, 0.0);

        let rn_a = r_a.gcross(normal);
        let rn_b = r_b.gcross(normal);
        let k = m_a + m_b + i_a * rn_a * rn_a + i_b * rn_b * rn_b;
        let impulse = if k > 0.0 { -c / k } else { 0.0 };

        let p = normal * impulse;
        c_a -= p * m_a;
        a_a -= i_a * r_a.gcross(p);
        c_b += p * m_b;
        a_b += i_b * r_b.gcross(p);
    }

    positions[pc.body_a.index] = Position { c: c_a, a: a_a };
    positions[pc.body_b.index] = Position { c: c_b, a: a_b };
    min_separation
}

#[cfg(test)]
mod test {
    use super::ContactSolver;
    use crate::dynamics::{
        Contact, ContactHandle, Fixture, FixtureDef, FixtureHandle, IntegrationParameters,
        Position, SolverBody, TimeStep, Velocity,
    };
    use crate::dynamics::contact::ContactFlags;
    use crate::dynamics::BodyHandle;
    use crate::math::{Isometry, Point, Vector};
    use crate::query::{DefaultNarrowPhase, NarrowPhase};
    use crate::shape::SharedShape;

    // A unit box resting on a wide box, falling at 1 m/s.
    fn setup(warm_starting: bool) -> (ContactSolver, [Position; 2], [Velocity; 2], TimeStep) {
        let mut slots = thunderdome::Arena::new();
        let ground_handle = BodyHandle(slots.insert(()));
        let cube_handle = BodyHandle(slots.insert(()));
        let ground = Fixture::new(ground_handle, FixtureDef::new(SharedShape::cuboid(5.0, 0.5)));
        let cube = Fixture::new(cube_handle, FixtureDef::new(SharedShape::cuboid(0.5, 0.5)));
        let mut contact = Contact::new(
            FixtureHandle(slots.insert(())),
            &ground,
            0,
            FixtureHandle(slots.insert(())),
            &cube,
            0,
        );

        let xf_a = Isometry::identity();
        let xf_b = Isometry::translation(0.0, 0.99);
        DefaultNarrowPhase::default()
            .evaluate(ground.shape(), 0, &xf_a, cube.shape(), 0, &xf_b, &mut contact.manifold)
            .unwrap();
        contact.flags.insert(ContactFlags::TOUCHING);
        for point in &mut contact.manifold.points {
            point.normal_impulse = 1.0;
        }

        let step = TimeStep {
            dt: 1.0 / 60.0,
            inv_dt: 60.0,
            dt_ratio: 1.0,
            velocity_iterations: 8,
            position_iterations: 3,
            warm_starting,
        };
        let ground_body = SolverBody {
            index: 0,
            local_center: Point::origin(),
            inv_mass: 0.0,
            inv_inertia: 0.0,
        };
        let cube_body = SolverBody {
            index: 1,
            local_center: Point::origin(),
            inv_mass: 1.0,
            inv_inertia: 6.0,
        };

        let radius_a = ground.shape().radius();
        let radius_b = cube.shape().radius();
        let mut solver = ContactSolver::default();
        solver.add_contact(
            &step,
            ContactHandle(slots.insert(())),
            &contact,
            ground_body,
            radius_a,
            cube_body,
            radius_b,
        );

        let positions = [
            Position {
                c: Point::origin(),
                a: 0.0,
            },
            Position {
                c: Point::new(0.0, 0.99),
                a: 0.0,
            },
        ];
        let velocities = [
            Velocity {
                v: Vector::zeros(),
                w: 0.0,
            },
            Velocity {
                v: Vector::new(0.0, -1.0),
                w: 0.0,
            },
        ];
        (solver, positions, velocities, step)
    }

    #[test]
    fn velocity_solver_stops_the_approach() {
        let params = IntegrationParameters::default();
        let (mut solver, positions, mut velocities, _) = setup(false);
        solver.initialize_velocity_constraints(&params, &positions, &velocities);

        for _ in 0..8 {
            solver.solve_velocity_constraints(&mut velocities);
        }

        assert_relative_eq!(velocities[1].v.y, 0.0, epsilon = 1.0e-4);
        assert_relative_eq!(velocities[1].w, 0.0, epsilon = 1.0e-4);
        assert_eq!(velocities[0].v, Vector::zeros());

        let (_, impulse) = solver.impulses().next().unwrap();
        assert_eq!(impulse.count, 2);
        // The impulse removes one unit of momentum, shared by both points.
        assert_relative_eq!(
            impulse.normal_impulses[0] + impulse.normal_impulses[1],
            1.0,
            epsilon = 1.0e-4
        );
    }

    #[test]
    fn warm_start_uses_the_stored_impulses() {
        let params = IntegrationParameters::default();
        let (mut solver, positions, mut velocities, _) = setup(true);
        solver.initialize_velocity_constraints(&params, &positions, &velocities);
        solver.warm_start(&mut velocities);
        // Two points with a unit impulse each push the cube up by two units of momentum.
        assert_relative_eq!(velocities[1].v.y, 1.0, epsilon = 1.0e-4);

        let (mut solver, positions, mut velocities, _) = setup(false);
        solver.initialize_velocity_constraints(&params, &positions, &velocities);
        solver.warm_start(&mut velocities);
        assert_relative_eq!(velocities[1].v.y, -1.0);
    }

    #[test]
    fn position_solver_pushes_out_penetrations() {
        let params = IntegrationParameters::default();
        let (solver, mut positions, _, _) = setup(false);

        let mut solved = false;
        for _ in 0..20 {
            solved = solver.solve_position_constraints(&params, &mut positions);
            if solved {
                break;
            }
        }

        assert!(solved);
        assert!(positions[1].c.y > 0.99);
        assert_eq!(positions[0].c, Point::origin());
    }
}
