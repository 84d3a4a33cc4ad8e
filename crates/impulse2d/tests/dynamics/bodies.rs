use crate::{dynamic_ball, dynamic_box, ground, gravity, step, DT};
use approx::assert_relative_eq;
use impulse2d::bounding_volume::Aabb;
use impulse2d::dynamics::{
    BodyDef, BodyType, DestructionListener, FixtureDef, FixtureHandle, JointDef, JointHandle,
    RevoluteJoint, RopeJoint, World, WorldError,
};
use impulse2d::math::{Point, Vector};
use impulse2d::shape::SharedShape;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn free_fall_matches_symplectic_euler() {
    let mut world = World::new(gravity());
    let (ball, _) = dynamic_ball(&mut world, Point::new(0.0, 10.0), 0.5);

    step(&mut world, 60);

    // y(n) = y0 - g * dt² * n * (n + 1) / 2
    let expected = 10.0 - 10.0 * DT * DT * 60.0 * 61.0 / 2.0;
    let body = world.body(ball).unwrap();
    assert_relative_eq!(body.position().y, expected, epsilon = 1.0e-3);
    assert_relative_eq!(body.linear_velocity().y, -10.0, epsilon = 1.0e-3);
    assert_relative_eq!(body.position().x, 0.0);
    assert!(body.is_awake());
}

#[test]
fn resting_box_falls_asleep() {
    let mut world = World::new(gravity());
    let _ = ground(&mut world);
    let cube = dynamic_box(&mut world, Point::new(0.0, 1.0), 0.5, 0.5);

    step(&mut world, 300);

    let body = world.body(cube).unwrap();
    assert!(!body.is_awake());
    assert_eq!(body.linear_velocity(), Vector::zeros());
    // Sinks by at most the slop, and the polygon skin keeps it within a few slops above.
    let slop = world.integration_parameters().linear_slop;
    assert!(body.position().y >= 1.0 - slop);
    assert!(body.position().y <= 1.0 + 3.0 * slop);
    assert_relative_eq!(body.angle(), 0.0, epsilon = 1.0e-2);
}

#[test]
fn touching_bodies_fall_asleep_together() {
    let mut world = World::new(gravity());
    let _ = ground(&mut world);
    let lower = dynamic_box(&mut world, Point::new(0.0, 1.0), 0.5, 0.5);
    let upper = dynamic_box(&mut world, Point::new(0.0, 2.0), 0.5, 0.5);

    for _ in 0..600 {
        step(&mut world, 1);
        let lower_awake = world.body(lower).unwrap().is_awake();
        assert_eq!(lower_awake, world.body(upper).unwrap().is_awake());
        if !lower_awake {
            break;
        }
    }

    assert!(!world.body(lower).unwrap().is_awake());
}

#[test]
fn kinematic_bodies_ignore_forces_and_gravity() {
    let mut world = World::new(gravity());
    let platform = world
        .create_body(
            &BodyDef::kinematic()
                .position(Point::new(0.0, 5.0))
                .linear_velocity(Vector::new(1.0, 0.0))
                .angular_velocity(0.5),
        )
        .unwrap();
    let _ = world
        .create_fixture(
            platform,
            FixtureDef::new(SharedShape::cuboid(2.0, 0.25)).density(1.0),
        )
        .unwrap();

    let body = world.body(platform).unwrap();
    assert_eq!(body.inv_mass(), 0.0);
    assert_eq!(body.inv_inertia(), 0.0);

    for _ in 0..60 {
        let body = world.body_mut(platform).unwrap();
        body.apply_force_to_center(Vector::new(0.0, 100.0), true);
        body.apply_torque(10.0, true);
        step(&mut world, 1);

        let body = world.body(platform).unwrap();
        assert_eq!(body.linear_velocity(), Vector::new(1.0, 0.0));
        assert_eq!(body.angular_velocity(), 0.5);
    }

    let body = world.body(platform).unwrap();
    assert_relative_eq!(body.position(), Point::new(1.0, 5.0), epsilon = 1.0e-4);
    assert_relative_eq!(body.angle(), 0.5, epsilon = 1.0e-4);
}

#[test]
fn sleeping_island_is_not_woken_through_static_bodies() {
    let mut world = World::new(gravity());
    let _ = ground(&mut world);
    let resting = dynamic_box(&mut world, Point::new(-5.0, 1.0), 0.5, 0.5);

    step(&mut world, 300);
    assert!(!world.body(resting).unwrap().is_awake());

    // Another body lands on the same ground, far away.
    let falling = dynamic_box(&mut world, Point::new(5.0, 3.0), 0.5, 0.5);

    for _ in 0..120 {
        step(&mut world, 1);
        assert!(!world.body(resting).unwrap().is_awake());
    }

    assert!(world.body(falling).unwrap().position().y < 1.1);
}

#[test]
fn disabling_sleep_wakes_every_body() {
    let mut world = World::new(gravity());
    let _ = ground(&mut world);
    let cube = dynamic_box(&mut world, Point::new(0.0, 1.0), 0.5, 0.5);

    step(&mut world, 300);
    assert!(!world.body(cube).unwrap().is_awake());

    world.set_sleeping_allowed(false);
    assert!(world.body(cube).unwrap().is_awake());

    step(&mut world, 300);
    assert!(world.body(cube).unwrap().is_awake());
}

#[test]
fn mass_is_computed_from_fixture_densities() {
    let mut world = World::new(gravity());
    let body = world.create_body(&BodyDef::dynamic()).unwrap();
    assert_relative_eq!(world.body(body).unwrap().mass(), 1.0);

    let _ = world
        .create_fixture(
            body,
            FixtureDef::new(SharedShape::cuboid(0.5, 0.5)).density(2.0),
        )
        .unwrap();
    assert_relative_eq!(world.body(body).unwrap().mass(), 2.0, epsilon = 1.0e-5);

    let offset = world
        .create_fixture(
            body,
            FixtureDef::new(SharedShape::cuboid_with_pose(
                0.5,
                0.5,
                Point::new(2.0, 0.0),
                0.0,
            ))
            .density(2.0),
        )
        .unwrap();

    let b = world.body(body).unwrap();
    assert_relative_eq!(b.mass(), 4.0, epsilon = 1.0e-5);
    assert_relative_eq!(b.local_center(), Point::new(1.0, 0.0), epsilon = 1.0e-5);

    world.destroy_fixture(offset).unwrap();
    let b = world.body(body).unwrap();
    assert_relative_eq!(b.mass(), 2.0, epsilon = 1.0e-5);
    assert_relative_eq!(b.local_center(), Point::origin(), epsilon = 1.0e-5);
}

#[test]
fn static_bodies_have_no_mass_and_do_not_move() {
    let mut world = World::new(gravity());
    let cube = dynamic_box(&mut world, Point::new(0.0, 5.0), 0.5, 0.5);

    world.set_body_type(cube, BodyType::Static).unwrap();
    assert_eq!(world.body(cube).unwrap().inv_mass(), 0.0);

    step(&mut world, 30);
    assert_eq!(world.body(cube).unwrap().position(), Point::new(0.0, 5.0));

    world.set_body_type(cube, BodyType::Dynamic).unwrap();
    step(&mut world, 30);
    assert!(world.body(cube).unwrap().position().y < 5.0);
}

#[derive(Clone, Default)]
struct DestructionCounter {
    joints: Arc<AtomicUsize>,
    fixtures: Arc<AtomicUsize>,
}

impl DestructionListener for DestructionCounter {
    fn say_goodbye_joint(&mut self, _joint: JointHandle) {
        let _ = self.joints.fetch_add(1, Ordering::SeqCst);
    }

    fn say_goodbye_fixture(&mut self, _fixture: FixtureHandle) {
        let _ = self.fixtures.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn destroying_a_body_destroys_what_is_attached_to_it() {
    let mut world = World::new(gravity());
    let counter = DestructionCounter::default();
    world.set_destruction_listener(Box::new(counter.clone()));

    let _ = ground(&mut world);
    let resting = dynamic_box(&mut world, Point::new(0.0, 1.0), 0.5, 0.5);
    let hanging = dynamic_box(&mut world, Point::new(5.0, 5.0), 0.5, 0.5);

    let joint = RevoluteJoint::new(
        world.body(resting).unwrap(),
        world.body(hanging).unwrap(),
        &Point::new(2.5, 3.0),
    );
    let _ = world
        .create_joint(JointDef::new(resting, hanging, joint))
        .unwrap();

    step(&mut world, 1);
    assert_eq!(world.contact_count(), 1);
    assert_eq!(world.joint_count(), 1);

    world.destroy_body(resting).unwrap();

    assert_eq!(counter.joints.load(Ordering::SeqCst), 1);
    assert_eq!(counter.fixtures.load(Ordering::SeqCst), 1);
    assert_eq!(world.body_count(), 2);
    assert_eq!(world.fixture_count(), 2);
    assert_eq!(world.joint_count(), 0);
    assert_eq!(world.contact_count(), 0);
    assert!(world.body(hanging).unwrap().joint_edges().is_empty());

    assert_eq!(
        world.destroy_body(resting),
        Err(WorldError::InvalidBodyHandle(resting))
    );

    world.destroy_body(hanging).unwrap();
    assert_eq!(counter.fixtures.load(Ordering::SeqCst), 2);
    step(&mut world, 1);
}

#[test]
fn invalid_handles_are_reported() {
    let mut world = World::new(gravity());
    let ground = ground(&mut world);
    let (ball, fixture) = dynamic_ball(&mut world, Point::new(0.0, 3.0), 0.5);

    let rope = RopeJoint::new(
        world.body(ground).unwrap(),
        world.body(ball).unwrap(),
        &Point::new(0.0, 5.0),
        &Point::new(0.0, 3.0),
    );
    let joint = world.create_joint(JointDef::new(ground, ball, rope)).unwrap();

    assert_eq!(
        world.modify_joint::<RevoluteJoint, _>(joint, |j| j.enable_motor(true)),
        Err(WorldError::JointTypeMismatch(joint))
    );
    assert_eq!(
        world.modify_joint::<RopeJoint, _>(joint, |j| j.set_max_length(1.0)),
        Ok(())
    );

    world.destroy_body(ball).unwrap();
    assert_eq!(
        world.create_fixture(ball, FixtureDef::new(SharedShape::ball(1.0))),
        Err(WorldError::InvalidBodyHandle(ball))
    );
    assert_eq!(
        world.destroy_fixture(fixture),
        Err(WorldError::InvalidFixtureHandle(fixture))
    );
    assert_eq!(
        world.destroy_joint(joint),
        Err(WorldError::InvalidJointHandle(joint))
    );
    assert!(!world.is_locked());
}

#[test]
fn stale_handles_stay_invalid_after_slot_reuse() {
    let mut world = World::new(gravity());
    let ground = ground(&mut world);
    let (old_ball, old_fixture) = dynamic_ball(&mut world, Point::new(0.0, 3.0), 0.5);
    let rope = RopeJoint::new(
        world.body(ground).unwrap(),
        world.body(old_ball).unwrap(),
        &Point::new(0.0, 5.0),
        &Point::new(0.0, 3.0),
    );
    let old_joint = world
        .create_joint(JointDef::new(ground, old_ball, rope))
        .unwrap();

    world.destroy_body(old_ball).unwrap();

    // The new body, fixture and joint take over the freed slots.
    let (new_ball, new_fixture) = dynamic_ball(&mut world, Point::new(2.0, 3.0), 0.5);
    let rope = RopeJoint::new(
        world.body(ground).unwrap(),
        world.body(new_ball).unwrap(),
        &Point::new(2.0, 5.0),
        &Point::new(2.0, 3.0),
    );
    let new_joint = world
        .create_joint(JointDef::new(ground, new_ball, rope))
        .unwrap();

    assert_ne!(old_ball, new_ball);
    assert_ne!(old_fixture, new_fixture);
    assert_ne!(old_joint, new_joint);

    assert!(world.body(old_ball).is_none());
    assert!(world.fixture(old_fixture).is_none());
    assert!(world.joint(old_joint).is_none());

    assert_eq!(
        world.destroy_joint(old_joint),
        Err(WorldError::InvalidJointHandle(old_joint))
    );
    assert_eq!(
        world.destroy_fixture(old_fixture),
        Err(WorldError::InvalidFixtureHandle(old_fixture))
    );
    assert_eq!(
        world.destroy_body(old_ball),
        Err(WorldError::InvalidBodyHandle(old_ball))
    );

    assert_eq!(world.body_count(), 2);
    assert_eq!(world.fixture_count(), 2);
    assert_eq!(world.joint_count(), 1);
    assert_eq!(world.fixture(new_fixture).unwrap().body(), new_ball);
    assert_eq!(world.joint(new_joint).unwrap().body_b(), new_ball);
    assert_eq!(world.body(new_ball).unwrap().position(), Point::new(2.0, 3.0));
}

#[test]
fn aabb_queries_report_overlapping_fixtures() {
    let mut world = World::new(gravity());
    let _ = ground(&mut world);
    let (_, fixture) = dynamic_ball(&mut world, Point::new(0.0, 10.0), 0.5);

    let mut found = Vec::new();
    world.query_aabb(
        &Aabb::new(Point::new(-1.0, 9.0), Point::new(1.0, 11.0)),
        |fixture, _| {
            found.push(fixture);
            true
        },
    );

    assert_eq!(found, vec![fixture]);
}

#[test]
fn shifting_the_origin_moves_every_body() {
    let mut world = World::new(Vector::zeros());
    let cube = dynamic_box(&mut world, Point::new(10.0, 10.0), 0.5, 0.5);

    world.shift_origin(&Vector::new(10.0, 10.0)).unwrap();

    let body = world.body(cube).unwrap();
    assert_relative_eq!(body.position(), Point::origin());
    assert_relative_eq!(body.world_center(), Point::origin());
}
