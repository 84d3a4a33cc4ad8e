use crate::{dynamic_ball, dynamic_box, gravity, step, DT};
use approx::assert_relative_eq;
use impulse2d::dynamics::{
    BodyDef, BodyHandle, DistanceJoint, FixtureDef, FrictionJoint, JointConstraint, JointDef,
    JointHandle, LimitState, MotorJoint, MouseJoint, PrismaticJoint, PulleyJoint, RevoluteJoint,
    RopeJoint, WeldJoint, WheelJoint, World,
};
use impulse2d::math::{Point, Real, Vector};
use impulse2d::na;
use impulse2d::shape::SharedShape;

/// A static body without fixture, to attach joints to.
fn anchor_body(world: &mut World) -> BodyHandle {
    world.create_body(&BodyDef::fixed()).unwrap()
}

fn revolute(world: &World, handle: JointHandle) -> &RevoluteJoint {
    world
        .joint(handle)
        .unwrap()
        .as_joint::<RevoluteJoint>()
        .unwrap()
}

#[test]
fn distance_joint_keeps_its_length() {
    let mut world = World::new(gravity());
    let ground = anchor_body(&mut world);
    let (ball, _) = dynamic_ball(&mut world, Point::new(3.0, 10.0), 0.25);

    let anchor = Point::new(0.0, 10.0);
    let joint = DistanceJoint::new(
        world.body(ground).unwrap(),
        world.body(ball).unwrap(),
        &anchor,
        &Point::new(3.0, 10.0),
    );
    let _ = world.create_joint(JointDef::new(ground, ball, joint)).unwrap();

    for _ in 0..120 {
        step(&mut world, 1);
        let position = world.body(ball).unwrap().position();
        assert!((na::distance(&anchor, &position) - 3.0).abs() < 0.05);
    }

    // The pendulum swung down.
    assert!(world.body(ball).unwrap().position().y < 10.0);
}

#[test]
fn distance_joint_resists_a_pulling_force() {
    let mut world = World::new(Vector::zeros());
    let ground = anchor_body(&mut world);
    let (ball, _) = dynamic_ball(&mut world, Point::new(3.0, 10.0), 0.25);

    let anchor = Point::new(0.0, 10.0);
    let joint = DistanceJoint::new(
        world.body(ground).unwrap(),
        world.body(ball).unwrap(),
        &anchor,
        &Point::new(3.0, 10.0),
    );
    let handle = world.create_joint(JointDef::new(ground, ball, joint)).unwrap();
    let slop = world.integration_parameters().linear_slop;

    for _ in 0..120 {
        world
            .body_mut(ball)
            .unwrap()
            .apply_force_to_center(Vector::new(50.0, 0.0), true);
        step(&mut world, 1);

        let position = world.body(ball).unwrap().position();
        assert!(na::distance(&anchor, &position) <= 3.0 + slop);
    }

    // The joint holds the ball against the pull.
    let reaction = world
        .joint(handle)
        .unwrap()
        .constraint()
        .reaction_force(1.0 / DT);
    assert_relative_eq!(reaction.x, -50.0, epsilon = 1.0);
}

#[test]
fn revolute_limit_stops_a_falling_arm() {
    let mut world = World::new(gravity());
    let ground = anchor_body(&mut world);
    let arm = dynamic_box(&mut world, Point::new(1.0, 5.0), 1.0, 0.1);

    let lower = -Real::to_radians(45.0);
    let joint = RevoluteJoint::new(
        world.body(ground).unwrap(),
        world.body(arm).unwrap(),
        &Point::new(0.0, 5.0),
    )
    .limits(lower, -lower);
    let handle = world.create_joint(JointDef::new(ground, arm, joint)).unwrap();

    step(&mut world, 120);

    let angle = revolute(&world, handle).joint_angle(
        world.body(ground).unwrap(),
        world.body(arm).unwrap(),
    );
    assert!(angle >= lower - 0.05);
    assert!(angle < lower + 0.05);
    assert_eq!(revolute(&world, handle).limit_state(), LimitState::AtLower);

    // The anchor did not drift.
    let anchor = world.body(arm).unwrap().world_point(&Point::new(-1.0, 0.0));
    assert_relative_eq!(anchor, Point::new(0.0, 5.0), epsilon = 1.0e-2);
}

#[test]
fn revolute_motor_reaches_its_speed() {
    let mut world = World::new(gravity());
    let ground = anchor_body(&mut world);
    let (wheel, _) = dynamic_ball(&mut world, Point::new(0.0, 5.0), 0.5);

    let joint = RevoluteJoint::new(
        world.body(ground).unwrap(),
        world.body(wheel).unwrap(),
        &Point::new(0.0, 5.0),
    )
    .motor(2.0, 1000.0);
    let handle = world.create_joint(JointDef::new(ground, wheel, joint)).unwrap();

    step(&mut world, 30);
    assert_relative_eq!(
        world.body(wheel).unwrap().angular_velocity(),
        2.0,
        epsilon = 1.0e-3
    );
    assert_relative_eq!(
        world.body(wheel).unwrap().position(),
        Point::new(0.0, 5.0),
        epsilon = 1.0e-2
    );

    world
        .modify_joint::<RevoluteJoint, _>(handle, |joint| joint.set_motor_speed(-1.0))
        .unwrap();
    step(&mut world, 30);
    assert_relative_eq!(
        world.body(wheel).unwrap().angular_velocity(),
        -1.0,
        epsilon = 1.0e-3
    );
}

#[test]
fn prismatic_joint_constrains_motion_to_its_axis() {
    let mut world = World::new(gravity());
    let ground = anchor_body(&mut world);
    let slider = world
        .create_body(
            &BodyDef::dynamic()
                .position(Point::new(0.0, 5.0))
                .linear_velocity(Vector::new(2.0, 0.0)),
        )
        .unwrap();
    let _ = world
        .create_fixture(
            slider,
            FixtureDef::new(SharedShape::cuboid(0.5, 0.25)).density(1.0),
        )
        .unwrap();

    let joint = PrismaticJoint::new(
        world.body(ground).unwrap(),
        world.body(slider).unwrap(),
        &Point::new(0.0, 5.0),
        &Vector::x(),
    );
    let handle = world.create_joint(JointDef::new(ground, slider, joint)).unwrap();

    step(&mut world, 60);

    let body = world.body(slider).unwrap();
    assert_relative_eq!(body.position().y, 5.0, epsilon = 1.0e-2);
    assert_relative_eq!(body.angle(), 0.0, epsilon = 1.0e-2);
    assert_relative_eq!(body.position().x, 2.0, epsilon = 5.0e-2);

    let prismatic = world
        .joint(handle)
        .unwrap()
        .as_joint::<PrismaticJoint>()
        .unwrap();
    let translation = prismatic.joint_translation(world.body(ground).unwrap(), body);
    assert_relative_eq!(translation, body.position().x, epsilon = 1.0e-2);
}

#[test]
fn prismatic_limit_stops_the_slider() {
    let mut world = World::new(Vector::new(10.0, 0.0));
    let ground = anchor_body(&mut world);
    let slider = dynamic_box(&mut world, Point::new(0.0, 5.0), 0.5, 0.25);

    let joint = PrismaticJoint::new(
        world.body(ground).unwrap(),
        world.body(slider).unwrap(),
        &Point::new(0.0, 5.0),
        &Vector::x(),
    )
    .limits(-1.0, 1.0);
    let _ = world.create_joint(JointDef::new(ground, slider, joint)).unwrap();

    step(&mut world, 120);

    let x = world.body(slider).unwrap().position().x;
    assert!(x <= 1.05);
    assert!(x > 0.9);
}

#[test]
fn rope_joint_limits_the_distance() {
    let mut world = World::new(gravity());
    let ground = anchor_body(&mut world);
    let (ball, _) = dynamic_ball(&mut world, Point::new(1.0, 4.0), 0.25);

    let anchor = Point::new(0.0, 5.0);
    let rope = RopeJoint::new(
        world.body(ground).unwrap(),
        world.body(ball).unwrap(),
        &anchor,
        &Point::new(1.0, 4.0),
    );
    let max_length = rope.max_length();
    let _ = world.create_joint(JointDef::new(ground, ball, rope)).unwrap();

    for _ in 0..120 {
        step(&mut world, 1);
        let position = world.body(ball).unwrap().position();
        assert!(na::distance(&anchor, &position) < max_length + 0.05);
    }
}

#[test]
fn mouse_joint_drags_the_body_to_its_target() {
    let mut world = World::new(Vector::zeros());
    let ground = anchor_body(&mut world);
    let cube = dynamic_box(&mut world, Point::origin(), 0.5, 0.5);

    let mass = world.body(cube).unwrap().mass();
    let joint = MouseJoint::new(world.body(cube).unwrap(), &Point::origin())
        .with_max_force(1000.0 * mass);
    let handle = world.create_joint(JointDef::new(ground, cube, joint)).unwrap();

    world
        .modify_joint::<MouseJoint, _>(handle, |joint| joint.set_target(Point::new(2.0, 0.0)))
        .unwrap();
    step(&mut world, 120);

    let position = world.body(cube).unwrap().position();
    assert!(na::distance(&position, &Point::new(2.0, 0.0)) < 0.05);
}

#[test]
fn pulley_keeps_the_total_rope_length() {
    let mut world = World::new(gravity());
    let ground = anchor_body(&mut world);

    let heavy = world
        .create_body(&BodyDef::dynamic().position(Point::new(-2.0, 5.0)))
        .unwrap();
    let _ = world
        .create_fixture(
            heavy,
            FixtureDef::new(SharedShape::cuboid(0.5, 0.5)).density(2.0),
        )
        .unwrap();
    let light = dynamic_box(&mut world, Point::new(2.0, 5.0), 0.5, 0.5);

    let joint = PulleyJoint::new(
        world.body(heavy).unwrap(),
        world.body(light).unwrap(),
        &Point::new(-2.0, 10.0),
        &Point::new(2.0, 10.0),
        &Point::new(-2.0, 5.0),
        &Point::new(2.0, 5.0),
        1.0,
    );
    let handle = world.create_joint(JointDef::new(heavy, light, joint)).unwrap();

    step(&mut world, 30);

    let pulley = world
        .joint(handle)
        .unwrap()
        .as_joint::<PulleyJoint>()
        .unwrap();
    let length_a = pulley.current_length_a(world.body(heavy).unwrap());
    let length_b = pulley.current_length_b(world.body(light).unwrap());
    assert_relative_eq!(length_a + length_b, 10.0, epsilon = 5.0e-2);
    assert!(world.body(heavy).unwrap().position().y < 5.0);
    assert!(world.body(light).unwrap().position().y > 5.0);
}

#[test]
fn weld_joint_holds_the_body() {
    let mut world = World::new(gravity());
    let ground = anchor_body(&mut world);
    let cube = dynamic_box(&mut world, Point::new(1.0, 5.0), 0.5, 0.5);

    let joint = WeldJoint::new(
        world.body(ground).unwrap(),
        world.body(cube).unwrap(),
        &Point::new(0.5, 5.0),
    );
    let _ = world.create_joint(JointDef::new(ground, cube, joint)).unwrap();

    step(&mut world, 60);

    let body = world.body(cube).unwrap();
    assert_relative_eq!(body.position(), Point::new(1.0, 5.0), epsilon = 5.0e-2);
    assert_relative_eq!(body.angle(), 0.0, epsilon = 5.0e-2);
}

#[test]
fn wheel_motor_spins_the_wheel() {
    let mut world = World::new(gravity());
    let ground = anchor_body(&mut world);
    let (wheel, _) = dynamic_ball(&mut world, Point::new(0.0, 5.0), 0.5);

    let joint = WheelJoint::new(
        world.body(ground).unwrap(),
        world.body(wheel).unwrap(),
        &Point::new(0.0, 5.0),
        &Vector::y(),
    )
    .motor(3.0, 100.0);
    let _ = world.create_joint(JointDef::new(ground, wheel, joint)).unwrap();

    step(&mut world, 30);

    let body = world.body(wheel).unwrap();
    assert_relative_eq!(body.angular_velocity(), 3.0, epsilon = 1.0e-3);
    // The suspension lets the wheel move along the axis only.
    assert_relative_eq!(body.position().x, 0.0, epsilon = 1.0e-2);
}

#[test]
fn friction_joint_brakes_a_sliding_box() {
    let mut world = World::new(Vector::zeros());
    let ground = anchor_body(&mut world);
    let slider = world
        .create_body(&BodyDef::dynamic().linear_velocity(Vector::new(2.0, 0.0)))
        .unwrap();
    let _ = world
        .create_fixture(
            slider,
            FixtureDef::new(SharedShape::cuboid(0.5, 0.5)).density(1.0),
        )
        .unwrap();

    // A unit mass under a unit braking force loses 1 m/s every second.
    let joint = FrictionJoint::new(
        world.body(ground).unwrap(),
        world.body(slider).unwrap(),
        &Point::origin(),
    )
    .limits(1.0, 1.0);
    let _ = world.create_joint(JointDef::new(ground, slider, joint)).unwrap();

    step(&mut world, 60);
    assert_relative_eq!(
        world.body(slider).unwrap().linear_velocity(),
        Vector::new(1.0, 0.0),
        epsilon = 1.0e-3
    );

    step(&mut world, 120);
    let body = world.body(slider).unwrap();
    assert_relative_eq!(body.linear_velocity(), Vector::zeros(), epsilon = 1.0e-5);
    // v² / 2a = 2 m
    assert_relative_eq!(body.position().x, 2.0, epsilon = 5.0e-2);
}

#[test]
fn motor_joint_drives_the_body_to_its_offsets() {
    let mut world = World::new(Vector::zeros());
    let ground = anchor_body(&mut world);
    let platform = dynamic_box(&mut world, Point::origin(), 0.5, 0.5);

    let joint = MotorJoint::with_offsets(Vector::new(2.0, 0.0), 0.5).limits(1000.0, 1000.0);
    let handle = world
        .create_joint(JointDef::new(ground, platform, joint))
        .unwrap();

    step(&mut world, 120);
    let body = world.body(platform).unwrap();
    assert_relative_eq!(body.position(), Point::new(2.0, 0.0), epsilon = 1.0e-2);
    assert_relative_eq!(body.angle(), 0.5, epsilon = 1.0e-2);

    world
        .modify_joint::<MotorJoint, _>(handle, |joint| {
            joint.set_linear_offset(Vector::new(0.0, -1.0))
        })
        .unwrap();
    step(&mut world, 120);
    assert_relative_eq!(
        world.body(platform).unwrap().position(),
        Point::new(0.0, -1.0),
        epsilon = 1.0e-2
    );
}

#[test]
fn weak_motor_joint_is_limited_by_its_max_force() {
    let mut world = World::new(Vector::zeros());
    let ground = anchor_body(&mut world);
    let platform = dynamic_box(&mut world, Point::origin(), 0.5, 0.5);

    let joint = MotorJoint::with_offsets(Vector::new(100.0, 0.0), 0.0).limits(1.0, 1.0);
    let _ = world
        .create_joint(JointDef::new(ground, platform, joint))
        .unwrap();

    // A unit force on a unit mass: x = t² / 2.
    step(&mut world, 60);
    let body = world.body(platform).unwrap();
    assert!(body.position().x > 0.4);
    assert!(body.position().x < 0.6);
    assert!(body.linear_velocity().x <= 1.0 + 1.0e-3);
}

#[test]
fn joint_user_data_can_be_changed() {
    let mut world = World::new(gravity());
    let ground = anchor_body(&mut world);
    let (ball, _) = dynamic_ball(&mut world, Point::new(1.0, 4.0), 0.25);

    let rope = RopeJoint::new(
        world.body(ground).unwrap(),
        world.body(ball).unwrap(),
        &Point::new(0.0, 5.0),
        &Point::new(1.0, 4.0),
    );
    let handle = world
        .create_joint(JointDef::new(ground, ball, rope).user_data(7))
        .unwrap();
    assert_eq!(world.joint(handle).unwrap().user_data(), 7);

    world.joint_mut(handle).unwrap().set_user_data(42);
    assert_eq!(world.joint(handle).unwrap().user_data(), 42);

    world.destroy_joint(handle).unwrap();
    assert!(world.joint_mut(handle).is_none());
}
