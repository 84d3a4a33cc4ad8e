use crate::{dynamic_ball, dynamic_box, ground, gravity, step};
use impulse2d::dynamics::{BodyDef, BodyHandle, FixtureDef, World};
use impulse2d::math::{Point, Vector};
use impulse2d::shape::SharedShape;

fn thin_wall(world: &mut World) {
    let wall = world
        .create_body(&BodyDef::fixed().position(Point::new(5.0, 0.0)))
        .unwrap();
    let _ = world
        .create_fixture(wall, FixtureDef::new(SharedShape::cuboid(0.05, 2.0)))
        .unwrap();
}

fn projectile(world: &mut World, bullet: bool) -> BodyHandle {
    let body = world
        .create_body(
            &BodyDef::dynamic()
                .linear_velocity(Vector::new(90.0, 0.0))
                .bullet(bullet),
        )
        .unwrap();
    let _ = world
        .create_fixture(body, FixtureDef::new(SharedShape::ball(0.1)).density(1.0))
        .unwrap();
    body
}

#[test]
fn fast_body_does_not_tunnel_through_static_wall() {
    let mut world = World::new(Vector::zeros());
    thin_wall(&mut world);
    let ball = projectile(&mut world, false);

    step(&mut world, 10);

    assert!(world.body(ball).unwrap().position().x < 4.95);
}

#[test]
fn fast_body_tunnels_without_continuous_physics() {
    let mut world = World::new(Vector::zeros());
    world.set_continuous_physics(false);
    thin_wall(&mut world);
    let ball = projectile(&mut world, false);

    step(&mut world, 10);

    assert!(world.body(ball).unwrap().position().x > 5.05);
}

#[test]
fn bullet_does_not_tunnel_through_dynamic_body() {
    let mut world = World::new(Vector::zeros());
    let target = world
        .create_body(&BodyDef::dynamic().position(Point::new(5.0, 0.0)))
        .unwrap();
    let _ = world
        .create_fixture(
            target,
            FixtureDef::new(SharedShape::cuboid(0.05, 2.0)).density(100.0),
        )
        .unwrap();
    let ball = projectile(&mut world, true);

    step(&mut world, 5);

    let ball_x = world.body(ball).unwrap().position().x;
    let target_x = world.body(target).unwrap().position().x;
    assert!(ball_x < target_x);
    assert!(world.body(target).unwrap().linear_velocity().x > 0.0);
}

#[test]
fn sweeps_restart_at_zero_after_a_complete_step() {
    let mut world = World::new(gravity());
    let _ = ground(&mut world);
    let cube = dynamic_box(&mut world, Point::new(0.0, 1.0), 0.5, 0.5);
    let (ball, _) = dynamic_ball(&mut world, Point::new(5.0, 10.0), 0.5);

    for _ in 0..60 {
        step(&mut world, 1);
        assert!(world.is_step_complete());

        assert_eq!(world.body(cube).unwrap().sweep().alpha0, 0.0);
        assert_eq!(world.body(ball).unwrap().sweep().alpha0, 0.0);
    }
}

#[test]
fn sub_stepping_interrupts_the_step_at_each_impact() {
    let mut world = World::new(Vector::zeros());
    world.set_sub_stepping(true);
    thin_wall(&mut world);
    let ball = projectile(&mut world, false);

    let mut interrupted = false;
    for _ in 0..10 {
        step(&mut world, 1);
        interrupted |= !world.is_step_complete();
    }

    assert!(interrupted);
    assert!(world.body(ball).unwrap().position().x < 4.95);
}

#[test]
fn impacts_per_contact_are_bounded_by_max_sub_steps() {
    let mut world = World::new(Vector::zeros());
    for x in [-0.5, 0.5] {
        let wall = world
            .create_body(&BodyDef::fixed().position(Point::new(x, 0.0)))
            .unwrap();
        let _ = world
            .create_fixture(wall, FixtureDef::new(SharedShape::cuboid(0.05, 2.0)))
            .unwrap();
    }

    // A bouncing bullet with barely any room between the walls.
    let bullet = world
        .create_body(
            &BodyDef::dynamic()
                .linear_velocity(Vector::new(200.0, 0.0))
                .bullet(true),
        )
        .unwrap();
    let _ = world
        .create_fixture(
            bullet,
            FixtureDef::new(SharedShape::ball(0.3))
                .density(1.0)
                .restitution(1.0),
        )
        .unwrap();

    let max_sub_steps = world.integration_parameters().max_sub_steps;
    let mut impacts = 0;
    for _ in 0..30 {
        step(&mut world, 1);
        assert!(world.is_step_complete());
        for (_, contact) in world.contacts() {
            assert!(contact.toi_count() <= max_sub_steps + 1);
            impacts = impacts.max(contact.toi_count());
        }

        let position = world.body(bullet).unwrap().position();
        assert!(position.coords.iter().all(|x| x.is_finite()));
    }

    assert!(impacts > 0);
}
