use crate::{dynamic_box, ground, gravity, step};
use impulse2d::dynamics::{IntegrationParameters, World};
use impulse2d::math::{Point, Real};

#[test]
fn random_pile_settles_on_the_ground() {
    let mut rng = oorandom::Rand32::new(42);
    let mut world = World::new(gravity());
    let _ = ground(&mut world);

    let mut boxes = Vec::new();
    for i in 0..4 {
        for j in 0..5 {
            let hx = 0.2 + rng.rand_float() as Real * 0.3;
            let hy = 0.2 + rng.rand_float() as Real * 0.3;
            let position = Point::new(-3.0 + i as Real * 2.0, 2.0 + j as Real * 1.5);
            boxes.push(dynamic_box(&mut world, position, hx, hy));
        }
    }

    step(&mut world, 600);

    for handle in boxes {
        let body = world.body(handle).unwrap();
        assert!(body.position().coords.iter().all(|x| x.is_finite()));
        assert!(body.angle().is_finite());
        // Resting on the ground or on another box.
        assert!(body.position().y > 0.5);
        assert!(body.linear_velocity().norm() < 0.5);
    }
}

/// Total sink of a column of unit boxes below their stacked heights, and the fastest residual
/// speed, after two seconds.
fn settle_column(warm_starting: bool) -> (Real, Real) {
    let mut world = World::new(gravity());
    world.set_warm_starting(warm_starting);
    world.set_sleeping_allowed(false);
    let _ = ground(&mut world);

    let column: Vec<_> = (0..6)
        .map(|i| dynamic_box(&mut world, Point::new(0.0, 1.0 + i as Real), 0.5, 0.5))
        .collect();

    step(&mut world, 120);

    let mut sink = 0.0;
    let mut speed: Real = 0.0;
    for (i, handle) in column.into_iter().enumerate() {
        let body = world.body(handle).unwrap();
        sink += (1.0 + i as Real - body.position().y).max(0.0);
        speed = speed.max(body.linear_velocity().norm());
    }
    (sink, speed)
}

#[test]
fn warm_starting_settles_a_column_at_least_as_well() {
    let (warm_sink, warm_speed) = settle_column(true);
    let (cold_sink, _) = settle_column(false);
    let slop = IntegrationParameters::default().linear_slop;

    assert!(warm_sink <= cold_sink + slop);
    assert!(warm_speed < 0.05);
}
