use impulse2d::dynamics::{BodyDef, BodyHandle, FixtureDef, FixtureHandle, World};
use impulse2d::math::{Point, Real, Vector};
use impulse2d::shape::SharedShape;

mod bodies;
mod continuous;
mod contacts;
mod joints;
mod stacking;

const DT: Real = 1.0 / 60.0;

fn step(world: &mut World, count: usize) {
    for _ in 0..count {
        world.step(DT, 8, 3);
    }
}

/// A static box whose top face is at `y = 0.5`.
fn ground(world: &mut World) -> BodyHandle {
    let ground = world.create_body(&BodyDef::default()).unwrap();
    let _ = world
        .create_fixture(ground, FixtureDef::new(SharedShape::cuboid(20.0, 0.5)))
        .unwrap();
    ground
}

fn dynamic_box(world: &mut World, position: Point<Real>, hx: Real, hy: Real) -> BodyHandle {
    let body = world
        .create_body(&BodyDef::dynamic().position(position))
        .unwrap();
    let _ = world
        .create_fixture(body, FixtureDef::new(SharedShape::cuboid(hx, hy)).density(1.0))
        .unwrap();
    body
}

fn dynamic_ball(
    world: &mut World,
    position: Point<Real>,
    radius: Real,
) -> (BodyHandle, FixtureHandle) {
    let body = world
        .create_body(&BodyDef::dynamic().position(position))
        .unwrap();
    let fixture = world
        .create_fixture(body, FixtureDef::new(SharedShape::ball(radius)).density(1.0))
        .unwrap();
    (body, fixture)
}

fn gravity() -> Vector<Real> {
    Vector::new(0.0, -10.0)
}
