/*!
impulse2d
========

**impulse2d** is a 2-dimensional rigid-body dynamics library written with
the rust programming language.

It advances rigid bodies, their attached collision shapes, and the joints
between them by a fixed time step using an island-partitioned sequential
impulse solver, with continuous collision detection for fast bodies.

```
use impulse2d::dynamics::{BodyDef, FixtureDef, World};
use impulse2d::math::{Point, Vector};
use impulse2d::shape::SharedShape;

let mut world = World::new(Vector::new(0.0, -10.0));
let ground = world.create_body(&BodyDef::default()).unwrap();
let _ = world
    .create_fixture(ground, FixtureDef::new(SharedShape::cuboid(10.0, 0.5)))
    .unwrap();

let body = world
    .create_body(&BodyDef::dynamic().position(Point::new(0.0, 4.0)))
    .unwrap();
let _ = world
    .create_fixture(body, FixtureDef::new(SharedShape::cuboid(0.5, 0.5)).density(1.0))
    .unwrap();

for _ in 0..60 {
    world.step(1.0 / 60.0, 8, 3);
}

assert!(world.body(body).unwrap().position().y < 4.0);
```
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)]
#![deny(unused_qualifications)]

extern crate alloc;

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[cfg(test)]
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod dynamics;
pub mod mass_properties;
pub mod partitioning;
pub mod query;
pub mod shape;
pub mod utils;

mod real {
    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub use f64 as Real;

    /// The scalar type used throughout this crate.
    #[cfg(feature = "f32")]
    pub use f32 as Real;
}

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    pub use super::real::*;
    pub use na::{Isometry2, Matrix2, Matrix3, Point2, Translation2, Vector2, Vector3};
    use na::UnitComplex;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The point type.
    pub use Point2 as Point;

    /// The vector type.
    pub use Vector2 as Vector;

    /// The rigid transformation type.
    pub use Isometry2 as Isometry;

    /// The rotation type.
    pub type Rotation<N> = UnitComplex<N>;

    /// The translation type.
    pub use Translation2 as Translation;
}
