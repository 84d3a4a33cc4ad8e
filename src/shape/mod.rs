//! Shapes supported by impulse2d.

pub use self::ball::Ball;
pub use self::convex_polygon::{ConvexPolygon, DEFAULT_POLYGON_RADIUS, MAX_POLYGON_VERTICES};
pub use self::shape::{Shape, ShapeType};
pub use self::shared_shape::SharedShape;

mod ball;
mod convex_polygon;
mod shape;
mod shared_shape;
