pub use self::contact_manifold::{
    ContactFeatureType, ContactId, Manifold, ManifoldPoint, ManifoldType, WorldManifold,
    MAX_MANIFOLD_POINTS,
};
pub use self::contact_manifolds_ball_ball::contact_manifold_ball_ball;
pub use self::contact_manifolds_polygon_ball::contact_manifold_polygon_ball;
pub use self::contact_manifolds_polygon_polygon::contact_manifold_polygon_polygon;

mod contact_manifold;
mod contact_manifolds_ball_ball;
mod contact_manifolds_polygon_ball;
mod contact_manifolds_polygon_polygon;
