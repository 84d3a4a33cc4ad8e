//! Non-persistent geometric queries used by the dynamics pipeline.
//!
//! This covers:
//!
//! * contact manifold generation, through the [`NarrowPhase`] trait and its
//!   [`DefaultNarrowPhase`] implementation,
//! * the distance between the cores of two convex shapes, with [`distance`],
//! * the time of impact between two sweeping shapes, through the [`TimeOfImpact`] trait and its
//!   [`DefaultTimeOfImpact`] implementation.
//!
//! The manifold generators for specific pairs of shapes are exported by the `details` submodule.

pub use self::contact_manifolds::{
    ContactFeatureType, ContactId, Manifold, ManifoldPoint, ManifoldType, WorldManifold,
    MAX_MANIFOLD_POINTS,
};
pub use self::distance::{distance, DistanceOutput, DistanceProxy};
pub use self::error::Unsupported;
pub use self::narrow_phase::{DefaultNarrowPhase, NarrowPhase};
pub use self::time_of_impact::{DefaultTimeOfImpact, TimeOfImpact, ToiInput, ToiOutput, ToiState};

mod clip;
mod contact_manifolds;
mod distance;
mod error;
mod narrow_phase;
mod time_of_impact;

/// Queries dedicated to specific pairs of shapes.
pub mod details {
    pub use super::clip::{clip_segment_to_line, ClipVertex};
    pub use super::contact_manifolds::{
        contact_manifold_ball_ball, contact_manifold_polygon_ball,
        contact_manifold_polygon_polygon,
    };
}
