//! Spatial partitioning tools.

pub use self::broad_phase::{BroadPhase, ProxyId};
pub use self::default_broad_phase::DefaultBroadPhase;

mod broad_phase;
mod default_broad_phase;
