/// Error indicating that a geometric query is not supported between certain shape combinations.
///
/// The [`DefaultNarrowPhase`](crate::query::DefaultNarrowPhase) only knows about balls and convex
/// polygons. Custom shapes need a custom [`NarrowPhase`](crate::query::NarrowPhase).
#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
#[error("query not supported between these shapes")]
pub struct Unsupported;
