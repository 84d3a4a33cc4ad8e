use crate::math::Real;

/// The default collision and constraint tolerance, in meters.
pub const DEFAULT_LINEAR_SLOP: Real = 0.005;
/// The default angular collision and constraint tolerance, in radians (two degrees).
pub const DEFAULT_ANGULAR_SLOP: Real = 2.0 / 180.0 * core::f64::consts::PI as Real;
