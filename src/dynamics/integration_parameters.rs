use crate::math::Real;
use crate::utils::{DEFAULT_ANGULAR_SLOP, DEFAULT_LINEAR_SLOP};
use na::RealField;

/// Parameters for a time-step of the physics engine.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct IntegrationParameters {
    /// The collision and constraint tolerance, in meters (default: `0.005`).
    pub linear_slop: Real,
    /// The angular collision and constraint tolerance, in radians (default: two degrees).
    pub angular_slop: Real,
    /// Relative normal velocity below which collisions are inelastic (default: `1.0` m/s).
    pub velocity_threshold: Real,
    /// The maximum linear position correction applied by one position iteration (default: `0.2`).
    pub max_linear_correction: Real,
    /// The maximum angular position correction applied by one position iteration
    /// (default: eight degrees).
    pub max_angular_correction: Real,
    /// The maximum translation of a body per step (default: `2.0`).
    ///
    /// This limit is very large and only prevents numerical problems.
    pub max_translation: Real,
    /// The maximum rotation of a body per step (default: `π / 2`).
    pub max_rotation: Real,
    /// The fraction of the overlap resolved by one position iteration (default: `0.2`).
    pub baumgarte: Real,
    /// The fraction of the overlap resolved by one position iteration during continuous
    /// collision sub-steps (default: `0.75`).
    pub toi_baumgarte: Real,
    /// The time a body must be still before it falls asleep, in seconds (default: `0.5`).
    pub time_to_sleep: Real,
    /// A body cannot sleep if its linear velocity is above this tolerance (default: `0.01`).
    pub linear_sleep_tolerance: Real,
    /// A body cannot sleep if its angular velocity is above this tolerance (default: two degrees
    /// per second).
    pub angular_sleep_tolerance: Real,
    /// The maximum number of time-of-impact sub-steps per contact and per step (default: `8`).
    pub max_sub_steps: u32,
    /// The maximum number of contacts handled by one time-of-impact sub-step (default: `32`).
    pub max_toi_contacts: usize,
    /// The number of position iterations of a time-of-impact sub-step (default: `20`).
    pub toi_position_iterations: usize,
    /// The margin added to the broad-phase AABBs, in meters (default: `0.1`).
    pub aabb_extension: Real,
    /// The factor applied to the displacement of a body when predicting its broad-phase AABB
    /// (default: `2.0`).
    pub aabb_multiplier: Real,
    /// The 2x2 block contact solver is used only below this condition number (default: `1000`).
    pub max_condition_number: Real,
}

impl Default for IntegrationParameters {
    fn default() -> Self {
        Self {
            linear_slop: DEFAULT_LINEAR_SLOP,
            angular_slop: DEFAULT_ANGULAR_SLOP,
            velocity_threshold: 1.0,
            max_linear_correction: 0.2,
            max_angular_correction: 8.0 / 180.0 * Real::pi(),
            max_translation: 2.0,
            max_rotation: 0.5 * Real::pi(),
            baumgarte: 0.2,
            toi_baumgarte: 0.75,
            time_to_sleep: 0.5,
            linear_sleep_tolerance: 0.01,
            angular_sleep_tolerance: 2.0 / 180.0 * Real::pi(),
            max_sub_steps: 8,
            max_toi_contacts: 32,
            toi_position_iterations: 20,
            aabb_extension: 0.1,
            aabb_multiplier: 2.0,
            max_condition_number: 1000.0,
        }
    }
}
