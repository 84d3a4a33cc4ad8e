use crate::dynamics::Sweep;
use crate::math::{Real, DEFAULT_EPSILON};
use crate::query::{distance, DistanceProxy};

/// The maximum number of conservative-advancement iterations.
const MAX_ITERATIONS: usize = 32;

/// The input of a time-of-impact query.
#[derive(Copy, Clone, Debug)]
pub struct ToiInput<'a> {
    /// The core and skin radius of the first shape.
    pub proxy_a: DistanceProxy<'a>,
    /// The core and skin radius of the second shape.
    pub proxy_b: DistanceProxy<'a>,
    /// The motion of the first body over the remainder of the step.
    pub sweep_a: Sweep,
    /// The motion of the second body over the remainder of the step.
    pub sweep_b: Sweep,
    /// The upper bound of the sweep interval, usually `1.0`.
    pub t_max: Real,
    /// The collision tolerance.
    pub linear_slop: Real,
}

/// The outcome of a time-of-impact query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToiState {
    /// The query did not run.
    Unknown,
    /// The query did not converge within its iteration budget.
    Failed,
    /// The cores already overlap at the start of the sweep.
    Overlapped,
    /// The shapes touch at the returned time.
    Touching,
    /// The shapes never get closer than the target separation in the sweep interval.
    Separated,
}

/// The result of a time-of-impact query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ToiOutput {
    /// The outcome of the query.
    pub state: ToiState,
    /// The time of impact, as a fraction of the sweep interval.
    pub t: Real,
}

/// Computes the time at which two sweeping shapes first come into contact.
pub trait TimeOfImpact: Send + Sync {
    /// Computes the upper bound on the time of impact between both proxies.
    fn time_of_impact(&self, input: &ToiInput) -> ToiOutput;
}

/// A time-of-impact query based on conservative advancement.
///
/// The shapes are advanced by the largest time step guaranteed not to make their cores closer
/// than the target separation, until they are close enough to be considered touching. The
/// target leaves a bit of overlap so that the contact is picked up by the narrow-phase.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultTimeOfImpact;

impl TimeOfImpact for DefaultTimeOfImpact {
    fn time_of_impact(&self, input: &ToiInput) -> ToiOutput {
        let mut sweep_a = input.sweep_a;
        let mut sweep_b = input.sweep_b;
        // Large rotations would make the motion bounds useless.
        sweep_a.normalize();
        sweep_b.normalize();

        let slop = input.linear_slop;
        let total_radius = input.proxy_a.radius + input.proxy_b.radius;
        let target = slop.max(total_radius - 3.0 * slop);
        let tolerance = 0.25 * slop;

        // Bounds of the distance any core point travels per unit of sweep time.
        let radius_a = input.proxy_a.max_distance_to(&sweep_a.local_center);
        let radius_b = input.proxy_b.max_distance_to(&sweep_b.local_center);
        let dc = (sweep_a.c - sweep_a.c0) - (sweep_b.c - sweep_b.c0);
        let angular_bound =
            (sweep_a.a - sweep_a.a0).abs() * radius_a + (sweep_b.a - sweep_b.a0).abs() * radius_b;

        let mut t = 0.0;

        for _ in 0..MAX_ITERATIONS {
            let xf_a = sweep_a.transform(t);
            let xf_b = sweep_b.transform(t);
            let out = distance(&input.proxy_a, &xf_a, &input.proxy_b, &xf_b);

            if out.distance <= 0.0 {
                return ToiOutput {
                    state: ToiState::Overlapped,
                    t: 0.0,
                };
            }

            if out.distance < target + tolerance {
                return ToiOutput {
                    state: ToiState::Touching,
                    t,
                };
            }

            let normal = (out.point_b - out.point_a) / out.distance;
            let approach_speed = dc.dot(&normal) + angular_bound;

            if approach_speed <= DEFAULT_EPSILON {
                return ToiOutput {
                    state: ToiState::Separated,
                    t: input.t_max,
                };
            }

            t += (out.distance - target) / approach_speed;

            if t >= input.t_max {
                return ToiOutput {
                    state: ToiState::Separated,
                    t: input.t_max,
                };
            }
        }

        log::debug!("Time of impact did not converge after {MAX_ITERATIONS} iterations.");
        ToiOutput {
            state: ToiState::Failed,
            t,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{DefaultTimeOfImpact, TimeOfImpact, ToiInput, ToiState};
    use crate::dynamics::Sweep;
    use crate::math::Point;
    use crate::shape::{Ball, ConvexPolygon, Shape};
    use crate::utils::DEFAULT_LINEAR_SLOP;

    fn sweep(from: Point<crate::math::Real>, to: Point<crate::math::Real>) -> Sweep {
        Sweep {
            c0: from,
            c: to,
            ..Sweep::default()
        }
    }

    #[test]
    fn fast_ball_hits_thin_wall() {
        let wall = ConvexPolygon::cuboid(0.05, 2.0);
        let ball = Ball::new(0.25);
        let input = ToiInput {
            proxy_a: wall.distance_proxy(0),
            proxy_b: ball.distance_proxy(0),
            sweep_a: Sweep::default(),
            sweep_b: sweep(Point::new(-4.0, 0.0), Point::new(4.0, 0.0)),
            t_max: 1.0,
            linear_slop: DEFAULT_LINEAR_SLOP,
        };

        let out = DefaultTimeOfImpact.time_of_impact(&input);
        assert_eq!(out.state, ToiState::Touching);

        // The ball core touches the wall core when its center is at x = -0.05 - target.
        let target = input.proxy_a.radius + input.proxy_b.radius - 3.0 * DEFAULT_LINEAR_SLOP;
        let expected = (4.0 - 0.05 - target) / 8.0;
        assert_relative_eq!(out.t, expected, epsilon = 1.0e-3);
    }

    #[test]
    fn receding_shapes_are_separated() {
        let ball = Ball::new(0.5);
        let input = ToiInput {
            proxy_a: ball.distance_proxy(0),
            proxy_b: ball.distance_proxy(0),
            sweep_a: Sweep::default(),
            sweep_b: sweep(Point::new(2.0, 0.0), Point::new(6.0, 0.0)),
            t_max: 1.0,
            linear_slop: DEFAULT_LINEAR_SLOP,
        };

        let out = DefaultTimeOfImpact.time_of_impact(&input);
        assert_eq!(out.state, ToiState::Separated);
        assert_eq!(out.t, 1.0);
    }

    #[test]
    fn overlapping_cores() {
        let cube = ConvexPolygon::cuboid(0.5, 0.5);
        let input = ToiInput {
            proxy_a: cube.distance_proxy(0),
            proxy_b: cube.distance_proxy(0),
            sweep_a: Sweep::default(),
            sweep_b: sweep(Point::new(0.2, 0.0), Point::new(3.0, 0.0)),
            t_max: 1.0,
            linear_slop: DEFAULT_LINEAR_SLOP,
        };

        let out = DefaultTimeOfImpact.time_of_impact(&input);
        assert_eq!(out.state, ToiState::Overlapped);
    }
}
