use crate::math::{Isometry, Real};
use crate::query::{ContactId, Manifold, ManifoldPoint, ManifoldType};
use crate::shape::Ball;

/// Computes the contact manifold between two balls.
///
/// The manifold is cleared if the balls are not touching.
pub fn contact_manifold_ball_ball(
    ball_a: &Ball,
    xf_a: &Isometry<Real>,
    ball_b: &Ball,
    xf_b: &Isometry<Real>,
    manifold: &mut Manifold,
) {
    manifold.points.clear();

    let center_a = xf_a * ball_a.center;
    let center_b = xf_b * ball_b.center;
    let dist_sqr = na::distance_squared(&center_a, &center_b);
    let radius = ball_a.radius + ball_b.radius;

    if dist_sqr > radius * radius {
        return;
    }

    manifold.kind = ManifoldType::Circles;
    manifold.local_point = ball_a.center;
    manifold.local_normal.fill(0.0);
    manifold
        .points
        .push(ManifoldPoint::new(ball_b.center, ContactId::default()));
}

#[cfg(test)]
mod test {
    use super::contact_manifold_ball_ball;
    use crate::math::{Isometry, Vector};
    use crate::query::{Manifold, ManifoldType, WorldManifold};
    use crate::shape::Ball;

    #[test]
    fn touching_balls() {
        let ball = Ball::new(1.0);
        let mut manifold = Manifold::new();
        let xf_b = Isometry::translation(1.5, 0.0);
        contact_manifold_ball_ball(&ball, &Isometry::identity(), &ball, &xf_b, &mut manifold);

        assert_eq!(manifold.len(), 1);
        assert_eq!(manifold.kind, ManifoldType::Circles);

        let world = WorldManifold::new(&manifold, &Isometry::identity(), 1.0, &xf_b, 1.0);
        assert_relative_eq!(world.normal, Vector::x());
        assert_relative_eq!(world.separations[0], -0.5);
    }

    #[test]
    fn separated_balls() {
        let ball = Ball::new(1.0);
        let mut manifold = Manifold::new();
        let xf_b = Isometry::translation(0.0, 2.1);
        contact_manifold_ball_ball(&ball, &Isometry::identity(), &ball, &xf_b, &mut manifold);
        assert!(manifold.is_empty());
    }
}
