use crate::math::{Isometry, Point, Real, Vector, DEFAULT_EPSILON};
use arrayvec::ArrayVec;

/// The maximum number of points of a contact manifold.
pub const MAX_MANIFOLD_POINTS: usize = 2;

/// The kind of geometric feature a contact point originates from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ContactFeatureType {
    /// A vertex.
    #[default]
    Vertex = 0,
    /// A face (an edge, in 2D).
    Face = 1,
}

/// Identifies a contact point by the features of both shapes that generated it.
///
/// Two points with the same id on consecutive frames are considered to be the same contact,
/// which lets the solver carry over the accumulated impulses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ContactId {
    /// Feature index on the first shape.
    pub index_a: u8,
    /// Feature index on the second shape.
    pub index_b: u8,
    /// Feature type on the first shape.
    pub type_a: ContactFeatureType,
    /// Feature type on the second shape.
    pub type_b: ContactFeatureType,
}

impl ContactId {
    /// A compact key packing all the fields of this id.
    #[inline]
    pub fn key(&self) -> u32 {
        self.index_a as u32
            | (self.index_b as u32) << 8
            | (self.type_a as u32) << 16
            | (self.type_b as u32) << 24
    }

    /// The same features, with the roles of both shapes exchanged.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            index_a: self.index_b,
            index_b: self.index_a,
            type_a: self.type_b,
            type_b: self.type_a,
        }
    }
}

/// A contact point of a [`Manifold`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ManifoldPoint {
    /// The point, whose meaning depends on the manifold type:
    ///
    /// - `Circles`: the local center of the second circle.
    /// - `FaceA`: the local center of the second shape's support point.
    /// - `FaceB`: the local center of the first shape's support point.
    pub local_point: Point<Real>,
    /// The non-penetration impulse accumulated at this point.
    pub normal_impulse: Real,
    /// The friction impulse accumulated at this point.
    pub tangent_impulse: Real,
    /// Identifies this point across frames.
    pub id: ContactId,
}

impl ManifoldPoint {
    /// A new manifold point with zero accumulated impulses.
    pub fn new(local_point: Point<Real>, id: ContactId) -> Self {
        Self {
            local_point,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            id,
        }
    }
}

/// How the points of a [`Manifold`] are expressed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ManifoldType {
    /// Two circles: the normal is the direction between both centers.
    #[default]
    Circles,
    /// The reference face is on the first shape.
    FaceA,
    /// The reference face is on the second shape.
    FaceB,
}

/// A contact manifold between two shapes, expressed in their local frames.
///
/// Keeping the manifold local lets the position solver recompute the separation after the
/// bodies moved, without running the narrow-phase again.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Manifold {
    /// The contact points, at most two.
    pub points: ArrayVec<ManifoldPoint, MAX_MANIFOLD_POINTS>,
    /// The reference face normal. Unused for `Circles`.
    pub local_normal: Vector<Real>,
    /// The reference point, whose meaning depends on the manifold type:
    ///
    /// - `Circles`: the local center of the first circle.
    /// - `FaceA`: the center of the reference face of the first shape.
    /// - `FaceB`: the center of the reference face of the second shape.
    pub local_point: Point<Real>,
    /// How the points are expressed.
    pub kind: ManifoldType,
}

impl Manifold {
    /// An empty manifold.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of contact points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Does this manifold have no point?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Removes every point of this manifold.
    #[inline]
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Copies the accumulated impulses of the points of `old` into the points of `self` that
    /// share the same contact id.
    ///
    /// Points without a match start with zero impulses.
    pub fn match_impulses(&mut self, old: &Manifold) {
        for point in &mut self.points {
            point.normal_impulse = 0.0;
            point.tangent_impulse = 0.0;

            let key = point.id.key();
            if let Some(old_point) = old.points.iter().find(|p| p.id.key() == key) {
                point.normal_impulse = old_point.normal_impulse;
                point.tangent_impulse = old_point.tangent_impulse;
            }
        }
    }
}

/// A contact manifold expressed in world-space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldManifold {
    /// The world normal, pointing from the first shape toward the second.
    pub normal: Vector<Real>,
    /// The world contact points, halfway between both shape surfaces.
    pub points: [Point<Real>; MAX_MANIFOLD_POINTS],
    /// The signed separation of each point. Negative means penetration.
    pub separations: [Real; MAX_MANIFOLD_POINTS],
    /// The number of valid points.
    pub len: usize,
}

impl WorldManifold {
    /// Computes the world manifold of `manifold` given the poses and skin radii of both shapes.
    pub fn new(
        manifold: &Manifold,
        xf_a: &Isometry<Real>,
        radius_a: Real,
        xf_b: &Isometry<Real>,
        radius_b: Real,
    ) -> Self {
        let mut result = WorldManifold {
            normal: Vector::zeros(),
            points: [Point::origin(); MAX_MANIFOLD_POINTS],
            separations: [0.0; MAX_MANIFOLD_POINTS],
            len: manifold.points.len(),
        };

        if manifold.points.is_empty() {
            return result;
        }

        match manifold.kind {
            ManifoldType::Circles => {
                let mut normal = Vector::x();
                let point_a = xf_a * manifold.local_point;
                let point_b = xf_b * manifold.points[0].local_point;
                if na::distance_squared(&point_a, &point_b) > DEFAULT_EPSILON * DEFAULT_EPSILON {
                    normal = (point_b - point_a).normalize();
                }

                let c_a = point_a + normal * radius_a;
                let c_b = point_b - normal * radius_b;
                result.normal = normal;
                result.points[0] = na::center(&c_a, &c_b);
                result.separations[0] = (c_b - c_a).dot(&normal);
            }
            ManifoldType::FaceA => {
                let normal = xf_a.rotation * manifold.local_normal;
                let plane_point = xf_a * manifold.local_point;

                for (i, point) in manifold.points.iter().enumerate() {
                    let clip_point = xf_b * point.local_point;
                    let c_a =
                        clip_point + normal * (radius_a - (clip_point - plane_point).dot(&normal));
                    let c_b = clip_point - normal * radius_b;
                    result.points[i] = na::center(&c_a, &c_b);
                    result.separations[i] = (c_b - c_a).dot(&normal);
                }

                result.normal = normal;
            }
            ManifoldType::FaceB => {
                let normal = xf_b.rotation * manifold.local_normal;
                let plane_point = xf_b * manifold.local_point;

                for (i, point) in manifold.points.iter().enumerate() {
                    let clip_point = xf_a * point.local_point;
                    let c_b =
                        clip_point + normal * (radius_b - (clip_point - plane_point).dot(&normal));
                    let c_a = clip_point - normal * radius_a;
                    result.points[i] = na::center(&c_a, &c_b);
                    result.separations[i] = (c_a - c_b).dot(&normal);
                }

                // Ensure the normal points from A to B.
                result.normal = -normal;
            }
        }

        result
    }
}

#[cfg(test)]
mod test {
    use super::{ContactFeatureType, ContactId, Manifold, ManifoldPoint};
    use crate::math::Point;

    #[test]
    fn keys_distinguish_features() {
        let a = ContactId {
            index_a: 1,
            index_b: 2,
            type_a: ContactFeatureType::Face,
            type_b: ContactFeatureType::Vertex,
        };
        assert_ne!(a.key(), a.flipped().key());
        assert_eq!(a.flipped().flipped(), a);
        assert_eq!(ContactId::default().key(), 0);
    }

    #[test]
    fn impulses_follow_contact_ids() {
        let id0 = ContactId::default();
        let id1 = ContactId {
            index_b: 1,
            ..ContactId::default()
        };

        let mut old = Manifold::new();
        let mut p = ManifoldPoint::new(Point::origin(), id1);
        p.normal_impulse = 3.0;
        p.tangent_impulse = -1.0;
        old.points.push(p);

        let mut new = Manifold::new();
        new.points.push(ManifoldPoint::new(Point::origin(), id0));
        new.points.push(ManifoldPoint::new(Point::origin(), id1));
        new.points[0].normal_impulse = 5.0;
        new.match_impulses(&old);

        assert_eq!(new.points[0].normal_impulse, 0.0);
        assert_eq!(new.points[1].normal_impulse, 3.0);
        assert_eq!(new.points[1].tangent_impulse, -1.0);
    }
}
