use crate::math::{Point, Real, Vector};
use crate::query::{ContactFeatureType, ContactId};

/// A point of a clipped segment, tagged with the features that produced it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClipVertex {
    /// The clipped point.
    pub point: Point<Real>,
    /// The features of both shapes this point originates from.
    pub id: ContactId,
}

/// Clips the segment `input` against the half-plane `normal · x <= offset`.
///
/// Points produced by the clipping itself are tagged with the vertex `vertex_index_a` of the
/// reference shape. Returns the number of points written to `output`.
pub fn clip_segment_to_line(
    output: &mut [ClipVertex; 2],
    input: &[ClipVertex; 2],
    normal: &Vector<Real>,
    offset: Real,
    vertex_index_a: usize,
) -> usize {
    let mut count = 0;

    let distance0 = normal.dot(&input[0].point.coords) - offset;
    let distance1 = normal.dot(&input[1].point.coords) - offset;

    if distance0 <= 0.0 {
        output[count] = input[0];
        count += 1;
    }
    if distance1 <= 0.0 {
        output[count] = input[1];
        count += 1;
    }

    if distance0 * distance1 < 0.0 {
        // The segment crosses the clipping plane.
        let interp = distance0 / (distance0 - distance1);
        output[count] = ClipVertex {
            point: input[0].point + (input[1].point - input[0].point) * interp,
            id: ContactId {
                index_a: vertex_index_a as u8,
                index_b: input[0].id.index_b,
                type_a: ContactFeatureType::Vertex,
                type_b: ContactFeatureType::Face,
            },
        };
        count += 1;
    }

    count
}

#[cfg(test)]
mod test {
    use super::{clip_segment_to_line, ClipVertex};
    use crate::math::{Point, Vector};
    use crate::query::{ContactFeatureType, ContactId};

    fn vertex(x: f32, index_b: u8) -> ClipVertex {
        ClipVertex {
            point: Point::new(x as crate::math::Real, 0.0),
            id: ContactId {
                index_b,
                ..ContactId::default()
            },
        }
    }

    #[test]
    fn clip_crossing_segment() {
        let input = [vertex(-1.0, 0), vertex(1.0, 1)];
        let mut output = input;
        let n = clip_segment_to_line(&mut output, &input, &Vector::x(), 0.5, 3);
        assert_eq!(n, 2);
        assert_eq!(output[0], input[0]);
        assert_relative_eq!(output[1].point, Point::new(0.5, 0.0));
        assert_eq!(output[1].id.index_a, 3);
        assert_eq!(output[1].id.type_a, ContactFeatureType::Vertex);
        assert_eq!(output[1].id.type_b, ContactFeatureType::Face);
    }

    #[test]
    fn clip_rejects_segment_outside() {
        let input = [vertex(1.0, 0), vertex(2.0, 1)];
        let mut output = input;
        let n = clip_segment_to_line(&mut output, &input, &Vector::x(), 0.5, 0);
        assert_eq!(n, 0);
    }
}
