use crate::math::{Real, Vector, Vector3};
use crate::utils::inv_det;
use core::ops::{Add, Mul};

/// A 2x2 symmetric-definite-positive matrix.
///
/// This is the shape of the effective mass matrices of 2-DOF constraints.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SdpMatrix2 {
    /// The component at the first row and first column of this matrix.
    pub m11: Real,
    /// The component at the first row and second column of this matrix.
    pub m12: Real,
    /// The component at the second row and second column of this matrix.
    pub m22: Real,
}

impl Default for SdpMatrix2 {
    fn default() -> Self {
        Self::zero()
    }
}

impl SdpMatrix2 {
    /// A new SDP 2x2 matrix with the given components.
    ///
    /// Because the matrix is symmetric, only the lower off-diagonal component is required.
    pub fn new(m11: Real, m12: Real, m22: Real) -> Self {
        Self { m11, m12, m22 }
    }

    /// Create a new SDP matrix filled with zeros.
    pub fn zero() -> Self {
        Self {
            m11: 0.0,
            m12: 0.0,
            m22: 0.0,
        }
    }

    /// The determinant of this matrix.
    pub fn determinant(&self) -> Real {
        self.m11 * self.m22 - self.m12 * self.m12
    }

    /// Computes the inverse of this matrix.
    ///
    /// Returns the zero matrix if the determinant is too close to zero.
    pub fn inverse(&self) -> Self {
        let inv_det = inv_det(self.determinant());
        Self {
            m11: self.m22 * inv_det,
            m12: -self.m12 * inv_det,
            m22: self.m11 * inv_det,
        }
    }

    /// Solves `self * x = b` for `x`.
    ///
    /// Returns zero if the determinant is too close to zero.
    pub fn solve(&self, b: &Vector<Real>) -> Vector<Real> {
        let inv_det = inv_det(self.determinant());
        Vector::new(
            inv_det * (self.m22 * b.x - self.m12 * b.y),
            inv_det * (self.m11 * b.y - self.m12 * b.x),
        )
    }
}

impl Add<SdpMatrix2> for SdpMatrix2 {
    type Output = Self;

    fn add(self, rhs: SdpMatrix2) -> Self {
        Self::new(self.m11 + rhs.m11, self.m12 + rhs.m12, self.m22 + rhs.m22)
    }
}

impl Mul<Vector<Real>> for SdpMatrix2 {
    type Output = Vector<Real>;

    fn mul(self, rhs: Vector<Real>) -> Self::Output {
        Vector::new(
            self.m11 * rhs.x + self.m12 * rhs.y,
            self.m12 * rhs.x + self.m22 * rhs.y,
        )
    }
}

impl Mul<Real> for SdpMatrix2 {
    type Output = SdpMatrix2;

    fn mul(self, rhs: Real) -> Self::Output {
        SdpMatrix2::new(self.m11 * rhs, self.m12 * rhs, self.m22 * rhs)
    }
}

/// A 3x3 symmetric-definite-positive matrix.
///
/// This is the shape of the effective mass matrices of constraints locking two linear
/// and one angular degrees of freedom.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SdpMatrix3 {
    /// The component at the first row and first column of this matrix.
    pub m11: Real,
    /// The component at the first row and second column of this matrix.
    pub m12: Real,
    /// The component at the first row and third column of this matrix.
    pub m13: Real,
    /// The component at the second row and second column of this matrix.
    pub m22: Real,
    /// The component at the second row and third column of this matrix.
    pub m23: Real,
    /// The component at the third row and third column of this matrix.
    pub m33: Real,
}

impl Default for SdpMatrix3 {
    fn default() -> Self {
        Self::zero()
    }
}

impl SdpMatrix3 {
    /// A new SDP 3x3 matrix with the given components.
    ///
    /// Because the matrix is symmetric, only the lower off-diagonal components is required.
    pub fn new(m11: Real, m12: Real, m13: Real, m22: Real, m23: Real, m33: Real) -> Self {
        Self {
            m11,
            m12,
            m13,
            m22,
            m23,
            m33,
        }
    }

    /// Create a new SDP matrix filled with zeros.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    fn minors(&self) -> (Real, Real, Real) {
        (
            self.m22 * self.m33 - self.m23 * self.m23,
            self.m12 * self.m33 - self.m13 * self.m23,
            self.m12 * self.m23 - self.m13 * self.m22,
        )
    }

    /// The determinant of this matrix.
    pub fn determinant(&self) -> Real {
        let (minor_m12_m23, minor_m11_m23, minor_m11_m22) = self.minors();
        self.m11 * minor_m12_m23 - self.m12 * minor_m11_m23 + self.m13 * minor_m11_m22
    }

    /// The determinant of the upper-left 2x2 block of this matrix.
    pub fn determinant22(&self) -> Real {
        self.m11 * self.m22 - self.m12 * self.m12
    }

    /// Computes the inverse of this matrix.
    ///
    /// Returns the zero matrix if the determinant is too close to zero.
    pub fn inverse(&self) -> Self {
        let (minor_m12_m23, minor_m11_m23, minor_m11_m22) = self.minors();
        let determinant =
            self.m11 * minor_m12_m23 - self.m12 * minor_m11_m23 + self.m13 * minor_m11_m22;
        let inv_det = inv_det(determinant);

        SdpMatrix3 {
            m11: minor_m12_m23 * inv_det,
            m12: -minor_m11_m23 * inv_det,
            m13: minor_m11_m22 * inv_det,
            m22: (self.m11 * self.m33 - self.m13 * self.m13) * inv_det,
            m23: (self.m13 * self.m12 - self.m23 * self.m11) * inv_det,
            m33: (self.m11 * self.m22 - self.m12 * self.m12) * inv_det,
        }
    }

    /// Inverts the upper-left 2x2 block of this matrix.
    ///
    /// The third row and column of the result are zero.
    pub fn inverse22(&self) -> Self {
        let inv_det = inv_det(self.determinant22());
        SdpMatrix3 {
            m11: self.m22 * inv_det,
            m12: -self.m12 * inv_det,
            m13: 0.0,
            m22: self.m11 * inv_det,
            m23: 0.0,
            m33: 0.0,
        }
    }

    /// Solves `self * x = b` for `x`.
    ///
    /// Returns zero if the determinant is too close to zero.
    pub fn solve(&self, b: &Vector3<Real>) -> Vector3<Real> {
        self.inverse() * *b
    }

    /// Solves the upper-left 2x2 block of `self * x = b` for `x`.
    ///
    /// Returns zero if the determinant of that block is too close to zero.
    pub fn solve22(&self, b: &Vector<Real>) -> Vector<Real> {
        let inv_det = inv_det(self.determinant22());
        Vector::new(
            inv_det * (self.m22 * b.x - self.m12 * b.y),
            inv_det * (self.m11 * b.y - self.m12 * b.x),
        )
    }

    /// Multiplies the upper-left 2x2 block of this matrix by `v`.
    pub fn mul22(&self, v: &Vector<Real>) -> Vector<Real> {
        Vector::new(
            self.m11 * v.x + self.m12 * v.y,
            self.m12 * v.x + self.m22 * v.y,
        )
    }
}

impl Add<SdpMatrix3> for SdpMatrix3 {
    type Output = SdpMatrix3;

    fn add(self, rhs: SdpMatrix3) -> Self::Output {
        SdpMatrix3 {
            m11: self.m11 + rhs.m11,
            m12: self.m12 + rhs.m12,
            m13: self.m13 + rhs.m13,
            m22: self.m22 + rhs.m22,
            m23: self.m23 + rhs.m23,
            m33: self.m33 + rhs.m33,
        }
    }
}

impl Mul<Vector3<Real>> for SdpMatrix3 {
    type Output = Vector3<Real>;

    fn mul(self, rhs: Vector3<Real>) -> Self::Output {
        let x = self.m11 * rhs.x + self.m12 * rhs.y + self.m13 * rhs.z;
        let y = self.m12 * rhs.x + self.m22 * rhs.y + self.m23 * rhs.z;
        let z = self.m13 * rhs.x + self.m23 * rhs.y + self.m33 * rhs.z;
        Vector3::new(x, y, z)
    }
}

#[cfg(test)]
mod test {
    use super::{SdpMatrix2, SdpMatrix3};
    use crate::math::{Vector, Vector3};

    #[test]
    fn singular_matrices_invert_to_zero() {
        let m = SdpMatrix2::new(1.0, 1.0, 1.0);
        assert_eq!(m.inverse(), SdpMatrix2::zero());
        assert_eq!(m.solve(&Vector::new(1.0, 2.0)), Vector::zeros());

        let m = SdpMatrix3::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        assert_eq!(m.inverse(), SdpMatrix3::zero());
        assert_eq!(m.solve(&Vector3::new(1.0, 2.0, 3.0)), Vector3::zeros());
        // The upper-left block is still invertible.
        assert_relative_eq!(m.solve22(&Vector::new(1.0, 2.0)), Vector::new(1.0, 2.0));
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let m = SdpMatrix3::new(4.0, 1.0, 0.5, 3.0, 0.25, 2.0);
        let x = Vector3::new(0.3, -1.2, 2.0);
        let b = m * x;
        assert_relative_eq!(m.solve(&b), x, epsilon = 1.0e-5);

        let m2 = SdpMatrix2::new(2.0, 0.5, 1.0);
        let y = Vector::new(-0.7, 1.1);
        assert_relative_eq!(m2.inverse() * (m2 * y), y, epsilon = 1.0e-5);
        assert_relative_eq!(m2.solve(&(m2 * y)), y, epsilon = 1.0e-5);
    }
}
