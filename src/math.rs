use nalgebra::{Matrix3, Vector3};

pub type Real = f64;
pub const DIM: usize = 3;

pub type Vector = Vector3<Real>;
pub type Matrix = Matrix3<Real>;

#[inline(always)]
pub fn zero_vector() -> Vector {
    Vector::zeros()
}

#[inline(always)]
pub fn zero_matrix() -> Matrix {
    Matrix::zeros()
}

#[inline(always)]
pub fn identity_matrix() -> Matrix {
    Matrix::identity()
}

#[inline(always)]
pub fn matrix_determinant(m: &Matrix) -> Real {
    m.determinant()
}

/// `a ⊗ b`, i.e. `a * bᵀ`.
#[inline(always)]
pub fn outer_product(a: &Vector, b: &Vector) -> Matrix {
    a * b.transpose()
}

#[inline(always)]
pub fn matrix_is_finite(m: &Matrix) -> bool {
    m.iter().all(|v| v.is_finite())
}

#[inline(always)]
pub fn vector_is_finite(v: &Vector) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Symmetric 3x3 tensor stored as its six independent entries.
///
/// Packing (row-major upper triangle):
///
/// | slot | 0  | 1  | 2  | 3  | 4  | 5  |
/// |------|----|----|----|----|----|----|
/// | (i,j)| xx | xy | xz | yy | yz | zz |
///
/// `(i, j)` and `(j, i)` map to the same slot, so a mirrored pair can only be
/// written together.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SymmetricTensor(pub [Real; 6]);

impl SymmetricTensor {
    pub const ZERO: Self = Self([0.0; 6]);

    /// Slot index of entry `(i, j)`.
    #[inline(always)]
    pub const fn slot(i: usize, j: usize) -> usize {
        let (r, c) = if i <= j { (i, j) } else { (j, i) };
        match (r, c) {
            (0, 0) => 0,
            (0, 1) => 1,
            (0, 2) => 2,
            (1, 1) => 3,
            (1, 2) => 4,
            _ => 5,
        }
    }

    pub fn identity() -> Self {
        Self([1.0, 0.0, 0.0, 1.0, 0.0, 1.0])
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> Real {
        self.0[Self::slot(i, j)]
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, value: Real) {
        self.0[Self::slot(i, j)] = value;
    }

    /// Symmetric part of `m`, `(m + mᵀ) / 2`.
    pub fn from_matrix(m: &Matrix) -> Self {
        let mut packed = Self::ZERO;
        for i in 0..DIM {
            for j in i..DIM {
                packed.set(i, j, 0.5 * (m[(i, j)] + m[(j, i)]));
            }
        }
        packed
    }

    pub fn to_matrix(&self) -> Matrix {
        Matrix::from_fn(|i, j| self.get(i, j))
    }

    pub fn trace(&self) -> Real {
        self.0[0] + self.0[3] + self.0[5]
    }

    /// Full double contraction `a : b` (off-diagonal slots count twice).
    pub fn double_dot(&self, other: &Self) -> Real {
        let a = &self.0;
        let b = &other.0;
        a[0] * b[0] + a[3] * b[3] + a[5] * b[5] + 2.0 * (a[1] * b[1] + a[2] * b[2] + a[4] * b[4])
    }

    pub fn scaled(&self, factor: Real) -> Self {
        Self(self.0.map(|v| v * factor))
    }

    pub fn add_scaled(&mut self, other: &Self, factor: Real) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += factor * b;
        }
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_matches_upper_triangle_order() {
        let expected = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)];
        for (slot, &(i, j)) in expected.iter().enumerate() {
            assert_eq!(SymmetricTensor::slot(i, j), slot);
            assert_eq!(SymmetricTensor::slot(j, i), slot);
        }
    }

    #[test]
    fn mirrored_entries_are_written_together() {
        let mut t = SymmetricTensor::ZERO;
        t.set(2, 0, 4.5);
        assert_eq!(t.get(0, 2), 4.5);
        let m = t.to_matrix();
        assert_eq!(m[(0, 2)], m[(2, 0)]);
    }

    #[test]
    fn from_matrix_takes_symmetric_part() {
        let m = Matrix::new(1.0, 2.0, 0.0, 4.0, 5.0, 6.0, 0.0, 0.0, 9.0);
        let t = SymmetricTensor::from_matrix(&m);
        assert_eq!(t.get(0, 1), 3.0);
        assert_eq!(t.get(1, 2), 3.0);
        assert_eq!(t.trace(), 15.0);
        let full = t.to_matrix();
        assert!((full - (m + m.transpose()) * 0.5).norm() < 1e-14);
    }

    #[test]
    fn double_dot_matches_full_contraction() {
        let a = SymmetricTensor([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = SymmetricTensor([0.5, -1.0, 2.0, 1.5, 0.25, -2.0]);
        let full = a.to_matrix().component_mul(&b.to_matrix()).sum();
        assert!((a.double_dot(&b) - full).abs() < 1e-12);
    }

}
