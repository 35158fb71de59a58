use nalgebra::{DMatrix, RealField, SymmetricEigen};
use ndarray::{Array1, Array2};
use nshare::IntoNalgebra;
use num_traits::Float;

use crate::error::IsomapError;
use crate::utils::FloatOps;

/// Eigenvalues with their eigenvectors stored as the columns of `eigenvectors`,
/// in whatever order the solver produced them.
#[derive(Debug, Clone)]
pub struct EigenDecomposition<T> {
    pub eigenvalues: Array1<T>,
    pub eigenvectors: Array2<T>,
}

/// Full eigendecomposition of a real symmetric matrix.
pub trait EigenSolver<T>: Send + Sync {
    fn decompose(&self, matrix: Array2<T>) -> Result<EigenDecomposition<T>, IsomapError>;
}

/// nalgebra's implicit QR solver for symmetric matrices.
///
/// The input is symmetrized as `(B + Bᵀ) / 2` first, so rounding noise in an
/// almost symmetric matrix is absorbed instead of rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymmetricEigenSolver {
    /// Upper bound on QR sweeps, `0` iterates until convergence.
    pub max_iterations: usize,
}

impl Default for SymmetricEigenSolver {
    fn default() -> Self {
        Self { max_iterations: 0 }
    }
}

impl<T> EigenSolver<T> for SymmetricEigenSolver
where
    T: FloatOps + RealField,
{
    fn decompose(&self, matrix: Array2<T>) -> Result<EigenDecomposition<T>, IsomapError> {
        let n = matrix.nrows();
        let matrix: DMatrix<T> = symmetrize(&matrix).into_nalgebra();

        let eig = SymmetricEigen::try_new(matrix, <T as Float>::epsilon(), self.max_iterations)
            .ok_or(IsomapError::EigenSolver { size: n })?;

        let eigenvalues = Array1::from_iter(eig.eigenvalues.iter().copied());
        let eigenvectors = Array2::from_shape_fn((n, n), |(r, c)| eig.eigenvectors[(r, c)]);

        Ok(EigenDecomposition {
            eigenvalues,
            eigenvectors,
        })
    }
}

fn symmetrize<T: FloatOps>(matrix: &Array2<T>) -> Array2<T> {
    let half = T::one() / (T::one() + T::one());
    Array2::from_shape_fn(matrix.dim(), |(i, j)| {
        (matrix[[i, j]] + matrix[[j, i]]) * half
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_decompose_2x2() {
        let m = array![[3.0, 1.0], [1.0, 3.0]];
        let eig = SymmetricEigenSolver::default().decompose(m.clone()).unwrap();

        let mut values = eig.eigenvalues.to_vec();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(values[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(values[1], 4.0, epsilon = 1e-10);

        // A v = lambda v
        for c in 0..2 {
            let v = eig.eigenvectors.column(c);
            let av = m.dot(&v);
            for r in 0..2 {
                assert_abs_diff_eq!(av[r], eig.eigenvalues[c] * v[r], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_tolerates_rounding_asymmetry() {
        let m = array![[2.0, 1.0 + 1e-14, 0.0], [1.0, 2.0, 0.0], [0.0, 0.0, 5.0]];
        let eig = SymmetricEigenSolver::default().decompose(m).unwrap();
        assert!(eig.eigenvalues.iter().all(|v| v.is_finite()));

        let mut values = eig.eigenvalues.to_vec();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(values[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(values[1], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(values[2], 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_orthonormal_vectors_f32() {
        let m = array![[4.0f32, 1.0, 0.5], [1.0, 3.0, 0.2], [0.5, 0.2, 1.0]];
        let eig = SymmetricEigenSolver::default().decompose(m).unwrap();
        let gram = eig.eigenvectors.t().dot(&eig.eigenvectors);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(gram[[i, j]], expected, epsilon = 1e-4);
            }
        }
    }
}
