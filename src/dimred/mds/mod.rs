//! # Classical multidimensional scaling
//!
//! Recovers Euclidean coordinates from a matrix of pairwise distances:
//! square the distances, double-center them into an inner-product (Gram)
//! matrix `B`, eigendecompose `B` and scale the leading eigenvectors by the
//! square roots of their eigenvalues.
//!
//! ## Conventions
//! - Negative eigenvalues are clamped to zero before the square root. Distance
//!   data that does not embed exactly in a Euclidean space routinely yields
//!   small negative eigenvalues; a clamped axis comes out as all zeros.
//!   Tiny positive eigenvalues from rounding are kept, so an axis beyond the
//!   intrinsic dimension holds values of order `sqrt(ε)` rather than exact zeros.
//! - Eigenvectors are only defined up to sign. Each axis is flipped so that
//!   its component of largest magnitude is positive (the first one on ties).
//!   Embeddings are therefore reproducible, but still only unique up to
//!   rotation inside eigenspaces of repeated eigenvalues.
//! - Eigenpairs with equal eigenvalues keep the order the solver produced.

use std::cmp::Ordering;

use log::{debug, warn};
use nalgebra::RealField;
use ndarray::{Array1, Array2, ArrayView1};
use num_traits::Float;

use crate::error::{IsomapError, Stage};
use crate::graph::DistanceMatrix;
use crate::utils::{from_count, FloatOps};

mod eigen;

pub use eigen::{EigenDecomposition, EigenSolver, SymmetricEigenSolver};

/// Output of the spectral embedding stage.
#[derive(Debug, Clone)]
pub struct MdsResult<T> {
    /// `N × d` coordinates, one row per point.
    pub embedding: Array2<T>,
    /// The `d` selected eigenvalues in descending order, before clamping.
    pub eigenvalues: Array1<T>,
    /// The full spectrum of `B` in descending order.
    pub all_eigenvalues: Array1<T>,
}

/// Embeds the points described by `distances` into `n_components` dimensions.
///
/// # Errors
/// - `InvalidParameter` when `n_components` is zero or not smaller than `N`
/// - `DisconnectedGraph` when any distance is `+∞`; checked before centering
///   so an unreachable pair cannot poison the decomposition
/// - `DegenerateEmbedding` when none of the selected eigenvalues is positive
pub fn embed<T>(distances: &DistanceMatrix<T>, n_components: usize) -> Result<MdsResult<T>, IsomapError>
where
    T: FloatOps + RealField,
{
    embed_with(distances, n_components, &SymmetricEigenSolver::default())
}

/// [`embed`] with a caller-provided eigensolver.
pub fn embed_with<T, S>(
    distances: &DistanceMatrix<T>,
    n_components: usize,
    solver: &S,
) -> Result<MdsResult<T>, IsomapError>
where
    T: FloatOps,
    S: EigenSolver<T> + ?Sized,
{
    let n = distances.n();
    if n_components == 0 {
        return Err(IsomapError::invalid(
            Stage::Embedding,
            "d",
            "target dimension must be at least 1",
        ));
    }
    if n_components >= n {
        return Err(IsomapError::invalid(
            Stage::Embedding,
            "d",
            format!(
                "target dimension ({}) must be smaller than the number of points ({})",
                n_components, n
            ),
        ));
    }
    if !distances.is_fully_finite() {
        return Err(IsomapError::DisconnectedGraph {
            unreachable_pairs: distances.unreachable_pairs(),
            components: distances.connected_components(),
        });
    }

    let squared = distances.view().mapv(|v| v * v);
    let gram = double_center(&squared);
    let decomposition = solver.decompose(gram)?;
    let values = &decomposition.eigenvalues;

    let order = descending_order(values);
    let all_eigenvalues: Array1<T> = order.iter().map(|&i| values[i]).collect();

    let max_abs = all_eigenvalues
        .iter()
        .fold(T::zero(), |acc, &v| Float::max(acc, Float::abs(v)));
    let tolerance = from_count::<T>(n) * <T as Float>::epsilon() * max_abs;

    let selected = &order[..n_components];
    if selected.iter().all(|&i| values[i] <= tolerance) {
        return Err(IsomapError::DegenerateEmbedding {
            requested: n_components,
        });
    }

    let mut embedding = Array2::zeros((n, n_components));
    for (axis, &idx) in selected.iter().enumerate() {
        let lambda = values[idx];
        if lambda < T::zero() {
            warn!(
                "Eigenvalue {:?} of component {} is negative, clamped to zero",
                lambda, axis
            );
        }
        let scale = Float::sqrt(Float::max(lambda, T::zero()));
        let vector = decomposition.eigenvectors.column(idx);
        let sign = canonical_sign(vector);
        for (row, &v) in vector.iter().enumerate() {
            embedding[[row, axis]] = v * sign * scale;
        }
    }

    let eigenvalues: Array1<T> = selected.iter().map(|&i| values[i]).collect();
    debug!(
        "Classical MDS: {} points -> {} components, eigenvalues {:?}",
        n, n_components, eigenvalues
    );

    Ok(MdsResult {
        embedding,
        eigenvalues,
        all_eigenvalues,
    })
}

/// `B = -1/2 (D² - rowMean - colMean + grandMean)`.
pub fn double_center<T: FloatOps>(squared: &Array2<T>) -> Array2<T> {
    let n_rows = from_count::<T>(squared.nrows());
    let n_cols = from_count::<T>(squared.ncols());

    let row_means: Vec<T> = squared.rows().into_iter().map(|r| r.sum() / n_cols).collect();
    let col_means: Vec<T> = squared
        .columns()
        .into_iter()
        .map(|c| c.sum() / n_rows)
        .collect();
    let grand_mean = row_means.iter().copied().sum::<T>() / n_rows;
    let half = T::one() / (T::one() + T::one());

    Array2::from_shape_fn(squared.dim(), |(i, j)| {
        -half * (squared[[i, j]] - row_means[i] - col_means[j] + grand_mean)
    })
}

/// Indices sorted by eigenvalue, largest first. Stable, so ties keep solver order.
fn descending_order<T: FloatOps>(values: &Array1<T>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal));
    order
}

fn canonical_sign<T: FloatOps>(vector: ArrayView1<T>) -> T {
    let mut pivot = T::zero();
    let mut best = T::zero();
    for &v in vector.iter() {
        if v.abs() > best {
            best = v.abs();
            pivot = v;
        }
    }
    if pivot < T::zero() {
        -T::one()
    } else {
        T::one()
    }
}
