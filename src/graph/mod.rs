//! # Distance graphs
//!
//! Dense `N × N` distance matrices shared by the neighbor graph and the
//! geodesic stage. A missing edge is stored as `+∞` so the shortest path
//! relaxation can run over the matrix without a separate adjacency structure.
//!
//! - [`neighbors`]: k-nearest (or radius) neighbor graph construction
//! - [`geodesic`]: all-pairs shortest paths over that graph

use crate::error::{IsomapError, Stage};
use crate::utils::FloatOps;
use ndarray::{Array2, ArrayView2};
use petgraph::unionfind::UnionFind;

pub mod geodesic;
pub mod neighbors;

pub use geodesic::shortest_paths;
pub use neighbors::{build_neighbor_graph, Neighborhood, NeighborGraphBuilder, Symmetrization};

/// Square matrix of non-negative distances where `+∞` marks an unreachable pair.
///
/// The diagonal is always exactly zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix<T: FloatOps> {
    data: Array2<T>,
}

impl<T: FloatOps> DistanceMatrix<T> {
    /// Wraps an array after checking that it is square, has a zero diagonal
    /// and holds only non-negative values or `+∞`.
    pub fn new(data: Array2<T>) -> Result<Self, IsomapError> {
        let (rows, cols) = data.dim();
        if rows != cols {
            return Err(IsomapError::invalid(
                Stage::Geodesic,
                "distances",
                format!("distance matrix must be square, got {}x{}", rows, cols),
            ));
        }
        if let Some(((i, j), v)) = data
            .indexed_iter()
            .find(|(_, v)| v.is_nan() || **v < T::zero())
        {
            return Err(IsomapError::invalid(
                Stage::Geodesic,
                "distances",
                format!("entry ({}, {}) = {:?} is not a valid distance", i, j, v),
            ));
        }
        if let Some(i) = (0..rows).find(|&i| data[[i, i]] != T::zero()) {
            return Err(IsomapError::invalid(
                Stage::Geodesic,
                "distances",
                format!("self-distance of point {} is not zero", i),
            ));
        }
        Ok(DistanceMatrix { data })
    }

    /// Callers guarantee the invariants `new` checks.
    pub(crate) fn from_array(data: Array2<T>) -> Self {
        debug_assert_eq!(data.nrows(), data.ncols());
        DistanceMatrix { data }
    }

    /// Number of points.
    pub fn n(&self) -> usize {
        self.data.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[[i, j]]
    }

    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    pub fn into_inner(self) -> Array2<T> {
        self.data
    }

    pub fn is_symmetric(&self, tolerance: T) -> bool {
        let n = self.n();
        (0..n).all(|i| {
            (i + 1..n).all(|j| {
                let (a, b) = (self.data[[i, j]], self.data[[j, i]]);
                a == b || (a - b).abs() <= tolerance
            })
        })
    }

    pub fn is_fully_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Number of unordered pairs `i < j` with no finite distance in either direction.
    pub fn unreachable_pairs(&self) -> usize {
        let n = self.n();
        (0..n)
            .map(|i| {
                (i + 1..n)
                    .filter(|&j| !self.linked(i, j))
                    .count()
            })
            .sum()
    }

    /// Number of connected components when every finite entry counts as a link.
    pub fn connected_components(&self) -> usize {
        let n = self.n();
        if n == 0 {
            return 0;
        }
        let mut components = UnionFind::<usize>::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                if self.linked(i, j) {
                    components.union(i, j);
                }
            }
        }
        let mut labels = components.into_labeling();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }

    /// Finite off-diagonal entries of row `i` as `(column, distance)` pairs.
    pub fn neighbors(&self, i: usize) -> Vec<(usize, T)> {
        self.data
            .row(i)
            .iter()
            .enumerate()
            .filter(|&(j, v)| j != i && v.is_finite())
            .map(|(j, &v)| (j, v))
            .collect()
    }

    /// Number of undirected edges (finite off-diagonal pairs).
    pub fn edge_count(&self) -> usize {
        let n = self.n();
        (0..n)
            .map(|i| (i + 1..n).filter(|&j| self.linked(i, j)).count())
            .sum()
    }

    fn linked(&self, i: usize, j: usize) -> bool {
        self.data[[i, j]].is_finite() || self.data[[j, i]].is_finite()
    }
}
