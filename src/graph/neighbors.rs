use std::cmp::Ordering;
use std::collections::HashSet;

use log::{debug, trace};
use ndarray::Array2;
use rayon::prelude::*;

use crate::error::{IsomapError, Stage};
use crate::graph::DistanceMatrix;
use crate::metric::{Euclidean, Metric};
use crate::points::PointSet;
use crate::utils::FloatOps;

/// How each point picks its neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Neighborhood {
    /// The `k` closest points, ties broken by the lower index.
    KNearest(usize),
    /// Every point within distance `eps` (inclusive).
    Radius(f64),
}

impl Default for Neighborhood {
    fn default() -> Self {
        Neighborhood::KNearest(7)
    }
}

/// How one-sided neighbor choices become undirected edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Symmetrization {
    /// `i` and `j` are linked when either one selected the other.
    #[default]
    Union,
    /// `i` and `j` are linked only when both selected each other.
    Mutual,
}

/// Builds the weighted neighbor graph by brute force over all pairs.
///
/// The result stores `dist(i, j)` for every edge, `+∞` for every other
/// off-diagonal pair and `0` on the diagonal. The zero diagonal is written
/// here and not left to the shortest path stage: relaxing from an infinite
/// diagonal would produce twice the nearest-neighbor distance instead of 0.
#[derive(Debug, Clone)]
pub struct NeighborGraphBuilder<M: Metric = Euclidean> {
    neighborhood: Neighborhood,
    symmetrization: Symmetrization,
    metric: M,
}

impl NeighborGraphBuilder<Euclidean> {
    pub fn new(neighborhood: Neighborhood) -> Self {
        NeighborGraphBuilder {
            neighborhood,
            symmetrization: Symmetrization::default(),
            metric: Euclidean,
        }
    }
}

impl Default for NeighborGraphBuilder<Euclidean> {
    fn default() -> Self {
        Self::new(Neighborhood::default())
    }
}

impl<M: Metric> NeighborGraphBuilder<M> {
    pub fn symmetrization(mut self, symmetrization: Symmetrization) -> Self {
        self.symmetrization = symmetrization;
        self
    }

    pub fn metric<N: Metric>(self, metric: N) -> NeighborGraphBuilder<N> {
        NeighborGraphBuilder {
            neighborhood: self.neighborhood,
            symmetrization: self.symmetrization,
            metric,
        }
    }

    /// Computes the neighbor graph of `points`.
    ///
    /// # Errors
    /// `InvalidParameter` when `k` is zero or not smaller than the number of
    /// points, or when the radius is not a positive finite number.
    pub fn build<T: FloatOps>(&self, points: &PointSet<'_, T>) -> Result<DistanceMatrix<T>, IsomapError> {
        let n = points.len();
        self.validate(n)?;

        let selections: Vec<Vec<(usize, T)>> = (0..n)
            .into_par_iter()
            .map(|i| self.select_neighbors(points, i))
            .collect::<Result<_, _>>()?;

        let mut matrix = Array2::from_elem((n, n), T::infinity());
        matrix.diag_mut().fill(T::zero());

        match self.symmetrization {
            Symmetrization::Union => {
                for (i, selected) in selections.iter().enumerate() {
                    for &(j, dist) in selected {
                        matrix[[i, j]] = dist;
                        matrix[[j, i]] = dist;
                    }
                }
            }
            Symmetrization::Mutual => {
                let chosen: Vec<HashSet<usize>> = selections
                    .iter()
                    .map(|selected| selected.iter().map(|&(j, _)| j).collect())
                    .collect();
                for (i, selected) in selections.iter().enumerate() {
                    for &(j, dist) in selected {
                        if chosen[j].contains(&i) {
                            matrix[[i, j]] = dist;
                            matrix[[j, i]] = dist;
                        }
                    }
                }
            }
        }

        let graph = DistanceMatrix::from_array(matrix);
        debug!(
            "Neighbor graph: {} points, {:?}, {:?}, {} edges",
            n,
            self.neighborhood,
            self.symmetrization,
            graph.edge_count()
        );
        Ok(graph)
    }

    fn validate(&self, n: usize) -> Result<(), IsomapError> {
        match self.neighborhood {
            Neighborhood::KNearest(0) => Err(IsomapError::invalid(
                Stage::NeighborGraph,
                "k",
                "k must be at least 1",
            )),
            Neighborhood::KNearest(k) if k >= n => Err(IsomapError::invalid(
                Stage::NeighborGraph,
                "k",
                format!("k ({}) must be smaller than the number of points ({})", k, n),
            )),
            Neighborhood::Radius(eps) if !(eps.is_finite() && eps > 0.0) => Err(IsomapError::invalid(
                Stage::NeighborGraph,
                "eps",
                format!("radius must be positive and finite, got {}", eps),
            )),
            _ => Ok(()),
        }
    }

    fn select_neighbors<T: FloatOps>(
        &self,
        points: &PointSet<'_, T>,
        i: usize,
    ) -> Result<Vec<(usize, T)>, IsomapError> {
        let origin = points.point(i);
        let mut candidates: Vec<(usize, T)> = (0..points.len())
            .filter(|&j| j != i)
            .map(|j| (j, self.metric.distance(origin, points.point(j))))
            .collect();

        match self.neighborhood {
            Neighborhood::KNearest(k) => {
                candidates.sort_by(|a, b| {
                    a.1.partial_cmp(&b.1)
                        .unwrap_or(Ordering::Equal)
                        .then(a.0.cmp(&b.0))
                });
                candidates.truncate(k);
            }
            Neighborhood::Radius(eps) => {
                let eps = T::from_f64(eps).ok_or_else(|| {
                    IsomapError::invalid(Stage::NeighborGraph, "eps", "radius is not representable")
                })?;
                candidates.retain(|&(_, dist)| dist <= eps);
            }
        }

        trace!("Point {}: {} neighbor candidates kept", i, candidates.len());
        Ok(candidates)
    }
}

/// k-nearest neighbor graph with Euclidean distances and union symmetrization.
pub fn build_neighbor_graph<T: FloatOps>(
    points: &PointSet<'_, T>,
    k: usize,
) -> Result<DistanceMatrix<T>, IsomapError> {
    NeighborGraphBuilder::new(Neighborhood::KNearest(k)).build(points)
}
