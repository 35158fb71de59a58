//! # Isometric feature mapping (ISOMAP)
//!
//! Non-linear dimensionality reduction that preserves geodesic distances along
//! the data manifold instead of straight-line distances in the ambient space.
//! The pipeline is linear and stateless between runs:
//!
//! 1. neighbor graph over the points ([`crate::graph::neighbors`])
//! 2. all-pairs shortest paths as geodesic estimates ([`crate::graph::geodesic`])
//! 3. classical MDS of the geodesic distances ([`crate::dimred::mds`])
//!
//! Every stage fails fast; a disconnected neighbor graph is reported instead
//! of being patched with a finite stand-in distance.

use std::marker::PhantomData;
use std::time::Instant;

use anyhow::{anyhow, bail, Context};
use log::{log, Level};
use nalgebra::RealField;
use ndarray::{Array1, Array2, ArrayView2};

use crate::dimred::mds::embed;
use crate::error::{IsomapError, Stage};
use crate::graph::{shortest_paths, DistanceMatrix, NeighborGraphBuilder, Neighborhood, Symmetrization};
use crate::metric::{Euclidean, Metric, MetricKind};
use crate::points::PointSet;
use crate::utils::{from_count, FloatOps};

/// Runs the whole pipeline with a k-nearest neighbor graph and Euclidean distances.
///
/// # Errors
/// Any [`IsomapError`] raised by one of the stages.
pub fn isomap<T>(x: ArrayView2<T>, n_neighbors: usize, n_components: usize) -> Result<Array2<T>, IsomapError>
where
    T: FloatOps + RealField,
{
    let points = PointSet::new(x)?;
    validate_components(n_components, points.len())?;
    let graph = NeighborGraphBuilder::new(Neighborhood::KNearest(n_neighbors)).build(&points)?;
    let geodesic = shortest_paths(&graph);
    Ok(embed(&geodesic, n_components)?.embedding)
}

/// ISOMAP model holding the configuration and, once fitted, the embedding
/// together with the intermediate results used for diagnostics.
#[derive(Debug)]
pub struct Isomap<T>
where
    T: FloatOps + RealField,
{
    n_components: usize,
    neighborhood: Neighborhood,
    symmetrization: Symmetrization,
    metric: MetricKind,
    verbose: bool,
    embedding_: Option<Array2<T>>,
    eigenvalues_: Option<Array1<T>>,
    all_eigenvalues_: Option<Array1<T>>,
    geodesic_: Option<DistanceMatrix<T>>,
}

impl<T> Isomap<T>
where
    T: FloatOps + RealField,
{
    /// Creates an unfitted model. See [`IsomapBuilder`] for the defaults.
    pub fn new(
        n_components: usize,
        neighborhood: Neighborhood,
        symmetrization: Symmetrization,
        metric: MetricKind,
        verbose: bool,
    ) -> Self {
        Self {
            n_components,
            neighborhood,
            symmetrization,
            metric,
            verbose,
            embedding_: None,
            eigenvalues_: None,
            all_eigenvalues_: None,
            geodesic_: None,
        }
    }

    /// Fits the model to `x` (points × features).
    ///
    /// Parameters are validated before any distance is computed. Failures
    /// carry an [`IsomapError`] that can be recovered with
    /// `err.downcast_ref::<IsomapError>()`.
    pub fn fit(&mut self, x: ArrayView2<T>) -> anyhow::Result<&mut Self> {
        let start = Instant::now();
        let level = if self.verbose { Level::Info } else { Level::Debug };

        let points = PointSet::new(x).context("invalid input points")?;
        validate_components(self.n_components, points.len())
            .context("invalid target dimension")?;

        let graph = NeighborGraphBuilder::new(self.neighborhood)
            .symmetrization(self.symmetrization)
            .metric(self.metric)
            .build(&points)
            .context("failed to build the neighbor graph")?;
        log!(
            level,
            "ISOMAP: {} points x {} features, {} graph edges",
            points.len(),
            points.dim(),
            graph.edge_count()
        );

        let geodesic = shortest_paths(&graph);
        let result = embed(&geodesic, self.n_components)
            .context("failed to embed the geodesic distances")?;

        log!(
            level,
            "ISOMAP: reduced to {} components in {:.2?}, eigenvalues {:?}",
            self.n_components,
            start.elapsed(),
            result.eigenvalues
        );

        self.embedding_ = Some(result.embedding);
        self.eigenvalues_ = Some(result.eigenvalues);
        self.all_eigenvalues_ = Some(result.all_eigenvalues);
        self.geodesic_ = Some(geodesic);
        Ok(self)
    }

    /// Fits the model and returns a copy of the embedding.
    pub fn fit_transform(&mut self, x: ArrayView2<T>) -> anyhow::Result<Array2<T>> {
        self.fit(x)?;
        Ok(self.embedding()?.clone())
    }

    /// `N × d` coordinates of the fitted points.
    pub fn embedding(&self) -> anyhow::Result<&Array2<T>> {
        self.embedding_
            .as_ref()
            .ok_or_else(|| anyhow!("Model must be fitted first!"))
    }

    /// The `d` selected eigenvalues, descending and before clamping.
    pub fn eigenvalues(&self) -> anyhow::Result<&Array1<T>> {
        self.eigenvalues_
            .as_ref()
            .ok_or_else(|| anyhow!("Model must be fitted first!"))
    }

    pub fn geodesic_distances(&self) -> anyhow::Result<&DistanceMatrix<T>> {
        self.geodesic_
            .as_ref()
            .ok_or_else(|| anyhow!("Model must be fitted first!"))
    }

    /// Share of the positive spectrum captured by each selected component.
    pub fn explained_variance_ratio(&self) -> anyhow::Result<Array1<T>> {
        let selected = self.eigenvalues()?;
        let all = self
            .all_eigenvalues_
            .as_ref()
            .ok_or_else(|| anyhow!("Model must be fitted first!"))?;
        variance_ratio(selected, all)
    }

    /// Residual variance `1 - r²`, where `r` is the correlation between the
    /// geodesic distances and the pairwise distances of the embedding.
    /// Close to zero when the embedding reproduces the manifold distances.
    pub fn residual_variance(&self) -> anyhow::Result<T> {
        residual_variance(self.geodesic_distances()?, self.embedding()?)
    }
}

fn validate_components(n_components: usize, n_points: usize) -> Result<(), IsomapError> {
    if n_components == 0 || n_components >= n_points {
        return Err(IsomapError::invalid(
            Stage::Embedding,
            "d",
            format!(
                "target dimension ({}) must be between 1 and the number of points ({}) minus one",
                n_components, n_points
            ),
        ));
    }
    Ok(())
}

fn variance_ratio<T: FloatOps>(selected: &Array1<T>, all: &Array1<T>) -> anyhow::Result<Array1<T>> {
    let total: T = all.iter().filter(|&&v| v > T::zero()).copied().sum();
    if total <= T::zero() {
        bail!("Spectrum has no positive eigenvalue");
    }
    Ok(selected.mapv(|v| v.max(T::zero()) / total))
}

fn residual_variance<T: FloatOps>(geodesic: &DistanceMatrix<T>, embedding: &Array2<T>) -> anyhow::Result<T> {
    let n = geodesic.n();
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let embedded = Euclidean.distance(embedding.row(i), embedding.row(j));
            pairs.push((geodesic.get(i, j), embedded));
        }
    }
    if pairs.len() < 2 {
        bail!("Residual variance needs at least three points");
    }

    let count = from_count::<T>(pairs.len());
    let mean_a = pairs.iter().map(|&(a, _)| a).sum::<T>() / count;
    let mean_b = pairs.iter().map(|&(_, b)| b).sum::<T>() / count;

    let mut cov = T::zero();
    let mut var_a = T::zero();
    let mut var_b = T::zero();
    for &(a, b) in &pairs {
        let (da, db) = (a - mean_a, b - mean_b);
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denominator = (var_a * var_b).sqrt();
    if !(denominator > T::epsilon()) {
        bail!("Residual variance is undefined for constant distances");
    }
    let r = cov / denominator;
    Ok(T::one() - r * r)
}

/// Builder for [`Isomap`].
///
/// # Example Usage
/// ```ignore
/// let mut isomap = IsomapBuilder::<f64>::new()
///     .n_neighbors(10)
///     .n_components(2)
///     .build();
/// let embedding = isomap.fit_transform(points.view())?;
/// ```
#[derive(Debug)]
pub struct IsomapBuilder<T>
where
    T: FloatOps + RealField,
{
    n_components: usize,
    neighborhood: Neighborhood,
    symmetrization: Symmetrization,
    metric: MetricKind,
    verbose: bool,
    _scalar: PhantomData<T>,
}

impl<T> Default for IsomapBuilder<T>
where
    T: FloatOps + RealField,
{
    fn default() -> Self {
        Self {
            n_components: 2,
            neighborhood: Neighborhood::default(),
            symmetrization: Symmetrization::default(),
            metric: MetricKind::default(),
            verbose: false,
            _scalar: PhantomData,
        }
    }
}

impl<T> IsomapBuilder<T>
where
    T: FloatOps + RealField,
{
    /// Creates a new builder with default parameters.
    ///
    /// Default values:
    /// - `n_components`: 2
    /// - `neighborhood`: 7 nearest neighbors
    /// - `symmetrization`: union
    /// - `metric`: Euclidean
    /// - `verbose`: false
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    /// Uses the `k` nearest neighbors of each point. `k` must be smaller than
    /// the number of points and large enough to keep the graph connected.
    pub fn n_neighbors(mut self, k: usize) -> Self {
        self.neighborhood = Neighborhood::KNearest(k);
        self
    }

    /// Links every pair of points closer than `eps` instead of a fixed count.
    pub fn radius(mut self, eps: f64) -> Self {
        self.neighborhood = Neighborhood::Radius(eps);
        self
    }

    pub fn neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    pub fn symmetrization(mut self, symmetrization: Symmetrization) -> Self {
        self.symmetrization = symmetrization;
        self
    }

    pub fn metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    /// Logs the per-stage summary at `info` instead of `debug`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> Isomap<T> {
        Isomap::new(
            self.n_components,
            self.neighborhood,
            self.symmetrization,
            self.metric,
            self.verbose,
        )
    }
}
