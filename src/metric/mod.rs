use ndarray::ArrayView1;

use crate::utils::FloatOps;

/// Base metric used to measure distances between points in the ambient space.
pub trait Metric: Send + Sync {
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl Metric for Euclidean {
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T {
        let mut squared_dist = T::zero();
        for (&x, &y) in a.iter().zip(b.iter()) {
            let diff = x - y;
            squared_dist += diff * diff;
        }
        squared_dist.sqrt()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manhattan;

impl Metric for Manhattan {
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y).abs())
            .sum()
    }
}

/// Runtime selection of the base metric, used by the pipeline configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetricKind {
    #[default]
    Euclidean,
    Manhattan,
}

impl Metric for MetricKind {
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T {
        match self {
            MetricKind::Euclidean => Euclidean.distance(a, b),
            MetricKind::Manhattan => Manhattan.distance(a, b),
        }
    }
}
