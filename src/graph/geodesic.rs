use log::{debug, trace};
use ndarray::Axis;
use rayon::prelude::*;

use crate::graph::DistanceMatrix;
use crate::utils::FloatOps;

/// All-pairs shortest path distances over a weighted graph (Floyd–Warshall).
///
/// The intermediate vertex `k` is the outer loop and runs strictly in order,
/// pass `k + 1` sees every update of pass `k`. Inside one pass the rows are
/// relaxed in parallel. Row `k` is copied before the pass; with a zero
/// diagonal neither row `k` nor column `k` can change during pass `k`, so the
/// copy is exact.
///
/// Pairs that are not connected keep their `+∞` distance. Detecting them is
/// left to the caller.
pub fn shortest_paths<T: FloatOps>(graph: &DistanceMatrix<T>) -> DistanceMatrix<T> {
    let n = graph.n();
    let mut dist = graph.view().to_owned();

    for k in 0..n {
        let via_k = dist.row(k).to_owned();
        dist.axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                let d_ik = row[k];
                if d_ik.is_infinite() {
                    return;
                }
                for (d_ij, &d_kj) in row.iter_mut().zip(via_k.iter()) {
                    let through_k = d_ik + d_kj;
                    if through_k < *d_ij {
                        *d_ij = through_k;
                    }
                }
            });
        trace!("Relaxation pass {}/{} done", k + 1, n);
    }

    let geodesic = DistanceMatrix::from_array(dist);
    debug!(
        "Geodesic distances: {} points, {} unreachable pairs",
        n,
        geodesic.unreachable_pairs()
    );
    geodesic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_neighbor_graph;
    use crate::points::PointSet;
    use crate::utils::init_test_logger;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const INF: f64 = f64::INFINITY;

    fn random_points(n: usize, dims: usize, seed: u64) -> Array2<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Array2::from_shape_fn((n, dims), |_| rng.random_range(-1.0..1.0))
    }

    /// Plain triple loop, used as the reference for the parallel version.
    fn reference_floyd_warshall(graph: &DistanceMatrix<f64>) -> Array2<f64> {
        let mut dist = graph.view().to_owned();
        let n = dist.nrows();
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    if dist[[i, k]] + dist[[k, j]] < dist[[i, j]] {
                        dist[[i, j]] = dist[[i, k]] + dist[[k, j]];
                    }
                }
            }
        }
        dist
    }

    #[test]
    fn test_path_graph() {
        let graph = DistanceMatrix::new(array![
            [0.0, 1.0, INF, INF],
            [1.0, 0.0, 2.0, INF],
            [INF, 2.0, 0.0, 0.5],
            [INF, INF, 0.5, 0.0],
        ])
        .unwrap();
        let geodesic = shortest_paths(&graph);

        assert_eq!(geodesic.get(0, 2), 3.0);
        assert_eq!(geodesic.get(0, 3), 3.5);
        assert_eq!(geodesic.get(3, 0), 3.5);
        assert_eq!(geodesic.get(1, 3), 2.5);
        for i in 0..4 {
            assert_eq!(geodesic.get(i, i), 0.0);
        }
        assert!(geodesic.is_fully_finite());
    }

    #[test]
    fn test_unit_square_goes_around_the_sides() {
        let data = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let points = PointSet::new(data.view()).unwrap();
        let geodesic = shortest_paths(&build_neighbor_graph(&points, 2).unwrap());

        assert_eq!(geodesic.get(0, 1), 1.0);
        assert_eq!(geodesic.get(2, 3), 1.0);
        // no diagonal edge, the shortest path runs along two sides
        assert_eq!(geodesic.get(0, 2), 2.0);
        assert_eq!(geodesic.get(1, 3), 2.0);
        assert_eq!(geodesic.get(2, 2), 0.0);
    }

    #[test]
    fn test_disconnected_keeps_infinity() {
        let graph = DistanceMatrix::new(array![
            [0.0, 1.0, INF, INF],
            [1.0, 0.0, INF, INF],
            [INF, INF, 0.0, 2.0],
            [INF, INF, 2.0, 0.0],
        ])
        .unwrap();
        let geodesic = shortest_paths(&graph);
        assert_eq!(geodesic, graph);
        assert_eq!(geodesic.unreachable_pairs(), 4);
    }

    #[test]
    fn test_matches_sequential_reference() {
        init_test_logger();
        let data = random_points(60, 4, 11);
        let points = PointSet::new(data.view()).unwrap();
        let graph = build_neighbor_graph(&points, 4).unwrap();

        let expected = reference_floyd_warshall(&graph);
        let geodesic = shortest_paths(&graph);
        for ((i, j), &v) in expected.indexed_iter() {
            assert_eq!(geodesic.get(i, j), v, "mismatch at ({}, {})", i, j);
        }
    }

    #[test]
    fn test_triangle_inequality_and_monotonicity() {
        let data = random_points(30, 3, 5);
        let points = PointSet::new(data.view()).unwrap();
        let graph = build_neighbor_graph(&points, 3).unwrap();
        let geodesic = shortest_paths(&graph);
        let n = geodesic.n();

        assert!(geodesic.is_symmetric(1e-12));
        for i in 0..n {
            assert_eq!(geodesic.get(i, i), 0.0);
            for j in 0..n {
                assert!(geodesic.get(i, j) <= graph.get(i, j));
                for k in 0..n {
                    assert!(
                        geodesic.get(i, j) <= geodesic.get(i, k) + geodesic.get(k, j) + 1e-12,
                        "triangle inequality violated for ({}, {}, {})",
                        i,
                        j,
                        k
                    );
                }
            }
        }
    }

    #[test]
    fn test_complete_graph_is_finite_and_euclidean() {
        let data = random_points(15, 6, 9);
        let points = PointSet::new(data.view()).unwrap();
        let graph = build_neighbor_graph(&points, 14).unwrap();
        let geodesic = shortest_paths(&graph);

        assert!(geodesic.is_fully_finite());
        assert_eq!(geodesic.connected_components(), 1);
        for i in 0..15 {
            for j in 0..15 {
                assert_abs_diff_eq!(geodesic.get(i, j), graph.get(i, j), epsilon = 1e-12);
            }
        }
    }
}
