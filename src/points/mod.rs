//! # Point sets
//!
//! Read-only view over the input cloud. Rows are points, columns are the
//! coordinates in the ambient space. Loading points from disk is left to the
//! caller; this type only checks the invariants the pipeline relies on.

use crate::error::{IsomapError, Stage};
use crate::utils::FloatOps;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// A validated, borrowed cloud of `N` points of dimension `D`.
#[derive(Debug, Clone, Copy)]
pub struct PointSet<'a, T: FloatOps> {
    data: ArrayView2<'a, T>,
}

impl<'a, T: FloatOps> PointSet<'a, T> {
    /// Wraps an `N × D` view.
    ///
    /// # Errors
    /// `InvalidParameter` when the view holds no points, has zero columns or
    /// contains a non-finite coordinate.
    pub fn new(data: ArrayView2<'a, T>) -> Result<Self, IsomapError> {
        let (n_points, n_dims) = data.dim();
        if n_points == 0 {
            return Err(IsomapError::invalid(Stage::Input, "points", "point set is empty"));
        }
        if n_dims == 0 {
            return Err(IsomapError::invalid(
                Stage::Input,
                "points",
                "points must have at least one coordinate",
            ));
        }
        if let Some(((row, col), _)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(IsomapError::invalid(
                Stage::Input,
                "points",
                format!("coordinate {} of point {} is not finite", col, row),
            ));
        }
        Ok(PointSet { data })
    }

    /// Number of points `N`.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Never true for a set built with [`PointSet::new`].
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Ambient dimension `D`.
    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn point(&self, i: usize) -> ArrayView1<'a, T> {
        self.data.index_axis_move(Axis(0), i)
    }

    pub fn view(&self) -> ArrayView2<'a, T> {
        self.data
    }
}

/// Packs row vectors into an `N × D` array, checking that every point has the
/// same length.
pub fn points_from_rows<T: FloatOps>(rows: &[Vec<T>]) -> Result<Array2<T>, IsomapError> {
    let first = rows
        .first()
        .ok_or_else(|| IsomapError::invalid(Stage::Input, "points", "point set is empty"))?;
    let n_dims = first.len();

    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_dims) {
        return Err(IsomapError::invalid(
            Stage::Input,
            "points",
            format!(
                "point {} has {} coordinates, expected {}",
                idx,
                row.len(),
                n_dims
            ),
        ));
    }

    let flat: Vec<T> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Ok(Array2::from_shape_vec((rows.len(), n_dims), flat)?)
}
