use std::fmt;

use thiserror::Error;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    NeighborGraph,
    Geodesic,
    Embedding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::NeighborGraph => "neighbor graph",
            Stage::Geodesic => "geodesic distances",
            Stage::Embedding => "spectral embedding",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while computing an ISOMAP embedding.
///
/// None of these are transient: the computation is deterministic, so the
/// caller has to change the data or the parameters before trying again.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IsomapError {
    /// A parameter or the input data violates a precondition.
    #[error("invalid parameter `{name}` ({stage}): {reason}")]
    InvalidParameter {
        stage: Stage,
        name: &'static str,
        reason: String,
    },

    /// The geodesic matrix still contains unreachable pairs, i.e. the
    /// neighbor graph has more than one connected component.
    #[error(
        "neighbor graph is disconnected: {unreachable_pairs} unreachable pairs across \
         {components} components, increase the neighborhood size"
    )]
    DisconnectedGraph {
        unreachable_pairs: usize,
        components: usize,
    },

    /// Every selected eigenvalue is zero after clamping, the data does not
    /// support the requested number of dimensions.
    #[error("no positive eigenvalue among the top {requested} components")]
    DegenerateEmbedding { requested: usize },

    /// The symmetric eigensolver failed to converge.
    #[error("symmetric eigendecomposition of a {size}x{size} matrix did not converge")]
    EigenSolver { size: usize },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl IsomapError {
    pub(crate) fn invalid(stage: Stage, name: &'static str, reason: impl Into<String>) -> Self {
        IsomapError::InvalidParameter {
            stage,
            name,
            reason: reason.into(),
        }
    }

    /// Stage the error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            IsomapError::InvalidParameter { stage, .. } => *stage,
            IsomapError::DisconnectedGraph { .. }
            | IsomapError::DegenerateEmbedding { .. }
            | IsomapError::EigenSolver { .. } => Stage::Embedding,
            IsomapError::Shape(_) => Stage::Input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = IsomapError::invalid(Stage::NeighborGraph, "k", "k (5) must be smaller than N (5)");
        assert_eq!(err.stage(), Stage::NeighborGraph);
        let msg = err.to_string();
        assert!(msg.contains("`k`"));
        assert!(msg.contains("neighbor graph"));

        let err = IsomapError::DisconnectedGraph {
            unreachable_pairs: 9,
            components: 2,
        };
        assert!(err.to_string().contains("9 unreachable pairs"));
        assert_eq!(err.stage(), Stage::Embedding);
    }
}
