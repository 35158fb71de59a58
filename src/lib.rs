pub mod dimred;
pub mod graph;
pub mod metric;
pub mod points;
mod error;
mod utils;

pub use dimred::isomap::{isomap, Isomap, IsomapBuilder};
pub use error::{IsomapError, Stage};
pub use graph::DistanceMatrix;
pub use points::PointSet;
pub use utils::FloatOps;
