use std::fmt::Debug;
use std::iter::Sum;
use std::ops::AddAssign;

use num_traits::{Float, FromPrimitive, ToPrimitive};

/// Scalar type accepted by every stage of the pipeline (`f32` and `f64`).
pub trait FloatOps:
    Float + FromPrimitive + ToPrimitive + AddAssign + Sum + Send + Sync + Debug + Default + 'static
{
}

impl<T> FloatOps for T where
    T: Float + FromPrimitive + ToPrimitive + AddAssign + Sum + Send + Sync + Debug + Default + 'static
{
}

/// Converts a count into the scalar type. Counts handled here are matrix
/// dimensions, which every float type represents.
pub(crate) fn from_count<T: FloatOps>(count: usize) -> T {
    T::from_usize(count).unwrap_or_else(T::max_value)
}

#[cfg(test)]
pub(crate) fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_count() {
        assert_eq!(from_count::<f64>(0), 0.0);
        assert_eq!(from_count::<f64>(12), 12.0);
        assert_eq!(from_count::<f32>(3), 3.0f32);
    }
}
