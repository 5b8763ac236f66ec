//! Clustering traits.

use crate::error::Result;

/// A flat partitioning algorithm with the cluster count chosen per call.
pub trait Partition: Send + Sync {
    /// Assign each point to one of at most `k` clusters.
    ///
    /// Returns one id per input point, contiguous from 0.
    fn partition(&self, data: &[Vec<f32>], k: usize) -> Result<Vec<usize>>;
}

/// Check that `data` is non-empty and rectangular; return its dimension.
pub(crate) fn check_shape(data: &[Vec<f32>]) -> Result<usize> {
    let first = data.first().ok_or(crate::error::Error::EmptyInput)?;
    let d = first.len();
    if let Some(p) = data.iter().find(|p| p.len() != d) {
        return Err(crate::error::Error::DimensionMismatch {
            expected: d,
            found: p.len(),
        });
    }
    Ok(d)
}
