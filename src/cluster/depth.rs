//! Depth → cluster count adapter.

use std::fmt;

use tracing::debug;

use super::{Agglomerative, Kmeans, Metric, Partition};
use crate::collab::Clusterer;
use crate::config::{ClusterConfig, ClusterMethod};
use crate::error::{Error, Result};

/// Clusters at depth `d` into `min(d, n)` groups.
pub struct DepthClusterer {
    backend: Box<dyn Partition>,
}

impl fmt::Debug for DepthClusterer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepthClusterer").finish_non_exhaustive()
    }
}

impl Default for DepthClusterer {
    fn default() -> Self {
        Self::new(Agglomerative::new().with_metric(Metric::Cosine))
    }
}

impl DepthClusterer {
    /// Wrap a backend.
    pub fn new(backend: impl Partition + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Backend chosen by configuration.
    pub fn from_config(config: &ClusterConfig) -> Self {
        match config.method {
            ClusterMethod::Agglomerative => Self::new(
                Agglomerative::new()
                    .with_linkage(config.linkage)
                    .with_metric(Metric::Cosine),
            ),
            ClusterMethod::Kmeans => Self::new(
                Kmeans::new()
                    .with_seed(config.seed)
                    .with_max_iter(config.max_iter)
                    .with_n_init(config.n_init),
            ),
        }
    }
}

impl Clusterer for DepthClusterer {
    fn cluster(&self, vectors: &[Vec<f32>], depth: usize) -> Result<Vec<usize>> {
        if depth == 0 {
            return Err(Error::invalid("depth", "depth must be at least 1"));
        }
        let k = depth.min(vectors.len());
        debug!(depth, k, n = vectors.len(), "clustering");
        self.backend.partition(vectors, k)
    }
}
