//! Agglomerative clustering.
//!
//! Bottom-up: every document starts as its own cluster and the two closest
//! clusters are merged until one remains. The merge history is cut to the
//! requested number of clusters, so one fit answers every depth.
//!
//! | Linkage | Distance between clusters |
//! |---------|---------------------------|
//! | Single | min(d(a,b)) for a∈A, b∈B |
//! | Complete | max(d(a,b)) |
//! | Average | mean(d(a,b)) |
//! | Ward | increase in within-cluster variance |
//!
//! Pairwise dissimilarities are Euclidean or cosine; cosine suits normalized
//! text embeddings, where zero vectors (empty documents) are at distance 1
//! from everything but each other.

use kodama::{linkage as kodama_linkage, Method as KodamaMethod};
use serde::{Deserialize, Serialize};

use super::dendrogram::Dendrogram;
use super::traits::{check_shape, Partition};
use crate::error::Result;

/// Linkage method for agglomerative clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Minimum distance between clusters.
    Single,
    /// Maximum distance between clusters.
    Complete,
    /// Mean distance between clusters.
    #[default]
    Average,
    /// Minimize within-cluster variance.
    Ward,
}

/// Pairwise dissimilarity between points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Straight-line distance.
    #[default]
    Euclidean,
    /// `1 - cos(a, b)`.
    Cosine,
}

/// Agglomerative clustering backed by `kodama`.
#[derive(Debug, Clone, Default)]
pub struct Agglomerative {
    linkage: Linkage,
    metric: Metric,
}

impl Agglomerative {
    /// Average linkage over Euclidean distance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set linkage method.
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Set dissimilarity.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Fit and return the full merge history.
    pub fn fit_dendrogram(&self, data: &[Vec<f32>]) -> Result<Dendrogram> {
        check_shape(data)?;
        let n = data.len();
        let mut dendro = Dendrogram::new(n);
        if n == 1 {
            return Ok(dendro);
        }

        // Condensed upper triangle, row-major, N-choose-2 entries.
        let mut condensed = Vec::with_capacity((n * (n - 1)) / 2);
        for row in 0..(n - 1) {
            for col in (row + 1)..n {
                condensed.push(self.distance(&data[row], &data[col]));
            }
        }

        let method = match self.linkage {
            Linkage::Single => KodamaMethod::Single,
            Linkage::Complete => KodamaMethod::Complete,
            Linkage::Average => KodamaMethod::Average,
            Linkage::Ward => KodamaMethod::Ward,
        };

        // kodama labels leaves 0..n-1 and merge i as n+i.
        let steps = kodama_linkage(&mut condensed, n, method);
        for step in steps.steps() {
            dendro.add_merge(step.cluster1, step.cluster2, step.dissimilarity, step.size);
        }
        Ok(dendro)
    }

    fn distance(&self, a: &[f32], b: &[f32]) -> f64 {
        match self.metric {
            Metric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| {
                    let d = f64::from(*x) - f64::from(*y);
                    d * d
                })
                .sum::<f64>()
                .sqrt(),
            Metric::Cosine => {
                let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
                for (x, y) in a.iter().zip(b) {
                    let (x, y) = (f64::from(*x), f64::from(*y));
                    dot += x * y;
                    na += x * x;
                    nb += y * y;
                }
                if na == 0.0 && nb == 0.0 {
                    0.0
                } else if na == 0.0 || nb == 0.0 {
                    1.0
                } else {
                    (1.0 - dot / (na.sqrt() * nb.sqrt())).max(0.0)
                }
            }
        }
    }
}

impl Partition for Agglomerative {
    fn partition(&self, data: &[Vec<f32>], k: usize) -> Result<Vec<usize>> {
        self.fit_dendrogram(data)?.cut_to_k(k)
    }
}
