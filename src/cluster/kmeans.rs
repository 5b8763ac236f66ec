//! K-means clustering.
//!
//! Lloyd iterations from k-means++ seeds, restarted `n_init` times; the run
//! with the lowest within-cluster sum of squares wins:
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! Seeded runs are fully deterministic, and ids are renumbered in order of
//! first appearance so equal partitions always carry equal ids.

use ndarray::{Array2, ArrayView1};
use rand::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::traits::{check_shape, Partition};
use crate::error::{Error, Result};

/// K-means with k-means++ initialization.
#[derive(Debug, Clone)]
pub struct Kmeans {
    max_iter: usize,
    n_init: usize,
    tol: f32,
    seed: u64,
}

/// One converged run.
struct Fit {
    labels: Vec<usize>,
    wcss: f32,
}

impl Default for Kmeans {
    fn default() -> Self {
        Self {
            max_iter: 100,
            n_init: 4,
            tol: 1e-4,
            seed: 42,
        }
    }
}

impl Kmeans {
    /// K-means with default iteration limits and seed 42.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum Lloyd iterations per run.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the number of restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn squared_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
    }

    /// Nearest centroid and its squared distance.
    fn nearest(point: ArrayView1<'_, f32>, centroids: &Array2<f32>) -> (usize, f32) {
        centroids
            .rows()
            .into_iter()
            .enumerate()
            .map(|(c, centroid)| (c, Self::squared_distance(point, centroid)))
            .fold((0, f32::MAX), |best, cur| if cur.1 < best.1 { cur } else { best })
    }

    /// k-means++: each new seed drawn proportional to D(x)².
    fn seed_centroids(data: &Array2<f32>, k: usize, rng: &mut StdRng) -> Array2<f32> {
        let n = data.nrows();
        let mut centroids = Array2::zeros((k, data.ncols()));
        centroids.row_mut(0).assign(&data.row(rng.random_range(0..n)));

        let mut d2: Vec<f32> = data
            .rows()
            .into_iter()
            .map(|p| Self::squared_distance(p, centroids.row(0)))
            .collect();

        for c in 1..k {
            let total: f32 = d2.iter().sum();
            let pick = if total <= 0.0 {
                rng.random_range(0..n)
            } else {
                let target = rng.random::<f32>() * total;
                let mut acc = 0.0;
                d2.iter()
                    .position(|&d| {
                        acc += d;
                        acc >= target
                    })
                    .unwrap_or(n - 1)
            };
            centroids.row_mut(c).assign(&data.row(pick));
            for (i, p) in data.rows().into_iter().enumerate() {
                d2[i] = d2[i].min(Self::squared_distance(p, centroids.row(c)));
            }
        }
        centroids
    }

    #[cfg(feature = "parallel")]
    fn assign(data: &Array2<f32>, centroids: &Array2<f32>) -> Vec<(usize, f32)> {
        (0..data.nrows())
            .into_par_iter()
            .map(|i| Self::nearest(data.row(i), centroids))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn assign(data: &Array2<f32>, centroids: &Array2<f32>) -> Vec<(usize, f32)> {
        (0..data.nrows())
            .map(|i| Self::nearest(data.row(i), centroids))
            .collect()
    }

    fn run(&self, data: &Array2<f32>, k: usize, rng: &mut StdRng) -> Fit {
        let (n, d) = data.dim();
        let mut centroids = Self::seed_centroids(data, k, rng);
        let mut nearest = Self::assign(data, &centroids);

        for _ in 0..self.max_iter {
            let mut sums = Array2::<f32>::zeros((k, d));
            let mut counts = vec![0usize; k];
            for (i, &(c, _)) in nearest.iter().enumerate() {
                sums.row_mut(c).scaled_add(1.0, &data.row(i));
                counts[c] += 1;
            }

            for c in 0..k {
                if counts[c] > 0 {
                    sums.row_mut(c).mapv_inplace(|x| x / counts[c] as f32);
                } else {
                    // Re-seed an empty cluster at the worst-fitting point.
                    let far = nearest
                        .iter()
                        .enumerate()
                        .fold((0, f32::MIN), |best, (i, &(_, dist))| {
                            if dist > best.1 {
                                (i, dist)
                            } else {
                                best
                            }
                        })
                        .0;
                    sums.row_mut(c).assign(&data.row(far));
                    nearest[far].1 = 0.0;
                }
            }

            let shift: f32 = centroids
                .iter()
                .zip(sums.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();
            centroids = sums;
            nearest = Self::assign(data, &centroids);

            if shift < self.tol {
                break;
            }
        }

        debug_assert_eq!(nearest.len(), n);
        Fit {
            wcss: nearest.iter().map(|&(_, dist)| dist).sum(),
            labels: nearest.into_iter().map(|(c, _)| c).collect(),
        }
    }
}

/// Renumber ids in order of first appearance.
fn renumber(labels: &[usize]) -> Vec<usize> {
    let mut seen: Vec<usize> = Vec::new();
    labels
        .iter()
        .map(|&l| match seen.iter().position(|&s| s == l) {
            Some(id) => id,
            None => {
                seen.push(l);
                seen.len() - 1
            }
        })
        .collect()
}

impl Partition for Kmeans {
    fn partition(&self, data: &[Vec<f32>], k: usize) -> Result<Vec<usize>> {
        let d = check_shape(data)?;
        let n = data.len();
        if k == 0 || k > n {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: n,
            });
        }

        let flat: Vec<f32> = data.iter().flatten().copied().collect();
        let data = Array2::from_shape_vec((n, d), flat).map_err(|e| Error::Other(e.to_string()))?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let best = (0..self.n_init)
            .map(|_| self.run(&data, k, &mut rng))
            .fold(None::<Fit>, |best, fit| match best {
                Some(b) if b.wcss <= fit.wcss => Some(b),
                _ => Some(fit),
            })
            .ok_or(Error::EmptyInput)?;

        Ok(renumber(&best.labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.1],
        ]
    }

    #[test]
    fn test_kmeans_basic() {
        let labels = Kmeans::new().partition(&two_blobs(), 2).unwrap();
        assert_eq!(labels, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_kmeans_all_points_assigned() {
        let data: Vec<Vec<f32>> = (0..50)
            .map(|i| vec![i as f32 * 0.1, (i % 5) as f32])
            .collect();
        let labels = Kmeans::new().with_seed(123).partition(&data, 5).unwrap();

        assert_eq!(labels.len(), data.len());
        for &label in &labels {
            assert!(label < 5, "label {} out of range", label);
        }
    }

    #[test]
    fn test_kmeans_k_equals_n() {
        let data = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
        let labels = Kmeans::new().partition(&data, 3).unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn test_kmeans_deterministic_with_seed() {
        let data: Vec<Vec<f32>> = (0..30)
            .map(|i| vec![(i * 7 % 11) as f32, (i * 3 % 5) as f32])
            .collect();
        let a = Kmeans::new().with_seed(9).partition(&data, 4).unwrap();
        let b = Kmeans::new().with_seed(9).partition(&data, 4).unwrap();
        assert_eq!(a, b, "same seed should give same result");
    }

    #[test]
    fn test_kmeans_duplicate_points() {
        // All-identical input: every seed collapses, nothing panics.
        let data = vec![vec![1.0, 1.0]; 6];
        let labels = Kmeans::new().partition(&data, 3).unwrap();
        assert_eq!(labels.len(), 6);
    }

    #[test]
    fn test_kmeans_errors() {
        assert!(Kmeans::new().partition(&[], 2).is_err());
        assert!(Kmeans::new().partition(&two_blobs(), 5).is_err());
        assert!(Kmeans::new().partition(&two_blobs(), 0).is_err());
    }

    #[test]
    fn test_renumber_first_seen() {
        assert_eq!(renumber(&[3, 3, 1, 0, 1]), vec![0, 0, 1, 2, 1]);
    }
}
