//! Merge history of agglomerative clustering.
//!
//! Leaves are numbered `0..n`; merge `i` creates cluster `n + i`. Cutting the
//! history after `n - k` merges yields exactly `k` flat clusters, which is how
//! a depth value becomes a partition.

use crate::error::{Error, Result};

/// A dendrogram: `n - 1` (or fewer) binary merges over `n` leaves.
#[derive(Debug, Clone)]
pub struct Dendrogram {
    merges: Vec<Merge>,
    n_items: usize,
}

/// A single merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// First cluster merged.
    pub cluster_a: usize,
    /// Second cluster merged.
    pub cluster_b: usize,
    /// Dissimilarity at which the merge happened.
    pub distance: f64,
    /// Leaves in the merged cluster.
    pub size: usize,
}

impl Dendrogram {
    /// Empty history over `n_items` leaves.
    pub fn new(n_items: usize) -> Self {
        Self {
            merges: Vec::with_capacity(n_items.saturating_sub(1)),
            n_items,
        }
    }

    /// Append a merge.
    pub fn add_merge(&mut self, cluster_a: usize, cluster_b: usize, distance: f64, size: usize) {
        self.merges.push(Merge {
            cluster_a,
            cluster_b,
            distance,
            size,
        });
    }

    /// Flat assignment with exactly `k` clusters (capped to `1..=n`).
    ///
    /// Ids are contiguous and numbered in order of first appearance.
    pub fn cut_to_k(&self, k: usize) -> Result<Vec<usize>> {
        if k == 0 {
            return Err(Error::InvalidClusterCount {
                requested: 0,
                n_items: self.n_items,
            });
        }
        let k = k.min(self.n_items);
        let n_merges = self.n_items - k;
        if n_merges > self.merges.len() {
            return Err(Error::Other(format!(
                "dendrogram has {} merges, {} needed for {} clusters",
                self.merges.len(),
                n_merges,
                k
            )));
        }
        self.apply(self.merges.iter().take(n_merges))
    }

    fn apply<'a>(&self, merges: impl Iterator<Item = &'a Merge>) -> Result<Vec<usize>> {
        let n = self.n_items;
        let mut parent: Vec<usize> = (0..n + self.merges.len()).collect();

        for (i, merge) in merges.enumerate() {
            let node = n + i;
            for child in [merge.cluster_a, merge.cluster_b] {
                if child >= node {
                    return Err(Error::Other(format!(
                        "merge {i} references cluster {child} before it exists"
                    )));
                }
                let root = find(&mut parent, child);
                parent[root] = node;
            }
        }

        let mut ids = Vec::with_capacity(n);
        let mut seen: Vec<usize> = Vec::new();
        for leaf in 0..n {
            let root = find(&mut parent, leaf);
            let id = match seen.iter().position(|&r| r == root) {
                Some(id) => id,
                None => {
                    seen.push(root);
                    seen.len() - 1
                }
            };
            ids.push(id);
        }
        Ok(ids)
    }

    /// Number of leaves.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_leaves() -> Dendrogram {
        //         6
        //        / \
        //       4   5
        //      / \ / \
        //     0  1 2  3
        let mut d = Dendrogram::new(4);
        d.add_merge(0, 1, 0.5, 2);
        d.add_merge(2, 3, 0.7, 2);
        d.add_merge(4, 5, 1.0, 4);
        d
    }

    #[test]
    fn test_dendrogram_creation() {
        let d = Dendrogram::new(5);
        assert_eq!(d.n_items(), 5);
        assert_eq!(d.n_merges(), 0);
    }

    #[test]
    fn test_cut_to_k() {
        let d = four_leaves();
        assert_eq!(d.cut_to_k(4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(d.cut_to_k(3).unwrap(), vec![0, 0, 1, 2]);
        assert_eq!(d.cut_to_k(2).unwrap(), vec![0, 0, 1, 1]);
        assert_eq!(d.cut_to_k(1).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_cut_to_k_caps_at_leaf_count() {
        assert_eq!(four_leaves().cut_to_k(10).unwrap(), vec![0, 1, 2, 3]);
        assert!(four_leaves().cut_to_k(0).is_err());
    }

    #[test]
    fn test_incomplete_history_rejected() {
        let mut d = Dendrogram::new(3);
        d.add_merge(0, 1, 0.1, 2);
        assert!(d.cut_to_k(1).is_err());
        assert_eq!(d.cut_to_k(2).unwrap(), vec![0, 0, 1]);
    }
}
