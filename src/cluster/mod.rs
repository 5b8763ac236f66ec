//! Clustering backends for the depth loop.
//!
//! The refinement loop asks for a partition "at depth `d`". Here a depth is
//! simply a cluster count: [`DepthClusterer`] requests `min(d, n)` clusters
//! from a [`Partition`] backend, so deeper tiers are finer.
//!
//! ## Backends
//!
//! - [`Agglomerative`]: bottom-up merges (kodama), dendrogram cut to `k`.
//!   Deterministic; one linkage per run.
//! - [`Kmeans`]: Lloyd iterations from k-means++ seeds, best of several
//!   seeded restarts.
//!
//! ```rust
//! use tierlabel::cluster::{Agglomerative, Partition};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Agglomerative::new().partition(&data, 2).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod dendrogram;
mod depth;
mod hierarchical;
mod kmeans;
mod traits;

pub use dendrogram::{Dendrogram, Merge};
pub use depth::DepthClusterer;
pub use hierarchical::{Agglomerative, Linkage, Metric};
pub use kmeans::Kmeans;
pub use traits::Partition;
