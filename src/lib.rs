//! # tierlabel
//!
//! Multi-resolution label hierarchies for short documents.
//!
//! Documents are clustered at a schedule of increasing depths. Each cluster is
//! named by a selection cascade (edit distance, word n-grams, character
//! n-grams, common hypernyms), and the labels of one depth become the input of
//! the next. The result is a [`LabelTable`]: one row per document, one column
//! per depth.
//!
//! ```rust
//! use tierlabel::collab::{FnClusterer, FnEmbedder};
//! use tierlabel::{Cascade, DepthSchedule, Refiner};
//!
//! let docs: Vec<String> = ["paris", "paris", "the cat sat", "the cat sat"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! // One dimension: the string length.
//! let embedder = FnEmbedder::new(|texts: &[String]| {
//!     Ok::<_, tierlabel::Error>(texts.iter().map(|t| vec![t.len() as f32]).collect())
//! });
//! // Split by length, whatever the depth.
//! let clusterer = FnClusterer::new(|vectors: &[Vec<f32>], _depth: usize| {
//!     Ok::<_, tierlabel::Error>(vectors.iter().map(|v| usize::from(v[0] > 5.0)).collect())
//! });
//!
//! let refiner = Refiner::new(
//!     Cascade::default(),
//!     DepthSchedule::new(2, 2, 1),
//!     &embedder,
//!     &clusterer,
//! )?;
//! let table = refiner.run(&docs)?;
//! assert_eq!(table.current_labels(), ["paris", "paris", "the cat sat", "the cat sat"]);
//! # Ok::<(), tierlabel::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`select`]: the four scorers and the [`Cascade`] that picks one label per group.
//! - [`group`]: split documents by cluster id and broadcast group labels.
//! - [`refine`]: the depth loop.
//! - [`collab`]: normalizer / embedder / clusterer seams with default implementations.
//! - [`cluster`]: agglomerative and k-means backends.
//! - [`table`]: output assembly (TSV, JSON).

pub mod cluster;
pub mod collab;
pub mod config;
/// Error types used across `tierlabel`.
pub mod error;
pub mod group;
pub mod refine;
pub mod select;
pub mod table;

pub use config::{
    CharGramRange, ClusterConfig, ClusterMethod, DepthSchedule, EmbeddingConfig, RunConfig,
    Thresholds,
};
pub use error::{Error, Result};
pub use refine::{merge_labels, Refiner};
pub use select::{Cascade, Decision, Strategy};
pub use table::{LabelTable, Tier};
