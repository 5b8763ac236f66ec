//! Depth-iteration controller.
//!
//! Drives the coarse-to-fine loop:
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │
//! working ─► embed ─► cluster(depth) ─► k clusters          │
//!                                        │                  │
//!                   k == previous k? ────┤                  │
//!                    yes │               │ no               │
//!                        ▼               ▼                  │
//!               copy previous tier   label groups ─► tier   │
//!                                        │                  │
//!                                        └─► merge labels ──┘
//!                                            into working
//! ```
//!
//! The working list starts as the normalized documents. After each
//! recomputed tier, every document whose new label is non-empty is replaced
//! by that label, so the next depth clusters the labels of the previous one.
//! Documents whose cluster found no confident label keep their prior text.
//!
//! The working list is threaded through the loop as a value: each depth
//! consumes the previous [`Progress`] and produces a new one.

use tracing::{debug, info, instrument, trace, warn};

use crate::collab::{Clusterer, Embedder, Identity, Normalizer};
use crate::config::DepthSchedule;
use crate::error::{Error, Result};
use crate::group;
use crate::select::Cascade;
use crate::table::{LabelTable, Tier};

/// Loop state carried from one depth to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Strings clustered at the next depth.
    pub working: Vec<String>,
    /// Distinct clusters at the last recomputed depth.
    pub previous_clusters: usize,
    /// Tiers recorded so far.
    pub tiers: Vec<Tier>,
}

impl Progress {
    /// Initial state: working list = targets, every target its own cluster.
    pub fn start(targets: Vec<String>) -> Self {
        Self {
            previous_clusters: targets.len(),
            working: targets,
            tiers: Vec::new(),
        }
    }
}

/// Builds multi-depth label tiers for a corpus.
pub struct Refiner<'a> {
    cascade: Cascade,
    schedule: DepthSchedule,
    normalizer: &'a dyn Normalizer,
    embedder: &'a dyn Embedder,
    clusterer: &'a dyn Clusterer,
}

impl<'a> Refiner<'a> {
    /// Refiner over the given collaborators. Documents are used as-is unless a
    /// normalizer is attached.
    pub fn new(
        cascade: Cascade,
        schedule: DepthSchedule,
        embedder: &'a dyn Embedder,
        clusterer: &'a dyn Clusterer,
    ) -> Result<Self> {
        schedule.validate()?;
        Ok(Self {
            cascade,
            schedule,
            normalizer: &Identity,
            embedder,
            clusterer,
        })
    }

    /// Clean and parse documents before the first depth.
    pub fn with_normalizer(mut self, normalizer: &'a dyn Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Run every depth and assemble the table.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn run(&self, documents: &[String]) -> Result<LabelTable> {
        let targets = self.normalizer.normalize(documents)?;
        check_len("normalizer", documents.len(), targets.len())?;

        let mut progress = Progress::start(targets);
        for depth in self.schedule.depths() {
            progress = self.advance(progress, depth)?;
        }

        LabelTable::new(documents.to_vec(), progress.tiers)
    }

    /// Process one depth.
    pub fn advance(&self, progress: Progress, depth: usize) -> Result<Progress> {
        let Progress {
            working,
            previous_clusters,
            mut tiers,
        } = progress;

        if working.is_empty() {
            tiers.push(Tier {
                depth,
                clusters: 0,
                reused: false,
                labels: Vec::new(),
            });
            return Ok(Progress {
                working,
                previous_clusters,
                tiers,
            });
        }

        let vectors = self.embedder.embed(&working)?;
        check_len("embedder", working.len(), vectors.len())?;
        let ids = self.clusterer.cluster(&vectors, depth)?;
        check_len("clusterer", working.len(), ids.len())?;

        let clusters = distinct(&ids);

        if clusters == previous_clusters {
            if let Some(last) = tiers.last() {
                info!(depth, clusters, "no refinement, reusing previous tier");
                let reused = Tier {
                    depth,
                    clusters,
                    reused: true,
                    labels: last.labels.clone(),
                };
                tiers.push(reused);
                return Ok(Progress {
                    working,
                    previous_clusters,
                    tiers,
                });
            }
            warn!(
                depth,
                clusters, "first depth kept every document separate; labelling anyway"
            );
        }

        let labels = group::select(&working, &ids, &self.cascade)?;
        let named = labels.iter().filter(|l| !l.is_empty()).count();
        info!(depth, clusters, named, "labelled tier");

        let working = merge_labels(&working, &labels);
        debug!(depth, replaced = named, "working list updated");
        trace!(depth, ?working, "working list");
        tiers.push(Tier {
            depth,
            clusters,
            reused: false,
            labels,
        });
        Ok(Progress {
            working,
            previous_clusters: clusters,
            tiers,
        })
    }
}

/// Replace each working entry by its new label, unless the label is empty.
pub fn merge_labels(working: &[String], labels: &[String]) -> Vec<String> {
    working
        .iter()
        .zip(labels)
        .map(|(prior, label)| {
            if label.is_empty() {
                prior.clone()
            } else {
                label.clone()
            }
        })
        .collect()
}

fn distinct(ids: &[usize]) -> usize {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn check_len(stage: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            stage,
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{FnClusterer, FnEmbedder};
    use std::sync::{Arc, Mutex};

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_keeps_prior_on_empty_label() {
        let working = strings(&["a b", "c d", "e"]);
        let labels = strings(&["x", "", "y"]);
        assert_eq!(merge_labels(&working, &labels), strings(&["x", "c d", "y"]));
    }

    #[test]
    fn test_merge_all_empty_is_noop() {
        let working = strings(&["a", "b"]);
        assert_eq!(merge_labels(&working, &strings(&["", ""])), working);
    }

    #[test]
    fn test_distinct() {
        assert_eq!(distinct(&[4, 1, 4, 9]), 3);
        assert_eq!(distinct(&[]), 0);
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_debug_log_omits_working_list() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let embedder = FnEmbedder::new(|texts: &[String]| {
            Ok::<_, Error>(texts.iter().map(|_| vec![0.0]).collect())
        });
        let clusterer =
            FnClusterer::new(|vectors: &[Vec<f32>], _depth: usize| Ok::<_, Error>(vec![0; vectors.len()]));
        let refiner = Refiner::new(
            Cascade::default(),
            DepthSchedule::new(1, 1, 1),
            &embedder,
            &clusterer,
        )
        .unwrap();
        let documents = strings(&["zanzibar ferry", "zanzibar ferry"]);

        tracing::subscriber::with_default(subscriber, || refiner.run(&documents).unwrap());

        let log = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(log.contains("working list updated"));
        assert!(!log.contains("working="), "working list dumped at debug level");
    }

    #[test]
    fn test_progress_start() {
        let p = Progress::start(strings(&["a", "b", "c"]));
        assert_eq!(p.previous_clusters, 3);
        assert!(p.tiers.is_empty());
    }
}
