//! Cluster grouping: split documents by cluster id and label each group.
//!
//! Groups are visited in ascending cluster-id order; members keep their
//! original relative order. Labels are keyed by the cluster id itself, so the
//! clusterer may hand out sparse, zero-based, or one-based ids.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};
use crate::select::Cascade;

/// Documents sharing one cluster id at one depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'a> {
    /// Cluster id.
    pub id: usize,
    /// Members in document order.
    pub members: Vec<&'a str>,
}

/// Split `documents` into one group per distinct cluster id, ascending.
///
/// Groups are produced lazily.
pub fn build<'a, S: AsRef<str>>(
    documents: &'a [S],
    cluster_ids: &'a [usize],
) -> Result<impl Iterator<Item = Group<'a>> + 'a> {
    if documents.len() != cluster_ids.len() {
        return Err(Error::LengthMismatch {
            stage: "cluster assignment",
            expected: documents.len(),
            found: cluster_ids.len(),
        });
    }

    let ids: BTreeSet<usize> = cluster_ids.iter().copied().collect();
    Ok(ids.into_iter().map(move |id| Group {
        id,
        members: documents
            .iter()
            .zip(cluster_ids)
            .filter(|(_, &c)| c == id)
            .map(|(d, _)| d.as_ref())
            .collect(),
    }))
}

/// One label per document: the label of the document's own group.
pub fn select<S: AsRef<str>>(
    documents: &[S],
    cluster_ids: &[usize],
    cascade: &Cascade,
) -> Result<Vec<String>> {
    let groups: Vec<Group<'_>> = build(documents, cluster_ids)?.collect();

    #[cfg(feature = "parallel")]
    let labels: BTreeMap<usize, String> = groups
        .par_iter()
        .map(|g| label_group(g, cascade).map(|label| (g.id, label)))
        .collect::<Result<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let labels: BTreeMap<usize, String> = groups
        .iter()
        .map(|g| label_group(g, cascade).map(|label| (g.id, label)))
        .collect::<Result<_>>()?;

    cluster_ids
        .iter()
        .map(|&id| {
            labels
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::UnknownCluster { id })
        })
        .collect()
}

fn label_group(group: &Group<'_>, cascade: &Cascade) -> Result<String> {
    let decision = cascade.decide(&group.members)?;
    debug!(
        cluster = group.id,
        size = group.members.len(),
        strategy = %decision.strategy,
        label = %decision.label,
        "labelled group"
    );
    Ok(decision.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_sorted_ids_stable_members() {
        let docs = ["a", "b", "c", "d", "e"];
        let ids = [7, 2, 7, 0, 2];
        let groups: Vec<Group<'_>> = build(&docs, &ids).unwrap().collect();

        assert_eq!(
            groups,
            vec![
                Group { id: 0, members: vec!["d"] },
                Group { id: 2, members: vec!["b", "e"] },
                Group { id: 7, members: vec!["a", "c"] },
            ]
        );
    }

    #[test]
    fn test_build_length_mismatch() {
        let docs = ["a", "b"];
        assert!(matches!(
            build(&docs, &[0]),
            Err(Error::LengthMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_select_broadcasts_group_label() {
        let docs = ["paris", "the cat sat", "paris", "the cat sat", "a dog ran"];
        let ids = [1, 2, 1, 2, 2];
        let labels = select(&docs, &ids, &Cascade::default()).unwrap();
        assert_eq!(
            labels,
            vec!["paris", "the cat sat", "paris", "the cat sat", "the cat sat"]
        );
    }

    #[test]
    fn test_select_sparse_and_zero_ids() {
        // Ids need not be contiguous nor start at 1.
        let docs = ["paris", "solo", "paris"];
        let ids = [0, 41, 0];
        let labels = select(&docs, &ids, &Cascade::default()).unwrap();
        assert_eq!(labels, vec!["paris", "", "paris"]);
    }

    #[test]
    fn test_select_propagates_taxonomy_failure() {
        use crate::select::{LastWord, Synset, Taxonomy};
        use std::sync::Arc;

        struct Broken;

        impl Taxonomy for Broken {
            fn synsets(&self, _word: &str) -> Result<Vec<Synset>> {
                Err(Error::Other("lookup failed".into()))
            }

            fn lowest_common_hypernyms(&self, _a: &Synset, _b: &Synset) -> Result<Vec<Synset>> {
                Ok(Vec::new())
            }
        }

        let cascade = Cascade::default().with_taxonomy(Arc::new(Broken), Arc::new(LastWord));
        // Single-word, two-char member: only the hypernym stage can fire.
        let docs = ["ox", "poodle", "beagle"];
        let result = select(&docs, &[3, 3, 3], &cascade);
        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[test]
    fn test_select_empty_input() {
        let docs: [&str; 0] = [];
        assert!(select(&docs, &[], &Cascade::default()).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_one_label_per_document(
            pairs in proptest::collection::vec(("[a-d ]{0,8}", 0usize..5), 0..30),
        ) {
            let docs: Vec<String> = pairs.iter().map(|(d, _)| d.clone()).collect();
            let ids: Vec<usize> = pairs.iter().map(|(_, c)| *c).collect();
            let labels = select(&docs, &ids, &Cascade::default()).unwrap();
            prop_assert_eq!(labels.len(), docs.len());

            // Same cluster, same label.
            for i in 0..ids.len() {
                for j in 0..ids.len() {
                    if ids[i] == ids[j] {
                        prop_assert_eq!(&labels[i], &labels[j]);
                    }
                }
            }
        }
    }
}
