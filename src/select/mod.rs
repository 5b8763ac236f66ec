//! Label selection for one cluster.
//!
//! A cluster (a *group* of member strings) is named by the first of four
//! similarity heuristics that is confident about it:
//!
//! ```text
//! Priority │ Scorer          │ Signal
//! ─────────┼─────────────────┼────────────────────────────────
//! 1        │ EditScorer      │ members are near-identical strings
//! 2        │ WordGramScorer  │ members share whole word n-grams
//! 3        │ CharGramScorer  │ members share character n-grams
//! 4        │ HypernymScorer  │ members' head words share an ancestor
//! 5        │ (fallback)      │ empty label
//! ```
//!
//! Each scorer answers two questions about a group:
//!
//! - [`Scorer::condition`]: how strongly does this heuristic apply?
//! - [`Scorer::selection`]: which string would it pick as the label?
//!
//! The [`Cascade`] compares each condition against its threshold in the
//! order above and returns the selection of the first one that passes.
//!
//! All scorers ignore empty members (see [`strip`]). A group with at most one
//! non-empty member scores `0.0` everywhere and selects `""`.

pub mod cascade;
pub mod chargram;
pub mod edit;
pub mod hypernym;
pub mod wordgram;

pub use cascade::{Cascade, Decision, Strategy};
pub use chargram::CharGramScorer;
pub use edit::EditScorer;
pub use hypernym::{HeadWord, HypernymScorer, LastWord, StaticTaxonomy, Synset, Taxonomy};
pub use wordgram::WordGramScorer;

use crate::error::Result;

/// A label heuristic over a group of member strings.
pub trait Scorer {
    /// Strength of this heuristic for the group.
    fn condition(&self, group: &[&str]) -> f64;

    /// Label this heuristic would pick for the group.
    ///
    /// Lexical scorers never fail; scorers backed by an external resource
    /// report lookup failures here.
    fn selection(&self, group: &[&str]) -> Result<String>;
}

/// Drop empty members.
///
/// Changes the group length; positions in the result do not line up with
/// positions in the input.
pub fn strip<'a>(group: &[&'a str]) -> Vec<&'a str> {
    group.iter().copied().filter(|s| !s.is_empty()).collect()
}

/// Index of the first maximum, or `None` for an empty slice.
///
/// Later equal scores never displace an earlier one.
pub(crate) fn first_argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some((_, b)) if score <= b => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// `count² × (1 + ln(len))`, shared by the n-gram scorers.
#[inline]
pub(crate) fn containment_weight(count: usize, len: usize) -> f64 {
    let count = count as f64;
    count * count * (1.0 + (len as f64).ln())
}
