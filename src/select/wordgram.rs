//! Word n-gram scorer.
//!
//! Rewards groups whose members contain one another verbatim. The score of a
//! string `s` against a group is
//!
//! ```text
//! score(s) = count(s)² × (1 + ln(words(s)))
//! ```
//!
//! where `count(s)` is the number of members containing `s`. Longer shared
//! phrases win over shorter ones at equal counts.

use std::collections::HashMap;

use super::{containment_weight, first_argmax, strip, Scorer};
use crate::error::Result;

/// Members must have at least this many words before the scorer applies.
const MIN_WORDS: usize = 3;

/// Names a group by its most widely shared word n-gram.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordGramScorer;

impl WordGramScorer {
    /// Create a word-gram scorer.
    pub fn new() -> Self {
        Self
    }
}

impl Scorer for WordGramScorer {
    /// Best containment score over whole members.
    ///
    /// `0.0` when fewer than two members remain or any member is shorter
    /// than three words.
    fn condition(&self, group: &[&str]) -> f64 {
        let members = strip(group);
        if members.len() <= 1 {
            return 0.0;
        }
        let min_words = members
            .iter()
            .map(|m| m.split_whitespace().count())
            .min()
            .unwrap_or(0);
        if min_words < MIN_WORDS {
            return 0.0;
        }

        members
            .iter()
            .map(|candidate| {
                let count = members.iter().filter(|m| m.contains(candidate)).count();
                containment_weight(count, candidate.split_whitespace().count())
            })
            .fold(0.0, f64::max)
    }

    /// Fragment with the best frequency score across all members' n-grams.
    fn selection(&self, group: &[&str]) -> Result<String> {
        let members = strip(group);
        let fragments: Vec<String> = members.iter().flat_map(|m| explode(m)).collect();
        if fragments.is_empty() {
            return Ok(String::new());
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for f in &fragments {
            *counts.entry(f.as_str()).or_default() += 1;
        }

        let total = fragments.len() as f64;
        let scores: Vec<f64> = fragments
            .iter()
            .map(|f| {
                let words = f.split_whitespace().count();
                containment_weight(counts[f.as_str()], words) / total
            })
            .collect();

        Ok(first_argmax(&scores)
            .map(|i| fragments[i].clone())
            .unwrap_or_default())
    }
}

/// Every distinct contiguous word n-gram of `text`, shortest first, then
/// left to right.
pub fn explode(text: &str) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for n in 1..=tokens.len() {
        for window in tokens.windows(n) {
            let gram = window.join(" ");
            if seen.insert(gram.clone()) {
                out.push(gram);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explode_orders_by_length() {
        assert_eq!(
            explode("the cat sat"),
            vec!["the", "cat", "sat", "the cat", "cat sat", "the cat sat"]
        );
        assert!(explode("").is_empty());
    }

    #[test]
    fn test_explode_dedups_within_document() {
        assert_eq!(explode("go go"), vec!["go", "go go"]);
    }

    #[test]
    fn test_condition_scores_shared_phrase() {
        let scorer = WordGramScorer::new();
        let group = ["the cat sat", "the cat sat", "a dog ran"];
        let expected = 4.0 * (1.0 + 3f64.ln());
        assert!((scorer.condition(&group) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_condition_counts_containment() {
        // "big red barn" is contained in the longer member too.
        let scorer = WordGramScorer::new();
        let group = ["big red barn", "old big red barn door", "blue lake shore"];
        let expected = 4.0 * (1.0 + 3f64.ln());
        assert!((scorer.condition(&group) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_condition_requires_three_words() {
        let scorer = WordGramScorer::new();
        assert_eq!(scorer.condition(&["new york city", "new york"]), 0.0);
        assert_eq!(scorer.condition(&["only one member here"]), 0.0);
        assert_eq!(scorer.condition(&["", "", ""]), 0.0);
    }

    #[test]
    fn test_selection_prefers_longest_shared_fragment() {
        let scorer = WordGramScorer::new();
        let group = ["the cat sat", "the cat sat", "a dog ran"];
        assert_eq!(scorer.selection(&group).unwrap(), "the cat sat");
    }

    #[test]
    fn test_selection_shared_subphrase() {
        // "machine learning" appears in all three members.
        let scorer = WordGramScorer::new();
        let group = [
            "applied machine learning",
            "machine learning systems",
            "intro to machine learning",
        ];
        assert_eq!(scorer.selection(&group).unwrap(), "machine learning");
    }

    #[test]
    fn test_selection_degenerate() {
        let scorer = WordGramScorer::new();
        assert_eq!(scorer.selection(&["", ""]).unwrap(), "");
        assert_eq!(scorer.selection(&[]).unwrap(), "");
    }
}
