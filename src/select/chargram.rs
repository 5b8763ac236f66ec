//! Character n-gram scorer.
//!
//! Same scoring shape as the word-gram scorer, applied to overlapping
//! character n-grams: `count² × (1 + ln(chars))`, where `count` is the number
//! of members containing the n-gram.

use std::collections::HashMap;

use super::{containment_weight, first_argmax, strip, Scorer};
use crate::config::CharGramRange;
use crate::error::Result;

/// Members must have at least this many characters before the scorer applies.
const MIN_CHARS: usize = 3;

/// Names a group by its most widely shared character n-gram.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharGramScorer {
    range: CharGramRange,
}

impl CharGramScorer {
    /// Scorer over the default 3..20 n-gram lengths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scorer over a custom n-gram length range.
    pub fn with_range(range: CharGramRange) -> Result<Self> {
        range.validate()?;
        Ok(Self { range })
    }

    /// N-gram lengths in use.
    pub fn range(&self) -> CharGramRange {
        self.range
    }

    /// `(gram, score)` for every n-gram of every member, in member order.
    fn scored<'a>(&self, members: &[&'a str]) -> (Vec<&'a str>, Vec<f64>) {
        let grams: Vec<&str> = members
            .iter()
            .flat_map(|m| (self.range.min..self.range.max).flat_map(move |n| char_ngrams(m, n)))
            .collect();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let scores = grams
            .iter()
            .map(|&gram| {
                let count = *counts
                    .entry(gram)
                    .or_insert_with(|| members.iter().filter(|m| m.contains(gram)).count());
                containment_weight(count, gram.chars().count())
            })
            .collect();
        (grams, scores)
    }
}

impl Scorer for CharGramScorer {
    /// Best containment score over all n-grams.
    ///
    /// `0.0` when fewer than two members remain or any member is shorter
    /// than three characters.
    fn condition(&self, group: &[&str]) -> f64 {
        let members = strip(group);
        if members.len() <= 1 || members.iter().any(|m| m.chars().count() < MIN_CHARS) {
            return 0.0;
        }
        let (_, scores) = self.scored(&members);
        scores.into_iter().fold(0.0, f64::max)
    }

    /// First n-gram with the maximal score.
    fn selection(&self, group: &[&str]) -> Result<String> {
        let members = strip(group);
        let (grams, scores) = self.scored(&members);
        Ok(first_argmax(&scores)
            .map(|i| grams[i].to_string())
            .unwrap_or_default())
    }
}

/// All overlapping `n`-character windows of `text`, left to right.
pub fn char_ngrams(text: &str, n: usize) -> impl Iterator<Item = &str> {
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let windows = if n == 0 {
        0
    } else {
        bounds.len().saturating_sub(n)
    };
    (0..windows).map(move |i| &text[bounds[i]..bounds[i + n]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_ngrams() {
        let grams: Vec<&str> = char_ngrams("paris", 3).collect();
        assert_eq!(grams, vec!["par", "ari", "ris"]);
        assert_eq!(char_ngrams("ab", 3).count(), 0);
        assert_eq!(char_ngrams("abc", 3).collect::<Vec<_>>(), vec!["abc"]);
    }

    #[test]
    fn test_char_ngrams_multibyte() {
        let grams: Vec<&str> = char_ngrams("naïve", 4).collect();
        assert_eq!(grams, vec!["naïv", "aïve"]);
    }

    #[test]
    fn test_condition_identical_members() {
        // Whole word "paris" (5 chars) is shared by both members.
        let scorer = CharGramScorer::new();
        let expected = 4.0 * (1.0 + 5f64.ln());
        assert!((scorer.condition(&["paris", "paris"]) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_condition_short_member_guard() {
        let scorer = CharGramScorer::new();
        assert_eq!(scorer.condition(&["ox", "oxen"]), 0.0);
        assert_eq!(scorer.condition(&["", "", ""]), 0.0);
        assert_eq!(scorer.condition(&["lonely"]), 0.0);
    }

    #[test]
    fn test_selection_shared_stem() {
        let scorer = CharGramScorer::new();
        let group = ["football", "footpath", "barefoot"];
        assert_eq!(scorer.selection(&group).unwrap(), "foot");
    }

    #[test]
    fn test_selection_prefers_longer_at_equal_count() {
        let scorer = CharGramScorer::new();
        assert_eq!(scorer.selection(&["rustacean", "rustacean"]).unwrap(), "rustacean");
    }

    #[test]
    fn test_custom_range() {
        let scorer = CharGramScorer::with_range(CharGramRange::new(2, 3)).unwrap();
        assert_eq!(scorer.selection(&["abxy", "cdxy"]).unwrap(), "xy");
        assert!(CharGramScorer::with_range(CharGramRange::new(4, 4)).is_err());
    }

    #[test]
    fn test_selection_degenerate() {
        let scorer = CharGramScorer::new();
        assert_eq!(scorer.selection(&["", ""]).unwrap(), "");
        assert_eq!(scorer.selection(&["ab"]).unwrap(), "");
    }
}
