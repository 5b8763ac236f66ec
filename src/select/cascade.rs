//! First-match decision list over the four scorers.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use super::{CharGramScorer, EditScorer, HeadWord, HypernymScorer, Scorer, Taxonomy, WordGramScorer};
use crate::config::{CharGramRange, Thresholds};
use crate::error::Result;

/// Which heuristic produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Near-identical members.
    Edit,
    /// Shared word n-gram.
    WordGram,
    /// Shared character n-gram.
    CharGram,
    /// Common hypernym.
    Hypernym,
    /// Nothing passed; empty label.
    Fallback,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Edit => "edit",
            Strategy::WordGram => "wordgram",
            Strategy::CharGram => "chargram",
            Strategy::Hypernym => "hypernym",
            Strategy::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// Outcome of running the cascade on one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Winning heuristic.
    pub strategy: Strategy,
    /// Chosen label (possibly empty).
    pub label: String,
}

/// Ordered `{condition, selection}` pairs, most specific first.
///
/// ```rust
/// use tierlabel::select::{Cascade, Strategy};
/// use tierlabel::Thresholds;
///
/// let cascade = Cascade::new(Thresholds::default())?;
///
/// let decision = cascade.decide(&["paris", "paris"])?;
/// assert_eq!(decision.strategy, Strategy::Edit);
/// assert_eq!(decision.label, "paris");
///
/// assert_eq!(cascade.represent(&["", "", ""])?, "");
/// # Ok::<(), tierlabel::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cascade {
    thresholds: Thresholds,
    edit: EditScorer,
    wordgram: WordGramScorer,
    chargram: CharGramScorer,
    hypernym: HypernymScorer,
}

impl Cascade {
    /// Cascade with the default scorers and the given thresholds.
    pub fn new(thresholds: Thresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self {
            thresholds,
            edit: EditScorer::new(),
            wordgram: WordGramScorer::new(),
            chargram: CharGramScorer::new(),
            hypernym: HypernymScorer::default(),
        })
    }

    /// Use a custom char-gram length range.
    pub fn with_chargrams(mut self, range: CharGramRange) -> Result<Self> {
        self.chargram = CharGramScorer::with_range(range)?;
        Ok(self)
    }

    /// Use the given taxonomy and head-word extractor for the semantic stage.
    pub fn with_taxonomy(mut self, taxonomy: Arc<dyn Taxonomy>, head: Arc<dyn HeadWord>) -> Self {
        self.hypernym = HypernymScorer::new(taxonomy, head);
        self
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// The decision list in priority order.
    pub fn stages(&self) -> [(Strategy, &dyn Scorer, f64); 4] {
        [
            (Strategy::Edit, &self.edit as &dyn Scorer, self.thresholds.edit),
            (Strategy::WordGram, &self.wordgram as &dyn Scorer, self.thresholds.wordgram),
            (Strategy::CharGram, &self.chargram as &dyn Scorer, self.thresholds.chargram),
            (Strategy::Hypernym, &self.hypernym as &dyn Scorer, self.thresholds.hypernym),
        ]
    }

    /// Run the decision list: the first stage whose condition is strictly
    /// above its threshold names the group. Later stages are not evaluated.
    ///
    /// Fails only when the winning scorer's external lookup fails.
    pub fn decide(&self, group: &[&str]) -> Result<Decision> {
        for (strategy, scorer, threshold) in self.stages() {
            let score = scorer.condition(group);
            trace!(%strategy, score, threshold, "condition");
            if score > threshold {
                return Ok(Decision {
                    strategy,
                    label: scorer.selection(group)?,
                });
            }
        }
        Ok(Decision {
            strategy: Strategy::Fallback,
            label: String::new(),
        })
    }

    /// Label for the group; `""` when no stage is confident.
    pub fn represent(&self, group: &[&str]) -> Result<String> {
        Ok(self.decide(group)?.label)
    }
}

impl Default for Cascade {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            edit: EditScorer::new(),
            wordgram: WordGramScorer::new(),
            chargram: CharGramScorer::new(),
            hypernym: HypernymScorer::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Strategy;
    use crate::select::{LastWord, StaticTaxonomy, Synset};
    use proptest::prelude::*;

    fn with_animals() -> Cascade {
        let tax = StaticTaxonomy::new()
            .with_chain(&["poodle", "dog", "canine", "carnivore"])
            .with_chain(&["beagle", "hound", "dog"]);
        Cascade::default().with_taxonomy(Arc::new(tax), Arc::new(LastWord))
    }

    #[test]
    fn test_identical_pair_goes_to_edit() {
        let decision = Cascade::default().decide(&["paris", "paris"]).unwrap();
        assert_eq!(decision.strategy, Strategy::Edit);
        assert_eq!(decision.label, "paris");
    }

    #[test]
    fn test_mixed_group_goes_to_wordgram_by_default() {
        // Edit condition is (1 + 6/11) / 3 ~ 0.515, below 0.75.
        let group = ["the cat sat", "the cat sat", "a dog ran"];
        let decision = Cascade::default().decide(&group).unwrap();
        assert_eq!(decision.strategy, Strategy::WordGram);
        assert_eq!(decision.label, "the cat sat");
    }

    #[test]
    fn test_lower_edit_threshold_switches_scorer() {
        let group = ["the cat sat", "the cat sat", "a dog ran"];
        let cascade = Cascade::new(Thresholds::default().with_edit(0.5)).unwrap();
        let decision = cascade.decide(&group).unwrap();
        assert_eq!(decision.strategy, Strategy::Edit);
        assert_eq!(decision.label, "the cat sat");
    }

    #[test]
    fn test_short_members_fall_to_chargram() {
        let decision = Cascade::default().decide(&["football", "footpath", "barefoot"]).unwrap();
        assert_eq!(decision.strategy, Strategy::CharGram);
        assert_eq!(decision.label, "foot");
    }

    #[test]
    fn test_hypernym_stage() {
        // A two-char member disables the char-gram stage; one-word members
        // disable the word-gram stage.
        let cascade = with_animals();
        let decision = cascade.decide(&["ox", "poodle", "beagle"]).unwrap();
        assert_eq!(decision.strategy, Strategy::Hypernym);
        assert_eq!(decision.label, "dog");
    }

    #[test]
    fn test_chargram_fires_before_hypernym() {
        // No shared n-gram, but the longest unique one still clears 0.8.
        let decision = with_animals().decide(&["poodle", "beagle"]).unwrap();
        assert_eq!(decision.strategy, Strategy::CharGram);
        assert_eq!(decision.label, "poodle");
    }

    #[test]
    fn test_all_empty_group_falls_back() {
        let decision = Cascade::default().decide(&["", "", ""]).unwrap();
        assert_eq!(decision.strategy, Strategy::Fallback);
        assert_eq!(decision.label, "");
    }

    #[test]
    fn test_single_member_falls_back() {
        assert_eq!(Cascade::default().represent(&["lonely"]).unwrap(), "");
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        assert!(Cascade::new(Thresholds::default().with_hypernym(-1.0)).is_err());
    }

    struct Unreachable;

    impl Taxonomy for Unreachable {
        fn synsets(&self, _word: &str) -> Result<Vec<Synset>> {
            Err(crate::error::Error::Other("taxonomy unreachable".into()))
        }

        fn lowest_common_hypernyms(&self, _a: &Synset, _b: &Synset) -> Result<Vec<Synset>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_taxonomy_failure_aborts_decision() {
        let cascade = Cascade::default().with_taxonomy(Arc::new(Unreachable), Arc::new(LastWord));
        assert!(cascade.decide(&["ox", "poodle", "beagle"]).is_err());
        // Earlier stages never touch the taxonomy.
        let decision = cascade.decide(&["paris", "paris"]).unwrap();
        assert_eq!(decision.strategy, Strategy::Edit);
    }

    proptest! {
        #[test]
        fn prop_represent_is_deterministic(
            group in proptest::collection::vec("[a-c ]{0,12}", 0..6),
        ) {
            let cascade = Cascade::default();
            let refs: Vec<&str> = group.iter().map(String::as_str).collect();
            prop_assert_eq!(cascade.represent(&refs).unwrap(), cascade.represent(&refs).unwrap());
        }

        #[test]
        fn prop_degenerate_groups_score_zero(
            word in "[a-z ]{0,10}",
            empties in 0usize..4,
        ) {
            let cascade = Cascade::default();
            let mut group = vec![""; empties];
            group.push(word.as_str());
            for (_, scorer, _) in cascade.stages() {
                prop_assert_eq!(scorer.condition(&group), 0.0);
            }
        }

        #[test]
        fn prop_edit_wins_when_it_passes(
            group in proptest::collection::vec("[ab]{1,6}", 2..5),
        ) {
            let cascade = Cascade::default();
            let refs: Vec<&str> = group.iter().map(String::as_str).collect();
            let edit = EditScorer::new();
            if edit.condition(&refs) > cascade.thresholds().edit {
                prop_assert_eq!(cascade.represent(&refs).unwrap(), edit.selection(&refs).unwrap());
            }
        }
    }
}
