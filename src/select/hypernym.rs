//! Hypernym scorer.
//!
//! The semantic fallback of the cascade: reduce each member to its head word,
//! look the word up in a taxonomy, and name the group after the lowest common
//! ancestor shared by members.
//!
//! ```text
//! "a small poodle" ─► poodle ─► poodle.n.01 ─┐
//!                                            ├─► lch = dog.n.01 ─► "dog"
//! "the old beagle" ─► beagle ─► beagle.n.01 ─┘
//! ```
//!
//! The taxonomy and head-word extractor are handles supplied by the host at
//! construction time and shared read-only across groups.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::{strip, Scorer};
use crate::error::Result;

/// Ancestors too generic to be useful as labels.
pub const AVOIDED_HYPERNYMS: [&str; 5] = ["entity", "whole", "object", "matter", "physical_entity"];

/// A taxonomy node, named `lemma.pos.nn` (e.g. `dog.n.01`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Synset {
    name: String,
}

impl Synset {
    /// Wrap a synset name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Full name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name up to the first `.`.
    pub fn lemma(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for Synset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Lexical taxonomy lookups.
///
/// Backends reading from disk or a service report failures as errors; they
/// abort the run.
pub trait Taxonomy: Send + Sync {
    /// Synsets a word may denote, most common sense first.
    fn synsets(&self, word: &str) -> Result<Vec<Synset>>;

    /// Deepest ancestors shared by `a` and `b` (each counts as its own
    /// ancestor).
    fn lowest_common_hypernyms(&self, a: &Synset, b: &Synset) -> Result<Vec<Synset>>;
}

/// Reduces a document to the token that best represents it.
pub trait HeadWord: Send + Sync {
    /// Head token, or `None` when the document has none.
    fn head(&self, document: &str) -> Option<String>;
}

/// Head word = last whitespace token, lowercased, with surrounding
/// punctuation removed.
///
/// English noun phrases are head-final, so this approximates the root of a
/// dependency parse for short label-like documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastWord;

impl HeadWord for LastWord {
    fn head(&self, document: &str) -> Option<String> {
        document
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '_'))
            .filter(|t| !t.is_empty())
            .last()
            .map(str::to_lowercase)
    }
}

/// In-memory taxonomy built from explicit hypernym edges.
///
/// Words resolve to the synsets registered for them; any synset whose lemma
/// is not explicitly registered is reachable through that lemma.
#[derive(Debug, Clone, Default)]
pub struct StaticTaxonomy {
    /// word -> synset names, in sense order.
    senses: BTreeMap<String, Vec<String>>,
    /// synset name -> parent synset names.
    parents: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    synsets: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    hypernyms: BTreeMap<String, Vec<String>>,
}

impl StaticTaxonomy {
    /// Empty taxonomy: every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `synset` as a sense of `word`.
    pub fn with_sense(mut self, word: &str, synset: &str) -> Self {
        self.add_sense(word, synset);
        self
    }

    /// Record `parent` as a direct hypernym of `child`.
    ///
    /// Bare words (no `.`) are promoted to `word.n.01`.
    pub fn with_hypernym(mut self, child: &str, parent: &str) -> Self {
        self.add_hypernym(child, parent);
        self
    }

    /// Record a chain `a -> b -> c ...`, most specific first.
    pub fn with_chain(mut self, chain: &[&str]) -> Self {
        for pair in chain.windows(2) {
            self.add_hypernym(pair[0], pair[1]);
        }
        self
    }

    /// Parse a TOML taxonomy:
    ///
    /// ```toml
    /// [synsets]
    /// hound = ["hound.n.01", "hound.n.02"]
    ///
    /// [hypernyms]
    /// "hound.n.01" = ["dog.n.01"]
    /// "dog.n.01" = ["canine.n.02"]
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: TaxonomyFile = toml::from_str(text)?;
        let mut taxonomy = Self::new();
        for (word, synsets) in &file.synsets {
            for synset in synsets {
                taxonomy.add_sense(word, synset);
            }
        }
        for (child, parents) in &file.hypernyms {
            for parent in parents {
                taxonomy.add_hypernym(child, parent);
            }
        }
        Ok(taxonomy)
    }

    /// Read a TOML taxonomy file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Number of synsets known (with or without edges).
    pub fn len(&self) -> usize {
        let mut all: BTreeSet<&str> = BTreeSet::new();
        for (child, parents) in &self.parents {
            all.insert(child);
            all.extend(parents.iter().map(String::as_str));
        }
        for synsets in self.senses.values() {
            all.extend(synsets.iter().map(String::as_str));
        }
        all.len()
    }

    /// True when no synset is known.
    pub fn is_empty(&self) -> bool {
        self.senses.is_empty() && self.parents.is_empty()
    }

    fn add_sense(&mut self, word: &str, synset: &str) {
        let synset = canonical(synset);
        let senses = self.senses.entry(word.to_lowercase()).or_default();
        if !senses.contains(&synset) {
            senses.push(synset);
        }
    }

    fn add_hypernym(&mut self, child: &str, parent: &str) {
        let (child, parent) = (canonical(child), canonical(parent));
        let parents = self.parents.entry(child).or_default();
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }

    /// `synset` and all its ancestors.
    fn ancestors(&self, synset: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([synset.to_string()]);
        while let Some(node) = queue.pop_front() {
            if !seen.insert(node.clone()) {
                continue;
            }
            if let Some(parents) = self.parents.get(&node) {
                queue.extend(parents.iter().cloned());
            }
        }
        seen
    }

    /// Longest path from `synset` up to a root. Edges closing a cycle are
    /// ignored.
    fn max_depth(&self, synset: &str, memo: &mut HashMap<String, usize>) -> usize {
        fn walk(
            tax: &StaticTaxonomy,
            node: &str,
            memo: &mut HashMap<String, usize>,
            on_path: &mut BTreeSet<String>,
        ) -> usize {
            if let Some(&d) = memo.get(node) {
                return d;
            }
            on_path.insert(node.to_string());
            let mut depth = 0;
            if let Some(parents) = tax.parents.get(node) {
                for p in parents {
                    if !on_path.contains(p.as_str()) {
                        depth = depth.max(1 + walk(tax, p, memo, on_path));
                    }
                }
            }
            on_path.remove(node);
            memo.insert(node.to_string(), depth);
            depth
        }
        walk(self, synset, memo, &mut BTreeSet::new())
    }
}

impl Taxonomy for StaticTaxonomy {
    fn synsets(&self, word: &str) -> Result<Vec<Synset>> {
        let word = word.to_lowercase();
        if let Some(senses) = self.senses.get(&word) {
            return Ok(senses.iter().map(Synset::new).collect());
        }
        // Fall back to synsets named after the word.
        let mut found: Vec<&String> = self
            .parents
            .iter()
            .flat_map(|(child, parents)| std::iter::once(child).chain(parents))
            .filter(|name| name.split('.').next() == Some(word.as_str()))
            .collect();
        found.sort();
        found.dedup();
        Ok(found.into_iter().map(Synset::new).collect())
    }

    fn lowest_common_hypernyms(&self, a: &Synset, b: &Synset) -> Result<Vec<Synset>> {
        let left = self.ancestors(a.name());
        let right = self.ancestors(b.name());
        let common: Vec<&String> = left.intersection(&right).collect();
        if common.is_empty() {
            return Ok(Vec::new());
        }

        let mut memo = HashMap::new();
        let depths: Vec<usize> = common.iter().map(|s| self.max_depth(s, &mut memo)).collect();
        let deepest = depths.iter().copied().max().unwrap_or(0);
        Ok(common
            .into_iter()
            .zip(depths)
            .filter(|&(_, d)| d == deepest)
            .map(|(s, _)| Synset::new(s.as_str()))
            .collect())
    }
}

/// Promote a bare word to its first noun sense name.
fn canonical(name: &str) -> String {
    if name.contains('.') {
        name.to_string()
    } else {
        format!("{}.n.01", name.to_lowercase())
    }
}

/// Names a group after the lowest common hypernym of its members' head words.
#[derive(Clone)]
pub struct HypernymScorer {
    taxonomy: Arc<dyn Taxonomy>,
    head: Arc<dyn HeadWord>,
}

impl fmt::Debug for HypernymScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HypernymScorer").finish_non_exhaustive()
    }
}

impl Default for HypernymScorer {
    /// Empty taxonomy: selection always yields `""`.
    fn default() -> Self {
        Self::new(Arc::new(StaticTaxonomy::new()), Arc::new(LastWord))
    }
}

impl HypernymScorer {
    /// Create a scorer over the given taxonomy and head-word extractor.
    pub fn new(taxonomy: Arc<dyn Taxonomy>, head: Arc<dyn HeadWord>) -> Self {
        Self { taxonomy, head }
    }

    /// Ancestor names shared by members, each member's senses compared once
    /// against the senses of every later member.
    pub fn common_hypernyms(&self, group: &[&str]) -> Result<Vec<String>> {
        let senses: Vec<Vec<Synset>> = strip(group)
            .into_iter()
            .map(|doc| match self.head.head(doc) {
                Some(word) => self.taxonomy.synsets(&word),
                None => Ok(Vec::new()),
            })
            .collect::<Result<_>>()?;
        let flat: Vec<&Synset> = senses.iter().flatten().collect();

        let mut common = Vec::new();
        let mut rest = flat.as_slice();
        for own in senses.iter().map(Vec::len) {
            let (left, right) = rest.split_at(own.min(rest.len()));
            for a in left {
                for b in right {
                    common.extend(self.taxonomy.lowest_common_hypernyms(a, b)?);
                }
            }
            rest = right;
        }

        Ok(common
            .iter()
            .map(|s| s.lemma().to_string())
            .filter(|name| !AVOIDED_HYPERNYMS.contains(&name.as_str()))
            .collect())
    }
}

impl Scorer for HypernymScorer {
    /// `1.0` whenever the group has at least two non-empty members.
    fn condition(&self, group: &[&str]) -> f64 {
        if strip(group).len() <= 1 {
            0.0
        } else {
            1.0
        }
    }

    /// First useful common ancestor, underscores shown as spaces.
    fn selection(&self, group: &[&str]) -> Result<String> {
        Ok(self
            .common_hypernyms(group)?
            .into_iter()
            .next()
            .map(|name| name.replace('_', " "))
            .unwrap_or_default())
    }
}
