//! Run configuration.
//!
//! Every knob of a labelling run lives here: cascade thresholds, the depth
//! schedule, char-gram lengths, and the settings of the default
//! collaborators. All sections are optional in TOML and fall back to the
//! defaults below.
//!
//! ```toml
//! [thresholds]
//! edit = 0.8
//!
//! [depths]
//! start = 2
//! end = 10
//! step = 2
//!
//! [cluster]
//! method = "kmeans"
//! seed = 7
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cluster::Linkage;
use crate::error::{Error, Result};

/// Cutoffs for the four cascade conditions.
///
/// A scorer fires only when its condition is strictly greater than its
/// threshold. Thresholds never change how a scorer computes its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Mean pairwise edit similarity.
    pub edit: f64,
    /// Word-gram containment score.
    pub wordgram: f64,
    /// Char-gram containment score.
    pub chargram: f64,
    /// Hypernym overlap signal.
    pub hypernym: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            edit: 0.75,
            wordgram: 2.0,
            chargram: 0.8,
            hypernym: 0.0,
        }
    }
}

impl Thresholds {
    /// Default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the edit threshold.
    pub fn with_edit(mut self, edit: f64) -> Self {
        self.edit = edit;
        self
    }

    /// Set the word-gram threshold.
    pub fn with_wordgram(mut self, wordgram: f64) -> Self {
        self.wordgram = wordgram;
        self
    }

    /// Set the char-gram threshold.
    pub fn with_chargram(mut self, chargram: f64) -> Self {
        self.chargram = chargram;
        self
    }

    /// Set the hypernym threshold.
    pub fn with_hypernym(mut self, hypernym: f64) -> Self {
        self.hypernym = hypernym;
        self
    }

    /// Reject NaN, infinite, and negative cutoffs.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("edit", self.edit),
            ("wordgram", self.wordgram),
            ("chargram", self.chargram),
            ("hypernym", self.hypernym),
        ] {
            if !value.is_finite() {
                return Err(Error::invalid(name, format!("threshold must be finite, got {value}")));
            }
            if value < 0.0 {
                return Err(Error::invalid(
                    name,
                    format!("threshold must be non-negative, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Depth values visited by a run: `start, start + step, ...` up to and
/// including `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthSchedule {
    /// First (coarsest) depth.
    pub start: usize,
    /// Last depth, inclusive.
    pub end: usize,
    /// Increment between depths.
    pub step: usize,
}

impl Default for DepthSchedule {
    fn default() -> Self {
        Self {
            start: 3,
            end: 15,
            step: 3,
        }
    }
}

impl DepthSchedule {
    /// Create a schedule.
    pub fn new(start: usize, end: usize, step: usize) -> Self {
        Self { start, end, step }
    }

    /// Check `1 <= start <= end` and `step >= 1`.
    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(Error::invalid("step", "step must be at least 1"));
        }
        if self.start == 0 {
            return Err(Error::invalid("start", "start depth must be at least 1"));
        }
        if self.start > self.end {
            return Err(Error::invalid(
                "end",
                format!("end depth {} is below start depth {}", self.end, self.start),
            ));
        }
        Ok(())
    }

    /// Iterate the depth values.
    pub fn depths(&self) -> impl Iterator<Item = usize> {
        (self.start..=self.end).step_by(self.step.max(1))
    }
}

/// Character n-gram lengths, `min..max` (upper bound exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharGramRange {
    /// Shortest n-gram.
    pub min: usize,
    /// One past the longest n-gram.
    pub max: usize,
}

impl Default for CharGramRange {
    fn default() -> Self {
        Self { min: 3, max: 20 }
    }
}

impl CharGramRange {
    /// Create a range.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Check `1 <= min < max`.
    pub fn validate(&self) -> Result<()> {
        if self.min == 0 {
            return Err(Error::invalid("chargrams.min", "n-gram length must be at least 1"));
        }
        if self.min >= self.max {
            return Err(Error::invalid(
                "chargrams.max",
                format!("empty n-gram range {}..{}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Clustering backend used by the default clusterer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMethod {
    /// Agglomerative clustering, dendrogram cut to `depth` clusters.
    #[default]
    Agglomerative,
    /// K-means with `k = depth`.
    Kmeans,
}

/// Settings for the default clusterer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Backend.
    pub method: ClusterMethod,
    /// Linkage for agglomerative clustering.
    pub linkage: Linkage,
    /// Seed for k-means initialization.
    pub seed: u64,
    /// Lloyd iterations per k-means restart.
    pub max_iter: usize,
    /// Number of k-means restarts.
    pub n_init: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            method: ClusterMethod::Agglomerative,
            linkage: Linkage::Average,
            seed: 42,
            max_iter: 100,
            n_init: 4,
        }
    }
}

/// Settings for the default hashing embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Output vector length.
    pub dimensions: usize,
    /// Shortest hashed subword.
    pub min_n: usize,
    /// Longest hashed subword.
    pub max_n: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensions: 64,
            min_n: 3,
            max_n: 6,
        }
    }
}

impl EmbeddingConfig {
    /// Check the dimension and subword lengths.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions == 0 {
            return Err(Error::invalid("embedding.dimensions", "must be at least 1"));
        }
        if self.min_n == 0 || self.min_n > self.max_n {
            return Err(Error::invalid(
                "embedding.min_n",
                format!("bad subword range {}..={}", self.min_n, self.max_n),
            ));
        }
        Ok(())
    }
}

/// One `pattern -> replacement` cleaning rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRule {
    /// Regular expression, matched case-insensitively.
    pub pattern: String,
    /// Replacement text (`$1` style groups allowed).
    pub replacement: String,
}

impl CleanRule {
    /// Create a rule.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Ordered cleaning rules applied before labelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Rules, applied in order.
    pub rules: Vec<CleanRule>,
    /// Reduce each cleaned document to its head word.
    pub head_word: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            head_word: false,
            rules: vec![
                CleanRule::new(r"[0-9]+", " "),
                CleanRule::new(r"[^\w\s]+", " "),
                CleanRule::new(r"_+", " "),
                CleanRule::new(r"\s+", " "),
            ],
        }
    }
}

/// Complete configuration of a labelling run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Cascade thresholds.
    pub thresholds: Thresholds,
    /// Depth schedule.
    pub depths: DepthSchedule,
    /// Char-gram lengths.
    pub chargrams: CharGramRange,
    /// Default clusterer settings.
    pub cluster: ClusterConfig,
    /// Default embedder settings.
    pub embedding: EmbeddingConfig,
    /// Cleaning rules.
    pub cleaner: CleanerConfig,
    /// Optional taxonomy file for the hypernym scorer.
    pub taxonomy: Option<PathBuf>,
}

impl RunConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.depths.validate()?;
        self.chargrams.validate()?;
        self.embedding.validate()
    }
}
