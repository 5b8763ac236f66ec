//! Edit-distance scorer.
//!
//! Uses the normalized Levenshtein similarity
//!
//! ```text
//! sim(a, b) = 1 - lev(a, b) / max(|a|, |b|)
//! ```
//!
//! measured in characters, so identical strings score exactly `1.0` and
//! strings with nothing in common score `0.0`.

use super::{first_argmax, strip, Scorer};
use crate::error::Result;

/// Names a group by its most central member when members are near-identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditScorer;

impl EditScorer {
    /// Create an edit scorer.
    pub fn new() -> Self {
        Self
    }

    /// Row sums of the pairwise similarity matrix (self-pairs included).
    fn row_sums(members: &[&str]) -> Vec<f64> {
        members
            .iter()
            .map(|a| members.iter().map(|b| similarity(a, b)).sum())
            .collect()
    }
}

impl Scorer for EditScorer {
    /// Mean similarity over all unordered member pairs.
    fn condition(&self, group: &[&str]) -> f64 {
        let members = strip(group);
        if members.len() <= 1 {
            return 0.0;
        }

        let mut total = 0.0;
        let mut pairs = 0usize;
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                total += similarity(a, b);
                pairs += 1;
            }
        }
        total / pairs as f64
    }

    /// Member with the largest row sum of pairwise similarities.
    fn selection(&self, group: &[&str]) -> Result<String> {
        let members = strip(group);
        Ok(first_argmax(&Self::row_sums(&members))
            .map(|i| members[i].to_string())
            .unwrap_or_default())
    }
}

/// Normalized Levenshtein similarity in `[0, 1]`; two empty strings are
/// identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Levenshtein distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row DP.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
