//! Regex substitution cleaner.

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use super::Normalizer;
use crate::config::CleanerConfig;
use crate::error::Result;
use crate::select::{HeadWord, LastWord};

/// Applies an ordered table of case-insensitive `pattern -> replacement`
/// rules, then trims.
///
/// With a head-word extractor attached, each cleaned document is further
/// reduced to its head word (documents without one become `""`).
#[derive(Clone)]
pub struct RegexCleaner {
    rules: Vec<(Regex, String)>,
    head: Option<Arc<dyn HeadWord>>,
}

impl fmt::Debug for RegexCleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexCleaner")
            .field("rules", &self.rules.len())
            .field("head", &self.head.is_some())
            .finish()
    }
}

impl RegexCleaner {
    /// Compile the configured rules. With `head_word` set, documents are
    /// reduced to their [`LastWord`] head.
    pub fn from_config(config: &CleanerConfig) -> Result<Self> {
        let rules = config
            .rules
            .iter()
            .map(|rule| {
                let regex = RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()?;
                Ok((regex, rule.replacement.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        let head = config
            .head_word
            .then(|| Arc::new(LastWord) as Arc<dyn HeadWord>);
        Ok(Self { rules, head })
    }

    /// Reduce every cleaned document to its head word.
    pub fn with_head_word(mut self, head: Arc<dyn HeadWord>) -> Self {
        self.head = Some(head);
        self
    }

    /// Clean a single document.
    pub fn clean(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (regex, replacement) in &self.rules {
            out = regex.replace_all(&out, replacement.as_str()).into_owned();
        }
        let out = out.trim();
        match &self.head {
            Some(head) => head.head(out).unwrap_or_default(),
            None => out.to_string(),
        }
    }
}

impl Normalizer for RegexCleaner {
    fn normalize(&self, raw: &[String]) -> Result<Vec<String>> {
        Ok(raw.iter().map(|s| self.clean(s)).collect())
    }
}
