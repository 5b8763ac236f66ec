//! The label table produced by a run.
//!
//! One row per original document; one column per depth tier from coarsest to
//! finest, then `original` and `current_labels` (the finest tier again).
//!
//! ```text
//! 3        │ 6           │ 9            │ original            │ current_labels
//! ─────────┼─────────────┼──────────────┼─────────────────────┼───────────────
//! shoes    │ red shoes   │ red shoes    │ red running shoes   │ red shoes
//! shoes    │ blue shoes  │ blue shoes   │ blue suede shoes    │ blue shoes
//! ```

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Column holding the input documents.
pub const ORIGINAL: &str = "original";
/// Column repeating the last tier.
pub const CURRENT_LABELS: &str = "current_labels";

/// Labels computed (or carried over) at one depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tier {
    /// Depth value that produced the tier.
    pub depth: usize,
    /// Distinct clusters found at this depth.
    pub clusters: usize,
    /// True when the labels were copied from the previous tier.
    pub reused: bool,
    /// One label per original document.
    pub labels: Vec<String>,
}

impl Tier {
    /// Column name.
    pub fn name(&self) -> String {
        self.depth.to_string()
    }
}

/// Depth tiers over the original documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    original: Vec<String>,
    tiers: Vec<Tier>,
}

/// One document's view of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    /// Position in the input.
    pub index: usize,
    /// Input document.
    pub original: &'a str,
    /// `(tier name, label)` from coarse to fine.
    pub labels: Vec<(String, &'a str)>,
    /// Label at the finest tier.
    pub current: &'a str,
}

impl LabelTable {
    /// Assemble a table; every tier must have one label per document.
    pub fn new(original: Vec<String>, tiers: Vec<Tier>) -> Result<Self> {
        if let Some(tier) = tiers.iter().find(|t| t.labels.len() != original.len()) {
            return Err(Error::LengthMismatch {
                stage: "tier",
                expected: original.len(),
                found: tier.labels.len(),
            });
        }
        Ok(Self { original, tiers })
    }

    /// Input documents.
    pub fn original(&self) -> &[String] {
        &self.original
    }

    /// All tiers, coarse to fine.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Tier recorded for `depth`.
    pub fn tier(&self, depth: usize) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.depth == depth)
    }

    /// Labels of the finest tier (empty when there are no tiers).
    pub fn current_labels(&self) -> &[String] {
        self.tiers.last().map(|t| t.labels.as_slice()).unwrap_or(&[])
    }

    /// Number of rows (documents).
    pub fn len(&self) -> usize {
        self.original.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Column names in output order.
    pub fn columns(&self) -> Vec<String> {
        self.tiers
            .iter()
            .map(Tier::name)
            .chain([ORIGINAL.to_string(), CURRENT_LABELS.to_string()])
            .collect()
    }

    /// Rows in document order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.original.iter().enumerate().map(move |(i, doc)| Row {
            index: i,
            original: doc,
            labels: self
                .tiers
                .iter()
                .map(|t| (t.name(), t.labels[i].as_str()))
                .collect(),
            current: self
                .tiers
                .last()
                .map(|t| t.labels[i].as_str())
                .unwrap_or(""),
        })
    }

    /// Tab-separated rendering with a header line.
    pub fn to_tsv(&self) -> String {
        let mut out = self.columns().join("\t");
        out.push('\n');
        for row in self.rows() {
            let cells: Vec<String> = row
                .labels
                .iter()
                .map(|(_, label)| *label)
                .chain([row.original, row.current])
                .map(tsv_cell)
                .collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }

    /// JSON array of row objects.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn tsv_cell(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.labels.len() + 2))?;
        for (name, label) in &self.labels {
            map.serialize_entry(name, label)?;
        }
        map.serialize_entry(ORIGINAL, self.original)?;
        map.serialize_entry(CURRENT_LABELS, self.current)?;
        map.end()
    }
}

impl Serialize for LabelTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for row in self.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}
