use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw job posting as handed over by the scanner. Immutable once created;
/// the engine borrows it for the duration of a batch and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPosting {
    pub source_id: String,
    pub source_name: String,
    pub url: String,
    /// Posting title as reported by the source, when the scanner could
    /// separate it from the body.
    #[serde(default)]
    pub title: Option<String>,
    /// Hiring company as reported by the source.
    #[serde(default)]
    pub company: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub raw_text: String,
}

/// Canonical form of a posting's text, produced once by the normalizer and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalText {
    /// Lowercased, markup-stripped, whitespace-collapsed text used for all
    /// matching decisions.
    pub normalized_text: String,
    /// Original-case copy (markup-stripped) preserved for display.
    pub display_text: String,
    /// Ordered tokens from `normalized_text`. Protected tokens ("c++",
    /// "node.js") survive as single entries.
    pub tokens: Vec<String>,
    pub language_tag: String,
}

/// Stable reference to a posting within a batch: the arena index plus the
/// source id used for deterministic tie-breaking downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingRef {
    pub index: usize,
    pub source_id: String,
}

impl PostingRef {
    pub fn new(index: usize, source_id: impl Into<String>) -> Self {
        Self {
            index,
            source_id: source_id.into(),
        }
    }
}

// Total order (index is unique within a batch) so refs can live in ordered
// sets like `DuplicateGroup::members`.
impl PartialOrd for PostingRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PostingRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.source_id.cmp(&other.source_id))
    }
}
