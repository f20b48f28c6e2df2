//! Wikidata reconciliation cache.
//!
//! The reconciliation client runs separately and persists its results as
//! `wikidata-reconciliation.json`:
//!
//! ```json
//! { "meta": {...},
//!   "matched":   [{"type": "person", "name": "...", "qid": "Q...", "label": "...", "match": "exact_label"}],
//!   "unmatched": [{"type": "work", "name": "...", "komponist": "..."}],
//!   "skipped":   [{"type": "location", "name": "...", "existing_qid": "Q..."}] }
//! ```
//!
//! The transform only reads it: matched ids fill index entries that have no id
//! of their own (see [`crate::index::EntityIndex::build`]).

use crate::error::{Result, TransformError};
use crate::index::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_name_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub qid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub komponist: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub komponist: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    /// Either the id already present in the index or a skip reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_qid: Option<String>,
}

/// Persisted reconciliation results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationCache {
    #[serde(default)]
    pub meta: CacheMeta,
    #[serde(default)]
    pub matched: Vec<MatchedEntry>,
    #[serde(default)]
    pub unmatched: Vec<UnmatchedEntry>,
    #[serde(default)]
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationStatus {
    Matched,
    Unmatched,
    Skipped,
    Unknown,
}

impl ReconciliationCache {
    pub fn from_json(path: &Path, text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| TransformError::Cache {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TransformError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cache = Self::from_json(path, &text)?;
        tracing::info!(
            path = %path.display(),
            matched = cache.matched.len(),
            unmatched = cache.unmatched.len(),
            skipped = cache.skipped.len(),
            "loaded reconciliation cache"
        );
        Ok(cache)
    }

    /// Matched entries of one kind, keyed by case-folded name. Later entries win.
    pub fn matches_for(&self, kind: EntityKind) -> HashMap<String, &MatchedEntry> {
        self.matched
            .iter()
            .filter(|m| m.kind == kind.cache_type())
            .map(|m| (m.name.trim().to_lowercase(), m))
            .collect()
    }

    /// Status of `(kind, name)`, compared on case-folded names like [`Self::matches_for`].
    /// A match takes precedence over the other lists.
    pub fn status(&self, kind: EntityKind, name: &str) -> ReconciliationStatus {
        let wanted = kind.cache_type();
        let name = name.trim().to_lowercase();
        let hit = |entry_kind: &str, entry_name: &str| entry_kind == wanted && entry_name.trim().to_lowercase() == name;
        if self.matched.iter().any(|m| hit(&m.kind, &m.name)) {
            ReconciliationStatus::Matched
        } else if self.unmatched.iter().any(|u| hit(&u.kind, &u.name)) {
            ReconciliationStatus::Unmatched
        } else if self.skipped.iter().any(|s| hit(&s.kind, &s.name)) {
            ReconciliationStatus::Skipped
        } else {
            ReconciliationStatus::Unknown
        }
    }
}
