//! Clause taxonomy: ordered `clause_id -> clause_detail` loaded from JSON rows.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::TaxonomyError;

#[derive(Debug, Deserialize)]
struct TaxonomyRow {
    clause_id: String,
    #[serde(default)]
    clause_detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyEntry {
    pub clause_id: String,
    pub detail: String,
}

/// Immutable, ordered clause list. A clause id listed twice keeps its first
/// position and its last detail.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
    index: HashMap<String, usize>,
}

impl Taxonomy {
    /// Build from `(clause_id, detail)` pairs. Rows with an absent or blank
    /// detail are skipped; nothing left is an error.
    pub fn from_rows<I, S>(rows: I) -> Result<Self, TaxonomyError>
    where
        I: IntoIterator<Item = (S, Option<S>)>,
        S: Into<String>,
    {
        let mut entries: Vec<TaxonomyEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0usize;
        for (id, detail) in rows {
            let clause_id: String = id.into();
            let clause_id = clause_id.trim().to_string();
            let detail: String = detail.map(Into::into).unwrap_or_default();
            let detail = detail.trim();
            if clause_id.is_empty() || detail.is_empty() {
                skipped += 1;
                continue;
            }
            match index.get(&clause_id) {
                Some(&pos) => entries[pos].detail = detail.to_string(),
                None => {
                    index.insert(clause_id.clone(), entries.len());
                    entries.push(TaxonomyEntry { clause_id, detail: detail.to_string() });
                }
            }
        }
        if skipped > 0 {
            debug!(skipped, "taxonomy rows without detail skipped");
        }
        if entries.is_empty() {
            return Err(TaxonomyError::Empty);
        }
        Ok(Taxonomy { entries, index })
    }

    /// Parse `[{"clause_id": "...", "clause_detail": "..."}, ...]`.
    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        let rows: Vec<TaxonomyRow> = serde_json::from_str(json)?;
        Self::from_rows(rows.into_iter().map(|r| (r.clause_id, r.clause_detail)))
    }

    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let taxonomy = Self::from_json(&raw)?;
        info!(path = %path.display(), clauses = taxonomy.len(), "taxonomy loaded");
        Ok(taxonomy)
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, clause_id: &str) -> Option<usize> {
        self.index.get(clause_id).copied()
    }
}

// ── Tests ──
