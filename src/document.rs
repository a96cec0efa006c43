use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::parser::clean::clean_text;

/// One table cell. `None` is an absent cell, which is not the same as "".
pub type Cell = Option<String>;

/// A table row of optional cells. Rows in one table may differ in length,
/// so every access goes through a bounds-checked accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Vec<Cell>);

pub type Table = Vec<Row>;

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Row(cells)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of cells that are present (empty strings count, absent cells don't).
    pub fn filled(&self) -> usize {
        self.0.iter().filter(|c| c.is_some()).count()
    }

    /// Raw cell content; `None` when out of range or absent.
    pub fn raw(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).and_then(|c| c.as_deref())
    }

    /// Cleaned cell text: absent → "", trimmed, whitespace runs collapsed.
    pub fn text(&self, idx: usize) -> String {
        self.raw(idx).map(clean_text).unwrap_or_default()
    }

    /// Whether the cell holds nothing useful (absent, out of range, or blank).
    pub fn is_blank(&self, idx: usize) -> bool {
        self.raw(idx).map_or(true, |s| s.trim().is_empty())
    }

    /// Lower-cased join of the present cells with whitespace collapsed, used
    /// for header detection. Wrapped cells like "CAR\nNo" read as "car no".
    pub fn probe(&self) -> String {
        self.0
            .iter()
            .flatten()
            .map(|c| clean_text(c).to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Vec<Option<&str>>> for Row {
    fn from(cells: Vec<Option<&str>>) -> Self {
        Row(cells.into_iter().map(|c| c.map(str::to_string)).collect())
    }
}

impl From<Vec<&str>> for Row {
    fn from(cells: Vec<&str>) -> Self {
        Row(cells.into_iter().map(|c| Some(c.to_string())).collect())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// An already-tokenized report: pages of text lines plus extracted tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Document { pages }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read a JSON page dump from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading page dump {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing page dump {}", path.display()))
    }

    /// All table rows in page → table → row order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.pages
            .iter()
            .flat_map(|p| p.tables.iter())
            .flat_map(|t| t.iter())
    }

    pub fn first_page(&self) -> Option<&Page> {
        self.pages.first()
    }
}

/// Document id used when none is given: the file stem of the dump.
pub fn id_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "CAR-UNKNOWN".to_string())
}

// ── Tests ──
