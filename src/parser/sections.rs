use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionTag {
    A,
    B1,
    B2,
    C,
    D,
    E1,
    E2,
    #[serde(rename = "NONE")]
    None,
}

impl SectionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionTag::A => "A",
            SectionTag::B1 => "B1",
            SectionTag::B2 => "B2",
            SectionTag::C => "C",
            SectionTag::D => "D",
            SectionTag::E1 => "E1",
            SectionTag::E2 => "E2",
            SectionTag::None => "NONE",
        }
    }
}

impl fmt::Display for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header keywords in precedence order. A probe can hit several rules
/// ("cost impact" next to "finding"), the first rule listed wins.
const HEADER_RULES: &[(SectionTag, &[&str])] = &[
    (SectionTag::A, &["car no"]),
    (SectionTag::B1, &["chronology", "finding"]),
    (SectionTag::B2, &["cost impact", "myr"]),
    (SectionTag::D, &["correction taken"]),
    (SectionTag::E1, &["corrective action"]),
    (SectionTag::E2, &["accepted", "rejected"]),
];

/// Which section a row's probe announces, if any.
pub fn detect_header(probe: &str) -> Option<SectionTag> {
    HEADER_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| probe.contains(kw)))
        .map(|(tag, _)| *tag)
}

/// What the segmenter decided for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowEvent<'a> {
    /// The row switched the current section; no record comes from it.
    Header(SectionTag),
    /// A body row of `tag`. `header` is the row that opened the section.
    Data {
        tag: SectionTag,
        header: Option<&'a Row>,
        row: &'a Row,
    },
    /// Body row seen before any header.
    Unassigned,
}

/// Row-by-row section state. One instance per segmentation call, so no
/// state can leak from one document into the next.
#[derive(Debug, Default)]
pub struct Segmenter<'a> {
    tag: Option<SectionTag>,
    header: Option<&'a Row>,
}

impl<'a> Segmenter<'a> {
    pub fn new() -> Self {
        Segmenter::default()
    }

    pub fn current(&self) -> SectionTag {
        self.tag.unwrap_or(SectionTag::None)
    }

    pub fn feed(&mut self, row: &'a Row) -> RowEvent<'a> {
        if let Some(tag) = detect_header(&row.probe()) {
            if self.tag != Some(tag) {
                debug!(from = %self.current(), to = %tag, "section switch");
            }
            self.tag = Some(tag);
            self.header = Some(row);
            return RowEvent::Header(tag);
        }
        match self.tag {
            Some(tag) => RowEvent::Data {
                tag,
                header: self.header,
                row,
            },
            None => RowEvent::Unassigned,
        }
    }
}

// ── Tests ──
