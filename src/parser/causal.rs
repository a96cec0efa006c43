//! Section C: causal factors and their WHY chains, parsed from page text.
//!
//! The grammar is three small passes over the Section C span:
//! factor blocks, then WHY steps inside a block, then bullets inside a step.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::clean::{clean_text, normalize_newlines};
use crate::document::Document;

static FACTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:causal factor|root cause analysis)[# \t]*\d*[ \t]*[:\-–]?[ \t]*").unwrap()
});

static WHY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(why\s?-?\s?\d+)\s*[:\-–—]?").unwrap());

const BULLETS: &[char] = &['•', '●', '▪', '◦', '‣', '\u{f0b7}'];

/// One causal factor with its WHY steps in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CausalBlock {
    pub title: String,
    pub why_chain: Vec<WhyStep>,
}

/// One WHY label and the bullet answers under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhyStep {
    pub why_label: String,
    pub answers: Vec<String>,
}

/// Page text between the "SECTION C" line and the next "SECTION D" line.
/// The start line is kept, the end line is not. Returns "" when Section C
/// never starts.
pub fn section_c_text(doc: &Document) -> String {
    let pages: Vec<String> = doc.pages.iter().map(|p| normalize_newlines(&p.text)).collect();
    let mut inside = false;
    let mut lines: Vec<&str> = Vec::new();
    for text in &pages {
        for line in text.lines() {
            let upper = line.trim().to_uppercase();
            if upper.contains("SECTION C") {
                inside = true;
            } else if upper.contains("SECTION D") {
                inside = false;
            }
            if inside {
                lines.push(line);
            }
        }
    }
    lines.join("\n").trim().to_string()
}

/// Parse the Section C span into causal blocks. Blocks without any WHY
/// label produce nothing.
pub fn parse_causal_blocks(text: &str) -> Vec<CausalBlock> {
    let text = normalize_newlines(text);
    split_factors(&text)
        .into_iter()
        .filter_map(|(title, body)| {
            let why_chain: Vec<WhyStep> = split_steps(body)
                .into_iter()
                .map(|(why_label, answer)| WhyStep {
                    why_label,
                    answers: split_bullets(answer),
                })
                .collect();
            (!why_chain.is_empty()).then_some(CausalBlock { title, why_chain })
        })
        .collect()
}

/// Split on causal-factor markers. Text before the first marker is dropped.
/// The title is the rest of the marker's line, "Factor #n" when blank.
fn split_factors(text: &str) -> Vec<(String, &str)> {
    let marks: Vec<_> = FACTOR_RE.find_iter(text).collect();
    marks
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = marks.get(i + 1).map_or(text.len(), |next| next.start());
            let body = &text[m.end()..end];
            let title = clean_text(body.split('\n').next().unwrap_or_default());
            let title = if title.is_empty() {
                format!("Factor #{}", i + 1)
            } else {
                title
            };
            (title, body)
        })
        .collect()
}

/// Each WHY label with the raw answer running to the next label.
/// Repeated labels stay as separate steps.
fn split_steps(body: &str) -> Vec<(String, &str)> {
    let labels: Vec<_> = WHY_RE.captures_iter(body).collect();
    labels
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let label = caps.get(1)?;
            let end = labels
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(body.len(), |next| next.start());
            Some((clean_text(label.as_str()), &body[whole.end()..end]))
        })
        .collect()
}

/// Bullets of one answer. Without glyphs the whole cleaned answer is the
/// single bullet; with glyphs, text before the first one is dropped.
/// Always returns at least one entry.
fn split_bullets(answer: &str) -> Vec<String> {
    let flat = answer.replace('\n', " ");
    if !flat.contains(BULLETS) {
        return vec![clean_text(&flat)];
    }
    let bullets: Vec<String> = flat
        .split(BULLETS)
        .skip(1)
        .map(clean_text)
        .filter(|b| !b.is_empty())
        .collect();
    if bullets.is_empty() {
        vec![String::new()]
    } else {
        bullets
    }
}

// ── Tests ──
