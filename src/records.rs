//! Output records, one struct per report section.
//!
//! Field values stay strings: costs carry thousands separators and
//! placeholders like "TBA" that only the caller knows how to interpret.

use serde::{Deserialize, Serialize};

use crate::parser::sections::SectionTag;

/// Section A: report header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    pub document_id: String,
    pub car_no: String,
    pub issue_date: String,
    pub reporter: String,
    pub department: String,
    pub client: String,
    pub location: String,
    pub well_no: String,
    pub project: String,
}

impl CarRecord {
    /// Fill empty fields from `other`; fields already set are kept.
    pub fn merge(&mut self, other: CarRecord) {
        fn take(dst: &mut String, src: String) {
            if dst.is_empty() && !src.is_empty() {
                *dst = src;
            }
        }
        take(&mut self.car_no, other.car_no);
        take(&mut self.issue_date, other.issue_date);
        take(&mut self.reporter, other.reporter);
        take(&mut self.department, other.department);
        take(&mut self.client, other.client);
        take(&mut self.location, other.location);
        take(&mut self.well_no, other.well_no);
        take(&mut self.project, other.project);
    }
}

/// Section B1: chronology / findings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChronologyRecord {
    pub document_id: String,
    pub car_no: String,
    pub seq: usize,
    pub date: String,
    pub time: String,
    pub details: String,
}

/// Section B2: cost impact breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub document_id: String,
    pub car_no: String,
    pub seq: usize,
    pub breakdown: String,
    pub cost_myr: String,
}

/// Section C: one bullet answer of one why step of one causal factor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CausalAnswerRecord {
    pub document_id: String,
    pub car_no: String,
    pub seq: usize,
    pub causal_factor: String,
    pub why: String,
    pub answer: String,
    pub clause_mapped: Option<String>,
    pub cosine_similarity_pct: Option<f64>,
    pub euclidean_distance_pct: Option<f64>,
}

/// Section D: correction taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub document_id: String,
    pub car_no: String,
    pub seq: usize,
    pub correction_taken: String,
    pub responsible_party: String,
    pub implementation_date: String,
    pub clause_code: String,
}

/// Section E1: corrective action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub document_id: String,
    pub car_no: String,
    pub seq: usize,
    pub corrective_action: String,
    pub responsible_party: String,
    pub implementation_date: String,
}

/// Section E2: conclusion review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConclusionRecord {
    pub document_id: String,
    pub car_no: String,
    pub seq: usize,
    pub accepted: String,
    pub rejected: String,
}

/// A table-row record tagged by the section it came from. Section C answers
/// come from page text and go straight into the report.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    A(CarRecord),
    B1(ChronologyRecord),
    B2(CostRecord),
    D(CorrectionRecord),
    E1(ActionRecord),
    E2(ConclusionRecord),
}

/// The seven ordered section collections for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarReport {
    pub document_id: String,
    #[serde(rename = "Section_A")]
    pub section_a: Vec<CarRecord>,
    #[serde(rename = "Section_B1")]
    pub section_b1: Vec<ChronologyRecord>,
    #[serde(rename = "Section_B2")]
    pub section_b2: Vec<CostRecord>,
    #[serde(rename = "Section_C")]
    pub section_c: Vec<CausalAnswerRecord>,
    #[serde(rename = "Section_D")]
    pub section_d: Vec<CorrectionRecord>,
    #[serde(rename = "Section_E1")]
    pub section_e1: Vec<ActionRecord>,
    #[serde(rename = "Section_E2")]
    pub section_e2: Vec<ConclusionRecord>,
}

/// Headline numbers lifted from a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub car_no: String,
    pub reporter: Option<String>,
    pub location: Option<String>,
    pub total_cost: f64,
}

impl CarReport {
    /// Car number from Section A, else the document id.
    pub fn car_no(&self) -> &str {
        self.section_a
            .first()
            .map(|a| a.car_no.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.document_id)
    }

    pub fn summary(&self) -> ReportSummary {
        let a = self.section_a.first();
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        ReportSummary {
            car_no: self.car_no().to_string(),
            reporter: a.and_then(|a| non_empty(&a.reporter)),
            location: a.and_then(|a| non_empty(&a.location)),
            total_cost: self.section_b2.iter().filter_map(|c| parse_cost(&c.cost_myr)).sum(),
        }
    }

    pub fn record_counts(&self) -> [(SectionTag, usize); 7] {
        [
            (SectionTag::A, self.section_a.len()),
            (SectionTag::B1, self.section_b1.len()),
            (SectionTag::B2, self.section_b2.len()),
            (SectionTag::C, self.section_c.len()),
            (SectionTag::D, self.section_d.len()),
            (SectionTag::E1, self.section_e1.len()),
            (SectionTag::E2, self.section_e2.len()),
        ]
    }
}

/// Parse "12,500.00" / "RM 1,200" into a number; placeholders give `None`.
pub fn parse_cost(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("RM")
        .trim_start_matches("MYR")
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
