pub mod actions;
pub mod car;
pub mod chronology;
pub mod conclusion;
pub mod corrections;
pub mod cost;

use tracing::debug;

use super::causal::CausalBlock;
use super::sections::SectionTag;
use crate::document::Row;
use crate::records::*;

/// What an extractor knows about the row it is looking at.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub document_id: &'a str,
    /// 1-based position the record will take in its section.
    pub seq: usize,
    /// Row that named the section's columns, if any.
    pub header: Option<&'a Row>,
}

/// Run the extractor bound to `tag`.
pub fn extract_row(tag: SectionTag, ctx: &RowContext, row: &Row) -> Option<Record> {
    match tag {
        SectionTag::A => car::extract(ctx, row).map(Record::A),
        SectionTag::B1 => chronology::extract(ctx, row).map(Record::B1),
        SectionTag::B2 => cost::extract(ctx, row).map(Record::B2),
        SectionTag::D => corrections::extract(ctx, row).map(Record::D),
        SectionTag::E1 => actions::extract(ctx, row).map(Record::E1),
        SectionTag::E2 => conclusion::extract(ctx, row).map(Record::E2),
        // Section C comes from page text, not tables.
        SectionTag::C | SectionTag::None => None,
    }
}

/// Column keywords for each field of a section, in field order.
pub(crate) type Fields = [&'static [&'static str]];

fn column_keywords(tag: SectionTag) -> Option<&'static Fields> {
    match tag {
        SectionTag::B1 => Some(chronology::FIELDS),
        SectionTag::B2 => Some(cost::FIELDS),
        SectionTag::D => Some(corrections::FIELDS),
        SectionTag::E1 => Some(actions::FIELDS),
        SectionTag::E2 => Some(conclusion::FIELDS),
        _ => None,
    }
}

/// Find every field's column in `header`. All fields must be named.
pub(crate) fn named_columns(header: &Row, fields: &Fields) -> Option<Vec<usize>> {
    let mut taken: Vec<usize> = Vec::with_capacity(fields.len());
    for keywords in fields {
        let idx = (0..header.len()).find(|i| {
            !taken.contains(i)
                && header.raw(*i).is_some_and(|cell| {
                    let cell = cell.to_lowercase();
                    keywords.iter().any(|kw| cell.contains(kw))
                })
        })?;
        taken.push(idx);
    }
    Some(taken)
}

/// A leading "No." column: "1", "2.", "10".
fn is_row_number(cell: Option<&str>) -> bool {
    cell.map(str::trim)
        .map(|c| c.trim_end_matches('.'))
        .is_some_and(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()))
}

/// Resolve the column of every field for `row`, or `None` when the row is too
/// short. The first `min` fields are required; the rest read as "" if absent.
/// Without named columns a leading row number, or a blank spare column, is skipped.
pub(crate) fn locate(
    header: Option<&Row>,
    row: &Row,
    fields: &Fields,
    min: usize,
) -> Option<Vec<usize>> {
    if row.filled() < min {
        return None;
    }
    let cols = header
        .and_then(|h| named_columns(h, fields))
        .unwrap_or_else(|| {
            let leading = (row.len() > min && is_row_number(row.raw(0)))
                || (row.len() > fields.len() && row.is_blank(0));
            let offset = usize::from(leading);
            (offset..offset + fields.len()).collect()
        });
    if cols.iter().take(min).any(|&c| c >= row.len()) {
        return None;
    }
    Some(cols)
}

/// Accumulates records for one document in row order.
pub struct SectionCollector {
    document_id: String,
    car_rows: Option<CarRecord>,
    b1: Vec<ChronologyRecord>,
    b2: Vec<CostRecord>,
    d: Vec<CorrectionRecord>,
    e1: Vec<ActionRecord>,
    e2: Vec<ConclusionRecord>,
    /// Column-label row seen inside the current section.
    labels: Option<(SectionTag, Row)>,
    dropped: usize,
}

impl SectionCollector {
    pub fn new(document_id: &str) -> Self {
        SectionCollector {
            document_id: document_id.to_string(),
            car_rows: None,
            b1: Vec::new(),
            b2: Vec::new(),
            d: Vec::new(),
            e1: Vec::new(),
            e2: Vec::new(),
            labels: None,
            dropped: 0,
        }
    }

    /// A header row opened a new section.
    pub fn on_header(&mut self) {
        self.labels = None;
    }

    /// A body row of `tag`; `header` is the row that opened the section.
    pub fn on_row(&mut self, tag: SectionTag, header: Option<&Row>, row: &Row) {
        // A row naming every column relabels the section instead of being data.
        if let Some(fields) = column_keywords(tag) {
            if header.and_then(|h| named_columns(h, fields)).is_none()
                && named_columns(row, fields).is_some()
            {
                debug!(section = %tag, "column label row");
                self.labels = Some((tag, row.clone()));
                return;
            }
        }
        let header = match &self.labels {
            Some((t, labels)) if *t == tag => Some(labels),
            _ => header,
        };
        let ctx = RowContext {
            document_id: &self.document_id,
            seq: self.next_seq(tag),
            header,
        };
        match extract_row(tag, &ctx, row) {
            Some(record) => self.push(record),
            None => {
                self.dropped += 1;
                debug!(section = %tag, cells = row.len(), filled = row.filled(), "row dropped");
            }
        }
    }

    fn next_seq(&self, tag: SectionTag) -> usize {
        1 + match tag {
            SectionTag::B1 => self.b1.len(),
            SectionTag::B2 => self.b2.len(),
            SectionTag::D => self.d.len(),
            SectionTag::E1 => self.e1.len(),
            SectionTag::E2 => self.e2.len(),
            _ => 0,
        }
    }

    fn push(&mut self, record: Record) {
        match record {
            Record::A(a) => match &mut self.car_rows {
                Some(existing) => existing.merge(a),
                None => self.car_rows = Some(a),
            },
            Record::B1(r) => self.b1.push(r),
            Record::B2(r) => self.b2.push(r),
            Record::D(r) => self.d.push(r),
            Record::E1(r) => self.e1.push(r),
            Record::E2(r) => self.e2.push(r),
        }
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Assemble the report. The label/value Section A wins over row-based A;
    /// A and E2 fall back to a single default record.
    pub fn finish(self, label_value: Option<CarRecord>, causal: &[CausalBlock]) -> CarReport {
        let document_id = self.document_id;

        let mut car = label_value
            .or(self.car_rows)
            .unwrap_or_default();
        car.document_id = document_id.clone();
        if car.car_no.is_empty() {
            car.car_no = document_id.clone();
        }
        let car_no = car.car_no.clone();

        let mut section_c = Vec::new();
        for block in causal {
            for step in &block.why_chain {
                for answer in &step.answers {
                    section_c.push(CausalAnswerRecord {
                        document_id: document_id.clone(),
                        car_no: car_no.clone(),
                        seq: section_c.len() + 1,
                        causal_factor: block.title.clone(),
                        why: step.why_label.clone(),
                        answer: answer.clone(),
                        ..Default::default()
                    });
                }
            }
        }

        let mut section_e2 = self.e2;
        if section_e2.is_empty() {
            section_e2.push(ConclusionRecord {
                document_id: document_id.clone(),
                seq: 1,
                ..Default::default()
            });
        }

        let mut report = CarReport {
            document_id,
            section_a: vec![car],
            section_b1: self.b1,
            section_b2: self.b2,
            section_c,
            section_d: self.d,
            section_e1: self.e1,
            section_e2,
        };
        stamp_car_no(&mut report, &car_no);
        report
    }
}

fn stamp_car_no(report: &mut CarReport, car_no: &str) {
    report.section_b1.iter_mut().for_each(|r| r.car_no = car_no.to_string());
    report.section_b2.iter_mut().for_each(|r| r.car_no = car_no.to_string());
    report.section_d.iter_mut().for_each(|r| r.car_no = car_no.to_string());
    report.section_e1.iter_mut().for_each(|r| r.car_no = car_no.to_string());
    report.section_e2.iter_mut().for_each(|r| r.car_no = car_no.to_string());
}

// ── Tests ──
