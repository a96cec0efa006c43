pub mod causal;
pub mod clean;
pub mod extract;
pub mod sections;

use tracing::{debug, info};

use crate::document::Document;
use crate::records::CarReport;
use extract::SectionCollector;
use sections::{RowEvent, Segmenter};

/// Three passes over one document: table rows → sections → records,
/// plus the Section C text grammar. Classification fields stay empty.
pub fn extract_document(doc: &Document, document_id: &str) -> CarReport {
    let mut segmenter = Segmenter::new();
    let mut collector = SectionCollector::new(document_id);
    let mut unassigned = 0usize;

    for row in doc.rows() {
        match segmenter.feed(row) {
            RowEvent::Header(_) => collector.on_header(),
            RowEvent::Data { tag, header, row } => collector.on_row(tag, header, row),
            RowEvent::Unassigned => unassigned += 1,
        }
    }

    let label_value = doc
        .first_page()
        .and_then(|page| extract::car::from_label_value_tables(page, document_id));
    let blocks = causal::parse_causal_blocks(&causal::section_c_text(doc));
    debug!(
        document_id,
        unassigned,
        dropped = collector.dropped(),
        factors = blocks.len(),
        "segmented"
    );

    let report = collector.finish(label_value, &blocks);
    let [a, b1, b2, c, d, e1, e2] = report.record_counts().map(|(_, n)| n);
    info!(document_id, car_no = report.car_no(), a, b1, b2, c, d, e1, e2, "extracted");
    report
}

// ── Tests ──
