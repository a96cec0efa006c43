//! Section A: the report header, laid out as label/value pairs.
//!
//! Each label row carries two pairs: the label in column 0 selects the field
//! for column 1, and the paired field for column 4
//! (`CAR No | CAR-001 | | Issue Date | 2024-01-02`).

use super::RowContext;
use crate::document::{Page, Row};
use crate::parser::clean::label_key;
use crate::records::CarRecord;

/// Apply one label row to `record`. Returns false for unknown labels.
fn apply_label(record: &mut CarRecord, row: &Row) -> bool {
    let (first, second) = (row.text(1), row.text(4));
    match label_key(row.raw(0).unwrap_or_default()).as_str() {
        "car no" => {
            record.car_no = first;
            record.issue_date = second;
        }
        "reporter" => {
            record.reporter = first;
            record.department = second;
        }
        "client" => {
            record.client = first;
            record.location = second;
        }
        "well no" => {
            record.well_no = first;
            record.project = second;
        }
        _ => return false,
    }
    true
}

/// Row-based Section A: one label row after an A header.
pub fn extract(ctx: &RowContext, row: &Row) -> Option<CarRecord> {
    if row.filled() < 2 {
        return None;
    }
    let mut record = CarRecord {
        document_id: ctx.document_id.to_string(),
        ..Default::default()
    };
    apply_label(&mut record, row).then_some(record)
}

fn is_label_value_table(table: &[Row]) -> bool {
    table
        .iter()
        .any(|row| row.len() >= 2 && label_key(row.raw(0).unwrap_or_default()) == "car no")
}

/// Section A from the fixed label/value table on the first page.
pub fn from_label_value_tables(page: &Page, document_id: &str) -> Option<CarRecord> {
    let table = page.tables.iter().find(|t| is_label_value_table(t))?;
    let mut record = CarRecord {
        document_id: document_id.to_string(),
        ..Default::default()
    };
    for row in table.iter().filter(|r| r.len() >= 2) {
        apply_label(&mut record, row);
    }
    Some(record)
}
