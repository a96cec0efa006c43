//! Section B1: chronology of events / findings.

use super::{locate, Fields, RowContext};
use crate::document::Row;
use crate::records::ChronologyRecord;

pub(crate) const FIELDS: &Fields = &[&["date"], &["time"], &["detail", "description"]];
const MIN_COLUMNS: usize = 3;

pub fn extract(ctx: &RowContext, row: &Row) -> Option<ChronologyRecord> {
    let cols = locate(ctx.header, row, FIELDS, MIN_COLUMNS)?;
    Some(ChronologyRecord {
        document_id: ctx.document_id.to_string(),
        car_no: String::new(),
        seq: ctx.seq,
        date: row.text(cols[0]),
        time: row.text(cols[1]),
        details: row.text(cols[2]),
    })
}
