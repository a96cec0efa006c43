//! Section E2: conclusion review, one accepted/rejected mark per row.

use super::{locate, Fields, RowContext};
use crate::document::Row;
use crate::records::ConclusionRecord;

pub(crate) const FIELDS: &Fields = &[&["accept"], &["reject"]];
const MIN_COLUMNS: usize = 1;

pub fn extract(ctx: &RowContext, row: &Row) -> Option<ConclusionRecord> {
    let cols = locate(ctx.header, row, FIELDS, MIN_COLUMNS)?;
    Some(ConclusionRecord {
        document_id: ctx.document_id.to_string(),
        car_no: String::new(),
        seq: ctx.seq,
        accepted: row.text(cols[0]),
        rejected: row.text(cols[1]),
    })
}
