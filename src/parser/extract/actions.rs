//! Section E1: corrective action.

use super::{locate, Fields, RowContext};
use crate::document::Row;
use crate::records::ActionRecord;

pub(crate) const FIELDS: &Fields = &[
    &["corrective", "action"],
    &["pic", "responsib", "person"],
    &["date"],
];
const MIN_COLUMNS: usize = 3;

pub fn extract(ctx: &RowContext, row: &Row) -> Option<ActionRecord> {
    let cols = locate(ctx.header, row, FIELDS, MIN_COLUMNS)?;
    Some(ActionRecord {
        document_id: ctx.document_id.to_string(),
        car_no: String::new(),
        seq: ctx.seq,
        corrective_action: row.text(cols[0]),
        responsible_party: row.text(cols[1]),
        implementation_date: row.text(cols[2]),
    })
}
