//! Section D: correction taken. The clause code column is optional.

use super::{locate, Fields, RowContext};
use crate::document::Row;
use crate::records::CorrectionRecord;

pub(crate) const FIELDS: &Fields = &[
    &["correction", "action"],
    &["pic", "responsib", "person"],
    &["date"],
    &["clause"],
];
const MIN_COLUMNS: usize = 3;

pub fn extract(ctx: &RowContext, row: &Row) -> Option<CorrectionRecord> {
    let cols = locate(ctx.header, row, FIELDS, MIN_COLUMNS)?;
    Some(CorrectionRecord {
        document_id: ctx.document_id.to_string(),
        car_no: String::new(),
        seq: ctx.seq,
        correction_taken: row.text(cols[0]),
        responsible_party: row.text(cols[1]),
        implementation_date: row.text(cols[2]),
        clause_code: row.text(cols[3]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RowContext<'static> {
        RowContext { document_id: "DOC", seq: 1, header: None }
    }

    #[test]
    fn two_cells_dropped() {
        assert!(extract(&ctx(), &Row::from(vec!["Replace seal", "Ali"])).is_none());
        assert!(extract(&ctx(), &Row::from(vec![Some("Replace seal"), Some("Ali"), None])).is_none());
    }

    #[test]
    fn three_cells_kept_without_clause() {
        let r = extract(&ctx(), &Row::from(vec!["Replace seal", "Ali", "2024-02-01"])).unwrap();
        assert_eq!(r.correction_taken, "Replace seal");
        assert_eq!(r.responsible_party, "Ali");
        assert_eq!(r.implementation_date, "2024-02-01");
        assert_eq!(r.clause_code, "");
    }

    #[test]
    fn four_cells_with_clause() {
        let r = extract(&ctx(), &Row::from(vec!["Replace seal", "Ali", "2024-02-01", "7.1.3"])).unwrap();
        assert_eq!(r.clause_code, "7.1.3");
    }

    #[test]
    fn absent_middle_cell_reads_empty() {
        let r = extract(
            &ctx(),
            &Row::from(vec![Some("Replace seal"), None, Some("2024-02-01"), Some("7.1.3")]),
        )
        .unwrap();
        assert_eq!(r.responsible_party, "");
        assert_eq!(r.implementation_date, "2024-02-01");
    }
}
