//! Section B2: cost impact breakdown. Costs stay as written ("12,000", "TBA").

use super::{locate, Fields, RowContext};
use crate::document::Row;
use crate::records::CostRecord;

pub(crate) const FIELDS: &Fields = &[&["breakdown", "description", "item"], &["myr", "cost(", "amount"]];
const MIN_COLUMNS: usize = 2;

pub fn extract(ctx: &RowContext, row: &Row) -> Option<CostRecord> {
    let cols = locate(ctx.header, row, FIELDS, MIN_COLUMNS)?;
    Some(CostRecord {
        document_id: ctx.document_id.to_string(),
        car_no: String::new(),
        seq: ctx.seq,
        breakdown: row.text(cols[0]),
        cost_myr: row.text(cols[1]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_named_columns() {
        let header = Row::from(vec!["COST IMPACTED BREAKDOWN", "COST(MYR)"]);
        let ctx = RowContext { document_id: "DOC", seq: 1, header: Some(&header) };
        let r = extract(&ctx, &Row::from(vec!["Replacement pump", "12,000.00"])).unwrap();
        assert_eq!(r.breakdown, "Replacement pump");
        assert_eq!(r.cost_myr, "12,000.00");
    }

    #[test]
    fn placeholder_cost_kept() {
        let ctx = RowContext { document_id: "DOC", seq: 2, header: None };
        let r = extract(&ctx, &Row::from(vec!["Downtime", "TBA"])).unwrap();
        assert_eq!(r.cost_myr, "TBA");
    }

    #[test]
    fn single_cell_dropped() {
        let ctx = RowContext { document_id: "DOC", seq: 1, header: None };
        assert!(extract(&ctx, &Row::from(vec![Some("Total"), None])).is_none());
    }
}
