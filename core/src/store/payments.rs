use super::{timestamp_column, DatasetStore};
use crate::{error::InsightResult, revenue::PaymentRecord, types::YearMonth};
use rusqlite::params;

#[derive(Debug, Clone, Default)]
pub struct PaymentRow {
    pub order_id: String,
    pub payment_sequential: i64,
    pub payment_type: Option<String>,
    pub installments: i64,
    pub value: f64,
}

impl DatasetStore {
    // ── Payments ───────────────────────────────────────────────────

    pub fn insert_payment(&self, p: &PaymentRow) -> InsightResult<()> {
        self.conn.execute(
            "INSERT INTO order_payments (
                order_id, payment_sequential, payment_type, payment_installments, payment_value
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &p.order_id,
                p.payment_sequential,
                p.payment_type.as_deref(),
                p.installments,
                p.value,
            ],
        )?;
        Ok(())
    }

    /// Payments with the purchase month of their order. A payment whose order
    /// is missing still counts toward revenue totals but has no month.
    pub fn payment_records(&self) -> InsightResult<Vec<PaymentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.order_id, o.order_purchase_timestamp, p.payment_type, p.payment_value
             FROM order_payments p
             LEFT JOIN orders o ON o.order_id = p.order_id
             ORDER BY p.rowid ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PaymentRecord {
                order_id: row.get(0)?,
                purchase_month: timestamp_column(row, 1, "order_purchase_timestamp")?
                    .map(|ts| YearMonth::of(&ts)),
                payment_type: row.get(2)?,
                value: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
