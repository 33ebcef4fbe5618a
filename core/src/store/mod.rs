//! SQLite-backed source dataset.
//!
//! RULE: Only the store talks to the database.
//! Analytics take the plain records the store hands out; they never execute
//! SQL and never write results back.

use crate::{
    error::InsightResult,
    snapshot::DatasetSnapshot,
    types::{parse_timestamp, Timestamp},
};
use rusqlite::Connection;

mod leads;
mod orders;
mod payments;
mod reviews;

pub use leads::{DealRow, LeadRow};
pub use orders::{CustomerRow, OrderItemRow, OrderRow, SellerRow};
pub use payments::PaymentRow;
pub use reviews::ReviewRow;

pub struct DatasetStore {
    conn: Connection,
}

impl DatasetStore {
    /// Open for reading and writing, creating the file when missing.
    pub fn open(path: &str) -> InsightResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        Ok(Self { conn })
    }

    /// Open an existing dataset without write access. Fails when the file
    /// does not exist instead of creating an empty one.
    pub fn open_read_only(path: &str) -> InsightResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> InsightResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create the source tables if they do not exist yet.
    pub fn migrate(&self) -> InsightResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_source_tables.sql"))?;
        Ok(())
    }

    /// Read every table once for a single computation pass.
    pub fn load_snapshot(&self) -> InsightResult<DatasetSnapshot> {
        let snapshot = DatasetSnapshot {
            fulfillment: self.fulfillment_records()?,
            reviews: self.review_records()?,
            leads: self.leads()?,
            deals: self.closed_deals()?,
            customer_orders: self.customer_orders()?,
            sale_items: self.sale_items()?,
            payments: self.payment_records()?,
            counts: self.dataset_counts()?,
        };
        log::info!(
            "snapshot loaded: {} fulfillment rows, {} reviews, {} leads, {} deals, {} orders, {} payments",
            snapshot.fulfillment.len(),
            snapshot.reviews.len(),
            snapshot.leads.len(),
            snapshot.deals.len(),
            snapshot.customer_orders.len(),
            snapshot.payments.len(),
        );
        Ok(snapshot)
    }
}

/// Read a TEXT timestamp column. Malformed text is logged and read as absent,
/// which excludes the row from anything that needs the value.
fn timestamp_column(
    row: &rusqlite::Row<'_>,
    idx: usize,
    column: &str,
) -> rusqlite::Result<Option<Timestamp>> {
    let raw: Option<String> = row.get(idx)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        log::warn!("unparseable {column} value '{raw}', treating as missing");
    }
    Ok(parsed)
}
