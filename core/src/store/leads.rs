use super::{timestamp_column, DatasetStore};
use crate::{
    error::InsightResult,
    leads::{ClosedDeal, LeadRecord},
};
use rusqlite::params;

#[derive(Debug, Clone, Default)]
pub struct LeadRow {
    pub mql_id: String,
    pub first_contact_date: Option<String>,
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DealRow {
    pub mql_id: String,
    pub seller_id: Option<String>,
    pub won_date: Option<String>,
    pub business_segment: Option<String>,
    pub lead_type: Option<String>,
}

impl DatasetStore {
    // ── Seller leads ───────────────────────────────────────────────

    pub fn insert_lead(&self, l: &LeadRow) -> InsightResult<()> {
        self.conn.execute(
            "INSERT INTO marketing_qualified_leads (mql_id, first_contact_date, origin)
             VALUES (?1, ?2, ?3)",
            params![&l.mql_id, l.first_contact_date.as_deref(), l.origin.as_deref()],
        )?;
        Ok(())
    }

    pub fn insert_deal(&self, d: &DealRow) -> InsightResult<()> {
        self.conn.execute(
            "INSERT INTO closed_deals (mql_id, seller_id, won_date, business_segment, lead_type)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &d.mql_id,
                d.seller_id.as_deref(),
                d.won_date.as_deref(),
                d.business_segment.as_deref(),
                d.lead_type.as_deref(),
            ],
        )?;
        Ok(())
    }

    pub fn leads(&self) -> InsightResult<Vec<LeadRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT mql_id, origin, first_contact_date
             FROM marketing_qualified_leads ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LeadRecord {
                mql_id: row.get(0)?,
                origin: row.get(1)?,
                first_contact_at: timestamp_column(row, 2, "first_contact_date")?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn closed_deals(&self) -> InsightResult<Vec<ClosedDeal>> {
        let mut stmt = self.conn.prepare(
            "SELECT mql_id, won_date, lead_type, business_segment
             FROM closed_deals ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ClosedDeal {
                mql_id: row.get(0)?,
                won_at: timestamp_column(row, 1, "won_date")?,
                lead_type: row.get(2)?,
                business_segment: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
