use super::DatasetStore;
use crate::{
    error::InsightResult,
    reviews::ReviewRecord,
    types::{title_case_snake, ReviewScore},
};
use rusqlite::params;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ReviewRow {
    pub review_id: String,
    pub order_id: String,
    pub score: i64,
    pub title: Option<String>,
    pub message: Option<String>,
}

impl DatasetStore {
    // ── Reviews ────────────────────────────────────────────────────

    pub fn insert_review(&self, r: &ReviewRow) -> InsightResult<()> {
        self.conn.execute(
            "INSERT INTO order_reviews (
                review_id, order_id, review_score, review_comment_title, review_comment_message
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &r.review_id,
                &r.order_id,
                r.score,
                r.title.as_deref(),
                r.message.as_deref(),
            ],
        )?;
        Ok(())
    }

    /// Reviews with the category of the first item of their order.
    /// A review id seen twice keeps its first row only. When that row has a
    /// score outside 1..=5 the review is dropped with every later duplicate.
    pub fn review_records(&self) -> InsightResult<Vec<ReviewRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.review_id, r.order_id, r.review_score, r.review_comment_message,
                    (SELECT t.product_category_name_english
                       FROM order_items i
                       JOIN products p             ON p.product_id = i.product_id
                       JOIN category_translation t ON t.product_category_name = p.product_category_name
                      WHERE i.order_id = r.order_id
                      ORDER BY i.order_item_id ASC
                      LIMIT 1)
             FROM order_reviews r
             ORDER BY r.rowid ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut reviews = Vec::with_capacity(rows.len());
        let mut duplicates = 0usize;
        for (review_id, order_id, raw_score, comment, category) in rows {
            if !seen.insert(review_id.clone()) {
                duplicates += 1;
                continue;
            }
            let score = match ReviewScore::try_from(raw_score) {
                Ok(s) if (1..=5).contains(&s) => s,
                _ => {
                    log::warn!("review {review_id} has out-of-range score {raw_score}, skipping");
                    continue;
                }
            };
            reviews.push(ReviewRecord {
                review_id,
                order_id,
                score,
                comment,
                product_category: category.map(|c| title_case_snake(&c)),
            });
        }
        if duplicates > 0 {
            log::debug!("collapsed {duplicates} duplicated review ids");
        }
        Ok(reviews)
    }
}
