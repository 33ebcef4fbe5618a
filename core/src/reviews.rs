//! Review records and the review-quality views of the product dashboard:
//! score distribution, per-category ranking and lateness by score.

use crate::{
    aggregate::{percentage, Reported},
    config::ReviewQualityConfig,
    fulfillment::DerivedFulfillment,
    types::{OrderId, ReviewId, ReviewScore},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRecord {
    pub review_id: ReviewId,
    pub order_id: OrderId,
    pub score: ReviewScore,
    pub comment: Option<String>,
    pub product_category: Option<String>,
}

impl ReviewRecord {
    /// Comment text, or `None` when absent or whitespace only.
    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Keep the first record for every review id.
pub fn dedup_by_review_id(reviews: &[ReviewRecord]) -> Vec<&ReviewRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    reviews
        .iter()
        .filter(|r| seen.insert(r.review_id.as_str()))
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoreCount {
    pub score: ReviewScore,
    pub count: usize,
}

/// Review counts for every score 1..=5, zeros included.
pub fn score_distribution(reviews: &[ReviewRecord]) -> Vec<ScoreCount> {
    let mut counts = [0usize; 5];
    for review in dedup_by_review_id(reviews) {
        if (1..=5).contains(&review.score) {
            counts[usize::from(review.score - 1)] += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| ScoreCount {
            score: i as ReviewScore + 1,
            count,
        })
        .collect()
}

/// Mean of all review scores.
pub fn average_score(reviews: &[ReviewRecord]) -> Reported<f64> {
    let deduped = dedup_by_review_id(reviews);
    if deduped.is_empty() {
        return Reported::NoData;
    }
    let total: f64 = deduped.iter().map(|r| f64::from(r.score)).sum();
    Reported::Value(total / deduped.len() as f64)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryQuality {
    pub category: String,
    pub average_score: f64,
    pub review_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryRanking {
    pub highest: Vec<CategoryQuality>,
    pub lowest: Vec<CategoryQuality>,
}

/// Average score and review count per product category. Categories with
/// fewer than `min_reviews` reviews are dropped. Sorted by category name.
pub fn category_quality(reviews: &[ReviewRecord], min_reviews: usize) -> Vec<CategoryQuality> {
    let mut by_category: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for review in dedup_by_review_id(reviews) {
        let Some(category) = review.product_category.as_deref() else {
            continue;
        };
        let entry = by_category.entry(category).or_insert((0.0, 0));
        entry.0 += f64::from(review.score);
        entry.1 += 1;
    }

    by_category
        .into_iter()
        .filter(|(_, (_, count))| *count >= min_reviews)
        .map(|(category, (sum, count))| CategoryQuality {
            category: category.to_string(),
            average_score: sum / count as f64,
            review_count: count,
        })
        .collect()
}

/// Best and worst rated categories among those with enough reviews.
pub fn rank_categories(reviews: &[ReviewRecord], config: &ReviewQualityConfig) -> CategoryRanking {
    let quality = category_quality(reviews, config.min_reviews);

    // Stable sorts keep name order between equal averages.
    let mut highest = quality.clone();
    highest.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
    highest.truncate(config.top_n);

    let mut lowest = quality;
    lowest.sort_by(|a, b| a.average_score.total_cmp(&b.average_score));
    lowest.truncate(config.top_n);

    CategoryRanking { highest, lowest }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatenessByScore {
    pub score: ReviewScore,
    pub reviews: usize,
    pub late_pct: Reported<f64>,
}

/// Share of late deliveries among reviewed orders, per review score.
///
/// Reviews whose order was excluded from lateness derivation are skipped.
pub fn late_pct_by_score<'a>(
    reviews: &[ReviewRecord],
    derived: impl IntoIterator<Item = &'a DerivedFulfillment>,
) -> Vec<LatenessByScore> {
    // All items of an order share the customer delivery timestamps, so the
    // first derived row per order stands for the order.
    let mut on_time_by_order: HashMap<&str, bool> = HashMap::new();
    for row in derived {
        on_time_by_order
            .entry(row.order_id.as_str())
            .or_insert(row.lateness.is_on_time);
    }

    let mut late_flags: BTreeMap<ReviewScore, Vec<bool>> =
        (1..=5).map(|s| (s, Vec::new())).collect();
    for review in dedup_by_review_id(reviews) {
        let Some(&on_time) = on_time_by_order.get(review.order_id.as_str()) else {
            continue;
        };
        if let Some(flags) = late_flags.get_mut(&review.score) {
            flags.push(!on_time);
        }
    }

    late_flags
        .into_iter()
        .map(|(score, flags)| LatenessByScore {
            score,
            reviews: flags.len(),
            late_pct: percentage(flags),
        })
        .collect()
}
