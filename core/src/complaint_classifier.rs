//! Complaint classifier: keyword voting over negative review comments.
//!
//! Every configured keyword found as a substring of the lowercased comment
//! adds one point to its category. The highest score wins; on a tie the
//! category declared first wins; no match at all yields the fallback label.
//! Matching is exact-substring and never folds accents.

use crate::{
    config::ClassifierConfig,
    error::InsightResult,
    reviews::{dedup_by_review_id, ReviewRecord},
    types::{ReviewId, ReviewScore},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryScore {
    pub category: String,
    pub score: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClassifiedReview {
    pub review_id: ReviewId,
    pub score: ReviewScore,
    pub comment: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct ComplaintClassifier {
    config: ClassifierConfig,
}

impl ComplaintClassifier {
    /// Fails when the keyword table is unusable.
    pub fn new(config: ClassifierConfig) -> InsightResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn fallback_label(&self) -> &str {
        &self.config.fallback_label
    }

    pub fn negative_score_threshold(&self) -> ReviewScore {
        self.config.negative_score_threshold
    }

    /// Category names in declared order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.config.categories.iter().map(|c| c.name.as_str())
    }

    fn score_lowered(&self, lowered: &str) -> Vec<usize> {
        self.config
            .categories
            .iter()
            .map(|c| c.keywords.iter().filter(|k| lowered.contains(k.as_str())).count())
            .collect()
    }

    /// Per-category scores in declared order.
    pub fn category_scores(&self, comment: &str) -> Vec<CategoryScore> {
        let lowered = comment.to_lowercase();
        self.config
            .categories
            .iter()
            .zip(self.score_lowered(&lowered))
            .map(|(c, score)| CategoryScore {
                category: c.name.clone(),
                score,
            })
            .collect()
    }

    /// Assign one label to a comment. Total over its input.
    pub fn classify(&self, comment: Option<&str>) -> &str {
        let Some(text) = comment.filter(|c| !c.trim().is_empty()) else {
            return self.fallback_label();
        };
        let scores = self.score_lowered(&text.to_lowercase());

        // Strictly-greater updates only: the first declared category keeps
        // a tied maximum.
        let mut best: Option<(usize, usize)> = None;
        for (index, &score) in scores.iter().enumerate() {
            if score == 0 {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((index, score)),
            }
        }

        match best {
            Some((index, _)) => &self.config.categories[index].name,
            None => self.fallback_label(),
        }
    }

    /// A review is in the negative subset when it carries a comment and
    /// scores at or below the threshold.
    pub fn is_negative(&self, review: &ReviewRecord) -> bool {
        review.score <= self.config.negative_score_threshold && review.comment_text().is_some()
    }

    /// Label every negative review, one row per distinct review id, in input
    /// order.
    pub fn classify_negative_reviews(&self, reviews: &[ReviewRecord]) -> Vec<ClassifiedReview> {
        let classified: Vec<ClassifiedReview> = dedup_by_review_id(reviews)
            .into_iter()
            .filter(|r| self.is_negative(r))
            .map(|r| ClassifiedReview {
                review_id: r.review_id.clone(),
                score: r.score,
                comment: r.comment.clone().unwrap_or_default(),
                category: self.classify(r.comment.as_deref()).to_string(),
            })
            .collect();

        let fallback = classified
            .iter()
            .filter(|c| c.category == self.config.fallback_label)
            .count();
        log::debug!(
            "classified {} negative reviews (score <= {}), {} fell back to '{}'",
            classified.len(),
            self.config.negative_score_threshold,
            fallback,
            self.config.fallback_label,
        );
        classified
    }

    /// Reviews per label, most frequent first. Equal counts keep declared
    /// order with the fallback label last. Labels with no reviews are omitted.
    pub fn category_counts(&self, classified: &[ClassifiedReview]) -> Vec<CategoryCount> {
        let labels: Vec<&str> = self
            .category_names()
            .chain(std::iter::once(self.fallback_label()))
            .collect();

        let mut counts: Vec<CategoryCount> = labels
            .iter()
            .map(|label| CategoryCount {
                category: label.to_string(),
                count: classified.iter().filter(|c| c.category == *label).count(),
            })
            .filter(|c| c.count > 0)
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// Reviews that fell into the fallback bucket.
    pub fn unclassified<'a>(
        &self,
        classified: &'a [ClassifiedReview],
    ) -> Vec<&'a ClassifiedReview> {
        classified
            .iter()
            .filter(|c| c.category == self.config.fallback_label)
            .collect()
    }
}
