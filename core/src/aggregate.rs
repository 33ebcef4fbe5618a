//! Read-only reductions over derived fulfillment rows.
//!
//! Every reduction over an empty input reports `Reported::NoData` rather
//! than a numeric zero. A mean over nothing is undefined, and the display
//! layer must be able to tell it apart from a real 0%.

use crate::{
    error::{InsightError, InsightResult},
    fulfillment::{DerivedFulfillment, LatenessMetrics},
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Reported<T> {
    NoData,
    Value(T),
}

impl<T> Reported<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reported<U> {
        match self {
            Self::Value(v) => Reported::Value(f(v)),
            Self::NoData => Reported::NoData,
        }
    }
}

pub fn mean(values: impl IntoIterator<Item = f64>) -> Reported<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        Reported::NoData
    } else {
        Reported::Value(sum / count as f64)
    }
}

/// Mean of a boolean column, ×100.
pub fn percentage(flags: impl IntoIterator<Item = bool>) -> Reported<f64> {
    mean(flags.into_iter().map(|f| if f { 1.0 } else { 0.0 })).map(|m| m * 100.0)
}

/// Which lateness pair a reduction reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LatenessKind {
    /// Customer delivery against the estimated delivery date.
    CustomerDelivery,
    /// Carrier handoff against the seller's shipping deadline.
    SellerDispatch,
}

impl LatenessKind {
    pub fn days_late(self, m: &LatenessMetrics) -> f64 {
        match self {
            Self::CustomerDelivery => m.days_late,
            Self::SellerDispatch => m.seller_dispatch_days_late,
        }
    }

    pub fn on_time(self, m: &LatenessMetrics) -> bool {
        match self {
            Self::CustomerDelivery => m.is_on_time,
            Self::SellerDispatch => m.seller_dispatched_on_time,
        }
    }
}

pub fn on_time_rate<'a>(
    rows: impl IntoIterator<Item = &'a DerivedFulfillment>,
    kind: LatenessKind,
) -> Reported<f64> {
    percentage(rows.into_iter().map(|r| kind.on_time(&r.lateness)))
}

pub fn late_rate<'a>(
    rows: impl IntoIterator<Item = &'a DerivedFulfillment>,
    kind: LatenessKind,
) -> Reported<f64> {
    percentage(rows.into_iter().map(|r| !kind.on_time(&r.lateness)))
}

/// Mean lateness of the late subset only. On-time rows do not enter the
/// denominator.
pub fn average_days_late<'a>(
    rows: impl IntoIterator<Item = &'a DerivedFulfillment>,
    kind: LatenessKind,
) -> Reported<f64> {
    mean(
        rows.into_iter()
            .filter(|r| !kind.on_time(&r.lateness))
            .map(|r| kind.days_late(&r.lateness)),
    )
}

/// Mean days from purchase to customer delivery.
pub fn average_delivery_days<'a>(
    rows: impl IntoIterator<Item = &'a DerivedFulfillment>,
) -> Reported<f64> {
    mean(rows.into_iter().map(|r| r.lateness.delivery_days))
}

// ── Grouping ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupDimension {
    PurchaseMonth,
    Region,
    Category,
}

impl GroupDimension {
    /// Rows without a value for the dimension belong to no group.
    fn key_of(self, row: &DerivedFulfillment) -> Option<String> {
        match self {
            Self::PurchaseMonth => Some(row.purchase_month.to_string()),
            Self::Region => row.customer_region.clone(),
            Self::Category => row.product_category.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupSummary {
    pub key: String,
    pub records: usize,
    pub on_time_rate: Reported<f64>,
    pub dispatch_on_time_rate: Reported<f64>,
    pub average_days_late: Reported<f64>,
    pub average_dispatch_days_late: Reported<f64>,
}

/// One summary row per group key, sorted by key. Month keys are
/// `YYYY-MM`, so key order is chronological.
pub fn grouped<'a>(
    rows: impl IntoIterator<Item = &'a DerivedFulfillment>,
    dimension: GroupDimension,
) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<String, Vec<&DerivedFulfillment>> = BTreeMap::new();
    for row in rows {
        if let Some(key) = dimension.key_of(row) {
            groups.entry(key).or_default().push(row);
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| GroupSummary {
            records: members.len(),
            on_time_rate: on_time_rate(members.iter().copied(), LatenessKind::CustomerDelivery),
            dispatch_on_time_rate: on_time_rate(
                members.iter().copied(),
                LatenessKind::SellerDispatch,
            ),
            average_days_late: average_days_late(
                members.iter().copied(),
                LatenessKind::CustomerDelivery,
            ),
            average_dispatch_days_late: average_days_late(
                members.iter().copied(),
                LatenessKind::SellerDispatch,
            ),
            key,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryLateCount {
    pub category: String,
    pub late_records: usize,
}

/// Categories with the most late customer deliveries, ties broken by name.
pub fn most_late_categories<'a>(
    rows: impl IntoIterator<Item = &'a DerivedFulfillment>,
    top_n: usize,
) -> Vec<CategoryLateCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        if row.lateness.is_on_time {
            continue;
        }
        if let Some(category) = row.product_category.as_deref() {
            *counts.entry(category).or_default() += 1;
        }
    }

    let mut ranked: Vec<CategoryLateCount> = counts
        .into_iter()
        .map(|(category, late_records)| CategoryLateCount {
            category: category.to_string(),
            late_records,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.late_records
            .cmp(&a.late_records)
            .then_with(|| a.category.cmp(&b.category))
    });
    ranked.truncate(top_n);
    ranked
}

// ── Binned distribution ───────────────────────────────────────────

/// Ordered half-open day ranges `[e0, e1) .. [e(n-1), e(n))` plus a final
/// `[e(n), ∞)` overflow bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct LatenessBins {
    edges: Vec<f64>,
}

impl LatenessBins {
    pub fn new(edges: Vec<f64>) -> InsightResult<Self> {
        let finite = edges.iter().all(|e| e.is_finite());
        let increasing = edges.windows(2).all(|w| w[0] < w[1]);
        if edges.is_empty() || !finite || !increasing {
            return Err(InsightError::InvalidBinEdges { edges });
        }
        Ok(Self { edges })
    }

    pub fn bucket_count(&self) -> usize {
        self.edges.len()
    }

    /// Bucket index for a value; `None` below the first edge.
    pub fn bucket_of(&self, days: f64) -> Option<usize> {
        if days.is_nan() || days < self.edges[0] {
            return None;
        }
        // Number of edges <= days, minus one, is the bucket.
        let at_or_below = self.edges.partition_point(|&e| e <= days);
        Some(at_or_below - 1)
    }

    pub fn label(&self, index: usize) -> String {
        match self.edges.get(index + 1) {
            Some(upper) => format!("{} - {}", self.edges[index], upper),
            None => format!("{}+", self.edges[index]),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BinCount {
    pub label: String,
    pub lower: f64,
    pub upper: Option<f64>,
    pub count: usize,
}

/// Count the late subset per bucket. Every bucket is listed, zeros included.
pub fn late_distribution<'a>(
    rows: impl IntoIterator<Item = &'a DerivedFulfillment>,
    kind: LatenessKind,
    bins: &LatenessBins,
) -> Reported<Vec<BinCount>> {
    let mut counts = vec![0usize; bins.bucket_count()];
    let mut late = 0usize;
    for row in rows {
        if kind.on_time(&row.lateness) {
            continue;
        }
        late += 1;
        if let Some(index) = bins.bucket_of(kind.days_late(&row.lateness)) {
            counts[index] += 1;
        }
    }
    if late == 0 {
        return Reported::NoData;
    }

    Reported::Value(
        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| BinCount {
                label: bins.label(i),
                lower: bins.edges[i],
                upper: bins.edges.get(i + 1).copied(),
                count,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bins() -> LatenessBins {
        LatenessBins::new(vec![0.0, 5.0, 10.0]).unwrap()
    }

    #[test]
    fn buckets_are_half_open() {
        let b = bins();
        assert_eq!(b.bucket_of(0.0), Some(0));
        assert_eq!(b.bucket_of(4.999), Some(0));
        assert_eq!(b.bucket_of(5.0), Some(1));
        assert_eq!(b.bucket_of(10.0), Some(2));
        assert_eq!(b.bucket_of(365.0), Some(2));
        assert_eq!(b.bucket_of(-0.5), None);
    }

    #[test]
    fn labels_end_with_overflow_bucket() {
        let b = bins();
        assert_eq!(b.label(0), "0 - 5");
        assert_eq!(b.label(1), "5 - 10");
        assert_eq!(b.label(2), "10+");
    }

    #[test]
    fn one_bucket_per_edge() {
        let b = bins();
        assert_eq!(b.bucket_count(), 3);
        assert_eq!(b.bucket_of(f64::MAX), Some(b.bucket_count() - 1));
    }

    #[test]
    fn rejects_unordered_or_empty_edges() {
        assert!(LatenessBins::new(vec![]).is_err());
        assert!(LatenessBins::new(vec![0.0, 5.0, 5.0]).is_err());
        assert!(LatenessBins::new(vec![3.0, 1.0]).is_err());
        assert!(LatenessBins::new(vec![0.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn empty_mean_is_no_data_not_zero() {
        assert_eq!(mean(Vec::new()), Reported::NoData);
        assert_eq!(percentage(vec![false, false]), Reported::Value(0.0));
    }
}
