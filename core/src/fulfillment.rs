//! Fulfillment metrics deriver: per-record lateness.
//!
//! A record takes part only when its order is delivered and all six
//! timestamps are present. Anything else is excluded outright: it is neither
//! on time nor late, and no aggregate ever sees it.

use crate::{
    reviews::ReviewRecord,
    types::{OrderId, Timestamp, YearMonth},
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One denormalized order-item row from the upstream join.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FulfillmentRecord {
    pub order_id: OrderId,
    pub order_status: String,
    pub purchased_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub delivered_carrier_at: Option<Timestamp>,
    pub delivered_customer_at: Option<Timestamp>,
    pub estimated_delivery_at: Option<Timestamp>,
    pub shipping_limit_at: Option<Timestamp>,
    pub customer_region: Option<String>,
    pub product_category: Option<String>,
}

/// The six timestamps, all present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryTimeline {
    pub purchased_at: Timestamp,
    pub approved_at: Timestamp,
    pub delivered_carrier_at: Timestamp,
    pub delivered_customer_at: Timestamp,
    pub estimated_delivery_at: Timestamp,
    pub shipping_limit_at: Timestamp,
}

impl FulfillmentRecord {
    pub fn timeline(&self) -> Option<DeliveryTimeline> {
        Some(DeliveryTimeline {
            purchased_at: self.purchased_at?,
            approved_at: self.approved_at?,
            delivered_carrier_at: self.delivered_carrier_at?,
            delivered_customer_at: self.delivered_customer_at?,
            estimated_delivery_at: self.estimated_delivery_at?,
            shipping_limit_at: self.shipping_limit_at?,
        })
    }
}

/// Signed `later - earlier` in fractional days.
pub fn fractional_days(later: Timestamp, earlier: Timestamp) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 86_400_000.0
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct LatenessMetrics {
    /// Customer delivery minus estimated delivery. Positive means late.
    pub days_late: f64,
    /// `days_late <= 0`; delivering on the estimated instant is on time.
    pub is_on_time: bool,
    /// Carrier handoff minus the seller's shipping deadline.
    pub seller_dispatch_days_late: f64,
    pub seller_dispatched_on_time: bool,
    /// Purchase to customer delivery.
    pub delivery_days: f64,
}

impl LatenessMetrics {
    pub fn from_timeline(t: &DeliveryTimeline) -> Self {
        let days_late = fractional_days(t.delivered_customer_at, t.estimated_delivery_at);
        let seller_dispatch_days_late = fractional_days(t.delivered_carrier_at, t.shipping_limit_at);
        Self {
            days_late,
            is_on_time: days_late <= 0.0,
            seller_dispatch_days_late,
            seller_dispatched_on_time: seller_dispatch_days_late <= 0.0,
            delivery_days: fractional_days(t.delivered_customer_at, t.purchased_at),
        }
    }
}

/// A record that passed eligibility, with its derived columns.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DerivedFulfillment {
    pub order_id: OrderId,
    pub purchase_month: YearMonth,
    pub customer_region: Option<String>,
    pub product_category: Option<String>,
    pub lateness: LatenessMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    NotDelivered,
    MissingTimestamp,
}

/// Derive lateness for one record, or say why it is excluded.
pub fn derive(
    record: &FulfillmentRecord,
    delivered_status: &str,
) -> Result<DerivedFulfillment, Exclusion> {
    if record.order_status != delivered_status {
        return Err(Exclusion::NotDelivered);
    }
    let timeline = record.timeline().ok_or(Exclusion::MissingTimestamp)?;
    Ok(DerivedFulfillment {
        order_id: record.order_id.clone(),
        purchase_month: YearMonth::of(&timeline.purchased_at),
        customer_region: record.customer_region.clone(),
        product_category: record.product_category.clone(),
        lateness: LatenessMetrics::from_timeline(&timeline),
    })
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DerivationOutcome {
    pub derived: Vec<DerivedFulfillment>,
    pub excluded_not_delivered: usize,
    pub excluded_missing_timestamp: usize,
}

impl DerivationOutcome {
    pub fn considered(&self) -> usize {
        self.derived.len()
    }

    pub fn excluded(&self) -> usize {
        self.excluded_not_delivered + self.excluded_missing_timestamp
    }
}

/// Derive every eligible record, preserving input order.
pub fn derive_all(records: &[FulfillmentRecord], delivered_status: &str) -> DerivationOutcome {
    let mut outcome = DerivationOutcome::default();
    for record in records {
        match derive(record, delivered_status) {
            Ok(row) => outcome.derived.push(row),
            Err(Exclusion::NotDelivered) => outcome.excluded_not_delivered += 1,
            Err(Exclusion::MissingTimestamp) => outcome.excluded_missing_timestamp += 1,
        }
    }
    log::debug!(
        "lateness derived for {} of {} records ({} not delivered, {} missing timestamps)",
        outcome.considered(),
        records.len(),
        outcome.excluded_not_delivered,
        outcome.excluded_missing_timestamp,
    );
    outcome
}

/// Region / category drill-down. `None` means "all".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FulfillmentFilter {
    pub region: Option<String>,
    pub category: Option<String>,
}

impl FulfillmentFilter {
    pub fn matches(&self, row: &DerivedFulfillment) -> bool {
        let region_ok = match &self.region {
            Some(region) => row.customer_region.as_deref() == Some(region.as_str()),
            None => true,
        };
        let category_ok = match &self.category {
            Some(category) => row.product_category.as_deref() == Some(category.as_str()),
            None => true,
        };
        region_ok && category_ok
    }

    pub fn apply<'a>(&self, rows: &'a [DerivedFulfillment]) -> Vec<&'a DerivedFulfillment> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }

    /// Reviews of the selected category. Reviews carry no customer region,
    /// so the region part of the filter does not apply to them.
    pub fn apply_reviews<'a>(&self, reviews: &'a [ReviewRecord]) -> Cow<'a, [ReviewRecord]> {
        match &self.category {
            Some(category) => Cow::Owned(
                reviews
                    .iter()
                    .filter(|r| r.product_category.as_deref() == Some(category.as_str()))
                    .cloned()
                    .collect(),
            ),
            None => Cow::Borrowed(reviews),
        }
    }
}
