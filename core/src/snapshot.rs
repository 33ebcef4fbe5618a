//! One fully materialized copy of the source tables.
//!
//! A snapshot is loaded once per computation pass and handed to the
//! analytics by reference. Nothing in the core caches it between passes.

use crate::{
    fulfillment::FulfillmentRecord,
    leads::{ClosedDeal, LeadRecord},
    retention::CustomerOrder,
    revenue::{DatasetCounts, PaymentRecord, SaleItem},
    reviews::ReviewRecord,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatasetSnapshot {
    pub fulfillment: Vec<FulfillmentRecord>,
    pub reviews: Vec<ReviewRecord>,
    pub leads: Vec<LeadRecord>,
    pub deals: Vec<ClosedDeal>,
    pub customer_orders: Vec<CustomerOrder>,
    pub sale_items: Vec<SaleItem>,
    pub payments: Vec<PaymentRecord>,
    pub counts: DatasetCounts,
}
