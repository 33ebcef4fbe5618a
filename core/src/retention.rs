//! New vs repeat customer mix.

use crate::{
    aggregate::Reported,
    types::{round1, OrderId},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerOrder {
    pub customer_id: String,
    pub order_id: OrderId,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct CustomerMix {
    pub customers: usize,
    pub new_pct: f64,
    pub repeat_pct: f64,
}

/// A customer with two or more distinct orders is a repeat customer.
pub fn customer_mix(orders: &[CustomerOrder]) -> Reported<CustomerMix> {
    let mut per_customer: HashMap<&str, HashSet<&str>> = HashMap::new();
    for o in orders {
        per_customer
            .entry(o.customer_id.as_str())
            .or_default()
            .insert(o.order_id.as_str());
    }
    if per_customer.is_empty() {
        return Reported::NoData;
    }

    let customers = per_customer.len();
    let repeat = per_customer.values().filter(|ids| ids.len() >= 2).count();
    let repeat_share = repeat as f64 / customers as f64 * 100.0;
    Reported::Value(CustomerMix {
        customers,
        new_pct: round1(100.0 - repeat_share),
        repeat_pct: round1(repeat_share),
    })
}
