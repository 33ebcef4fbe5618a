//! Revenue and order-volume views of the executive dashboard.
//!
//! Two revenue measures exist side by side and are never mixed:
//! item revenue (sum of order-item prices, freight excluded) drives the
//! monthly sales series and the category ranking; payment revenue (sum of
//! payment values) drives the headline total, the monthly payment series and
//! the payment-type split.

use crate::types::{OrderId, YearMonth};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// One order item with the purchase month of its order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleItem {
    pub order_id: OrderId,
    /// `None` when the order is unknown or has no purchase timestamp.
    pub purchase_month: Option<YearMonth>,
    pub product_category: Option<String>,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub order_id: OrderId,
    pub purchase_month: Option<YearMonth>,
    pub payment_type: Option<String>,
    pub value: f64,
}

/// Distinct entity counts read straight from the source tables.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetCounts {
    /// Distinct `customer_unique_id`; one person may hold several customer ids.
    pub customers: usize,
    pub orders: usize,
    pub sellers: usize,
    pub products: usize,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct HeadlineTotals {
    pub revenue: f64,
    pub customers: usize,
    pub orders: usize,
    pub sellers: usize,
    pub products: usize,
}

pub fn headline_totals(payments: &[PaymentRecord], counts: &DatasetCounts) -> HeadlineTotals {
    HeadlineTotals {
        revenue: payments.iter().map(|p| p.value).sum(),
        customers: counts.customers,
        orders: counts.orders,
        sellers: counts.sellers,
        products: counts.products,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlySales {
    pub month: YearMonth,
    pub revenue: f64,
    /// Distinct orders with at least one item in the month.
    pub orders: usize,
}

/// Item revenue and order count per purchase month, oldest first. Items
/// without a purchase month are left out.
pub fn monthly_sales(items: &[SaleItem]) -> Vec<MonthlySales> {
    let mut by_month: BTreeMap<YearMonth, (f64, HashSet<&str>)> = BTreeMap::new();
    for item in items {
        let Some(month) = item.purchase_month else {
            continue;
        };
        let entry = by_month.entry(month).or_default();
        entry.0 += item.price;
        entry.1.insert(item.order_id.as_str());
    }
    by_month
        .into_iter()
        .map(|(month, (revenue, orders))| MonthlySales {
            month,
            revenue,
            orders: orders.len(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyRevenue {
    pub month: YearMonth,
    pub revenue: f64,
}

/// Payment revenue per purchase month, oldest first.
pub fn monthly_payment_revenue(payments: &[PaymentRecord]) -> Vec<MonthlyRevenue> {
    let mut by_month: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for payment in payments {
        if let Some(month) = payment.purchase_month {
            *by_month.entry(month).or_default() += payment.value;
        }
    }
    by_month
        .into_iter()
        .map(|(month, revenue)| MonthlyRevenue { month, revenue })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
    pub items: usize,
}

/// Categories with the highest item revenue, ties broken by name.
pub fn top_categories_by_revenue(items: &[SaleItem], top_n: usize) -> Vec<CategoryRevenue> {
    let mut by_category: HashMap<&str, (f64, usize)> = HashMap::new();
    for item in items {
        if let Some(category) = item.product_category.as_deref() {
            let entry = by_category.entry(category).or_insert((0.0, 0));
            entry.0 += item.price;
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<CategoryRevenue> = by_category
        .into_iter()
        .map(|(category, (revenue, items))| CategoryRevenue {
            category: category.to_string(),
            revenue,
            items,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.category.cmp(&b.category))
    });
    ranked.truncate(top_n);
    ranked
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentTypeShare {
    pub payment_type: String,
    pub revenue: f64,
    /// Fraction of typed payment revenue, 0..=1.
    pub share: f64,
}

/// Payment revenue split by payment type, largest first. Payments without a
/// type are left out of both the split and its total.
pub fn payment_type_shares(payments: &[PaymentRecord]) -> Vec<PaymentTypeShare> {
    let mut by_type: BTreeMap<&str, f64> = BTreeMap::new();
    for payment in payments {
        if let Some(kind) = payment.payment_type.as_deref() {
            *by_type.entry(kind).or_default() += payment.value;
        }
    }
    let total: f64 = by_type.values().sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut shares: Vec<PaymentTypeShare> = by_type
        .into_iter()
        .map(|(kind, revenue)| PaymentTypeShare {
            payment_type: kind.to_string(),
            revenue,
            share: revenue / total,
        })
        .collect();
    // Stable: equal revenue keeps type-name order.
    shares.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    shares
}
