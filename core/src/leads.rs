//! Seller acquisition funnel: marketing-qualified leads → closed deals.

use crate::types::{round1, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadRecord {
    pub mql_id: String,
    pub origin: Option<String>,
    pub first_contact_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClosedDeal {
    pub mql_id: String,
    pub won_at: Option<Timestamp>,
    pub lead_type: Option<String>,
    pub business_segment: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OriginConversion {
    pub origin: String,
    pub leads: usize,
    pub deals_closed: usize,
    pub conversion_rate_pct: f64,
}

/// Per lead origin: leads, deals with a won date, and the conversion rate
/// rounded to one decimal. Highest rate first; equal rates by origin name.
/// Leads without an origin are left out.
pub fn conversion_by_origin(leads: &[LeadRecord], deals: &[ClosedDeal]) -> Vec<OriginConversion> {
    let mut won: HashMap<&str, bool> = HashMap::new();
    for deal in deals {
        won.entry(deal.mql_id.as_str()).or_insert(deal.won_at.is_some());
    }

    let mut by_origin: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for lead in leads {
        let Some(origin) = lead.origin.as_deref() else {
            continue;
        };
        let entry = by_origin.entry(origin).or_insert((0, 0));
        entry.0 += 1;
        if won.get(lead.mql_id.as_str()).copied().unwrap_or(false) {
            entry.1 += 1;
        }
    }

    let mut funnel: Vec<OriginConversion> = by_origin
        .into_iter()
        .map(|(origin, (leads, closed))| OriginConversion {
            origin: origin.to_string(),
            leads,
            deals_closed: closed,
            conversion_rate_pct: round1(closed as f64 / leads as f64 * 100.0),
        })
        .collect();
    funnel.sort_by(|a, b| b.conversion_rate_pct.total_cmp(&a.conversion_rate_pct));
    funnel
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeadTypeShare {
    pub lead_type: String,
    pub deals: usize,
    pub share: f64,
}

/// Fraction of closed deals per lead type, largest first.
pub fn lead_type_shares(deals: &[ClosedDeal]) -> Vec<LeadTypeShare> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for deal in deals {
        if let Some(lead_type) = deal.lead_type.as_deref() {
            *counts.entry(lead_type).or_default() += 1;
        }
    }
    let total: usize = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LeadTypeShare> = counts
        .into_iter()
        .map(|(lead_type, deals)| LeadTypeShare {
            lead_type: lead_type.to_string(),
            deals,
            share: deals as f64 / total as f64,
        })
        .collect();
    shares.sort_by(|a, b| b.deals.cmp(&a.deals));
    shares
}
