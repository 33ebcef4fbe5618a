//! Dashboard report: every view the presentation layer draws, built in one
//! pass over a snapshot.
//!
//! EXECUTION ORDER:
//!   1. Fulfillment derivation (eligibility + lateness columns)
//!   2. Fulfillment aggregates over the filtered derived rows
//!   3. Category narrowing of the review set
//!   4. Complaint classification of the negative review subset
//!   5. Review quality (needs the derived rows for lateness by score)
//!   6. Revenue, lead funnel and customer mix
//!
//! The drill-down filter narrows the fulfillment views by region and
//! category, and the review-based views (complaints, review quality) by
//! category. Revenue, leads and customer mix are marketplace-wide.

use crate::{
    aggregate::{
        average_days_late, average_delivery_days, grouped, late_distribution, late_rate,
        most_late_categories, on_time_rate, BinCount, CategoryLateCount, GroupDimension,
        GroupSummary, LatenessKind, Reported,
    },
    complaint_classifier::{CategoryCount, ClassifiedReview, ComplaintClassifier},
    config::InsightConfig,
    error::InsightResult,
    fulfillment::{derive_all, DerivationOutcome, FulfillmentFilter},
    revenue::{
        headline_totals, monthly_payment_revenue, monthly_sales, payment_type_shares,
        top_categories_by_revenue, CategoryRevenue, HeadlineTotals, MonthlyRevenue, MonthlySales,
        PaymentTypeShare,
    },
    leads::{conversion_by_origin, lead_type_shares, LeadTypeShare, OriginConversion},
    retention::{customer_mix, CustomerMix},
    reviews::{
        average_score, late_pct_by_score, rank_categories, score_distribution, CategoryRanking,
        LatenessByScore, ReviewRecord, ScoreCount,
    },
    rng::SampleRng,
    snapshot::DatasetSnapshot,
    types::{ReviewId, ReviewScore},
};
use serde::Serialize;
use std::collections::BTreeMap;

// ── Fulfillment ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FulfillmentKpis {
    pub considered: usize,
    pub excluded_not_delivered: usize,
    pub excluded_missing_timestamp: usize,
    pub on_time_rate: Reported<f64>,
    pub late_rate: Reported<f64>,
    pub dispatch_on_time_rate: Reported<f64>,
    pub average_days_late: Reported<f64>,
    pub average_dispatch_days_late: Reported<f64>,
    pub average_delivery_days: Reported<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FulfillmentReport {
    pub filter: FulfillmentFilter,
    pub kpis: FulfillmentKpis,
    pub monthly: Vec<GroupSummary>,
    pub by_region: Vec<GroupSummary>,
    pub by_category: Vec<GroupSummary>,
    pub customer_lateness: Reported<Vec<BinCount>>,
    pub dispatch_lateness: Reported<Vec<BinCount>>,
    pub most_late_categories: Vec<CategoryLateCount>,
}

impl FulfillmentReport {
    /// Aggregate the derived rows that pass `filter`. Exclusion counts refer
    /// to the whole pass, before filtering.
    pub fn build(
        outcome: &DerivationOutcome,
        filter: &FulfillmentFilter,
        config: &InsightConfig,
    ) -> InsightResult<Self> {
        let customer_bins = config.fulfillment.customer_bins()?;
        let dispatch_bins = config.fulfillment.dispatch_bins()?;
        let rows = filter.apply(&outcome.derived);
        let it = || rows.iter().copied();

        let kpis = FulfillmentKpis {
            considered: rows.len(),
            excluded_not_delivered: outcome.excluded_not_delivered,
            excluded_missing_timestamp: outcome.excluded_missing_timestamp,
            on_time_rate: on_time_rate(it(), LatenessKind::CustomerDelivery),
            late_rate: late_rate(it(), LatenessKind::CustomerDelivery),
            dispatch_on_time_rate: on_time_rate(it(), LatenessKind::SellerDispatch),
            average_days_late: average_days_late(it(), LatenessKind::CustomerDelivery),
            average_dispatch_days_late: average_days_late(it(), LatenessKind::SellerDispatch),
            average_delivery_days: average_delivery_days(it()),
        };

        Ok(Self {
            filter: filter.clone(),
            kpis,
            monthly: grouped(it(), GroupDimension::PurchaseMonth),
            by_region: grouped(it(), GroupDimension::Region),
            by_category: grouped(it(), GroupDimension::Category),
            customer_lateness: late_distribution(
                it(),
                LatenessKind::CustomerDelivery,
                &customer_bins,
            ),
            dispatch_lateness: late_distribution(it(), LatenessKind::SellerDispatch, &dispatch_bins),
            most_late_categories: most_late_categories(
                it(),
                config.fulfillment.top_late_categories,
            ),
        })
    }
}

// ── Complaints ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComplaintReport {
    pub negative_score_threshold: ReviewScore,
    pub fallback_label: String,
    pub negative_reviews: usize,
    pub counts: Vec<CategoryCount>,
    /// One label per negative review id.
    pub labels: BTreeMap<ReviewId, String>,
    /// Seeded sample of fallback-labelled comments, for keyword upkeep.
    pub unclassified_sample: Vec<ClassifiedReview>,
}

impl ComplaintReport {
    pub fn build(
        classifier: &ComplaintClassifier,
        reviews: &[ReviewRecord],
        config: &InsightConfig,
    ) -> Self {
        let classified = classifier.classify_negative_reviews(reviews);
        let unclassified = classifier.unclassified(&classified);
        let unclassified_sample = SampleRng::new(config.sampling.seed)
            .sample(&unclassified, config.sampling.sample_size)
            .into_iter()
            .map(|c| (*c).clone())
            .collect();

        Self {
            negative_score_threshold: classifier.negative_score_threshold(),
            fallback_label: classifier.fallback_label().to_string(),
            negative_reviews: classified.len(),
            counts: classifier.category_counts(&classified),
            labels: classified
                .iter()
                .map(|c| (c.review_id.clone(), c.category.clone()))
                .collect(),
            unclassified_sample,
        }
    }
}

// ── Reviews ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewReport {
    pub average_score: Reported<f64>,
    pub score_distribution: Vec<ScoreCount>,
    pub ranking: CategoryRanking,
    pub late_pct_by_score: Vec<LatenessByScore>,
}

// ── Revenue ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RevenueReport {
    pub totals: HeadlineTotals,
    pub monthly_sales: Vec<MonthlySales>,
    pub monthly_payment_revenue: Vec<MonthlyRevenue>,
    pub top_categories: Vec<CategoryRevenue>,
    pub payment_type_shares: Vec<PaymentTypeShare>,
}

impl RevenueReport {
    pub fn build(snapshot: &DatasetSnapshot, config: &InsightConfig) -> Self {
        Self {
            totals: headline_totals(&snapshot.payments, &snapshot.counts),
            monthly_sales: monthly_sales(&snapshot.sale_items),
            monthly_payment_revenue: monthly_payment_revenue(&snapshot.payments),
            top_categories: top_categories_by_revenue(
                &snapshot.sale_items,
                config.revenue.top_categories,
            ),
            payment_type_shares: payment_type_shares(&snapshot.payments),
        }
    }
}

// ── Leads ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeadReport {
    pub conversion_by_origin: Vec<OriginConversion>,
    pub lead_type_shares: Vec<LeadTypeShare>,
}

// ── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardReport {
    pub fulfillment: FulfillmentReport,
    pub complaints: ComplaintReport,
    pub reviews: ReviewReport,
    pub revenue: RevenueReport,
    pub leads: LeadReport,
    pub customer_mix: Reported<CustomerMix>,
}

impl DashboardReport {
    pub fn build(snapshot: &DatasetSnapshot, config: &InsightConfig) -> InsightResult<Self> {
        Self::build_filtered(snapshot, config, &FulfillmentFilter::default())
    }

    /// Same as `build`, narrowed by `filter`: fulfillment views by region
    /// and/or category, review-based views by category.
    pub fn build_filtered(
        snapshot: &DatasetSnapshot,
        config: &InsightConfig,
        filter: &FulfillmentFilter,
    ) -> InsightResult<Self> {
        let classifier = ComplaintClassifier::new(config.classifier.clone())?;

        let outcome = derive_all(&snapshot.fulfillment, &config.fulfillment.delivered_status);
        let fulfillment = FulfillmentReport::build(&outcome, filter, config)?;

        // Reviews carry no region, so only the category narrows them.
        let review_filter = FulfillmentFilter {
            region: None,
            category: filter.category.clone(),
        };
        let selected = review_filter.apply_reviews(&snapshot.reviews);
        let complaints = ComplaintReport::build(&classifier, &selected, config);

        let reviews = ReviewReport {
            average_score: average_score(&selected),
            score_distribution: score_distribution(&selected),
            ranking: rank_categories(&selected, &config.review_quality),
            late_pct_by_score: late_pct_by_score(
                &selected,
                review_filter.apply(&outcome.derived),
            ),
        };

        let leads = LeadReport {
            conversion_by_origin: conversion_by_origin(&snapshot.leads, &snapshot.deals),
            lead_type_shares: lead_type_shares(&snapshot.deals),
        };

        log::info!(
            "report built: {} fulfillment rows considered, {} negative reviews classified",
            fulfillment.kpis.considered,
            complaints.negative_reviews,
        );

        Ok(Self {
            fulfillment,
            complaints,
            reviews,
            revenue: RevenueReport::build(snapshot, config),
            leads,
            customer_mix: customer_mix(&snapshot.customer_orders),
        })
    }
}
