//! Marketplace insights core.
//!
//! Complaint categorization of negative reviews and delivery-performance
//! metrics, plus the review, revenue, lead and customer views the dashboards
//! draw from the same snapshot. Everything here is a pure function of a loaded
//! `DatasetStore` snapshot and an `InsightConfig`.

pub mod aggregate;
pub mod complaint_classifier;
pub mod config;
pub mod error;
pub mod fulfillment;
pub mod leads;
pub mod report;
pub mod retention;
pub mod revenue;
pub mod reviews;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod types;
