//! insights-runner: headless report runner for the marketplace dashboards.
//!
//! Usage:
//!   insights-runner --db olist.db
//!   insights-runner --db olist.db --data-dir ./data --json
//!   insights-runner --db olist.db --variant regional --region SP

use anyhow::{bail, Context, Result};
use insights_core::{
    aggregate::Reported,
    config::{ClassifierConfig, InsightConfig},
    fulfillment::FulfillmentFilter,
    report::DashboardReport,
    store::DatasetStore,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let json = args.iter().any(|a| a == "--json");
    let Some(db) = arg_value(&args, "--db") else {
        bail!("--db <path to dataset sqlite file> is required");
    };
    let variant = arg_value(&args, "--variant").unwrap_or("reference");
    let data_dir = arg_value(&args, "--data-dir");

    let config = match data_dir {
        Some(dir) => InsightConfig::load(dir)?,
        None => InsightConfig::with_classifier(preset(variant)?),
    };
    if data_dir.is_some() && variant != "reference" {
        log::warn!("--variant {variant} ignored: keyword table comes from --data-dir");
    }
    let filter = FulfillmentFilter {
        region: arg_value(&args, "--region").map(String::from),
        category: arg_value(&args, "--category").map(String::from),
    };

    // Read-only: a mistyped path fails here instead of yielding an empty report.
    let store = DatasetStore::open_read_only(db)
        .with_context(|| format!("cannot open dataset '{db}'"))?;
    let snapshot = store.load_snapshot()?;
    let report = DashboardReport::build_filtered(&snapshot, &config, &filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(db, variant, &report);
    }
    Ok(())
}

fn preset(variant: &str) -> Result<ClassifierConfig> {
    Ok(match variant {
        "reference" => ClassifierConfig::reference(),
        "regional" => ClassifierConfig::regional(),
        "exploratory" => ClassifierConfig::exploratory(),
        other => bail!("unknown variant '{other}' (reference | regional | exploratory)"),
    })
}

fn print_summary(db: &str, variant: &str, report: &DashboardReport) {
    let f = &report.fulfillment;
    println!("Marketplace insights: insights-runner");
    println!("  db:        {db}");
    println!("  variant:   {variant}");
    if let Some(region) = &f.filter.region {
        println!("  region:    {region}");
    }
    if let Some(category) = &f.filter.category {
        println!("  category:  {category}");
    }
    println!();

    println!("=== FULFILLMENT ===");
    println!("  considered:          {}", f.kpis.considered);
    println!(
        "  excluded:            {} not delivered, {} missing timestamps",
        f.kpis.excluded_not_delivered, f.kpis.excluded_missing_timestamp
    );
    println!("  on-time delivery:    {}", pct(f.kpis.on_time_rate));
    println!("  seller dispatch:     {}", pct(f.kpis.dispatch_on_time_rate));
    println!("  avg days late:       {}", days(f.kpis.average_days_late));
    println!("  avg delivery time:   {}", days(f.kpis.average_delivery_days));
    for c in &f.most_late_categories {
        println!("  late: {:<40} {}", c.category, c.late_records);
    }

    println!();
    println!(
        "=== COMPLAINTS (score <= {}) ===",
        report.complaints.negative_score_threshold
    );
    if report.complaints.counts.is_empty() {
        println!("  (no negative reviews with comments)");
    }
    for c in &report.complaints.counts {
        println!("  {:<40} {}", c.category, c.count);
    }

    println!();
    println!("=== REVIEWS ===");
    println!("  average score:       {}", plain(report.reviews.average_score));
    for s in &report.reviews.score_distribution {
        println!("  {} stars: {}", s.score, s.count);
    }

    println!();
    println!("=== REVENUE ===");
    let totals = &report.revenue.totals;
    println!("  payment revenue:     R$ {:.2}", totals.revenue);
    println!(
        "  customers={} orders={} sellers={} products={}",
        totals.customers, totals.orders, totals.sellers, totals.products
    );
    for m in &report.revenue.monthly_sales {
        println!("  {}  items R$ {:>12.2}  orders {}", m.month, m.revenue, m.orders);
    }
    for c in &report.revenue.top_categories {
        println!("  top: {:<40} R$ {:.2}", c.category, c.revenue);
    }
    for p in &report.revenue.payment_type_shares {
        println!("  {:<20} {:.1}%", p.payment_type, p.share * 100.0);
    }

    println!();
    println!("=== LEADS ===");
    for o in &report.leads.conversion_by_origin {
        println!(
            "  {:<24} leads={:<6} closed={:<5} rate={:.1}%",
            o.origin, o.leads, o.deals_closed, o.conversion_rate_pct
        );
    }
    match report.customer_mix {
        Reported::Value(mix) => println!(
            "  customers: {} (new {:.1}%, repeat {:.1}%)",
            mix.customers, mix.new_pct, mix.repeat_pct
        ),
        Reported::NoData => println!("  customers: no data"),
    }
}

fn pct(v: Reported<f64>) -> String {
    v.value().map_or_else(|| "no data".into(), |x| format!("{x:.1}%"))
}

fn days(v: Reported<f64>) -> String {
    v.value().map_or_else(|| "no data".into(), |x| format!("{x:.1} days"))
}

fn plain(v: Reported<f64>) -> String {
    v.value().map_or_else(|| "no data".into(), |x| format!("{x:.2}"))
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
