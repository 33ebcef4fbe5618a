use chrono::Duration;
use insights_core::{
    aggregate::{
        average_days_late, average_delivery_days, grouped, late_distribution, late_rate,
        most_late_categories, on_time_rate, GroupDimension, LatenessKind, LatenessBins, Reported,
    },
    config::FulfillmentConfig,
    fulfillment::{derive, derive_all, DerivedFulfillment, Exclusion, FulfillmentFilter, FulfillmentRecord},
    types::{parse_timestamp, Timestamp},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn ts(raw: &str) -> Timestamp {
    parse_timestamp(raw).unwrap()
}

fn secs(days: f64) -> Duration {
    Duration::seconds((days * 86_400.0).round() as i64)
}

/// Delivered order purchased at `purchased`. The estimate sits 19 days after
/// purchase and the shipping deadline 4 days after; the actual handoff and
/// delivery are offset from those by the given (signed) days.
fn order_at(id: &str, purchased: &str, days_late: f64, dispatch_days_late: f64) -> FulfillmentRecord {
    let purchased_at = ts(purchased);
    let estimated = purchased_at + Duration::days(19);
    let shipping_limit = purchased_at + Duration::days(4);
    FulfillmentRecord {
        order_id: id.into(),
        order_status: "delivered".into(),
        purchased_at: Some(purchased_at),
        approved_at: Some(purchased_at + Duration::hours(1)),
        delivered_carrier_at: Some(shipping_limit + secs(dispatch_days_late)),
        delivered_customer_at: Some(estimated + secs(days_late)),
        estimated_delivery_at: Some(estimated),
        shipping_limit_at: Some(shipping_limit),
        customer_region: Some("SP".into()),
        product_category: Some("Toys".into()),
    }
}

fn order(id: &str, days_late: f64) -> FulfillmentRecord {
    order_at(id, "2018-01-01 10:00:00", days_late, -1.0)
}

fn derived(records: &[FulfillmentRecord]) -> Vec<DerivedFulfillment> {
    derive_all(records, "delivered").derived
}

fn assert_approx(actual: Reported<f64>, expected: f64) {
    match actual {
        Reported::Value(v) => assert!(
            (v - expected).abs() < 1e-9,
            "expected {expected}, got {v}"
        ),
        Reported::NoData => panic!("expected {expected}, got NoData"),
    }
}

// ── Per-record derivation ────────────────────────────────────────────────────

/// Delivering exactly on the estimated instant counts as on time; one
/// second later does not.
#[test]
fn on_time_boundary_is_inclusive() {
    let exact = derive(&order("o1", 0.0), "delivered").unwrap();
    assert_eq!(exact.lateness.days_late, 0.0);
    assert!(exact.lateness.is_on_time);

    let mut one_second = order("o2", 0.0);
    one_second.delivered_customer_at = one_second
        .estimated_delivery_at
        .map(|t| t + Duration::seconds(1));
    let late = derive(&one_second, "delivered").unwrap();
    assert!(late.lateness.days_late > 0.0);
    assert!(!late.lateness.is_on_time);
}

#[test]
fn lateness_is_measured_in_fractional_days() {
    let half_day = derive(&order("o1", 0.5), "delivered").unwrap();
    assert!((half_day.lateness.days_late - 0.5).abs() < 1e-9);

    let early = derive(&order("o2", -3.25), "delivered").unwrap();
    assert!((early.lateness.days_late + 3.25).abs() < 1e-9);
    assert!(early.lateness.is_on_time);
    assert!((early.lateness.delivery_days - 15.75).abs() < 1e-9);
}

#[test]
fn seller_dispatch_lateness_uses_shipping_deadline() {
    let row = derive(&order_at("o1", "2018-03-10 08:00:00", -2.0, 1.5), "delivered").unwrap();
    assert!((row.lateness.seller_dispatch_days_late - 1.5).abs() < 1e-9);
    assert!(!row.lateness.seller_dispatched_on_time);
    assert!(row.lateness.is_on_time, "customer side is independent");
    assert_eq!(row.purchase_month.to_string(), "2018-03");
}

// ── Eligibility ──────────────────────────────────────────────────────────────

#[test]
fn undelivered_orders_are_excluded_before_timestamps_are_checked() {
    let mut shipped = order("o1", 0.0);
    shipped.order_status = "shipped".into();
    shipped.delivered_customer_at = None;
    assert_eq!(derive(&shipped, "delivered"), Err(Exclusion::NotDelivered));
}

#[test]
fn any_missing_timestamp_excludes_the_record() {
    let strip: [fn(&mut FulfillmentRecord); 6] = [
        |r| r.purchased_at = None,
        |r| r.approved_at = None,
        |r| r.delivered_carrier_at = None,
        |r| r.delivered_customer_at = None,
        |r| r.estimated_delivery_at = None,
        |r| r.shipping_limit_at = None,
    ];
    for clear in strip {
        let mut record = order("o1", 3.0);
        clear(&mut record);
        assert_eq!(derive(&record, "delivered"), Err(Exclusion::MissingTimestamp));
    }
}

#[test]
fn excluded_records_never_reach_the_aggregates() {
    let mut canceled = order("c1", 30.0);
    canceled.order_status = "canceled".into();
    let mut incomplete = order("i1", 30.0);
    incomplete.approved_at = None;
    let records = vec![order("o1", -1.0), canceled, incomplete, order("o2", 2.0)];

    let outcome = derive_all(&records, "delivered");
    assert_eq!(outcome.considered(), 2);
    assert_eq!(outcome.excluded_not_delivered, 1);
    assert_eq!(outcome.excluded_missing_timestamp, 1);
    assert_eq!(outcome.excluded(), 2);

    assert_approx(on_time_rate(&outcome.derived, LatenessKind::CustomerDelivery), 50.0);
    assert_approx(average_days_late(&outcome.derived, LatenessKind::CustomerDelivery), 2.0);
}

#[test]
fn delivered_status_is_configurable() {
    let mut record = order("o1", 0.0);
    record.order_status = "entregue".into();
    assert!(derive(&record, "entregue").is_ok());
    assert_eq!(derive(&record, "delivered"), Err(Exclusion::NotDelivered));
}

// ── Aggregates ───────────────────────────────────────────────────────────────

/// The average covers only the late subset: (2 + 4) / 2.
#[test]
fn average_days_late_ignores_on_time_records() {
    let rows = derived(&[
        order("a", -1.0),
        order("b", 0.0),
        order("c", -5.0),
        order("d", 2.0),
        order("e", 4.0),
    ]);
    assert_approx(average_days_late(&rows, LatenessKind::CustomerDelivery), 3.0);
    assert_approx(on_time_rate(&rows, LatenessKind::CustomerDelivery), 60.0);
    assert_approx(late_rate(&rows, LatenessKind::CustomerDelivery), 40.0);
}

#[test]
fn ten_late_out_of_a_hundred_is_ten_percent() {
    let records: Vec<FulfillmentRecord> = (0..100)
        .map(|i| order(&format!("o{i}"), if i < 10 { 1.0 } else { -1.0 }))
        .collect();
    let rows = derived(&records);
    assert_approx(late_rate(&rows, LatenessKind::CustomerDelivery), 10.0);
    assert_approx(on_time_rate(&rows, LatenessKind::CustomerDelivery), 90.0);
}

#[test]
fn empty_input_reports_no_data() {
    let rows: Vec<DerivedFulfillment> = Vec::new();
    assert_eq!(on_time_rate(&rows, LatenessKind::CustomerDelivery), Reported::NoData);
    assert_eq!(late_rate(&rows, LatenessKind::SellerDispatch), Reported::NoData);
    assert_eq!(average_days_late(&rows, LatenessKind::CustomerDelivery), Reported::NoData);
    assert_eq!(average_delivery_days(&rows), Reported::NoData);
    assert!(grouped(&rows, GroupDimension::Region).is_empty());
}

#[test]
fn all_on_time_means_no_average_lateness() {
    let rows = derived(&[order("a", -2.0), order("b", 0.0)]);
    assert_approx(on_time_rate(&rows, LatenessKind::CustomerDelivery), 100.0);
    assert_eq!(average_days_late(&rows, LatenessKind::CustomerDelivery), Reported::NoData);
}

#[test]
fn average_delivery_days_spans_purchase_to_customer() {
    let rows = derived(&[order("a", 0.0), order("b", 2.0)]);
    assert_approx(average_delivery_days(&rows), 20.0);
}

#[test]
fn dispatch_metrics_are_independent_of_customer_metrics() {
    let rows = derived(&[
        order_at("a", "2018-01-01 10:00:00", 1.0, -1.0),
        order_at("b", "2018-01-01 10:00:00", -1.0, 3.0),
    ]);
    assert_approx(on_time_rate(&rows, LatenessKind::SellerDispatch), 50.0);
    assert_approx(average_days_late(&rows, LatenessKind::SellerDispatch), 3.0);
    assert_approx(average_days_late(&rows, LatenessKind::CustomerDelivery), 1.0);
}

// ── Grouping ─────────────────────────────────────────────────────────────────

#[test]
fn monthly_groups_are_chronological() {
    let rows = derived(&[
        order_at("feb", "2018-02-03 09:00:00", -1.0, -1.0),
        order_at("jan1", "2018-01-05 09:00:00", 2.0, -1.0),
        order_at("jan2", "2018-01-20 09:00:00", -1.0, -1.0),
        order_at("dec", "2017-12-31 23:59:59", -1.0, -1.0),
    ]);
    let months = grouped(&rows, GroupDimension::PurchaseMonth);

    let keys: Vec<&str> = months.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["2017-12", "2018-01", "2018-02"]);

    let jan = &months[1];
    assert_eq!(jan.records, 2);
    assert_approx(jan.on_time_rate, 50.0);
    assert_approx(jan.average_days_late, 2.0);
    assert_eq!(months[2].average_days_late, Reported::NoData);
}

#[test]
fn rows_without_a_region_are_left_out_of_region_groups_only() {
    let mut rio = order("rj", 1.0);
    rio.customer_region = Some("RJ".into());
    let mut unknown = order("unknown", 1.0);
    unknown.customer_region = None;
    let rows = derived(&[order("sp", -1.0), rio, unknown]);

    let regions = grouped(&rows, GroupDimension::Region);
    let keys: Vec<(&str, usize)> = regions.iter().map(|g| (g.key.as_str(), g.records)).collect();
    assert_eq!(keys, vec![("RJ", 1), ("SP", 1)]);

    // The record still counts toward the overall rate.
    assert_approx(late_rate(&rows, LatenessKind::CustomerDelivery), 200.0 / 3.0);
}

#[test]
fn most_late_categories_ranks_by_count_then_name() {
    let with_category = |id: &str, category: &str, days_late: f64| {
        let mut r = order(id, days_late);
        r.product_category = Some(category.into());
        r
    };
    let rows = derived(&[
        with_category("1", "Toys", 1.0),
        with_category("2", "Bed Bath Table", 2.0),
        with_category("3", "Toys", 3.0),
        with_category("4", "Bed Bath Table", 1.0),
        with_category("5", "Auto", 1.0),
        with_category("6", "Watches Gifts", -1.0),
    ]);

    let top = most_late_categories(&rows, 2);
    let flat: Vec<(&str, usize)> = top.iter().map(|c| (c.category.as_str(), c.late_records)).collect();
    assert_eq!(flat, vec![("Bed Bath Table", 2), ("Toys", 2)]);
}

// ── Lateness distribution ────────────────────────────────────────────────────

#[test]
fn late_distribution_uses_half_open_buckets_with_overflow() {
    let bins = FulfillmentConfig::default().customer_bins().unwrap();
    let rows = derived(&[
        order("a", 1.0),
        order("b", 4.9),
        order("c", 5.0),
        order("d", 61.0),
        order("e", -3.0),
    ]);

    let Reported::Value(buckets) = late_distribution(&rows, LatenessKind::CustomerDelivery, &bins)
    else {
        panic!("expected a distribution");
    };
    assert_eq!(buckets.len(), bins.bucket_count());
    assert_eq!(buckets[0].label, "0 - 5");
    assert_eq!(buckets[0].count, 2);
    assert_eq!(buckets[1].count, 1);
    let last = buckets.last().unwrap();
    assert_eq!(last.label, "60+");
    assert_eq!(last.upper, None);
    assert_eq!(last.count, 1);
    assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 4);
}

#[test]
fn distribution_without_late_records_is_no_data() {
    let bins = LatenessBins::new(vec![0.0, 5.0]).unwrap();
    let rows = derived(&[order("a", -1.0), order("b", 0.0)]);
    assert_eq!(
        late_distribution(&rows, LatenessKind::CustomerDelivery, &bins),
        Reported::NoData
    );
}

// ── Drill-down and repeatability ─────────────────────────────────────────────

#[test]
fn filter_narrows_by_region_and_category() {
    let mut rj_toys = order("rj-toys", 1.0);
    rj_toys.customer_region = Some("RJ".into());
    let mut rj_auto = order("rj-auto", -1.0);
    rj_auto.customer_region = Some("RJ".into());
    rj_auto.product_category = Some("Auto".into());
    let rows = derived(&[order("sp-toys", -1.0), rj_toys, rj_auto]);

    let region = FulfillmentFilter {
        region: Some("RJ".into()),
        category: None,
    };
    assert_eq!(region.apply(&rows).len(), 2);

    let both = FulfillmentFilter {
        region: Some("RJ".into()),
        category: Some("Toys".into()),
    };
    let picked = both.apply(&rows);
    assert_eq!(picked.len(), 1);
    assert_eq!(picked[0].order_id, "rj-toys");

    assert_eq!(FulfillmentFilter::default().apply(&rows).len(), 3);
}

#[test]
fn derivation_is_repeatable() {
    let records = vec![order("a", 1.0), order("b", -2.0), order("c", 12.5)];
    assert_eq!(derive_all(&records, "delivered"), derive_all(&records, "delivered"));
}
