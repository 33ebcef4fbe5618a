use insights_core::{
    aggregate::Reported,
    config::ReviewQualityConfig,
    leads::{conversion_by_origin, lead_type_shares, ClosedDeal, LeadRecord},
    retention::{customer_mix, CustomerOrder},
    reviews::{average_score, category_quality, rank_categories, score_distribution, ReviewRecord},
    types::parse_timestamp,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn rated(id: &str, category: Option<&str>, score: u8) -> ReviewRecord {
    ReviewRecord {
        review_id: id.into(),
        order_id: format!("order-{id}"),
        score,
        comment: None,
        product_category: category.map(String::from),
    }
}

fn lead(id: &str, origin: Option<&str>) -> LeadRecord {
    LeadRecord {
        mql_id: id.into(),
        origin: origin.map(String::from),
        first_contact_at: None,
    }
}

fn deal(id: &str, won: bool, lead_type: Option<&str>) -> ClosedDeal {
    ClosedDeal {
        mql_id: id.into(),
        won_at: if won { parse_timestamp("2018-03-01 12:00:00") } else { None },
        lead_type: lead_type.map(String::from),
        business_segment: None,
    }
}

fn orders(pairs: &[(&str, &str)]) -> Vec<CustomerOrder> {
    pairs
        .iter()
        .map(|(customer, order)| CustomerOrder {
            customer_id: customer.to_string(),
            order_id: order.to_string(),
        })
        .collect()
}

// ── Reviews ──────────────────────────────────────────────────────────────────

#[test]
fn score_distribution_lists_all_five_scores() {
    let reviews = vec![
        rated("a", None, 5),
        rated("b", None, 5),
        rated("c", None, 3),
        rated("a", None, 1),
    ];
    let dist: Vec<(u8, usize)> = score_distribution(&reviews)
        .iter()
        .map(|s| (s.score, s.count))
        .collect();
    assert_eq!(dist, vec![(1, 0), (2, 0), (3, 1), (4, 0), (5, 2)]);
    assert_eq!(average_score(&reviews).value().map(|v| (v * 100.0).round()), Some(433.0));
}

#[test]
fn average_score_of_nothing_is_no_data() {
    assert_eq!(average_score(&[]), Reported::NoData);
}

#[test]
fn small_categories_are_left_out_of_quality() {
    let reviews = vec![
        rated("1", Some("Toys"), 4),
        rated("2", Some("Toys"), 2),
        rated("3", Some("Auto"), 5),
        rated("4", None, 1),
    ];
    let quality = category_quality(&reviews, 2);
    assert_eq!(quality.len(), 1);
    assert_eq!(quality[0].category, "Toys");
    assert_eq!(quality[0].review_count, 2);
    assert_eq!(quality[0].average_score, 3.0);
}

#[test]
fn ranking_takes_top_and_bottom_n() {
    let mut reviews = Vec::new();
    for (i, (category, score)) in [
        ("Auto", 5),
        ("Auto", 4),
        ("Toys", 2),
        ("Toys", 1),
        ("Garden Tools", 3),
        ("Garden Tools", 3),
        ("Watches Gifts", 4),
    ]
    .into_iter()
    .enumerate()
    {
        reviews.push(rated(&i.to_string(), Some(category), score));
    }
    let config = ReviewQualityConfig {
        min_reviews: 2,
        top_n: 2,
    };
    let ranking = rank_categories(&reviews, &config);

    let highest: Vec<&str> = ranking.highest.iter().map(|c| c.category.as_str()).collect();
    let lowest: Vec<&str> = ranking.lowest.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(highest, vec!["Auto", "Garden Tools"]);
    assert_eq!(lowest, vec!["Toys", "Garden Tools"]);
}

// ── Seller lead funnel ───────────────────────────────────────────────────────

#[test]
fn conversion_counts_only_won_deals_and_rounds_to_one_decimal() {
    let leads = vec![
        lead("m1", Some("social")),
        lead("m2", Some("social")),
        lead("m3", Some("social")),
        lead("m4", Some("email")),
        lead("m5", None),
    ];
    let deals = vec![
        deal("m1", true, Some("online_medium")),
        deal("m2", false, Some("online_medium")),
        deal("m4", true, Some("offline")),
        deal("m5", true, Some("offline")),
    ];

    let funnel = conversion_by_origin(&leads, &deals);
    assert_eq!(funnel.len(), 2, "leads without an origin are skipped");
    assert_eq!(funnel[0].origin, "email");
    assert_eq!(funnel[0].conversion_rate_pct, 100.0);
    assert_eq!(funnel[1].origin, "social");
    assert_eq!(funnel[1].leads, 3);
    assert_eq!(funnel[1].deals_closed, 1);
    assert_eq!(funnel[1].conversion_rate_pct, 33.3);
}

#[test]
fn equal_conversion_rates_sort_by_origin() {
    let leads = vec![lead("a", Some("referral")), lead("b", Some("direct_traffic"))];
    let funnel = conversion_by_origin(&leads, &[]);
    let origins: Vec<&str> = funnel.iter().map(|o| o.origin.as_str()).collect();
    assert_eq!(origins, vec!["direct_traffic", "referral"]);
    assert!(funnel.iter().all(|o| o.conversion_rate_pct == 0.0));
}

#[test]
fn lead_type_shares_sum_to_one() {
    let deals = vec![
        deal("a", true, Some("online_big")),
        deal("b", true, Some("online_big")),
        deal("c", true, Some("industry")),
        deal("d", true, Some("online_big")),
        deal("e", true, None),
    ];
    let shares = lead_type_shares(&deals);
    assert_eq!(shares[0].lead_type, "online_big");
    assert_eq!(shares[0].deals, 3);
    assert_eq!(shares[0].share, 0.75);
    let total: f64 = shares.iter().map(|s| s.share).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(lead_type_shares(&[]).is_empty());
}

// ── Customer mix ─────────────────────────────────────────────────────────────

#[test]
fn repeat_customers_have_two_distinct_orders() {
    let mix = customer_mix(&orders(&[
        ("c1", "o1"),
        ("c1", "o2"),
        ("c2", "o3"),
        ("c2", "o3"),
        ("c3", "o4"),
    ]));
    let Reported::Value(mix) = mix else {
        panic!("expected a mix");
    };
    assert_eq!(mix.customers, 3);
    assert_eq!(mix.repeat_pct, 33.3);
    assert_eq!(mix.new_pct, 66.7);
}

#[test]
fn no_orders_no_mix() {
    assert!(customer_mix(&[]).is_no_data());
}
