//! End-to-end scenarios for the metrics engine over in-memory datasets.

use chrono::{DateTime, TimeZone, Utc};
use core_types::{Address, AddressType, Customer, LineItem, Order, Payment, Refund};
use metrics::{MetricsEngine, OrderDataset};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

fn order(id: i64, total_price: Decimal, customer_id: Option<i64>) -> Order {
    Order {
        id,
        external_id: 1000 + id,
        order_number: format!("#{id}"),
        name: format!("Order {id}"),
        customer_id,
        email: "buyer@example.com".to_string(),
        phone: None,
        status_id: "Paid".to_string(),
        financial_status: 2,
        fulfillment_status: "Unfulfilled".to_string(),
        currency: "USD".to_string(),
        currency_symbol: "$".to_string(),
        presentment_currency: "R$".to_string(),
        local_currency_amount: total_price * dec!(5),
        total_price,
        subtotal_price: total_price,
        current_total_price: total_price,
        total_discounts: Decimal::ZERO,
        total_tax: Decimal::ZERO,
        total_shipping: Decimal::ZERO,
        cancel_reason: None,
        cancelled_at: None,
        note: None,
        source_name: None,
        processed_at: None,
        closed_at: None,
        created_at: ts(id as u32, 12),
        updated_at: ts(id as u32, 12),
    }
}

fn line_item(id: i64, order_id: i64, title: &str, quantity: i32, price: Decimal) -> LineItem {
    LineItem {
        id,
        order_id,
        external_id: 2000 + id,
        title: Some(title.to_string()),
        name: title.to_string(),
        sku: None,
        price,
        quantity,
        variant_title: None,
        product_main_image: None,
        product_id: None,
        variant_id: None,
        requires_shipping: true,
        is_refunded: false,
        refunded_quantity: 0,
        total_discount: Decimal::ZERO,
        created_at: ts(1, 0),
        updated_at: ts(1, 0),
    }
}

fn refund(id: i64, order_id: i64, amount: Decimal, note: Option<&str>) -> Refund {
    Refund {
        id,
        order_id,
        external_id: 3000 + id,
        note: note.map(str::to_string),
        total_amount: amount,
        status_id: 1,
        refunded_at: Some(ts(5, 10)),
        created_at: ts(5, 10),
        updated_at: ts(5, 10),
    }
}

fn payment(id: i64, order_id: i64, brand: Option<&str>, amount: Decimal) -> Payment {
    Payment {
        id,
        order_id,
        external_id: None,
        gateway: "gateway".to_string(),
        payment_type: "credit_card".to_string(),
        status_id: 1,
        amount,
        cc_brand: brand.map(str::to_string),
        cc_last_four: Some("4242".to_string()),
        cc_name: None,
        created_at: ts(1, 0),
        updated_at: ts(1, 0),
    }
}

fn shipping_address(id: i64, order_id: i64, city: Option<&str>) -> Address {
    Address {
        id,
        order_id,
        address_type: AddressType::Shipping,
        first_name: "Ana".to_string(),
        last_name: "Silva".to_string(),
        address1: "Rua 1".to_string(),
        address2: None,
        city: city.map(str::to_string),
        province: None,
        province_code: None,
        zip: None,
        country: "Brazil".to_string(),
        country_code: Some("BR".to_string()),
        company: None,
        phone: None,
        created_at: ts(1, 0),
        updated_at: ts(1, 0),
    }
}

fn customer(id: i64, first_name: &str) -> Customer {
    Customer {
        id,
        external_id: 4000 + id,
        email: format!("{}@example.com", first_name.to_lowercase()),
        first_name: first_name.to_string(),
        last_name: "Souza".to_string(),
        phone: None,
        accepts_marketing: false,
        created_at: ts(1, 0),
        updated_at: ts(1, 0),
    }
}

#[test]
fn empty_dataset_yields_defined_defaults() {
    let report = MetricsEngine::new().compute(&OrderDataset::default());

    assert_eq!(report.kpis.total_orders, 0);
    assert_eq!(report.kpis.average_ticket, Decimal::ZERO);
    assert_eq!(report.kpis.delivered_rate, Decimal::ZERO);
    assert_eq!(report.kpis.refund_rate, Decimal::ZERO);
    assert_eq!(report.kpis.avg_orders_per_customer, Decimal::ZERO);
    assert_eq!(report.kpis.top_product.name, None);
    assert_eq!(report.kpis.top_product.quantity, 0);
    assert_eq!(report.kpis.top_product.revenue, Decimal::ZERO);
    assert!(report.charts.orders_by_status.is_empty());
    assert!(report.charts.revenue_by_date.is_empty());
    assert_eq!(report.intermediate.upsell_analysis.upsell_rate, Decimal::ZERO);
    assert!(report.recent_orders.is_empty());
}

#[test]
fn single_order_upsell_scenario() {
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(25.00), None)],
        line_items: vec![
            line_item(1, 1, "Shirt", 2, dec!(10)),
            line_item(2, 1, "Hat", 1, dec!(5)),
        ],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);

    // Revenue comes from the order total, not the line items.
    assert_eq!(report.kpis.total_revenue_usd, dec!(25.00));

    let upsell = &report.intermediate.upsell_analysis;
    assert_eq!(upsell.total_orders_with_items, 1);
    assert_eq!(upsell.multi_product_orders, 1);
    assert_eq!(upsell.upsell_rate, dec!(100.00));
    // (2*10 + 1*5) - min price 5 = 20.
    assert_eq!(upsell.upsell_revenue, dec!(20.00));

    assert_eq!(upsell.top_combinations.len(), 1);
    let pair = &upsell.top_combinations[0];
    assert_eq!(pair.product_a, "Hat");
    assert_eq!(pair.product_b, "Shirt");
    assert_eq!(pair.count, 1);
}

#[test]
fn net_revenue_is_gross_minus_refunds() {
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(100.00), None), order(2, dec!(50.00), None)],
        refunds: vec![refund(1, 1, dec!(30.00), Some("damaged"))],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);

    assert_eq!(report.kpis.gross_revenue, dec!(150.00));
    assert_eq!(report.kpis.refund_amount, dec!(30.00));
    assert_eq!(report.kpis.net_revenue, dec!(120.00));
    assert_eq!(report.kpis.refund_rate, dec!(20.00));
}

#[test]
fn empty_refund_note_gets_placeholder_reason() {
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(40.00), None), order(2, dec!(60.00), None)],
        refunds: vec![refund(1, 1, dec!(15.50), Some(""))],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);

    let reasons = &report.advanced.refund_reasons;
    assert_eq!(reasons.len(), 1);
    assert_eq!(reasons[0].reason, "Sem motivo informado");
    assert_eq!(reasons[0].count, 1);
    assert_eq!(reasons[0].amount, dec!(15.50));
}

#[test]
fn shipping_only_order_is_excluded_from_product_analyses() {
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(5.00), None)],
        line_items: vec![line_item(1, 1, "Shipping Protection", 1, dec!(5))],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);

    assert!(report.intermediate.top_products_by_revenue.is_empty());
    let upsell = &report.intermediate.upsell_analysis;
    assert_eq!(upsell.total_orders_with_items, 0);
    assert_eq!(upsell.multi_product_orders, 0);
    assert_eq!(upsell.upsell_rate, Decimal::ZERO);
    assert!(upsell.top_combinations.is_empty());
    assert_eq!(report.kpis.top_product.name, None);
    // All line items still count toward average items per order.
    assert_eq!(upsell.avg_items_per_order, dec!(1.00));
}

#[test]
fn top_products_limited_sorted_and_named() {
    let mut line_items = Vec::new();
    for (i, (title, qty, price)) in [
        ("A", 1, dec!(10)),
        ("B", 1, dec!(20)),
        ("C", 1, dec!(30)),
        ("D", 1, dec!(40)),
        ("E", 1, dec!(50)),
        ("F", 1, dec!(60)),
        ("G", 1, dec!(5)),
    ]
    .into_iter()
    .enumerate()
    {
        line_items.push(line_item(i as i64 + 1, 1, title, qty, price));
    }
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(215.00), None)],
        line_items,
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);
    let top = &report.intermediate.top_products_by_revenue;

    assert_eq!(top.len(), 5);
    let names: Vec<&str> = top.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["F", "E", "D", "C", "B"]);
    for window in top.windows(2) {
        assert!(window[0].revenue >= window[1].revenue);
    }
}

#[test]
fn top_product_ties_break_by_revenue_then_name() {
    // Same quantity everywhere; "B" wins on revenue.
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(30.00), None)],
        line_items: vec![
            line_item(1, 1, "A", 2, dec!(5)),
            line_item(2, 1, "B", 2, dec!(10)),
        ],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);
    assert_eq!(report.kpis.top_product.name.as_deref(), Some("B"));
    assert_eq!(report.kpis.top_product.quantity, 2);
    assert_eq!(report.kpis.top_product.revenue, dec!(20.00));
}

#[test]
fn combinations_are_deduped_and_never_self_paired() {
    // Two orders both containing Hat+Shirt, one also containing Mug.
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(30.00), None), order(2, dec!(45.00), None)],
        line_items: vec![
            line_item(1, 1, "Shirt", 1, dec!(10)),
            line_item(2, 1, "Hat", 1, dec!(5)),
            // Duplicate title rows within the same order count once.
            line_item(3, 1, "Shirt", 1, dec!(10)),
            line_item(4, 2, "Shirt", 1, dec!(10)),
            line_item(5, 2, "Hat", 1, dec!(5)),
            line_item(6, 2, "Mug", 1, dec!(15)),
        ],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);
    let pairs = &report.intermediate.upsell_analysis.top_combinations;

    assert_eq!(pairs[0].product_a, "Hat");
    assert_eq!(pairs[0].product_b, "Shirt");
    assert_eq!(pairs[0].count, 2);

    let mut seen = std::collections::HashSet::new();
    for pair in pairs {
        assert!(pair.product_a < pair.product_b);
        assert!(seen.insert((pair.product_a.clone(), pair.product_b.clone())));
    }
}

#[test]
fn upsell_revenue_floors_at_zero_per_order() {
    // All items share the same price; the contribution is total - min >= 0.
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(20.00), None)],
        line_items: vec![
            line_item(1, 1, "A", 1, dec!(10)),
            line_item(2, 1, "B", 1, dec!(10)),
        ],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);
    let upsell = &report.intermediate.upsell_analysis;
    assert_eq!(upsell.multi_product_orders, 1);
    assert!(upsell.upsell_revenue >= Decimal::ZERO);
    assert_eq!(upsell.upsell_revenue, dec!(10.00));
}

#[test]
fn delivered_rate_stays_in_range() {
    let mut delivered = order(1, dec!(10.00), None);
    delivered.fulfillment_status = "Fully Fulfilled".to_string();
    let dataset = OrderDataset {
        orders: vec![delivered, order(2, dec!(10.00), None), order(3, dec!(10.00), None)],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);
    assert_eq!(report.kpis.delivered_orders, 1);
    assert_eq!(report.kpis.delivered_rate, dec!(33.33));
    assert!(report.kpis.delivered_rate >= Decimal::ZERO);
    assert!(report.kpis.delivered_rate <= Decimal::ONE_HUNDRED);
}

#[test]
fn charts_group_and_order_as_specified() {
    let mut cancelled = order(3, dec!(10.00), None);
    cancelled.status_id = "Cancelled".to_string();
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(10.00), None), order(2, dec!(20.00), None), cancelled],
        payments: vec![
            payment(1, 1, Some("Visa"), dec!(10.00)),
            payment(2, 2, Some("Mastercard"), dec!(20.00)),
            payment(3, 3, Some("Visa"), dec!(10.00)),
        ],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);

    let statuses: Vec<&String> = report.charts.orders_by_status.keys().collect();
    assert_eq!(statuses, vec!["Cancelled", "Paid"]);
    assert_eq!(report.charts.orders_by_status["Paid"], 2);

    assert_eq!(report.charts.orders_by_payment_method["Visa"], 2);
    assert_eq!(report.charts.orders_by_payment_method["Mastercard"], 1);

    // One row per distinct day, ascending, no gap filling.
    let days: Vec<_> = report.charts.revenue_by_date.iter().map(|r| r.date).collect();
    let mut sorted = days.clone();
    sorted.sort();
    assert_eq!(days, sorted);
    assert_eq!(report.charts.revenue_by_date.len(), 3);
}

#[test]
fn payment_conversion_uses_paid_orders_as_denominator() {
    let dataset = OrderDataset {
        orders: vec![
            order(1, dec!(10.00), None),
            order(2, dec!(10.00), None),
            order(3, dec!(10.00), None),
            order(4, dec!(10.00), None),
        ],
        payments: vec![
            payment(1, 1, Some("Visa"), dec!(10.00)),
            payment(2, 2, Some("Visa"), dec!(10.00)),
            payment(3, 3, None, dec!(10.00)),
        ],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);
    let conversion = &report.intermediate.payment_conversion;

    // Order 4 has no payment and order 3 has no brand; denominator is still
    // all 3 paid orders.
    assert_eq!(conversion.len(), 1);
    assert_eq!(conversion[0].method, "Visa");
    assert_eq!(conversion[0].orders, 2);
    assert_eq!(conversion[0].conversion, dec!(66.67));
}

#[test]
fn cities_count_distinct_orders() {
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(100.00), None), order(2, dec!(50.00), None)],
        addresses: vec![
            shipping_address(1, 1, Some("Lisbon")),
            // Duplicate shipping row for the same order must not double count.
            shipping_address(2, 1, Some("Lisbon")),
            shipping_address(3, 2, Some("Porto")),
            shipping_address(4, 2, None),
            shipping_address(5, 2, Some("")),
        ],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);
    let cities = &report.intermediate.top_cities_by_sales;

    assert_eq!(cities.len(), 2);
    assert_eq!(cities[0].city, "Lisbon");
    assert_eq!(cities[0].orders, 1);
    assert_eq!(cities[0].revenue, dec!(100.00));
    assert_eq!(cities[1].city, "Porto");
}

#[test]
fn high_refund_rate_products_require_a_refunded_order() {
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(10.00), None), order(2, dec!(10.00), None)],
        line_items: vec![
            line_item(1, 1, "Widget", 1, dec!(10)),
            line_item(2, 2, "Widget", 1, dec!(10)),
            line_item(3, 2, "Gadget", 1, dec!(10)),
        ],
        refunds: vec![refund(1, 2, dec!(10.00), Some("broken"))],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);
    let products = &report.advanced.high_refund_rate_products;

    assert_eq!(products.len(), 2);
    // Gadget: 1/1 refunded (100%) ranks above Widget: 1/2 (50%).
    assert_eq!(products[0].name, "Gadget");
    assert_eq!(products[0].refund_rate, dec!(100.00));
    assert_eq!(products[1].name, "Widget");
    assert_eq!(products[1].orders_with_product, 2);
    assert_eq!(products[1].refunded_orders_with_product, 1);
    assert_eq!(products[1].refund_rate, dec!(50.00));
    assert_eq!(products[1].revenue, dec!(20.00));
}

#[test]
fn recent_orders_take_five_newest_with_customers() {
    let mut orders = Vec::new();
    for id in 1..=7 {
        orders.push(order(id, dec!(10.00), if id == 7 { Some(1) } else { None }));
    }
    let dataset = OrderDataset {
        orders,
        customers: vec![customer(1, "Maria")],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);

    assert_eq!(report.recent_orders.len(), 5);
    let ids: Vec<i64> = report.recent_orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    let newest = &report.recent_orders[0];
    assert_eq!(newest.customer.as_ref().unwrap().first_name, "Maria");
}

#[test]
fn unique_customers_ignores_orders_without_customer() {
    let dataset = OrderDataset {
        orders: vec![
            order(1, dec!(10.00), Some(1)),
            order(2, dec!(10.00), Some(1)),
            order(3, dec!(10.00), None),
        ],
        customers: vec![customer(1, "Jo")],
        ..Default::default()
    };

    let report = MetricsEngine::new().compute(&dataset);
    assert_eq!(report.kpis.unique_customers, 1);
    assert_eq!(report.kpis.avg_orders_per_customer, dec!(3.00));
}

#[test]
fn compute_is_idempotent_for_a_fixed_snapshot() {
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(25.00), Some(1)), order(2, dec!(75.00), None)],
        line_items: vec![
            line_item(1, 1, "Shirt", 2, dec!(10)),
            line_item(2, 1, "Hat", 1, dec!(5)),
            line_item(3, 2, "Mug", 3, dec!(25)),
        ],
        payments: vec![payment(1, 1, Some("Visa"), dec!(25.00))],
        refunds: vec![refund(1, 2, dec!(10.00), None)],
        addresses: vec![shipping_address(1, 1, Some("Recife"))],
        customers: vec![customer(1, "Ana")],
    };

    let engine = MetricsEngine::new();
    let first = serde_json::to_string(&engine.compute(&dataset)).unwrap();
    let second = serde_json::to_string(&engine.compute(&dataset)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn report_serializes_with_camel_case_contract_keys() {
    let dataset = OrderDataset {
        orders: vec![order(1, dec!(25.00), None)],
        line_items: vec![line_item(1, 1, "Shirt", 1, dec!(25))],
        ..Default::default()
    };

    let value = serde_json::to_value(MetricsEngine::new().compute(&dataset)).unwrap();

    assert!(value.get("kpis").is_some());
    assert!(value.get("recentOrders").is_some());
    assert!(value["kpis"].get("totalRevenueUsd").is_some());
    assert!(value["kpis"].get("avgOrdersPerCustomer").is_some());
    assert!(value["kpis"]["topProduct"].get("name").is_some());
    assert!(value["charts"].get("ordersByStatus").is_some());
    assert!(value["intermediate"].get("upsellAnalysis").is_some());
    assert!(value["intermediate"]["upsellAnalysis"].get("topCombinations").is_some());
    assert!(value["advanced"].get("highRefundRateProducts").is_some());
}
