use crate::dataset::OrderDataset;
use crate::num::{dec, guarded_ratio, percentage, round2};
use crate::report::{
    Advanced, Charts, CitySales, DailyRevenue, DeliveredAndRefunded, Intermediate, Kpis,
    MetricsReport, PaymentConversion, ProductPair, ProductRevenue, RecentOrder,
    RecentOrderCustomer, RefundRateProduct, RefundReason, TopProduct, UpsellAnalysis,
    VariantRevenue,
};
use core_types::{AddressType, Order};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

const FULLY_FULFILLED: &str = "Fully Fulfilled";
const CANCELLED: &str = "Cancelled";

/// The label substituted for refunds whose note is missing or empty.
pub const NO_REFUND_REASON: &str = "Sem motivo informado";

/// A stateless calculator that turns an `OrderDataset` snapshot into the
/// dashboard's `MetricsReport`.
///
/// Every calculator is a pure function of the snapshot; the engine invokes
/// them in a fixed order and only assembles their outputs. Numeric edge cases
/// (zero denominators, empty groups, absent top product) produce defined
/// defaults rather than errors, so `compute` is infallible.
#[derive(Debug, Default)]
pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the full report. Deterministic for a fixed snapshot: every
    /// ranked list carries a total order (primary key, then group key), so
    /// repeated calls yield identical output.
    pub fn compute(&self, dataset: &OrderDataset) -> MetricsReport {
        tracing::debug!(
            orders = dataset.orders.len(),
            line_items = dataset.line_items.len(),
            refunds = dataset.refunds.len(),
            "Computing dashboard metrics."
        );

        MetricsReport {
            kpis: self.calculate_kpis(dataset),
            charts: self.calculate_charts(dataset),
            intermediate: self.calculate_intermediate(dataset),
            advanced: self.calculate_advanced(dataset),
            recent_orders: self.select_recent_orders(dataset),
        }
    }

    fn calculate_kpis(&self, dataset: &OrderDataset) -> Kpis {
        let total_orders = dataset.orders.len();
        let total_revenue_usd: Decimal = dataset.orders.iter().map(|o| o.total_price).sum();
        let total_revenue_brl: Decimal =
            dataset.orders.iter().map(|o| o.local_currency_amount).sum();
        let average_ticket = round2(guarded_ratio(total_revenue_usd, dec(total_orders)));

        let delivered_orders = dataset
            .orders
            .iter()
            .filter(|o| o.fulfillment_status == FULLY_FULFILLED)
            .count();
        let delivered_rate = percentage(dec(delivered_orders), dec(total_orders));
        let cancelled_orders = dataset
            .orders
            .iter()
            .filter(|o| o.status_id == CANCELLED)
            .count();

        let unique_customers = dataset
            .orders
            .iter()
            .filter_map(|o| o.customer_id)
            .collect::<HashSet<_>>()
            .len();
        let avg_orders_per_customer =
            round2(guarded_ratio(dec(total_orders), dec(unique_customers)));

        let refund_amount: Decimal = dataset.refunds.iter().map(|r| r.total_amount).sum();
        let gross_revenue = total_revenue_usd;
        let net_revenue = gross_revenue - refund_amount;
        let refund_rate = percentage(refund_amount, gross_revenue);

        Kpis {
            total_orders: total_orders as u64,
            total_revenue: round2(total_revenue_usd),
            cancelled_orders: cancelled_orders as u64,
            total_revenue_usd: round2(total_revenue_usd),
            total_revenue_brl: round2(total_revenue_brl),
            average_ticket,
            delivered_orders: delivered_orders as u64,
            delivered_rate,
            unique_customers: unique_customers as u64,
            avg_orders_per_customer,
            gross_revenue: round2(gross_revenue),
            refund_amount: round2(refund_amount),
            net_revenue: round2(net_revenue),
            refund_rate,
            top_product: self.top_product(dataset),
        }
    }

    /// The product with the highest summed quantity; ties break by summed
    /// revenue descending, then title ascending.
    fn top_product(&self, dataset: &OrderDataset) -> TopProduct {
        let mut groups: HashMap<&str, (u64, Decimal)> = HashMap::new();
        for (item, title) in dataset.product_items() {
            let entry = groups.entry(title).or_default();
            entry.0 += item.quantity as u64;
            entry.1 += item.line_total();
        }

        groups
            .into_iter()
            .max_by(|(name_a, (qty_a, rev_a)), (name_b, (qty_b, rev_b))| {
                qty_a
                    .cmp(qty_b)
                    .then(rev_a.cmp(rev_b))
                    .then(name_b.cmp(name_a))
            })
            .map(|(name, (quantity, revenue))| TopProduct {
                name: Some(name.to_string()),
                quantity,
                revenue: round2(revenue),
            })
            .unwrap_or_default()
    }

    fn calculate_charts(&self, dataset: &OrderDataset) -> Charts {
        let mut orders_by_status: BTreeMap<String, u64> = BTreeMap::new();
        for order in &dataset.orders {
            *orders_by_status.entry(order.status_id.clone()).or_default() += 1;
        }

        // Zero-or-one payment per order, so counting payments counts orders.
        let mut orders_by_payment_method: BTreeMap<String, u64> = BTreeMap::new();
        for payment in &dataset.payments {
            if let Some(brand) = payment.cc_brand.as_deref()
                && !brand.is_empty()
            {
                *orders_by_payment_method.entry(brand.to_string()).or_default() += 1;
            }
        }

        let mut by_date: BTreeMap<chrono::NaiveDate, (Decimal, u64)> = BTreeMap::new();
        for order in &dataset.orders {
            let entry = by_date.entry(order.created_at.date_naive()).or_default();
            entry.0 += order.total_price;
            entry.1 += 1;
        }
        let revenue_by_date = by_date
            .into_iter()
            .map(|(date, (revenue, count))| DailyRevenue {
                date,
                revenue: round2(revenue),
                count,
            })
            .collect();

        Charts {
            orders_by_status,
            orders_by_payment_method,
            revenue_by_date,
        }
    }

    fn calculate_intermediate(&self, dataset: &OrderDataset) -> Intermediate {
        Intermediate {
            top_products_by_revenue: self.top_products_by_revenue(dataset),
            revenue_by_variant: self.revenue_by_variant(dataset),
            top_cities_by_sales: self.top_cities_by_sales(dataset),
            delivered_and_refunded: self.delivered_and_refunded(dataset),
            payment_conversion: self.payment_conversion(dataset),
            upsell_analysis: self.upsell_analysis(dataset),
        }
    }

    fn top_products_by_revenue(&self, dataset: &OrderDataset) -> Vec<ProductRevenue> {
        let mut groups: HashMap<&str, (u64, Decimal)> = HashMap::new();
        for (item, title) in dataset.product_items() {
            let entry = groups.entry(title).or_default();
            entry.0 += item.quantity as u64;
            entry.1 += item.line_total();
        }

        let mut rows: Vec<ProductRevenue> = groups
            .into_iter()
            .map(|(name, (quantity, revenue))| ProductRevenue {
                name: name.to_string(),
                quantity,
                revenue: round2(revenue),
            })
            .collect();
        rows.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.name.cmp(&b.name)));
        rows.truncate(5);
        rows
    }

    fn revenue_by_variant(&self, dataset: &OrderDataset) -> Vec<VariantRevenue> {
        let mut groups: HashMap<&str, (u64, Decimal)> = HashMap::new();
        for item in &dataset.line_items {
            if let Some(variant) = item.variant_title.as_deref()
                && !variant.is_empty()
            {
                let entry = groups.entry(variant).or_default();
                entry.0 += item.quantity as u64;
                entry.1 += item.line_total();
            }
        }

        let mut rows: Vec<VariantRevenue> = groups
            .into_iter()
            .map(|(variant, (quantity, revenue))| VariantRevenue {
                variant: variant.to_string(),
                quantity,
                revenue: round2(revenue),
            })
            .collect();
        rows.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.variant.cmp(&b.variant)));
        rows.truncate(10);
        rows
    }

    fn top_cities_by_sales(&self, dataset: &OrderDataset) -> Vec<CitySales> {
        let orders_by_id = dataset.orders_by_id();

        // Distinct order ids per city: a duplicate shipping address row must
        // not double-count the order or its revenue.
        let mut city_orders: HashMap<&str, HashSet<i64>> = HashMap::new();
        for address in &dataset.addresses {
            if address.address_type != AddressType::Shipping {
                continue;
            }
            if let Some(city) = address.city.as_deref()
                && !city.is_empty()
            {
                city_orders.entry(city).or_default().insert(address.order_id);
            }
        }

        let mut rows: Vec<CitySales> = city_orders
            .into_iter()
            .map(|(city, order_ids)| {
                let revenue: Decimal = order_ids
                    .iter()
                    .filter_map(|id| orders_by_id.get(id))
                    .map(|o| o.total_price)
                    .sum();
                CitySales {
                    city: city.to_string(),
                    orders: order_ids.len() as u64,
                    revenue: round2(revenue),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.city.cmp(&b.city)));
        rows.truncate(10);
        rows
    }

    fn delivered_and_refunded(&self, dataset: &OrderDataset) -> DeliveredAndRefunded {
        let refunded_ids = dataset.refunded_order_ids();
        let delivered: Vec<&Order> = dataset
            .orders
            .iter()
            .filter(|o| o.fulfillment_status == FULLY_FULFILLED)
            .collect();
        let both = delivered
            .iter()
            .filter(|o| refunded_ids.contains(&o.id))
            .count();

        DeliveredAndRefunded {
            delivered_orders: delivered.len() as u64,
            refunded_orders: refunded_ids.len() as u64,
            delivered_and_refunded: both as u64,
            delivered_and_refunded_rate: percentage(dec(both), dec(delivered.len())),
        }
    }

    fn payment_conversion(&self, dataset: &OrderDataset) -> Vec<PaymentConversion> {
        let total_paid_orders = dataset.paid_order_ids().len();

        let mut brand_orders: HashMap<&str, HashSet<i64>> = HashMap::new();
        for payment in &dataset.payments {
            if let Some(brand) = payment.cc_brand.as_deref()
                && !brand.is_empty()
            {
                brand_orders.entry(brand).or_default().insert(payment.order_id);
            }
        }

        let mut rows: Vec<PaymentConversion> = brand_orders
            .into_iter()
            .map(|(method, order_ids)| PaymentConversion {
                method: method.to_string(),
                orders: order_ids.len() as u64,
                conversion: percentage(dec(order_ids.len()), dec(total_paid_orders)),
            })
            .collect();
        rows.sort_by(|a, b| b.orders.cmp(&a.orders).then(a.method.cmp(&b.method)));
        rows
    }

    fn upsell_analysis(&self, dataset: &OrderDataset) -> UpsellAnalysis {
        let by_order = dataset.product_items_by_order();
        let total_orders_with_items = by_order.len();

        let mut multi_product_orders = 0usize;
        let mut upsell_revenue = Decimal::ZERO;
        let mut pair_counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();

        for items in by_order.values() {
            let mut titles: Vec<&str> = items.iter().map(|(_, title)| *title).collect();
            titles.sort_unstable();
            titles.dedup();

            if titles.len() > 1 {
                multi_product_orders += 1;

                // Everything beyond the single cheapest item, floored at 0.
                let order_total: Decimal = items.iter().map(|(item, _)| item.line_total()).sum();
                let min_price = items
                    .iter()
                    .map(|(item, _)| item.price)
                    .min()
                    .unwrap_or(Decimal::ZERO);
                upsell_revenue += (order_total - min_price).max(Decimal::ZERO);
            }

            // Titles are sorted and deduped, so each unordered pair is seen
            // once per order with product_a < product_b.
            for (i, a) in titles.iter().enumerate() {
                for b in &titles[i + 1..] {
                    *pair_counts.entry((a, b)).or_default() += 1;
                }
            }
        }

        let mut top_combinations: Vec<ProductPair> = pair_counts
            .into_iter()
            .map(|((a, b), count)| ProductPair {
                product_a: a.to_string(),
                product_b: b.to_string(),
                count,
            })
            .collect();
        top_combinations.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then(a.product_a.cmp(&b.product_a))
                .then(a.product_b.cmp(&b.product_b))
        });
        top_combinations.truncate(5);

        let total_quantity: u64 = dataset
            .line_items
            .iter()
            .map(|item| item.quantity as u64)
            .sum();

        UpsellAnalysis {
            total_orders_with_items: total_orders_with_items as u64,
            multi_product_orders: multi_product_orders as u64,
            upsell_rate: percentage(dec(multi_product_orders), dec(total_orders_with_items)),
            upsell_revenue: round2(upsell_revenue),
            avg_items_per_order: round2(guarded_ratio(
                Decimal::from(total_quantity),
                dec(dataset.orders.len()),
            )),
            top_combinations,
        }
    }

    fn calculate_advanced(&self, dataset: &OrderDataset) -> Advanced {
        Advanced {
            high_refund_rate_products: self.high_refund_rate_products(dataset),
            refund_reasons: self.refund_reasons(dataset),
        }
    }

    fn high_refund_rate_products(&self, dataset: &OrderDataset) -> Vec<RefundRateProduct> {
        let refunded_ids = dataset.refunded_order_ids();

        let mut groups: HashMap<&str, (HashSet<i64>, Decimal)> = HashMap::new();
        for (item, title) in dataset.product_items() {
            let entry = groups.entry(title).or_default();
            entry.0.insert(item.order_id);
            entry.1 += item.line_total();
        }

        let mut rows: Vec<RefundRateProduct> = groups
            .into_iter()
            .filter_map(|(name, (order_ids, revenue))| {
                let refunded = order_ids
                    .iter()
                    .filter(|id| refunded_ids.contains(id))
                    .count();
                if refunded == 0 {
                    return None;
                }
                Some(RefundRateProduct {
                    name: name.to_string(),
                    orders_with_product: order_ids.len() as u64,
                    refunded_orders_with_product: refunded as u64,
                    refund_rate: percentage(dec(refunded), dec(order_ids.len())),
                    revenue: round2(revenue),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.refund_rate
                .cmp(&a.refund_rate)
                .then(b.refunded_orders_with_product.cmp(&a.refunded_orders_with_product))
                .then(a.name.cmp(&b.name))
        });
        rows.truncate(10);
        rows
    }

    fn refund_reasons(&self, dataset: &OrderDataset) -> Vec<RefundReason> {
        let mut groups: HashMap<&str, (u64, Decimal)> = HashMap::new();
        for refund in &dataset.refunds {
            let reason = match refund.note.as_deref() {
                Some(note) if !note.is_empty() => note,
                _ => NO_REFUND_REASON,
            };
            let entry = groups.entry(reason).or_default();
            entry.0 += 1;
            entry.1 += refund.total_amount;
        }

        let mut rows: Vec<RefundReason> = groups
            .into_iter()
            .map(|(reason, (count, amount))| RefundReason {
                reason: reason.to_string(),
                count,
                amount: round2(amount),
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.reason.cmp(&b.reason)));
        rows.truncate(10);
        rows
    }

    fn select_recent_orders(&self, dataset: &OrderDataset) -> Vec<RecentOrder> {
        let customers = dataset.customers_by_id();

        let mut orders: Vec<&Order> = dataset.orders.iter().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        orders
            .into_iter()
            .take(5)
            .map(|order| RecentOrder {
                id: order.id,
                order_number: order.order_number.clone(),
                name: order.name.clone(),
                status_id: order.status_id.clone(),
                fulfillment_status: order.fulfillment_status.clone(),
                total_price: order.total_price,
                currency: order.currency.clone(),
                created_at: order.created_at,
                customer: order
                    .customer_id
                    .and_then(|id| customers.get(&id))
                    .map(|c| RecentOrderCustomer {
                        id: c.id,
                        first_name: c.first_name.clone(),
                        last_name: c.last_name.clone(),
                        email: c.email.clone(),
                    }),
            })
            .collect()
    }
}
