use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The complete dashboard payload.
///
/// This struct is the final output of the `MetricsEngine` and is the wire
/// contract for every consumer: the keys serialize in camelCase exactly as
/// the dashboard expects them, so renaming a field here is a breaking change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub kpis: Kpis,
    pub charts: Charts,
    pub intermediate: Intermediate,
    pub advanced: Advanced,
    pub recent_orders: Vec<RecentOrder>,
}

/// Headline figures. All monetary values are rounded to 2 decimal places,
/// percentages are 0-100 rounded to 2 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_orders: u64,
    /// Same value as `total_revenue_usd`; both keys are part of the contract.
    pub total_revenue: Decimal,
    pub cancelled_orders: u64,
    pub total_revenue_usd: Decimal,
    pub total_revenue_brl: Decimal,
    pub average_ticket: Decimal,
    pub delivered_orders: u64,
    pub delivered_rate: Decimal,
    pub unique_customers: u64,
    pub avg_orders_per_customer: Decimal,
    pub gross_revenue: Decimal,
    pub refund_amount: Decimal,
    pub net_revenue: Decimal,
    pub refund_rate: Decimal,
    pub top_product: TopProduct,
}

/// The single best-selling product by summed quantity. `name` is `null` when
/// the dataset has no product line items at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub name: Option<String>,
    pub quantity: u64,
    pub revenue: Decimal,
}

impl Default for TopProduct {
    fn default() -> Self {
        Self {
            name: None,
            quantity: 0,
            revenue: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    /// Order counts keyed by lifecycle status, keys in ascending order.
    pub orders_by_status: BTreeMap<String, u64>,
    /// Order counts keyed by card brand; orders without a payment are absent.
    pub orders_by_payment_method: BTreeMap<String, u64>,
    /// One row per calendar day present in the data, ascending. Days with no
    /// orders produce no row.
    pub revenue_by_date: Vec<DailyRevenue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intermediate {
    pub top_products_by_revenue: Vec<ProductRevenue>,
    pub revenue_by_variant: Vec<VariantRevenue>,
    pub top_cities_by_sales: Vec<CitySales>,
    pub delivered_and_refunded: DeliveredAndRefunded,
    pub payment_conversion: Vec<PaymentConversion>,
    pub upsell_analysis: UpsellAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRevenue {
    pub name: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRevenue {
    pub variant: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySales {
    pub city: String,
    /// Distinct orders shipped to this city.
    pub orders: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredAndRefunded {
    pub delivered_orders: u64,
    pub refunded_orders: u64,
    /// Orders that are both fully fulfilled and refunded at least once.
    pub delivered_and_refunded: u64,
    pub delivered_and_refunded_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConversion {
    pub method: String,
    pub orders: u64,
    /// Share of all paid orders that used this method, as a percentage.
    pub conversion: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellAnalysis {
    pub total_orders_with_items: u64,
    pub multi_product_orders: u64,
    pub upsell_rate: Decimal,
    /// Revenue beyond each multi-product order's single cheapest item,
    /// floored at 0 per order.
    pub upsell_revenue: Decimal,
    pub avg_items_per_order: Decimal,
    pub top_combinations: Vec<ProductPair>,
}

/// An unordered pair of products bought together, with `product_a` lexically
/// before `product_b` so each pair appears exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPair {
    pub product_a: String,
    pub product_b: String,
    /// Distinct orders containing both products.
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advanced {
    pub high_refund_rate_products: Vec<RefundRateProduct>,
    pub refund_reasons: Vec<RefundReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRateProduct {
    pub name: String,
    pub orders_with_product: u64,
    pub refunded_orders_with_product: u64,
    pub refund_rate: Decimal,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundReason {
    pub reason: String,
    pub count: u64,
    pub amount: Decimal,
}

/// A recent order as shown in the dashboard sidebar. Entity-shaped fields
/// keep their column names (snake_case), matching the listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentOrder {
    pub id: i64,
    pub order_number: String,
    pub name: String,
    pub status_id: String,
    pub fulfillment_status: String,
    pub total_price: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub customer: Option<RecentOrderCustomer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentOrderCustomer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
