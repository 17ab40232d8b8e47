//! DTOs mirroring the remote orders API payload.
//!
//! The endpoint returns `{"orders": [{"order": {...}}, ...]}`. Monetary
//! fields go through the `flexible_decimal` boundary so the rest of the
//! system only ever sees `Decimal`.

use crate::decimal::flexible_decimal;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;

/// The top-level response body.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersEnvelope {
    #[serde(default)]
    pub orders: Vec<OrderWrapper>,
}

/// Each array element wraps the order under an `order` key.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderWrapper {
    pub order: RemoteOrder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteOrder {
    pub id: i64,
    #[serde(deserialize_with = "as_string")]
    pub order_number: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status_id: String,
    pub financial_status: i16,
    pub fulfillment_status: String,
    pub currency: String,
    pub currency_symbol: String,
    pub presentment_currency: Option<String>,
    #[serde(default, deserialize_with = "flexible_decimal::option::deserialize")]
    pub local_currency_amount: Option<Decimal>,
    #[serde(deserialize_with = "flexible_decimal::deserialize")]
    pub total_price: Decimal,
    #[serde(deserialize_with = "flexible_decimal::deserialize")]
    pub subtotal_price: Decimal,
    #[serde(deserialize_with = "flexible_decimal::deserialize")]
    pub current_total_price: Decimal,
    #[serde(default, deserialize_with = "flexible_decimal::option::deserialize")]
    pub total_discounts: Option<Decimal>,
    #[serde(default, deserialize_with = "flexible_decimal::option::deserialize")]
    pub total_tax: Option<Decimal>,
    pub shipping_lines: Option<RemoteShippingLines>,
    pub cancel_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub source_name: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer: RemoteCustomer,
    #[serde(default)]
    pub line_items: Vec<RemoteLineItem>,
    pub payment: Option<RemotePayment>,
    pub billing_address: Option<RemoteAddress>,
    pub shipping_address: Option<RemoteAddress>,
    #[serde(default)]
    pub fulfillments: Vec<RemoteFulfillment>,
    #[serde(default)]
    pub refunds: Vec<RemoteRefund>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteShippingLines {
    #[serde(default, deserialize_with = "flexible_decimal::option::deserialize")]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCustomer {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub accepts_marketing: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteLineItem {
    pub id: i64,
    pub title: Option<String>,
    pub name: String,
    pub sku: Option<String>,
    #[serde(deserialize_with = "flexible_decimal::deserialize")]
    pub price: Decimal,
    pub quantity: i32,
    pub variant_title: Option<String>,
    pub product_main_image: Option<String>,
    pub product_id: Option<i64>,
    pub variant_id: Option<i64>,
    #[serde(default = "default_true")]
    pub requires_shipping: bool,
    #[serde(default)]
    pub is_refunded: bool,
    #[serde(default)]
    pub refunded_quantity: i32,
    #[serde(default, deserialize_with = "flexible_decimal::option::deserialize")]
    pub total_discount: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemotePayment {
    pub id: Option<i64>,
    pub gateway: String,
    #[serde(rename = "type")]
    pub payment_type: String,
    pub status_id: i16,
    #[serde(deserialize_with = "flexible_decimal::deserialize")]
    pub amount: Decimal,
    pub cc_brand: Option<String>,
    pub cc_last_four: Option<String>,
    pub cc_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteAddress {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub province_code: Option<String>,
    pub zip: Option<String>,
    pub country: String,
    pub country_code: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFulfillment {
    pub id: i64,
    pub tracking_company: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    #[serde(default)]
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRefund {
    pub id: i64,
    pub note: Option<String>,
    #[serde(deserialize_with = "flexible_decimal::deserialize")]
    pub total_amount: Decimal,
    pub status_id: i16,
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Accepts a string or a bare number where the API is inconsistent about
/// quoting (order numbers in particular).
fn as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }
    match Raw::deserialize(deserializer).map_err(DeError::custom)? {
        Raw::Text(s) => Ok(s),
        Raw::Number(n) => Ok(n.to_string()),
    }
}
