use crate::enums::AddressType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A customer as imported from the remote store, deduplicated by external id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub external_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub accepts_marketing: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An imported order. Monetary fields are fixed-precision decimals; the
/// lifecycle state (`status_id`) and fulfillment state are the enum-like
/// strings the remote store reports, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub external_id: i64,
    pub order_number: String,
    pub name: String,
    pub customer_id: Option<i64>,
    pub email: String,
    pub phone: Option<String>,
    pub status_id: String,
    pub financial_status: i16,
    pub fulfillment_status: String,
    pub currency: String,
    pub currency_symbol: String,
    pub presentment_currency: String,
    /// Order total expressed in the presentment (local) currency.
    pub local_currency_amount: Decimal,
    pub total_price: Decimal,
    pub subtotal_price: Decimal,
    pub current_total_price: Decimal,
    pub total_discounts: Decimal,
    pub total_tax: Decimal,
    pub total_shipping: Decimal,
    pub cancel_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub source_name: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single product line on an order.
///
/// `title` and `variant_title` may be missing or empty; consumers that group
/// by them are expected to skip those rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    pub external_id: i64,
    pub title: Option<String>,
    pub name: String,
    pub sku: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub variant_title: Option<String>,
    pub product_main_image: Option<String>,
    pub product_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub requires_shipping: bool,
    pub is_refunded: bool,
    pub refunded_quantity: i32,
    pub total_discount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LineItem {
    /// The derived value of this line: unit price times quantity.
    /// Never stored; always recomputed from the persisted fields.
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The zero-or-one payment recorded against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub external_id: Option<i64>,
    pub gateway: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub payment_type: String,
    pub status_id: i16,
    pub amount: Decimal,
    /// Card network identifier, e.g. "Visa". Absent for non-card payments.
    pub cc_brand: Option<String>,
    pub cc_last_four: Option<String>,
    pub cc_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A refund issued against an order. Orders may carry any number of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Refund {
    pub id: i64,
    pub order_id: i64,
    pub external_id: i64,
    pub note: Option<String>,
    pub total_amount: Decimal,
    pub status_id: i16,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A billing or shipping address attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub order_id: i64,
    #[serde(rename = "type")]
    pub address_type: AddressType,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Single-line rendering of the populated address parts.
    pub fn formatted(&self) -> String {
        let parts: Vec<&str> = [
            Some(self.address1.as_str()),
            self.address2.as_deref(),
            self.city.as_deref(),
            self.province.as_deref(),
            self.zip.as_deref(),
            Some(self.country.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

        parts.join(", ")
    }
}

/// A shipment record attached to an order. Display-only; metrics never read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Fulfillment {
    pub id: i64,
    pub order_id: i64,
    pub external_id: i64,
    pub tracking_company: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
