//! Write-side records for the import pipeline.
//!
//! The importer maps the remote API payload into these structs; the
//! repository persists one `NewOrderRecord` per remote order inside a single
//! transaction. All monetary values arrive here already normalized to
//! `Decimal` by the api-client's parsing boundary.

use chrono::{DateTime, Utc};
use core_types::AddressType;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct NewOrderRecord {
    pub customer: NewCustomer,
    pub order: NewOrder,
    pub line_items: Vec<NewLineItem>,
    pub payment: Option<NewPayment>,
    pub addresses: Vec<NewAddress>,
    pub fulfillments: Vec<NewFulfillment>,
    pub refunds: Vec<NewRefund>,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub external_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub accepts_marketing: bool,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub external_id: i64,
    pub order_number: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status_id: String,
    pub financial_status: i16,
    pub fulfillment_status: String,
    pub currency: String,
    pub currency_symbol: String,
    pub presentment_currency: String,
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
    /// Taken from the payload, not from the import time.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLineItem {
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
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub external_id: Option<i64>,
    pub gateway: String,
    pub payment_type: String,
    pub status_id: i16,
    pub amount: Decimal,
    pub cc_brand: Option<String>,
    pub cc_last_four: Option<String>,
    pub cc_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAddress {
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
}

#[derive(Debug, Clone)]
pub struct NewFulfillment {
    pub external_id: i64,
    pub tracking_company: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRefund {
    pub external_id: i64,
    pub note: Option<String>,
    pub total_amount: Decimal,
    pub status_id: i16,
    pub refunded_at: Option<DateTime<Utc>>,
}
