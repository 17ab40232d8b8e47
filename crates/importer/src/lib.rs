//! # Vitrine Importer
//!
//! Orchestrates one import run: fetch the remote orders payload, map each
//! order into write-side records, and persist them one transaction per order.
//! Cache invalidation is deliberately not handled here; the caller bumps the
//! version token after a successful run.

use api_client::OrdersApi;
use api_client::responses::{RemoteAddress, RemoteOrder};
use core_types::AddressType;
use database::{
    NewAddress, NewCustomer, NewFulfillment, NewLineItem, NewOrder, NewOrderRecord, NewPayment,
    NewRefund, OrderRepository,
};
use rust_decimal::Decimal;

pub mod error;

pub use error::ImportError;

/// Fetches and persists the remote order set.
pub struct ImportService<C: OrdersApi> {
    client: C,
    repository: OrderRepository,
}

impl<C: OrdersApi> ImportService<C> {
    pub fn new(client: C, repository: OrderRepository) -> Self {
        Self { client, repository }
    }

    /// Runs one full import and returns the number of orders persisted.
    ///
    /// Each order is written in its own transaction, so a failure partway
    /// through leaves earlier orders imported and the failing order
    /// untouched.
    pub async fn run(&self) -> Result<u64, ImportError> {
        let remote_orders = self.client.fetch_orders().await?;

        let mut imported = 0u64;
        for remote in &remote_orders {
            let record = map_order(remote);
            self.repository.save_imported_order(&record).await?;
            imported += 1;
        }

        tracing::info!(imported, "Order import finished.");
        Ok(imported)
    }
}

/// Maps one remote order into the write-side record the repository persists.
pub fn map_order(remote: &RemoteOrder) -> NewOrderRecord {
    let customer = NewCustomer {
        external_id: remote.customer.id,
        email: remote.customer.email.clone(),
        first_name: remote.customer.first_name.clone(),
        last_name: remote.customer.last_name.clone(),
        phone: remote.customer.phone.clone(),
        accepts_marketing: remote.customer.accepts_marketing,
    };

    let order = NewOrder {
        external_id: remote.id,
        order_number: remote.order_number.clone(),
        name: remote.name.clone(),
        email: remote.email.clone(),
        phone: remote.phone.clone(),
        status_id: remote.status_id.clone(),
        financial_status: remote.financial_status,
        fulfillment_status: remote.fulfillment_status.clone(),
        currency: remote.currency.clone(),
        currency_symbol: remote.currency_symbol.clone(),
        presentment_currency: remote
            .presentment_currency
            .clone()
            .unwrap_or_else(|| "R$".to_string()),
        local_currency_amount: remote.local_currency_amount.unwrap_or(Decimal::ZERO),
        total_price: remote.total_price,
        subtotal_price: remote.subtotal_price,
        current_total_price: remote.current_total_price,
        total_discounts: remote.total_discounts.unwrap_or(Decimal::ZERO),
        total_tax: remote.total_tax.unwrap_or(Decimal::ZERO),
        total_shipping: remote
            .shipping_lines
            .as_ref()
            .and_then(|lines| lines.price)
            .unwrap_or(Decimal::ZERO),
        cancel_reason: none_if_empty(remote.cancel_reason.clone()),
        cancelled_at: remote.cancelled_at,
        note: none_if_empty(remote.note.clone()),
        source_name: remote.source_name.clone(),
        processed_at: remote.processed_at,
        closed_at: remote.closed_at,
        created_at: remote.created_at,
        updated_at: remote.updated_at,
    };

    let line_items = remote
        .line_items
        .iter()
        .map(|item| NewLineItem {
            external_id: item.id,
            title: item.title.clone(),
            name: item.name.clone(),
            sku: item.sku.clone(),
            price: item.price,
            quantity: item.quantity,
            variant_title: item.variant_title.clone(),
            product_main_image: item.product_main_image.clone(),
            product_id: item.product_id,
            variant_id: item.variant_id,
            requires_shipping: item.requires_shipping,
            is_refunded: item.is_refunded,
            refunded_quantity: item.refunded_quantity,
            total_discount: item.total_discount.unwrap_or(Decimal::ZERO),
        })
        .collect();

    let payment = remote.payment.as_ref().map(|payment| NewPayment {
        external_id: payment.id,
        gateway: payment.gateway.clone(),
        payment_type: payment.payment_type.clone(),
        status_id: payment.status_id,
        amount: payment.amount,
        cc_brand: payment.cc_brand.clone(),
        cc_last_four: payment.cc_last_four.clone(),
        cc_name: payment.cc_name.clone(),
    });

    let mut addresses = Vec::new();
    if let Some(billing) = &remote.billing_address {
        addresses.push(map_address(billing, AddressType::Billing));
    }
    if let Some(shipping) = &remote.shipping_address {
        addresses.push(map_address(shipping, AddressType::Shipping));
    }

    let fulfillments = remote
        .fulfillments
        .iter()
        .map(|fulfillment| NewFulfillment {
            external_id: fulfillment.id,
            tracking_company: fulfillment.tracking_company.clone(),
            tracking_number: fulfillment.tracking_number.clone(),
            tracking_url: fulfillment.tracking_url.clone(),
            status: fulfillment.status,
            created_at: fulfillment.created_at,
            updated_at: fulfillment.updated_at,
        })
        .collect();

    let refunds = remote
        .refunds
        .iter()
        .map(|refund| NewRefund {
            external_id: refund.id,
            note: refund.note.clone(),
            total_amount: refund.total_amount,
            status_id: refund.status_id,
            refunded_at: refund.created_at,
        })
        .collect();

    NewOrderRecord {
        customer,
        order,
        line_items,
        payment,
        addresses,
        fulfillments,
        refunds,
    }
}

fn map_address(remote: &RemoteAddress, address_type: AddressType) -> NewAddress {
    NewAddress {
        address_type,
        first_name: remote.first_name.clone(),
        last_name: remote.last_name.clone(),
        address1: remote.address1.clone(),
        address2: none_if_empty(remote.address2.clone()),
        city: remote.city.clone(),
        province: remote.province.clone(),
        province_code: remote.province_code.clone(),
        zip: remote.zip.clone(),
        country: remote.country.clone(),
        country_code: remote.country_code.clone(),
        company: none_if_empty(remote.company.clone()),
        phone: remote.phone.clone(),
    }
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
