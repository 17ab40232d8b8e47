//! # Vitrine API Client
//!
//! The HTTP boundary to the remote orders API. This crate owns the response
//! DTO tree and the decimal parsing boundary that normalizes the remote
//! payload's mixed number-or-string money values before anything downstream
//! sees them.

use crate::error::ApiError;
use crate::responses::{OrdersEnvelope, RemoteOrder};
use async_trait::async_trait;
use configuration::OrdersApiSettings;
use std::time::Duration;

pub mod decimal;
pub mod error;
pub mod responses;

// --- Public API ---
pub use decimal::parse_decimal;

/// The abstract interface to the remote orders API. The importer is written
/// against this trait so tests can substitute a canned client.
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Fetches the complete list of orders from the remote endpoint.
    async fn fetch_orders(&self) -> Result<Vec<RemoteOrder>, ApiError>;
}

/// The concrete reqwest-backed client.
#[derive(Clone)]
pub struct HttpOrdersClient {
    client: reqwest::Client,
    url: String,
}

impl HttpOrdersClient {
    pub fn new(settings: &OrdersApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: settings.url.clone(),
        })
    }
}

#[async_trait]
impl OrdersApi for HttpOrdersClient {
    async fn fetch_orders(&self) -> Result<Vec<RemoteOrder>, ApiError> {
        tracing::debug!(url = %self.url, "Fetching orders from the remote API.");

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let envelope = serde_json::from_str::<OrdersEnvelope>(&text)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;

        let orders: Vec<RemoteOrder> =
            envelope.orders.into_iter().map(|wrapper| wrapper.order).collect();
        tracing::info!(count = orders.len(), "Fetched orders from the remote API.");

        Ok(orders)
    }
}
