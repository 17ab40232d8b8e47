use crate::{AppState, error::AppError};
use api_client::HttpOrdersClient;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use database::{OrderDetails, OrderListFilter, OrderPage, SortDirection, SortField};
use importer::ImportService;
use metrics::{MetricsEngine, MetricsReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// # GET /api/dashboard
///
/// The full metrics report, served through the cache gate. The compute
/// closure loads a fresh dataset snapshot and runs the engine; the gate
/// guarantees at most one computation in flight per version token.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MetricsReport>, AppError> {
    let repository = state.repository.clone();
    let report = state
        .report_cache
        .get_or_compute(state.version.current(), || async move {
            let dataset = repository.load_dataset().await?;
            Ok::<_, database::DbError>(MetricsEngine::new().compute(&dataset))
        })
        .await?;

    Ok(Json((*report).clone()))
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub imported: u64,
}

/// # POST /api/dashboard/sync
///
/// Runs a full import from the remote orders API, then bumps the cache
/// version token so the next dashboard request recomputes.
pub async fn sync_orders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SyncResponse>, AppError> {
    let client = HttpOrdersClient::new(&state.settings.orders_api)?;
    let service = ImportService::new(client, state.repository.clone());

    let imported = service.run().await?;
    if imported > 0 {
        let version = state.version.bump();
        tracing::info!(imported, version, "Import finished; cache invalidated.");
    }

    Ok(Json(SyncResponse { imported }))
}

/// Raw query parameters for the order listing. Sanitization happens here:
/// the repository only ever sees the whitelisted filter struct.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl OrderListParams {
    fn into_filter(self) -> OrderListFilter {
        OrderListFilter {
            search: self.search,
            status: self.status,
            date_from: self.date_from.as_deref().and_then(parse_date),
            date_to: self.date_to.as_deref().and_then(parse_date),
            payment_method: self.payment_method,
            sort: self.sort.as_deref().map(SortField::parse).unwrap_or_default(),
            direction: self
                .direction
                .as_deref()
                .map(SortDirection::parse)
                .unwrap_or_default(),
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(0),
        }
        .sanitized()
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersIndexResponse {
    pub orders: OrderPage,
    pub filters: OrderListFilter,
    pub available_statuses: Vec<String>,
    pub available_payment_methods: Vec<String>,
}

/// # GET /api/orders
///
/// Filtered, sorted, paginated order listing plus the distinct values the
/// filter dropdowns need.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<OrdersIndexResponse>, AppError> {
    let filter = params.into_filter();

    let (orders, statuses, payment_methods) = tokio::join!(
        state.repository.list_orders(&filter),
        state.repository.distinct_statuses(),
        state.repository.distinct_payment_methods(),
    );

    Ok(Json(OrdersIndexResponse {
        orders: orders?,
        filters: filter,
        available_statuses: statuses?,
        available_payment_methods: payment_methods?,
    }))
}

/// # GET /api/orders/{id}
pub async fn get_order(
    Path(order_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<OrderDetails>, AppError> {
    let details = state.repository.order_details(order_id).await.map_err(|e| {
        match e {
            database::DbError::NotFound => {
                AppError::NotFound(format!("Order {order_id} not found"))
            }
            other => other.into(),
        }
    })?;
    Ok(Json(details))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_sanitize_into_a_whitelisted_filter() {
        let params = OrderListParams {
            search: Some("bob".to_string()),
            sort: Some("email".to_string()),
            direction: Some("up".to_string()),
            date_from: Some("2026-03-01".to_string()),
            date_to: Some("not-a-date".to_string()),
            per_page: Some(500),
            ..Default::default()
        };

        let filter = params.into_filter();
        assert_eq!(filter.sort, SortField::CreatedAt);
        assert_eq!(filter.direction, SortDirection::Desc);
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(filter.date_to, None);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.per_page, database::listing::MAX_PER_PAGE);
    }
}
