use axum::{
    Router,
    routing::{get, post},
};
use cache::{ReportCache, VersionCounter};
use configuration::Settings;
use database::OrderRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub repository: OrderRepository,
    pub report_cache: ReportCache,
    pub version: VersionCounter,
    pub settings: Settings,
}

/// The main function to configure and run the web server.
///
/// Tracing is initialized by the binary entry point, not here.
pub async fn run_server(addr: SocketAddr, settings: Settings) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let db_pool = database::connect().await?;
    database::run_migrations(&db_pool).await?;
    let repository = OrderRepository::new(db_pool);

    let app_state = Arc::new(AppState {
        repository,
        report_cache: ReportCache::new(Duration::from_secs(settings.dashboard.cache_ttl_secs)),
        version: VersionCounter::new(),
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/dashboard/sync", post(handlers::sync_orders))
        .route("/api/orders", get(handlers::list_orders))
        .route("/api/orders/{id}", get(handlers::get_order))
        .with_state(app_state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http());

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
