use api_client::HttpOrdersClient;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use database::connection::{connect, run_migrations};
use database::repository::OrderRepository;
use importer::ImportService;
use indicatif::{ProgressBar, ProgressStyle};
use metrics::{MetricsEngine, MetricsReport};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// The main entry point for the vitrine order dashboard backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from the .env file when present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let settings = configuration::load_settings()?;

    match cli.command {
        Commands::Import => handle_import(settings).await,
        Commands::Serve(args) => handle_serve(args, settings).await,
        Commands::Dashboard => handle_dashboard().await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Order ingestion and dashboard metrics for the store's e-commerce data.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all orders from the remote API and persist them locally.
    Import,
    /// Run the JSON HTTP API for the dashboard frontend.
    Serve(ServeArgs),
    /// Compute the metrics report and render the KPIs in the terminal.
    Dashboard,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind, overriding the configured host.
    #[arg(long)]
    host: Option<String>,

    /// The port to listen on, overriding the configured port.
    #[arg(long)]
    port: Option<u16>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_import(settings: configuration::Settings) -> anyhow::Result<()> {
    let db_pool = connect().await?;
    run_migrations(&db_pool).await?;

    let client = HttpOrdersClient::new(&settings.orders_api)?;
    let service = ImportService::new(client, OrderRepository::new(db_pool));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Importing orders from the remote API...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let imported = service.run().await?;

    spinner.finish_with_message(format!("Imported {imported} orders."));
    Ok(())
}

async fn handle_serve(args: ServeArgs, settings: configuration::Settings) -> anyhow::Result<()> {
    let host = args.host.unwrap_or_else(|| settings.server.host.clone());
    let port = args.port.unwrap_or(settings.server.port);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    web_server::run_server(addr, settings).await
}

async fn handle_dashboard() -> anyhow::Result<()> {
    let db_pool = connect().await?;
    run_migrations(&db_pool).await?;

    let dataset = OrderRepository::new(db_pool).load_dataset().await?;
    let report = MetricsEngine::new().compute(&dataset);

    println!("{}", render_kpi_table(&report));
    Ok(())
}

/// Renders the KPI block as a terminal table.
fn render_kpi_table(report: &MetricsReport) -> Table {
    let kpis = &report.kpis;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![Cell::new("Metric"), Cell::new("Value")]);

    table.add_row(vec!["Total orders".to_string(), kpis.total_orders.to_string()]);
    table.add_row(vec![
        "Total revenue (USD)".to_string(),
        kpis.total_revenue_usd.to_string(),
    ]);
    table.add_row(vec![
        "Total revenue (BRL)".to_string(),
        kpis.total_revenue_brl.to_string(),
    ]);
    table.add_row(vec!["Average ticket".to_string(), kpis.average_ticket.to_string()]);
    table.add_row(vec![
        "Delivered orders".to_string(),
        format!("{} ({}%)", kpis.delivered_orders, kpis.delivered_rate),
    ]);
    table.add_row(vec![
        "Cancelled orders".to_string(),
        kpis.cancelled_orders.to_string(),
    ]);
    table.add_row(vec![
        "Unique customers".to_string(),
        kpis.unique_customers.to_string(),
    ]);
    table.add_row(vec![
        "Avg orders per customer".to_string(),
        kpis.avg_orders_per_customer.to_string(),
    ]);
    table.add_row(vec!["Gross revenue".to_string(), kpis.gross_revenue.to_string()]);
    table.add_row(vec![
        "Refunds".to_string(),
        format!("{} ({}%)", kpis.refund_amount, kpis.refund_rate),
    ]);
    table.add_row(vec!["Net revenue".to_string(), kpis.net_revenue.to_string()]);
    table.add_row(vec![
        "Top product".to_string(),
        match &kpis.top_product.name {
            Some(name) => format!("{} ({} sold)", name, kpis.top_product.quantity),
            None => "-".to_string(),
        },
    ]);

    table
}
