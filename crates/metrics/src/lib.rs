//! # Vitrine Metrics Engine
//!
//! This crate computes the dashboard's aggregate business metrics. It acts as
//! the "single source of truth" for every KPI, chart series, and analytics
//! table the dashboard renders.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of the
//!   database, the remote API, or HTTP. It depends only on `core-types`
//!   (Layer 0).
//! - **Stateless Calculation:** The `MetricsEngine` is a stateless calculator.
//!   It takes an immutable `OrderDataset` snapshot as input and produces a
//!   `MetricsReport` as output. Two calls on the same snapshot yield identical
//!   reports, which is what makes the result safely cacheable by the caller.
//!
//! ## Public API
//!
//! - `OrderDataset`: The read-only snapshot of all order data.
//! - `MetricsEngine`: The main struct that contains the calculation logic.
//! - `MetricsReport`: The standardized struct that holds the full dashboard
//!   payload (kpis, charts, intermediate, advanced, recentOrders).

// Declare the modules that constitute this crate.
pub mod dataset;
pub mod engine;
pub mod num;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use dataset::OrderDataset;
pub use engine::MetricsEngine;
pub use report::MetricsReport;
