//! # Vitrine Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database. It owns the order schema and is the system's only
//! writer.
//!
//! ## Architectural Principles
//!
//! - **Adapter Layer:** Encapsulates all database-specific logic. The rest of
//!   the application sees typed entities and filter structs, never SQL.
//! - **Snapshot Reads:** The metrics engine consumes a full `OrderDataset`
//!   snapshot produced here; the per-entity scans run concurrently since they
//!   are independent reads.
//! - **Asynchronous & Pooled:** All operations are asynchronous over a shared
//!   `PgPool`.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: Pool setup and schema management.
//! - `OrderRepository`: All data access methods (snapshot loads, listing,
//!   details, import upserts).
//! - `OrderListFilter` and friends: the sanitized listing filter types.
//! - `DbError`: The specific error types that can be returned from this
//!   crate. A failed query propagates untouched through the compute paths;
//!   there is no partial metrics report.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod listing;
pub mod records;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use listing::{OrderListFilter, SortDirection, SortField};
pub use records::{
    NewAddress, NewCustomer, NewFulfillment, NewLineItem, NewOrder, NewOrderRecord, NewPayment,
    NewRefund,
};
pub use repository::{OrderDetails, OrderPage, OrderRepository, OrderSummary};
