//! # Vitrine Core Types
//!
//! This crate defines the shared data model of the system: the order dataset
//! entities as they are persisted and served, plus the small enums and errors
//! that every other crate builds on.
//!
//! As a Layer 0 crate it has no knowledge of the database schema details, the
//! remote API payload, or the metrics that are derived from these types.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::AddressType;
pub use error::CoreError;
pub use structs::{Address, Customer, Fulfillment, LineItem, Order, Payment, Refund};
