//! Data models
//!
//! Shared between the order server and its clients (via API).
//! All IDs are `i64`; an id of `0` means "not yet persisted".
//! Currency fields are `rust_decimal::Decimal` with 2-digit scale.

pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod payment;

// Re-exports
pub use dining_table::*;
pub use menu_item::*;
pub use order::*;
pub use payment::*;

use thiserror::Error;

/// Returned when a status/method string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
