//! External-facing identifiers
//!
//! `<PREFIX>_<yyyyMMddHHmmss>_<8 hex>`, UTC.

use chrono::{DateTime, Utc};

/// `yyyyMMddHHmmss`
pub fn timestamp_token(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// First `len` hex chars of a fresh v4 uuid (max 32)
pub fn short_hex(len: usize) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    hex[..len.min(hex.len())].to_string()
}

/// Payment reference number
pub fn reference_number(now: DateTime<Utc>) -> String {
    format!("REF_{}_{}", timestamp_token(now), short_hex(8))
}

/// Mock gateway transaction id
pub fn mock_transaction_id(now: DateTime<Utc>) -> String {
    format!("MOCK_TXN_{}_{}", timestamp_token(now), short_hex(8))
}
