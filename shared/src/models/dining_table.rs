//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table status (read-only to the order core)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

/// Dining table entity (桌台)
///
/// `number` is what guests see and what table topics are named after.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: i64,
    pub number: i32,
    pub capacity: i32,
    pub status: TableStatus,
}
