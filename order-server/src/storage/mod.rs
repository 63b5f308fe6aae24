//! Storage port
//!
//! [`OrderStore`] is the only way the services reach persisted state.
//! [`RedbStore`] is the embedded implementation (file-backed or in-memory).

mod redb_store;
pub mod seed;

pub use redb_store::RedbStore;

use async_trait::async_trait;
use shared::models::{DiningTable, MenuItem, Order, OrderStatus, Payment};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Order {0} still has payments")]
    OrderHasPayments(i64),

    #[error("Transaction {transaction_id} already recorded for order {order_id}")]
    DuplicateTransaction {
        order_id: i64,
        transaction_id: String,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order listing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
    #[default]
    All,
    Table(i64),
    Status(OrderStatus),
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderFilter::All => true,
            OrderFilter::Table(table_id) => order.table_id == *table_id,
            OrderFilter::Status(status) => order.status == *status,
        }
    }
}

/// Storage port consumed by the services
///
/// Entities saved with `id == 0` get a fresh id; the saved copy is returned.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn load_order(&self, id: i64) -> StorageResult<Option<Order>>;

    /// Persist an order together with its lines
    async fn save_order(&self, order: &Order) -> StorageResult<Order>;

    /// Remove an order and its lines
    ///
    /// `Ok(false)` when absent, `OrderHasPayments` when any payment references it.
    async fn delete_order(&self, id: i64) -> StorageResult<bool>;

    /// Unordered; callers sort
    async fn list_orders(&self, filter: OrderFilter) -> StorageResult<Vec<Order>>;

    async fn load_menu_item(&self, id: i64) -> StorageResult<Option<MenuItem>>;

    async fn save_menu_item(&self, item: &MenuItem) -> StorageResult<MenuItem>;

    async fn list_menu_items(&self) -> StorageResult<Vec<MenuItem>>;

    async fn load_table(&self, id: i64) -> StorageResult<Option<DiningTable>>;

    async fn save_table(&self, table: &DiningTable) -> StorageResult<DiningTable>;

    async fn list_tables(&self) -> StorageResult<Vec<DiningTable>>;

    /// All payments, or only those of one order
    async fn list_payments(&self, order_id: Option<i64>) -> StorageResult<Vec<Payment>>;

    /// Persist the order and a new payment in one transaction
    ///
    /// Fails with `DuplicateTransaction` if `(order_id, transaction_id)` exists.
    async fn save_payment(&self, order: &Order, payment: &Payment) -> StorageResult<Payment>;
}
