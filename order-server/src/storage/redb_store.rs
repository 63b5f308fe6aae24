//! redb-based implementation of the storage port
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` (JSON, lines embedded) | Orders |
//! | `payments` | `payment_id` | `Payment` (JSON) | Payment attempts |
//! | `payment_tx_index` | `(order_id, transaction_id)` | `payment_id` | Uniqueness + per-order lookup |
//! | `menu_items` | `menu_item_id` | `MenuItem` (JSON) | Menu |
//! | `dining_tables` | `table_id` | `DiningTable` (JSON) | Tables |
//! | `sequence_counter` | entity name | `u64` | Id allocation |
//!
//! redb commits are atomic, so "order + payment" and "order + lines" each land
//! in a single write transaction.

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{DiningTable, MenuItem, Order, Payment};
use std::path::Path;
use std::sync::Arc;

use super::{OrderFilter, OrderStore, StorageError, StorageResult};

type JsonTable = TableDefinition<'static, i64, &'static [u8]>;

const ORDERS_TABLE: JsonTable = TableDefinition::new("orders");
const PAYMENTS_TABLE: JsonTable = TableDefinition::new("payments");
const MENU_ITEMS_TABLE: JsonTable = TableDefinition::new("menu_items");
const DINING_TABLES_TABLE: JsonTable = TableDefinition::new("dining_tables");

/// key = (order_id, transaction_id), value = payment_id
const PAYMENT_TX_INDEX: TableDefinition<(i64, &str), i64> =
    TableDefinition::new("payment_tx_index");

/// key = entity name, value = last allocated id
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const ORDER_SEQ: &str = "order";
const ORDER_LINE_SEQ: &str = "order_line";
const PAYMENT_SEQ: &str = "payment";
const MENU_ITEM_SEQ: &str = "menu_item";
const DINING_TABLE_SEQ: &str = "dining_table";

/// Order store backed by redb
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, `STORAGE=memory`)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(PAYMENTS_TABLE)?;
            let _ = write_txn.open_table(PAYMENT_TX_INDEX)?;
            let _ = write_txn.open_table(MENU_ITEMS_TABLE)?;
            let _ = write_txn.open_table(DINING_TABLES_TABLE)?;
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Helpers ==========

    /// Increment and return the sequence for `key` (within transaction)
    fn next_id(txn: &WriteTransaction, key: &str) -> StorageResult<i64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table.get(key)?.map(|guard| guard.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(key, next)?;
        Ok(next as i64)
    }

    fn put_json<T: Serialize>(
        txn: &WriteTransaction,
        def: JsonTable,
        id: i64,
        value: &T,
    ) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let mut table = txn.open_table(def)?;
        table.insert(id, bytes.as_slice())?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, def: JsonTable, id: i64) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn list_json<T: DeserializeOwned>(&self, def: JsonTable) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;

        let mut items = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }

    /// Save with id allocation for `id == 0`
    fn upsert<T: Serialize>(
        &self,
        def: JsonTable,
        seq_key: &str,
        id: i64,
        value: impl FnOnce(i64) -> T,
    ) -> StorageResult<T> {
        let txn = self.db.begin_write()?;
        let id = if id == 0 {
            Self::next_id(&txn, seq_key)?
        } else {
            id
        };
        let entity = value(id);
        Self::put_json(&txn, def, id, &entity)?;
        txn.commit()?;
        Ok(entity)
    }
}

#[async_trait]
impl OrderStore for RedbStore {
    async fn load_order(&self, id: i64) -> StorageResult<Option<Order>> {
        self.get_json(ORDERS_TABLE, id)
    }

    async fn save_order(&self, order: &Order) -> StorageResult<Order> {
        let mut order = order.clone();
        let txn = self.db.begin_write()?;
        if order.id == 0 {
            order.id = Self::next_id(&txn, ORDER_SEQ)?;
        }
        for line in order.lines.iter_mut().filter(|l| l.id == 0) {
            line.id = Self::next_id(&txn, ORDER_LINE_SEQ)?;
        }
        Self::put_json(&txn, ORDERS_TABLE, order.id, &order)?;
        txn.commit()?;
        Ok(order)
    }

    async fn delete_order(&self, id: i64) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let exists = {
            let orders = txn.open_table(ORDERS_TABLE)?;
            orders.get(id)?.is_some()
        };
        let has_payments = {
            let index = txn.open_table(PAYMENT_TX_INDEX)?;
            // 只有下界, 以免 id + 1 溢出; 首个键属于本订单即有支付
            match index.range((id, "")..)?.next() {
                Some(entry) => entry?.0.value().0 == id,
                None => false,
            }
        };

        if !exists {
            txn.abort()?;
            return Ok(false);
        }
        if has_payments {
            txn.abort()?;
            return Err(StorageError::OrderHasPayments(id));
        }

        {
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            orders.remove(id)?;
        }
        txn.commit()?;
        Ok(true)
    }

    async fn list_orders(&self, filter: OrderFilter) -> StorageResult<Vec<Order>> {
        let orders: Vec<Order> = self.list_json(ORDERS_TABLE)?;
        Ok(orders.into_iter().filter(|o| filter.matches(o)).collect())
    }

    async fn load_menu_item(&self, id: i64) -> StorageResult<Option<MenuItem>> {
        self.get_json(MENU_ITEMS_TABLE, id)
    }

    async fn save_menu_item(&self, item: &MenuItem) -> StorageResult<MenuItem> {
        self.upsert(MENU_ITEMS_TABLE, MENU_ITEM_SEQ, item.id, |id| MenuItem {
            id,
            ..item.clone()
        })
    }

    async fn list_menu_items(&self) -> StorageResult<Vec<MenuItem>> {
        self.list_json(MENU_ITEMS_TABLE)
    }

    async fn load_table(&self, id: i64) -> StorageResult<Option<DiningTable>> {
        self.get_json(DINING_TABLES_TABLE, id)
    }

    async fn save_table(&self, table: &DiningTable) -> StorageResult<DiningTable> {
        self.upsert(DINING_TABLES_TABLE, DINING_TABLE_SEQ, table.id, |id| DiningTable {
            id,
            ..table.clone()
        })
    }

    async fn list_tables(&self) -> StorageResult<Vec<DiningTable>> {
        self.list_json(DINING_TABLES_TABLE)
    }

    async fn list_payments(&self, order_id: Option<i64>) -> StorageResult<Vec<Payment>> {
        let Some(order_id) = order_id else {
            return self.list_json(PAYMENTS_TABLE);
        };

        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(PAYMENT_TX_INDEX)?;
        let payments = read_txn.open_table(PAYMENTS_TABLE)?;

        let mut result = Vec::new();
        for entry in index.range((order_id, "")..)? {
            let (key, payment_id) = entry?;
            if key.value().0 != order_id {
                break;
            }
            if let Some(value) = payments.get(payment_id.value())? {
                result.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(result)
    }

    async fn save_payment(&self, order: &Order, payment: &Payment) -> StorageResult<Payment> {
        if !order.is_persisted() {
            return Err(StorageError::OrderNotFound(order.id));
        }

        let mut payment = payment.clone();
        let txn = self.db.begin_write()?;

        let duplicate = {
            let index = txn.open_table(PAYMENT_TX_INDEX)?;
            index
                .get((payment.order_id, payment.transaction_id.as_str()))?
                .is_some()
        };
        if duplicate {
            txn.abort()?;
            return Err(StorageError::DuplicateTransaction {
                order_id: payment.order_id,
                transaction_id: payment.transaction_id,
            });
        }

        if payment.id == 0 {
            payment.id = Self::next_id(&txn, PAYMENT_SEQ)?;
        }
        Self::put_json(&txn, PAYMENTS_TABLE, payment.id, &payment)?;
        {
            let mut index = txn.open_table(PAYMENT_TX_INDEX)?;
            index.insert(
                (payment.order_id, payment.transaction_id.as_str()),
                payment.id,
            )?;
        }
        Self::put_json(&txn, ORDERS_TABLE, order.id, order)?;
        txn.commit()?;

        Ok(payment)
    }
}
