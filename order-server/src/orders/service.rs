//! OrderService - order command/query orchestration
//!
//! validate → load table/menu → [`OrderLedger`] → persist → broadcast.
//! Persist always happens before the broadcast, inside the same request, so
//! per-order events go out in commit order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::message::{HubEvent, HubEventData};
use shared::models::{Order, OrderLine, OrderStatus};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use super::error::{OrderError, OrderResult};
use super::ledger::{LineRequest, OrderLedger};
use crate::hub::EventBroadcaster;
use crate::storage::{OrderFilter, OrderStore};
use crate::utils::validation::{
    MAX_INSTRUCTIONS_LEN, MAX_QUANTITY, MAX_REMARKS_LEN, MIN_QUANTITY, collect_violations,
};

// ========== DTOs ==========

/// Create order request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(range(min = 1, message = "tableId must be a positive integer"))]
    pub table_id: i64,
    #[serde(alias = "lines")]
    #[validate(length(min = 1, message = "order must contain at least one item"))]
    #[validate(nested)]
    pub order_items: Vec<OrderItemRequest>,
    #[serde(default, alias = "specialInstructions")]
    #[validate(length(max = MAX_REMARKS_LEN, message = "remarks must be at most 500 characters"))]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[validate(range(min = 1, message = "menuItemId must be a positive integer"))]
    pub menu_item_id: i64,
    #[validate(range(min = MIN_QUANTITY, max = MAX_QUANTITY, message = "quantity must be between 1 and 10"))]
    pub quantity: i32,
    #[serde(default, alias = "specialInstructions")]
    #[validate(length(max = MAX_INSTRUCTIONS_LEN, message = "instructions must be at most 200 characters"))]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub instructions: Option<String>,
}

impl From<&OrderLine> for OrderLineResponse {
    fn from(line: &OrderLine) -> Self {
        Self {
            id: line.id,
            menu_item_id: line.menu_item_id,
            menu_item_name: line.menu_item_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price: line.line_total(),
            instructions: line.instructions.clone(),
        }
    }
}

/// Full order view (read-enriched with the table number)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub table_id: i64,
    pub table_number: Option<i32>,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub remarks: Option<String>,
    pub lines: Vec<OrderLineResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn from_order(order: &Order, table_number: Option<i32>) -> Self {
        Self {
            id: order.id,
            table_id: order.table_id,
            table_number,
            status: order.status,
            subtotal: order.subtotal,
            tax_amount: order.tax,
            total_amount: order.total,
            remarks: order.remarks.clone(),
            lines: order.lines.iter().map(OrderLineResponse::from).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Listing row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: i64,
    pub table_id: i64,
    pub table_number: Option<i32>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub item_count: i32,
    pub created_at: DateTime<Utc>,
}

// ========== Service ==========

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    ledger: OrderLedger,
    broadcaster: EventBroadcaster,
}

/// Parse a status string from a request (case-insensitive)
pub fn parse_status(raw: &str) -> OrderResult<OrderStatus> {
    raw.parse::<OrderStatus>()
        .map_err(|e| OrderError::Validation(vec![e.to_string()]))
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, ledger: OrderLedger, broadcaster: EventBroadcaster) -> Self {
        Self {
            store,
            ledger,
            broadcaster,
        }
    }

    /// Create a new order and notify the kitchen and the table
    pub async fn create_order(&self, req: CreateOrderRequest) -> OrderResult<OrderResponse> {
        req.validate()
            .map_err(|e| OrderError::Validation(collect_violations(&e)))?;

        let table = self.store.load_table(req.table_id).await?;

        let mut menu = HashMap::new();
        for item in &req.order_items {
            if menu.contains_key(&item.menu_item_id) {
                continue;
            }
            if let Some(menu_item) = self.store.load_menu_item(item.menu_item_id).await? {
                menu.insert(item.menu_item_id, menu_item);
            }
        }

        let lines: Vec<LineRequest> = req
            .order_items
            .into_iter()
            .map(|item| LineRequest {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
                instructions: item.instructions,
            })
            .collect();

        let order = self.ledger.create_order(
            req.table_id,
            table.as_ref(),
            &lines,
            &menu,
            req.remarks,
            Utc::now(),
        )?;
        let order = self.store.save_order(&order).await?;

        let table_number = table.map(|t| t.number);
        tracing::info!(
            order_id = order.id,
            table_id = order.table_id,
            total = %order.total,
            "Order created"
        );

        self.emit(
            &order,
            table_number,
            HubEventData::OrderCreated {
                status: order.status,
                total_amount: order.total,
                item_count: order.item_count(),
                created_at: order.created_at,
            },
        );

        Ok(OrderResponse::from_order(&order, table_number))
    }

    pub async fn get_order(&self, order_id: i64) -> OrderResult<OrderResponse> {
        let order = self.load(order_id).await?;
        let table_number = self.table_number(order.table_id).await?;
        Ok(OrderResponse::from_order(&order, table_number))
    }

    /// Move an order through its lifecycle
    pub async fn update_status(&self, order_id: i64, new_status: OrderStatus) -> OrderResult<OrderResponse> {
        let mut order = self.load(order_id).await?;
        let old_status = self
            .ledger
            .transition_status(&mut order, new_status, Utc::now())?;
        let table_number = self.table_number(order.table_id).await?;
        let order = self.store.save_order(&order).await?;

        tracing::info!(
            order_id,
            old_status = %old_status,
            new_status = %new_status,
            "Order status changed"
        );

        self.emit(
            &order,
            table_number,
            HubEventData::OrderStatusChanged {
                old_status,
                new_status,
                updated_at: order.updated_at,
            },
        );

        Ok(OrderResponse::from_order(&order, table_number))
    }

    /// All / by table: newest first. By status: oldest first (kitchen queue order).
    pub async fn list_orders(&self, filter: OrderFilter) -> OrderResult<Vec<OrderSummary>> {
        let mut orders = self.store.list_orders(filter).await?;
        match filter {
            OrderFilter::Status(_) => {
                orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            }
            OrderFilter::All | OrderFilter::Table(_) => {
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
            }
        }

        let numbers: HashMap<i64, i32> = self
            .store
            .list_tables()
            .await?
            .into_iter()
            .map(|t| (t.id, t.number))
            .collect();

        Ok(orders
            .iter()
            .map(|order| OrderSummary {
                id: order.id,
                table_id: order.table_id,
                table_number: numbers.get(&order.table_id).copied(),
                status: order.status,
                total_amount: order.total,
                item_count: order.item_count(),
                created_at: order.created_at,
            })
            .collect())
    }

    /// Delete an order without payments
    pub async fn delete_order(&self, order_id: i64) -> OrderResult<()> {
        if !self.store.delete_order(order_id).await? {
            return Err(OrderError::OrderNotFound(order_id));
        }
        tracing::info!(order_id, "Order deleted");
        Ok(())
    }

    // ========== Helpers ==========

    async fn load(&self, order_id: i64) -> OrderResult<Order> {
        self.store
            .load_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    async fn table_number(&self, table_id: i64) -> OrderResult<Option<i32>> {
        Ok(self.store.load_table(table_id).await?.map(|t| t.number))
    }

    fn emit(&self, order: &Order, table_number: Option<i32>, data: HubEventData) {
        self.broadcaster.broadcast(&HubEvent {
            order_id: order.id,
            table_id: order.table_id,
            table_number,
            data,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::TopicRegistry;
    use crate::orders::TransitionPolicy;
    use crate::storage::{RedbStore, StorageError, StorageResult, seed::seed_demo_data};
    use async_trait::async_trait;
    use shared::models::{DiningTable, MenuItem, Payment};
    use std::sync::atomic::{AtomicBool, Ordering};

    async fn service() -> OrderService {
        let store = Arc::new(RedbStore::open_in_memory().unwrap());
        seed_demo_data(store.as_ref()).await.unwrap();
        OrderService::new(
            store,
            OrderLedger::new(Decimal::new(8, 2), TransitionPolicy::Strict),
            EventBroadcaster::new(Arc::new(TopicRegistry::default())),
        )
    }

    fn request(table_id: i64, items: &[(i64, i32)]) -> CreateOrderRequest {
        CreateOrderRequest {
            table_id,
            order_items: items
                .iter()
                .map(|&(menu_item_id, quantity)| OrderItemRequest {
                    menu_item_id,
                    quantity,
                    instructions: None,
                })
                .collect(),
            remarks: None,
        }
    }

    #[tokio::test]
    async fn test_validation_lists_every_violation() {
        let service = service().await;
        let mut req = request(0, &[(1, 0), (2, 11)]);
        req.remarks = Some("x".repeat(501));

        match service.create_order(req).await.unwrap_err() {
            OrderError::Validation(violations) => {
                assert_eq!(violations.len(), 4, "{violations:?}");
                assert!(violations.iter().any(|v| v.starts_with("order_items[1].quantity")));
                assert!(violations.iter().any(|v| v.starts_with("remarks")));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = service.create_order(request(1, &[])).await.unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_request_accepts_aliases() {
        let req: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "tableId": 2,
            "lines": [{ "menuItemId": 1, "quantity": 1, "specialInstructions": "extra basil" }],
            "specialInstructions": "birthday"
        }))
        .unwrap();
        assert_eq!(req.order_items[0].instructions.as_deref(), Some("extra basil"));
        assert_eq!(req.remarks.as_deref(), Some("birthday"));
    }

    #[tokio::test]
    async fn test_listing_order_asymmetry() {
        let service = service().await;
        let first = service.create_order(request(1, &[(1, 1)])).await.unwrap();
        let second = service.create_order(request(1, &[(2, 1)])).await.unwrap();
        let third = service.create_order(request(2, &[(3, 1)])).await.unwrap();

        let all: Vec<i64> = service
            .list_orders(OrderFilter::All)
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(all, vec![third.id, second.id, first.id]);

        let by_table: Vec<i64> = service
            .list_orders(OrderFilter::Table(1))
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(by_table, vec![second.id, first.id]);

        let by_status: Vec<i64> = service
            .list_orders(OrderFilter::Status(OrderStatus::Received))
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(by_status, vec![first.id, second.id, third.id]);
    }

    #[tokio::test]
    async fn test_summary_fields() {
        let service = service().await;
        service
            .create_order(request(3, &[(1, 2), (6, 3)]))
            .await
            .unwrap();

        let summaries = service.list_orders(OrderFilter::All).await.unwrap();
        assert_eq!(summaries[0].item_count, 5);
        assert_eq!(summaries[0].table_number, Some(3));
    }

    #[tokio::test]
    async fn test_update_status_and_delete() {
        let service = service().await;
        let order = service.create_order(request(1, &[(1, 1)])).await.unwrap();

        let updated = service
            .update_status(order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);

        let err = service
            .update_status(999, OrderStatus::Preparing)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound(999)));

        service.delete_order(order.id).await.unwrap();
        assert!(matches!(
            service.get_order(order.id).await,
            Err(OrderError::OrderNotFound(_))
        ));
        assert!(matches!(
            service.delete_order(order.id).await,
            Err(OrderError::OrderNotFound(_))
        ));
    }

    /// Delegates to redb; table lookups fail once `tables_offline` is set
    struct FlakyTableStore {
        inner: RedbStore,
        tables_offline: AtomicBool,
    }

    #[async_trait]
    impl OrderStore for FlakyTableStore {
        async fn load_order(&self, id: i64) -> StorageResult<Option<Order>> {
            self.inner.load_order(id).await
        }
        async fn save_order(&self, order: &Order) -> StorageResult<Order> {
            self.inner.save_order(order).await
        }
        async fn delete_order(&self, id: i64) -> StorageResult<bool> {
            self.inner.delete_order(id).await
        }
        async fn list_orders(&self, filter: OrderFilter) -> StorageResult<Vec<Order>> {
            self.inner.list_orders(filter).await
        }
        async fn load_menu_item(&self, id: i64) -> StorageResult<Option<MenuItem>> {
            self.inner.load_menu_item(id).await
        }
        async fn save_menu_item(&self, item: &MenuItem) -> StorageResult<MenuItem> {
            self.inner.save_menu_item(item).await
        }
        async fn list_menu_items(&self) -> StorageResult<Vec<MenuItem>> {
            self.inner.list_menu_items().await
        }
        async fn load_table(&self, id: i64) -> StorageResult<Option<DiningTable>> {
            if self.tables_offline.load(Ordering::SeqCst) {
                return Err(StorageError::Storage(redb::StorageError::Io(
                    std::io::Error::other("table index unavailable"),
                )));
            }
            self.inner.load_table(id).await
        }
        async fn save_table(&self, table: &DiningTable) -> StorageResult<DiningTable> {
            self.inner.save_table(table).await
        }
        async fn list_tables(&self) -> StorageResult<Vec<DiningTable>> {
            self.inner.list_tables().await
        }
        async fn list_payments(&self, order_id: Option<i64>) -> StorageResult<Vec<Payment>> {
            self.inner.list_payments(order_id).await
        }
        async fn save_payment(&self, order: &Order, payment: &Payment) -> StorageResult<Payment> {
            self.inner.save_payment(order, payment).await
        }
    }

    #[tokio::test]
    async fn test_update_status_not_saved_when_table_lookup_fails() {
        let inner = RedbStore::open_in_memory().unwrap();
        seed_demo_data(&inner).await.unwrap();
        let store = Arc::new(FlakyTableStore {
            inner,
            tables_offline: AtomicBool::new(false),
        });
        let service = OrderService::new(
            store.clone(),
            OrderLedger::new(Decimal::new(8, 2), TransitionPolicy::Strict),
            EventBroadcaster::new(Arc::new(TopicRegistry::default())),
        );
        let order = service.create_order(request(1, &[(1, 1)])).await.unwrap();

        store.tables_offline.store(true, Ordering::SeqCst);
        let err = service
            .update_status(order.id, OrderStatus::Preparing)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Storage(_)));

        let persisted = store.inner.load_order(order.id).await.unwrap().unwrap();
        assert_eq!(persisted.status, OrderStatus::Received);

        // 恢复后重试不会被误判为非法流转
        store.tables_offline.store(false, Ordering::SeqCst);
        let updated = service
            .update_status(order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);
    }

    #[test]
    fn test_max_quantity_and_empty_order_messages() {
        let req = request(1, &[]);
        let violations = collect_violations(&req.validate().unwrap_err());
        assert_eq!(
            violations,
            vec!["order_items: order must contain at least one item".to_string()]
        );

        let req = request(1, &[(1, MAX_QUANTITY)]);
        assert!(req.validate().is_ok());
        let req = request(1, &[(1, MAX_QUANTITY + 1)]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("preparing").unwrap(), OrderStatus::Preparing);
        assert!(matches!(parse_status("cooking"), Err(OrderError::Validation(_))));
    }
}
