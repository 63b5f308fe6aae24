//! Menu administration
//!
//! 菜单编辑只影响之后的新订单；已有订单行保存的是下单时的名称和单价快照。

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{MenuItem, MenuItemPatch};
use std::sync::Arc;

use crate::orders::{OrderError, OrderResult};
use crate::storage::OrderStore;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, check_optional_text, check_required_text,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

#[derive(Clone)]
pub struct MenuService {
    store: Arc<dyn OrderStore>,
}

impl MenuService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Sorted by category, then name
    pub async fn list_items(&self) -> OrderResult<Vec<MenuItem>> {
        let mut items = self.store.list_menu_items().await?;
        items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    pub async fn get_item(&self, id: i64) -> OrderResult<MenuItem> {
        self.store
            .load_menu_item(id)
            .await?
            .ok_or(OrderError::MenuItemNotFound(id))
    }

    /// Merge a partial update; present fields win
    pub async fn patch_item(&self, id: i64, patch: MenuItemPatch) -> OrderResult<MenuItem> {
        let violations = validate_patch(&patch);
        if !violations.is_empty() {
            return Err(OrderError::Validation(violations));
        }

        let mut item = self.get_item(id).await?;
        if patch.is_empty() {
            return Ok(item);
        }
        item.apply_patch(patch, Utc::now());
        let item = self.store.save_menu_item(&item).await?;

        tracing::info!(menu_item_id = id, price = %item.price, available = item.is_available, "Menu item updated");
        Ok(item)
    }

    pub async fn set_availability(&self, id: i64, is_available: bool) -> OrderResult<MenuItem> {
        self.patch_item(
            id,
            MenuItemPatch {
                is_available: Some(is_available),
                ..Default::default()
            },
        )
        .await
    }
}

fn validate_patch(patch: &MenuItemPatch) -> Vec<String> {
    let mut violations = Vec::new();
    if let Some(name) = &patch.name {
        violations.extend(check_required_text(name, "name", MAX_NAME_LEN));
    }
    violations.extend(check_optional_text(
        patch.description.as_deref(),
        "description",
        MAX_DESCRIPTION_LEN,
    ));
    if let Some(price) = patch.price
        && price <= Decimal::ZERO
    {
        violations.push(format!("price must be greater than 0, got {price}"));
    }
    if let Some(minutes) = patch.preparation_time_minutes
        && minutes < 0
    {
        violations.push("preparationTimeMinutes must not be negative".to_string());
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{RedbStore, seed::seed_demo_data};

    async fn service() -> MenuService {
        let store = Arc::new(RedbStore::open_in_memory().unwrap());
        seed_demo_data(store.as_ref()).await.unwrap();
        MenuService::new(store)
    }

    #[tokio::test]
    async fn test_patch_item() {
        let service = service().await;
        let before = service.get_item(1).await.unwrap();

        let after = service
            .patch_item(
                1,
                MenuItemPatch {
                    price: Some(Decimal::new(1399, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(after.price, Decimal::new(1399, 2));
        assert_eq!(after.name, before.name);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(service.get_item(1).await.unwrap(), after);
    }

    #[tokio::test]
    async fn test_patch_rejects_bad_values() {
        let service = service().await;
        let err = service
            .patch_item(
                1,
                MenuItemPatch {
                    name: Some("   ".into()),
                    price: Some(Decimal::ZERO),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        match err {
            OrderError::Validation(v) => assert_eq!(v.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            service.set_availability(99, false).await,
            Err(OrderError::MenuItemNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_set_availability_and_listing() {
        let service = service().await;
        let item = service.set_availability(5, false).await.unwrap();
        assert!(!item.is_available);

        let items = service.list_items().await.unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(items[0].category, "Desserts");
    }
}
