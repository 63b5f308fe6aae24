//! Demo data
//!
//! 空库时写入 6 张桌台和一份小菜单，方便本地开发。

use chrono::Utc;
use rust_decimal::Decimal;
use shared::models::{DiningTable, MenuItem, TableStatus};

use super::{OrderStore, StorageResult};

/// (name, description, price in cents, category, vegetarian, prep minutes)
const DEMO_MENU: &[(&str, &str, i64, &str, bool, i32)] = &[
    ("Margherita Pizza", "Tomato, mozzarella, basil", 1299, "Pizza", true, 15),
    ("Pepperoni Pizza", "Tomato, mozzarella, pepperoni", 1499, "Pizza", false, 15),
    ("Caesar Salad", "Romaine, parmesan, croutons", 899, "Salads", true, 8),
    ("Spaghetti Carbonara", "Egg, pecorino, guanciale", 1349, "Pasta", false, 12),
    ("Tiramisu", "Mascarpone, espresso, cocoa", 699, "Desserts", true, 5),
    ("Lemonade", "Fresh squeezed", 349, "Drinks", true, 2),
];

/// Table numbers 1..=6 with capacities
const DEMO_TABLES: &[(i32, i32)] = &[(1, 2), (2, 2), (3, 4), (4, 4), (5, 6), (6, 8)];

/// Seed tables and menu when the store has no tables yet
///
/// Returns `true` when data was written.
pub async fn seed_demo_data(store: &dyn OrderStore) -> StorageResult<bool> {
    if !store.list_tables().await?.is_empty() {
        return Ok(false);
    }

    for &(number, capacity) in DEMO_TABLES {
        store
            .save_table(&DiningTable {
                id: 0,
                number,
                capacity,
                status: TableStatus::Available,
            })
            .await?;
    }

    let now = Utc::now();
    for &(name, description, cents, category, is_vegetarian, prep) in DEMO_MENU {
        store
            .save_menu_item(&MenuItem {
                id: 0,
                name: name.to_string(),
                description: description.to_string(),
                price: Decimal::new(cents, 2),
                category: category.to_string(),
                is_available: true,
                is_vegetarian,
                preparation_time_minutes: prep,
                image_url: None,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    tracing::info!(
        tables = DEMO_TABLES.len(),
        menu_items = DEMO_MENU.len(),
        "Seeded demo data"
    );
    Ok(true)
}
