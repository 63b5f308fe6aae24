//! Menu Item Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub is_available: bool,
    pub is_vegetarian: bool,
    pub preparation_time_minutes: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update payload (PATCH)
///
/// Present fields override the stored value, absent fields keep it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub is_available: Option<bool>,
    pub is_vegetarian: Option<bool>,
    pub preparation_time_minutes: Option<i32>,
    pub image_url: Option<String>,
}

impl MenuItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == MenuItemPatch::default()
    }
}

impl MenuItem {
    /// Merge `patch` into this item and bump `updated_at`
    pub fn apply_patch(&mut self, patch: MenuItemPatch, now: DateTime<Utc>) {
        let MenuItemPatch {
            name,
            description,
            price,
            category,
            is_available,
            is_vegetarian,
            preparation_time_minutes,
            image_url,
        } = patch;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = price {
            self.price = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = is_available {
            self.is_available = v;
        }
        if let Some(v) = is_vegetarian {
            self.is_vegetarian = v;
        }
        if let Some(v) = preparation_time_minutes {
            self.preparation_time_minutes = v;
        }
        if image_url.is_some() {
            self.image_url = image_url;
        }
        self.updated_at = now;
    }
}
