//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ParseEnumError;

/// Order lifecycle status
///
/// Linear and forward-only: `Received → Preparing → Ready → Served → Closed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Received,
    Preparing,
    Ready,
    Served,
    Closed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Received,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Closed,
    ];

    /// Immediate successor in the chain, `None` for `Closed`
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Received => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Served),
            OrderStatus::Served => Some(OrderStatus::Closed),
            OrderStatus::Closed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Received",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Served => "Served",
            OrderStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive (`"preparing"`, `"Preparing"`, `"PREPARING"`)
impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("order status", s))
    }
}

/// Order line
///
/// Name and unit price are snapshots taken at order time; later menu edits
/// never reach an existing line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    /// 1..=10
    pub quantity: i32,
    pub unit_price: Decimal,
    pub instructions: Option<String>,
}

impl OrderLine {
    /// `quantity * unit_price`
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Order entity
///
/// `total == subtotal + tax`, `subtotal == Σ line totals`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub table_id: i64,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Σ line quantities
    pub fn item_count(&self) -> i32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_chain() {
        assert_eq!(OrderStatus::Received.next(), Some(OrderStatus::Preparing));
        assert_eq!(OrderStatus::Served.next(), Some(OrderStatus::Closed));
        assert_eq!(OrderStatus::Closed.next(), None);
        assert!(OrderStatus::Closed.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!("preparing".parse::<OrderStatus>(), Ok(OrderStatus::Preparing));
        assert_eq!("SERVED".parse::<OrderStatus>(), Ok(OrderStatus::Served));
        assert_eq!(" Closed ".parse::<OrderStatus>(), Ok(OrderStatus::Closed));

        let err = "cancelled".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown order status: cancelled");
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Ready).unwrap(),
            "\"Ready\""
        );
    }

    #[test]
    fn test_line_total_and_item_count() {
        let line = |qty, price| OrderLine {
            id: 0,
            menu_item_id: 1,
            menu_item_name: "Margherita Pizza".into(),
            quantity: qty,
            unit_price: price,
            instructions: None,
        };
        let now = Utc::now();
        let order = Order {
            id: 0,
            table_id: 1,
            lines: vec![line(2, Decimal::new(1299, 2)), line(1, Decimal::new(899, 2))],
            status: OrderStatus::Received,
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            remarks: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(order.lines[0].line_total(), Decimal::new(2598, 2));
        assert_eq!(order.item_count(), 3);
        assert!(!order.is_persisted());
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let now = Utc::now();
        let order = Order {
            id: 7,
            table_id: 2,
            lines: vec![],
            status: OrderStatus::Received,
            subtotal: Decimal::new(1000, 2),
            tax: Decimal::new(80, 2),
            total: Decimal::new(1080, 2),
            remarks: Some("no onions".into()),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["tableId"], 2);
        assert_eq!(json["total"], "10.80");
        assert!(json.get("createdAt").is_some());
    }
}
