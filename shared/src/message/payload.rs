//! 领域事件负载
//!
//! Strongly typed broadcast payloads. `table_number` is a named field, so
//! topic routing is a direct read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{HubMessage, Topic};
use crate::models::OrderStatus;

/// Order/payment domain event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubEvent {
    pub order_id: i64,
    pub table_id: i64,
    /// `None` when the table could not be resolved; the event then only
    /// reaches the kitchen.
    pub table_number: Option<i32>,
    #[serde(flatten)]
    pub data: HubEventData,
}

/// Kind-specific event fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum HubEventData {
    OrderCreated {
        status: OrderStatus,
        total_amount: Decimal,
        item_count: i32,
        created_at: DateTime<Utc>,
    },
    OrderStatusChanged {
        old_status: OrderStatus,
        new_status: OrderStatus,
        updated_at: DateTime<Utc>,
    },
    PaymentCompleted {
        payment_id: i64,
        amount: Decimal,
        transaction_id: String,
        completed_at: DateTime<Utc>,
    },
    PaymentFailed {
        payment_id: i64,
        amount: Decimal,
        transaction_id: String,
        reason: Option<String>,
    },
}

impl HubEventData {
    pub fn event_name(&self) -> &'static str {
        match self {
            HubEventData::OrderCreated { .. } => "OrderCreated",
            HubEventData::OrderStatusChanged { .. } => "OrderStatusChanged",
            HubEventData::PaymentCompleted { .. } => "PaymentCompleted",
            HubEventData::PaymentFailed { .. } => "PaymentFailed",
        }
    }
}

impl HubEvent {
    pub fn event_name(&self) -> &'static str {
        self.data.event_name()
    }

    /// Always `kitchen`, plus `table:<N>` when the table number is known
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics = vec![Topic::Kitchen];
        if let Some(n) = self.table_number {
            topics.push(Topic::Table(n));
        }
        topics
    }

    pub fn to_message(&self) -> Result<HubMessage, serde_json::Error> {
        Ok(HubMessage::new(self.event_name(), serde_json::to_value(self)?))
    }
}
