use shared::message::HubEvent;
use std::sync::Arc;

use super::TopicRegistry;

/// 领域事件 → 主题推送
///
/// 推送失败只记日志，永远不会回传给触发变更的调用方。
#[derive(Clone)]
pub struct EventBroadcaster {
    registry: Arc<TopicRegistry>,
}

impl EventBroadcaster {
    pub fn new(registry: Arc<TopicRegistry>) -> Self {
        Self { registry }
    }

    /// Publish to `kitchen` and, when known, `table:<N>`
    ///
    /// Returns the total number of deliveries queued.
    pub fn broadcast(&self, event: &HubEvent) -> usize {
        let message = match event.to_message() {
            Ok(message) => Arc::new(message),
            Err(e) => {
                tracing::error!(
                    order_id = event.order_id,
                    event = event.event_name(),
                    error = %e,
                    "Failed to serialize hub event"
                );
                return 0;
            }
        };

        let mut delivered = 0;
        for topic in event.topics() {
            delivered += self.registry.publish_message(topic, message.clone());
        }

        tracing::debug!(
            order_id = event.order_id,
            table_number = ?event.table_number,
            event = event.event_name(),
            delivered,
            "Hub event broadcast"
        );
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::message::{HubEventData, Topic};

    fn payment_failed(table_number: Option<i32>) -> HubEvent {
        HubEvent {
            order_id: 5,
            table_id: 2,
            table_number,
            data: HubEventData::PaymentFailed {
                payment_id: 1,
                amount: Decimal::new(3777, 2),
                transaction_id: "TXN_FAILED_1".into(),
                reason: Some("card declined".into()),
            },
        }
    }

    #[test]
    fn test_broadcast_targets_kitchen_and_table() {
        let registry = Arc::new(TopicRegistry::default());
        let broadcaster = EventBroadcaster::new(registry.clone());

        let (kitchen, mut kitchen_rx) = registry.connect();
        let (table, mut table_rx) = registry.connect();
        let (other, mut other_rx) = registry.connect();
        registry.join(kitchen, Topic::Kitchen);
        registry.join(table, Topic::Table(3));
        registry.join(other, Topic::Table(4));

        assert_eq!(broadcaster.broadcast(&payment_failed(Some(3))), 2);

        let msg = kitchen_rx.try_recv().unwrap();
        assert_eq!(msg.event_name, "PaymentFailed");
        assert_eq!(msg.payload["tableNumber"], 3);
        assert_eq!(msg.payload["reason"], "card declined");
        assert_eq!(table_rx.try_recv().unwrap().event_name, "PaymentFailed");
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn test_unknown_table_reaches_kitchen_only() {
        let registry = Arc::new(TopicRegistry::default());
        let broadcaster = EventBroadcaster::new(registry.clone());
        let (kitchen, mut kitchen_rx) = registry.connect();
        registry.join(kitchen, Topic::Kitchen);

        assert_eq!(broadcaster.broadcast(&payment_failed(None)), 1);
        assert!(kitchen_rx.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let broadcaster = EventBroadcaster::new(Arc::new(TopicRegistry::default()));
        assert_eq!(broadcaster.broadcast(&payment_failed(Some(1))), 0);
    }
}
