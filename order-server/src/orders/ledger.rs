//! OrderLedger - order lifecycle state machine
//!
//! Pure domain logic: builds orders, validates status transitions and links
//! payments to orders. No I/O; callers load the inputs and persist the output.
//!
//! ```text
//! Received → Preparing → Ready → Served → Closed
//!                                            ↑
//!                 completed payment ─────────┘ (from any status)
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{DiningTable, MenuItem, Order, OrderLine, OrderStatus, Payment, PaymentStatus};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::{OrderError, OrderResult};
use super::money::compute_totals;

/// Which status changes `transition_status` accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Only the immediate successor
    #[default]
    Strict,
    /// Any target status; `Closed` stays terminal
    Lenient,
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "lenient" => Ok(TransitionPolicy::Lenient),
            other => Err(format!("unknown transition policy: {other}")),
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionPolicy::Strict => f.write_str("strict"),
            TransitionPolicy::Lenient => f.write_str("lenient"),
        }
    }
}

/// One requested order line
#[derive(Debug, Clone, PartialEq)]
pub struct LineRequest {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub instructions: Option<String>,
}

/// Order state machine with injected tax rate and transition policy
#[derive(Debug, Clone)]
pub struct OrderLedger {
    tax_rate: Decimal,
    policy: TransitionPolicy,
}

impl OrderLedger {
    pub fn new(tax_rate: Decimal, policy: TransitionPolicy) -> Self {
        Self { tax_rate, policy }
    }

    /// Build a new `Received` order (not yet persisted, id 0)
    ///
    /// Checks, in order: table exists, every menu item exists, every menu
    /// item is available (all offenders reported together), at least one line.
    pub fn create_order(
        &self,
        table_id: i64,
        table: Option<&DiningTable>,
        lines: &[LineRequest],
        menu: &HashMap<i64, MenuItem>,
        remarks: Option<String>,
        now: DateTime<Utc>,
    ) -> OrderResult<Order> {
        if table.is_none() {
            return Err(OrderError::TableNotFound(table_id));
        }

        if let Some(missing) = lines.iter().find(|l| !menu.contains_key(&l.menu_item_id)) {
            return Err(OrderError::MenuItemNotFound(missing.menu_item_id));
        }

        let mut unavailable: Vec<(i64, String)> = Vec::new();
        for line in lines {
            if let Some(item) = menu.get(&line.menu_item_id)
                && !item.is_available
                && !unavailable.iter().any(|(id, _)| *id == item.id)
            {
                unavailable.push((item.id, item.name.clone()));
            }
        }
        if !unavailable.is_empty() {
            return Err(OrderError::MenuItemUnavailable(unavailable));
        }

        if lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        // Snapshot name + price so later menu edits never reach this order
        let order_lines: Vec<OrderLine> = lines
            .iter()
            .filter_map(|req| {
                menu.get(&req.menu_item_id).map(|item| OrderLine {
                    id: 0,
                    menu_item_id: item.id,
                    menu_item_name: item.name.clone(),
                    quantity: req.quantity,
                    unit_price: item.price,
                    instructions: req.instructions.clone(),
                })
            })
            .collect();

        let totals = compute_totals(&order_lines, self.tax_rate);
        Ok(Order {
            id: 0,
            table_id,
            lines: order_lines,
            status: OrderStatus::Received,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            remarks,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move the order to `new_status`, returning the previous status
    pub fn transition_status(
        &self,
        order: &mut Order,
        new_status: OrderStatus,
        now: DateTime<Utc>,
    ) -> OrderResult<OrderStatus> {
        let old_status = order.status;
        let allowed = match self.policy {
            _ if old_status.is_terminal() => false,
            TransitionPolicy::Strict => old_status.next() == Some(new_status),
            TransitionPolicy::Lenient => true,
        };
        if !allowed {
            return Err(OrderError::InvalidTransition {
                from: old_status,
                to: new_status,
            });
        }

        order.status = new_status;
        order.updated_at = now;
        Ok(old_status)
    }

    /// Link a settled payment attempt to its order
    ///
    /// `existing` are the payments already stored for the order. A
    /// `Completed` payment closes the order regardless of its current status;
    /// any other outcome leaves the order untouched.
    pub fn record_payment(
        &self,
        order: &mut Order,
        existing: &[Payment],
        payment: &Payment,
        now: DateTime<Utc>,
    ) -> OrderResult<()> {
        if payment.order_id != order.id {
            return Err(OrderError::Validation(vec![format!(
                "payment belongs to order {}, not {}",
                payment.order_id, order.id
            )]));
        }
        if existing
            .iter()
            .any(|p| p.transaction_id == payment.transaction_id)
        {
            return Err(OrderError::DuplicatePayment {
                order_id: order.id,
                transaction_id: payment.transaction_id.clone(),
            });
        }

        if payment.status == PaymentStatus::Completed {
            order.status = OrderStatus::Closed;
            order.updated_at = now;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared::models::{PaymentMethod, TableStatus};

    fn ledger(policy: TransitionPolicy) -> OrderLedger {
        OrderLedger::new(Decimal::new(8, 2), policy)
    }

    fn table() -> DiningTable {
        DiningTable {
            id: 1,
            number: 1,
            capacity: 4,
            status: TableStatus::Available,
        }
    }

    fn menu_item(id: i64, name: &str, cents: i64, is_available: bool) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id,
            name: name.into(),
            description: String::new(),
            price: Decimal::new(cents, 2),
            category: "Mains".into(),
            is_available,
            is_vegetarian: false,
            preparation_time_minutes: 10,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn menu() -> HashMap<i64, MenuItem> {
        [
            menu_item(1, "Margherita Pizza", 1299, true),
            menu_item(2, "Caesar Salad", 899, true),
            menu_item(3, "Tiramisu", 699, false),
        ]
        .into_iter()
        .map(|m| (m.id, m))
        .collect()
    }

    fn req(menu_item_id: i64, quantity: i32) -> LineRequest {
        LineRequest {
            menu_item_id,
            quantity,
            instructions: None,
        }
    }

    fn persisted_order(status: OrderStatus) -> Order {
        let mut order = ledger(TransitionPolicy::Strict)
            .create_order(1, Some(&table()), &[req(1, 1)], &menu(), None, Utc::now())
            .unwrap();
        order.id = 10;
        order.status = status;
        order
    }

    #[test]
    fn test_create_order_totals_and_snapshots() {
        let now = Utc::now();
        let order = ledger(TransitionPolicy::Strict)
            .create_order(
                1,
                Some(&table()),
                &[req(1, 2), req(2, 1)],
                &menu(),
                Some("window seat".into()),
                now,
            )
            .unwrap();

        assert_eq!(order.status, OrderStatus::Received);
        assert_eq!(order.subtotal, Decimal::new(3497, 2));
        assert_eq!(order.tax, Decimal::new(280, 2));
        assert_eq!(order.total, Decimal::new(3777, 2));
        assert_eq!(order.lines[0].menu_item_name, "Margherita Pizza");
        assert_eq!(order.lines[1].unit_price, Decimal::new(899, 2));
        assert_eq!(order.created_at, now);
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_create_order_rejections() {
        let ledger = ledger(TransitionPolicy::Strict);
        let now = Utc::now();

        let err = ledger
            .create_order(9, None, &[req(1, 1)], &menu(), None, now)
            .unwrap_err();
        assert!(matches!(err, OrderError::TableNotFound(9)));

        let err = ledger
            .create_order(1, Some(&table()), &[req(42, 1)], &menu(), None, now)
            .unwrap_err();
        assert!(matches!(err, OrderError::MenuItemNotFound(42)));

        let err = ledger
            .create_order(1, Some(&table()), &[req(1, 1), req(3, 2), req(3, 1)], &menu(), None, now)
            .unwrap_err();
        match err {
            OrderError::MenuItemUnavailable(items) => {
                assert_eq!(items, vec![(3, "Tiramisu".to_string())]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = ledger
            .create_order(1, Some(&table()), &[], &menu(), None, now)
            .unwrap_err();
        assert!(matches!(err, OrderError::EmptyOrder));
    }

    #[test]
    fn test_strict_transitions() {
        let ledger = ledger(TransitionPolicy::Strict);
        let mut order = persisted_order(OrderStatus::Received);
        let later = order.updated_at + Duration::seconds(5);

        let old = ledger
            .transition_status(&mut order, OrderStatus::Preparing, later)
            .unwrap();
        assert_eq!(old, OrderStatus::Received);
        assert_eq!(order.status, OrderStatus::Preparing);
        assert_eq!(order.updated_at, later);

        // Skipping ahead is rejected
        let err = ledger
            .transition_status(&mut order, OrderStatus::Served, later)
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Preparing,
                to: OrderStatus::Served
            }
        ));

        // Going back is rejected
        assert!(
            ledger
                .transition_status(&mut order, OrderStatus::Received, later)
                .is_err()
        );
    }

    #[test]
    fn test_closed_is_terminal_under_both_policies() {
        for policy in [TransitionPolicy::Strict, TransitionPolicy::Lenient] {
            let ledger = ledger(policy);
            for target in OrderStatus::ALL {
                let mut order = persisted_order(OrderStatus::Closed);
                assert!(
                    ledger
                        .transition_status(&mut order, target, Utc::now())
                        .is_err(),
                    "{policy} allowed Closed -> {target}"
                );
                assert_eq!(order.status, OrderStatus::Closed);
            }
        }
    }

    #[test]
    fn test_lenient_accepts_any_target() {
        let ledger = ledger(TransitionPolicy::Lenient);
        let mut order = persisted_order(OrderStatus::Ready);
        let later = order.updated_at + Duration::seconds(1);

        ledger
            .transition_status(&mut order, OrderStatus::Received, later)
            .unwrap();
        assert_eq!(order.status, OrderStatus::Received);

        // Same status: no-op that still bumps updated_at
        let even_later = later + Duration::seconds(1);
        let old = ledger
            .transition_status(&mut order, OrderStatus::Received, even_later)
            .unwrap();
        assert_eq!(old, OrderStatus::Received);
        assert_eq!(order.updated_at, even_later);
    }

    #[test]
    fn test_record_payment() {
        let ledger = ledger(TransitionPolicy::Strict);
        let now = Utc::now();

        for status in [OrderStatus::Received, OrderStatus::Ready, OrderStatus::Served] {
            let mut order = persisted_order(status);
            let mut payment =
                Payment::pending(order.id, order.total, PaymentMethod::Cash, "TXN_1", "REF", now);
            payment.settle(PaymentStatus::Completed, now).unwrap();

            ledger.record_payment(&mut order, &[], &payment, now).unwrap();
            assert_eq!(order.status, OrderStatus::Closed);
        }

        let mut order = persisted_order(OrderStatus::Preparing);
        let mut failed =
            Payment::pending(order.id, order.total, PaymentMethod::Cash, "TXN_2", "REF", now);
        failed.settle(PaymentStatus::Failed, now).unwrap();
        ledger.record_payment(&mut order, &[], &failed, now).unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);

        let err = ledger
            .record_payment(&mut order, &[failed.clone()], &failed, now)
            .unwrap_err();
        assert!(matches!(err, OrderError::DuplicatePayment { .. }));

        let foreign = Payment::pending(99, order.total, PaymentMethod::Cash, "TXN_3", "REF", now);
        assert!(matches!(
            ledger.record_payment(&mut order, &[], &foreign, now),
            Err(OrderError::Validation(_))
        ));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("STRICT".parse::<TransitionPolicy>(), Ok(TransitionPolicy::Strict));
        assert_eq!(" lenient ".parse::<TransitionPolicy>(), Ok(TransitionPolicy::Lenient));
        assert!("loose".parse::<TransitionPolicy>().is_err());
    }
}
