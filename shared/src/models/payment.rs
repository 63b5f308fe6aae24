//! Payment Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PaymentMethod {
    Cash,
    #[default]
    Credit,
    Debit,
    Other,
}

impl PaymentMethod {
    /// Lenient parse of a client-reported method
    ///
    /// Unknown methods (upi, apple_pay, ...) map to `Other`; absent maps to `Credit`.
    pub fn from_reported(method: Option<&str>) -> Self {
        let Some(method) = method else {
            return PaymentMethod::default();
        };
        match method.trim().to_ascii_lowercase().as_str() {
            "cash" => PaymentMethod::Cash,
            "credit_card" | "card" | "credit" => PaymentMethod::Credit,
            "debit_card" | "debit" => PaymentMethod::Debit,
            _ => PaymentMethod::Other,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Credit => "Credit",
            PaymentMethod::Debit => "Debit",
            PaymentMethod::Other => "Other",
        };
        f.write_str(s)
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

impl PaymentStatus {
    /// Pending and Processing are the only unsettled states
    pub fn is_settled(&self) -> bool {
        !matches!(self, PaymentStatus::Pending | PaymentStatus::Processing)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Processing => "Processing",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
            PaymentStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// Settle-once violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payment {payment_id} already settled as {status}")]
pub struct AlreadySettled {
    pub payment_id: i64,
    pub status: PaymentStatus,
}

/// Payment entity
///
/// One row per confirmation attempt. `transaction_id` is unique per order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: String,
    /// `REF_<yyyyMMddHHmmss>_<8 hex>`
    pub reference_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// New pending payment (id assigned on save)
    pub fn pending(
        order_id: i64,
        amount: Decimal,
        method: PaymentMethod,
        transaction_id: impl Into<String>,
        reference_number: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            order_id,
            amount,
            method,
            status: PaymentStatus::Pending,
            transaction_id: transaction_id.into(),
            reference_number: reference_number.into(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Move out of Pending/Processing exactly once
    pub fn settle(&mut self, status: PaymentStatus, now: DateTime<Utc>) -> Result<(), AlreadySettled> {
        if self.status.is_settled() {
            return Err(AlreadySettled {
                payment_id: self.id,
                status: self.status,
            });
        }
        self.status = status;
        self.updated_at = now;
        if status == PaymentStatus::Completed {
            self.completed_at = Some(now);
        }
        Ok(())
    }
}
