//! PaymentService - QR payloads, gateway sessions and payment confirmation
//!
//! Confirmation order: load order → dedup transaction id → verify with the
//! gateway (bounded by a timeout) → ledger → one storage transaction for
//! order + payment → broadcast.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::message::{HubEvent, HubEventData};
use shared::models::{Order, Payment, PaymentMethod, PaymentStatus};
use std::sync::Arc;
use std::time::Duration;

use super::gateway::{GatewayRequest, GatewayVerification, PaymentGateway};
use crate::hub::EventBroadcaster;
use crate::orders::{OrderError, OrderLedger, OrderResult};
use crate::storage::OrderStore;
use crate::utils::ids;
use crate::utils::validation::collect_violations;
use validator::{Validate, ValidationError};

// ========== DTOs ==========

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrPayloadResponse {
    pub qr_data: String,
    pub amount: Decimal,
    pub order_id: i64,
    pub merchant_id: String,
    pub upi_id: String,
    pub transaction_note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentResponse {
    pub order_id: i64,
    pub amount: Decimal,
    pub transaction_id: String,
    pub payment_url: String,
    pub qr_data: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    #[validate(range(min = 1, message = "orderId must be a positive integer"))]
    pub order_id: i64,
    #[validate(custom(function = "validate_transaction_id"))]
    pub transaction_id: String,
    /// Gateway-reported status (`success`, `failed`, `pending`, ...)
    pub status: String,
    #[serde(default)]
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Free-form gateway text, used as failure reason
    #[serde(default)]
    pub gateway_response: Option<String>,
}

fn validate_transaction_id(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("transactionId must not be empty".into()));
    }
    Ok(())
}

/// 客户端上报金额可缺省, 给出时必须为正
fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("range")
            .with_message(format!("amount must be greater than 0, got {amount}").into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub payment_id: i64,
    pub order_id: i64,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: String,
    pub reference_number: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Payment> for PaymentStatusResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            payment_id: payment.id,
            order_id: payment.order_id,
            amount: payment.amount,
            payment_method: payment.method,
            status: payment.status,
            transaction_id: payment.transaction_id.clone(),
            reference_number: payment.reference_number.clone(),
            created_at: payment.created_at,
            completed_at: payment
                .completed_at
                .filter(|_| payment.status == PaymentStatus::Completed),
        }
    }
}

/// `success|completed|paid` → Completed, `failed|cancelled` → Failed,
/// anything else → Pending
pub fn map_reported_status(reported: &str) -> PaymentStatus {
    match reported.trim().to_ascii_lowercase().as_str() {
        "success" | "completed" | "paid" => PaymentStatus::Completed,
        "failed" | "cancelled" => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

// ========== Service ==========

/// Merchant identity and gateway bounds
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub merchant_id: String,
    pub upi_id: String,
    pub verify_timeout: Duration,
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    ledger: OrderLedger,
    broadcaster: EventBroadcaster,
    settings: PaymentSettings,
}

impl PaymentService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        ledger: OrderLedger,
        broadcaster: EventBroadcaster,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            ledger,
            broadcaster,
            settings,
        }
    }

    /// QR payload for paying the order total
    pub async fn generate_qr_payload(&self, order_id: i64) -> OrderResult<QrPayloadResponse> {
        let order = self.load_order(order_id).await?;
        self.ensure_unpaid(order_id).await?;

        let table_number = self.table_number(order.table_id).await?;
        let transaction_note = match table_number {
            Some(number) => format!("Order #{} - Table {}", order.id, number),
            None => format!("Order #{}", order.id),
        };
        let qr_data =
            self.gateway
                .generate_qr_code(order.total, &self.settings.merchant_id, &transaction_note);

        Ok(QrPayloadResponse {
            qr_data,
            amount: order.total,
            order_id: order.id,
            merchant_id: self.settings.merchant_id.clone(),
            upi_id: self.settings.upi_id.clone(),
            transaction_note,
        })
    }

    /// Open a gateway transaction for the order total
    pub async fn initialize_payment(&self, order_id: i64) -> OrderResult<InitializePaymentResponse> {
        let order = self.load_order(order_id).await?;
        self.ensure_unpaid(order_id).await?;

        let init = self
            .gateway
            .initialize_payment(GatewayRequest {
                order_id: order.id,
                amount: order.total,
                note: format!("Order #{}", order.id),
            })
            .await
            .map_err(|e| {
                tracing::warn!(order_id, gateway = self.gateway.name(), error = %e, "Gateway initialize failed");
                OrderError::Gateway(e.to_string())
            })?;

        Ok(InitializePaymentResponse {
            order_id: order.id,
            amount: order.total,
            transaction_id: init.transaction_id,
            payment_url: init.payment_url,
            qr_data: init.qr_data,
        })
    }

    /// Record a payment attempt reported by the client
    pub async fn confirm_payment(&self, req: ConfirmPaymentRequest) -> OrderResult<PaymentStatusResponse> {
        req.validate()
            .map_err(|e| OrderError::Validation(collect_violations(&e)))?;

        let mut order = self.load_order(req.order_id).await?;
        let existing = self.store.list_payments(Some(order.id)).await?;
        if existing
            .iter()
            .any(|p| p.transaction_id == req.transaction_id)
        {
            return Err(OrderError::DuplicatePayment {
                order_id: order.id,
                transaction_id: req.transaction_id,
            });
        }

        let verification = self.verify(&req.transaction_id).await?;

        let now = Utc::now();
        let status = map_reported_status(&req.status);
        let mut payment = Payment::pending(
            order.id,
            req.amount.unwrap_or(order.total),
            PaymentMethod::from_reported(req.payment_method.as_deref()),
            req.transaction_id.clone(),
            ids::reference_number(now),
            now,
        );
        if status != PaymentStatus::Pending {
            payment.settle(status, now)?;
        }

        self.ledger
            .record_payment(&mut order, &existing, &payment, now)?;
        let payment = self.store.save_payment(&order, &payment).await?;

        tracing::info!(
            order_id = order.id,
            payment_id = payment.id,
            transaction_id = %payment.transaction_id,
            status = ?payment.status,
            "Payment confirmed"
        );

        let data = match payment.status {
            PaymentStatus::Completed => Some(HubEventData::PaymentCompleted {
                payment_id: payment.id,
                amount: payment.amount,
                transaction_id: payment.transaction_id.clone(),
                completed_at: payment.completed_at.unwrap_or(now),
            }),
            PaymentStatus::Failed => Some(HubEventData::PaymentFailed {
                payment_id: payment.id,
                amount: payment.amount,
                transaction_id: payment.transaction_id.clone(),
                reason: verification.error_message.or(req.gateway_response),
            }),
            _ => None,
        };
        if let Some(data) = data {
            self.emit(&order, data).await;
        }

        Ok(PaymentStatusResponse::from(&payment))
    }

    /// Newest first; `None` lists every payment
    pub async fn list_payments(&self, order_id: Option<i64>) -> OrderResult<Vec<PaymentStatusResponse>> {
        let mut payments = self.store.list_payments(order_id).await?;
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(payments.iter().map(PaymentStatusResponse::from).collect())
    }

    // ========== Helpers ==========

    async fn load_order(&self, order_id: i64) -> OrderResult<Order> {
        self.store
            .load_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    async fn ensure_unpaid(&self, order_id: i64) -> OrderResult<()> {
        let paid = self
            .store
            .list_payments(Some(order_id))
            .await?
            .iter()
            .any(|p| p.status == PaymentStatus::Completed);
        if paid {
            return Err(OrderError::AlreadyPaid(order_id));
        }
        Ok(())
    }

    async fn table_number(&self, table_id: i64) -> OrderResult<Option<i32>> {
        Ok(self.store.load_table(table_id).await?.map(|t| t.number))
    }

    /// Gateway verification; timeout and transport errors count as failure
    async fn verify(&self, transaction_id: &str) -> OrderResult<GatewayVerification> {
        let timeout = self.settings.verify_timeout;
        let verification =
            match tokio::time::timeout(timeout, self.gateway.verify_payment(transaction_id)).await {
                Ok(Ok(verification)) => verification,
                Ok(Err(e)) => {
                    tracing::warn!(transaction_id, error = %e, "Gateway verification error");
                    return Err(OrderError::GatewayVerificationFailed(e.to_string()));
                }
                Err(_) => {
                    tracing::warn!(
                        transaction_id,
                        timeout_ms = timeout.as_millis() as u64,
                        "Gateway verification timed out"
                    );
                    return Err(OrderError::GatewayVerificationFailed(format!(
                        "verification timed out after {}ms",
                        timeout.as_millis()
                    )));
                }
            };

        if !verification.success {
            let reason = verification
                .error_message
                .unwrap_or_else(|| "Payment verification failed".to_string());
            tracing::warn!(transaction_id, reason = %reason, "Gateway rejected payment");
            return Err(OrderError::GatewayVerificationFailed(reason));
        }
        Ok(verification)
    }

    /// Table lookup failures only cost the table topic, never the mutation
    async fn emit(&self, order: &Order, data: HubEventData) {
        let table_number = match self.table_number(order.table_id).await {
            Ok(number) => number,
            Err(e) => {
                tracing::warn!(order_id = order.id, error = %e, "Table lookup failed for broadcast");
                None
            }
        };
        self.broadcaster.broadcast(&HubEvent {
            order_id: order.id,
            table_id: order.table_id,
            table_number,
            data,
        });
    }
}
