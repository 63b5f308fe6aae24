//! Mock payment gateway
//!
//! 不接真实支付通道。交易表由 [`MockGatewayState`] 持有并在构造时注入，
//! 测试之间互不干扰。
//!
//! - 未登记的交易号 → "Transaction not found"
//! - 交易号包含 `FAILED` → "Payment failed due to insufficient funds"
//! - 其余 → 成功

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

use super::gateway::{
    GatewayError, GatewayInit, GatewayRequest, GatewayVerification, PaymentGateway,
};
use crate::utils::ids;

const MERCHANT_NAME: &str = "TableOrder Restaurant";
const PAYMENT_URL_BASE: &str = "https://mock-payment-gateway.com/pay";

/// A transaction known to the mock gateway
#[derive(Debug, Clone, PartialEq)]
pub struct MockTransaction {
    pub order_id: i64,
    pub amount: Decimal,
    pub status: String,
}

/// Injected transaction table
#[derive(Debug, Default)]
pub struct MockGatewayState {
    transactions: DashMap<String, MockTransaction>,
}

impl MockGatewayState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a transaction id directly (tests, scripted flows)
    pub fn register(&self, transaction_id: impl Into<String>, order_id: i64, amount: Decimal) {
        self.transactions.insert(
            transaction_id.into(),
            MockTransaction {
                order_id,
                amount,
                status: "initiated".to_string(),
            },
        );
    }

    pub fn get(&self, transaction_id: &str) -> Option<MockTransaction> {
        self.transactions.get(transaction_id).map(|t| t.clone())
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

pub struct MockPaymentGateway {
    state: Arc<MockGatewayState>,
    upi_id: String,
    merchant_id: String,
    delay: Option<Duration>,
}

impl MockPaymentGateway {
    pub fn new(
        state: Arc<MockGatewayState>,
        merchant_id: impl Into<String>,
        upi_id: impl Into<String>,
    ) -> Self {
        Self {
            state,
            upi_id: upi_id.into(),
            merchant_id: merchant_id.into(),
            delay: None,
        }
    }

    /// Artificial latency on every verification
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn state(&self) -> &Arc<MockGatewayState> {
        &self.state
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    fn name(&self) -> &'static str {
        "MockPaymentGateway"
    }

    async fn initialize_payment(&self, request: GatewayRequest) -> Result<GatewayInit, GatewayError> {
        if request.amount <= Decimal::ZERO {
            return Err(GatewayError::Rejected(format!(
                "amount must be positive, got {}",
                request.amount
            )));
        }

        let transaction_id = ids::mock_transaction_id(Utc::now());
        self.state
            .register(transaction_id.clone(), request.order_id, request.amount);

        tracing::info!(
            order_id = request.order_id,
            amount = %request.amount,
            transaction_id = %transaction_id,
            "Mock payment initialized"
        );

        Ok(GatewayInit {
            payment_url: format!("{PAYMENT_URL_BASE}/{transaction_id}"),
            qr_data: self.generate_qr_code(request.amount, &self.merchant_id, &request.note),
            transaction_id,
        })
    }

    async fn verify_payment(&self, transaction_id: &str) -> Result<GatewayVerification, GatewayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let Some(mut transaction) = self.state.transactions.get_mut(transaction_id) else {
            tracing::debug!(transaction_id, "Mock verification: unknown transaction");
            return Ok(GatewayVerification {
                success: false,
                status: "not_found".to_string(),
                error_message: Some("Transaction not found".to_string()),
            });
        };

        let success = !transaction_id.contains("FAILED");
        transaction.status = if success { "completed" } else { "failed" }.to_string();
        tracing::debug!(transaction_id, success, "Mock verification");

        Ok(GatewayVerification {
            success,
            status: transaction.status.clone(),
            error_message: (!success)
                .then(|| "Payment failed due to insufficient funds".to_string()),
        })
    }

    fn generate_qr_code(&self, amount: Decimal, merchant_id: &str, note: &str) -> String {
        tracing::debug!(amount = %amount, merchant_id, "Generating UPI QR payload");
        format!(
            "upi://pay?pa={}&pn={}&am={:.2}&cu=INR&tn={}",
            self.upi_id,
            urlencoding::encode(MERCHANT_NAME),
            amount,
            urlencoding::encode(note)
        )
    }
}
