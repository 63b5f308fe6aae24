//! Payment gateway port

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Gateway rejected request: {0}")]
    Rejected(String),
}

/// Open-transaction request
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    pub order_id: i64,
    pub amount: Decimal,
    pub note: String,
}

/// Opened transaction
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayInit {
    pub transaction_id: String,
    pub payment_url: String,
    pub qr_data: String,
}

/// Verification outcome
///
/// `success == false` is a business answer (declined, unknown id), not a
/// transport failure.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayVerification {
    pub success: bool,
    pub status: String,
    pub error_message: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn initialize_payment(&self, request: GatewayRequest) -> Result<GatewayInit, GatewayError>;

    async fn verify_payment(&self, transaction_id: &str) -> Result<GatewayVerification, GatewayError>;

    /// QR payload string for the given amount
    fn generate_qr_code(&self, amount: Decimal, merchant_id: &str, note: &str) -> String;
}
