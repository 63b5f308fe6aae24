//! Payments
//!
//! - [`PaymentGateway`]: external gateway port
//! - [`MockPaymentGateway`]: in-process gateway with injected state
//! - [`PaymentService`]: QR / initialize / confirm / list

pub mod gateway;
pub mod mock_gateway;
pub mod service;

pub use gateway::{GatewayError, GatewayInit, GatewayRequest, GatewayVerification, PaymentGateway};
pub use mock_gateway::{MockGatewayState, MockPaymentGateway};
pub use service::{
    ConfirmPaymentRequest, InitializePaymentResponse, PaymentService, PaymentSettings,
    PaymentStatusResponse, QrPayloadResponse, map_reported_status,
};
