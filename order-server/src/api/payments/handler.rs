//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::payments::{
    ConfirmPaymentRequest, InitializePaymentResponse, PaymentStatusResponse, QrPayloadResponse,
};
use crate::utils::AppResult;

pub async fn qr_code(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<QrPayloadResponse>> {
    Ok(Json(state.payments.generate_qr_payload(order_id).await?))
}

pub async fn initialize(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<InitializePaymentResponse>> {
    Ok(Json(state.payments.initialize_payment(order_id).await?))
}

/// Confirm a payment reported by the tablet
pub async fn confirm(
    State(state): State<ServerState>,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<PaymentStatusResponse>> {
    Ok(Json(state.payments.confirm_payment(payload).await?))
}

pub async fn status(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<Vec<PaymentStatusResponse>>> {
    Ok(Json(state.payments.list_payments(Some(order_id)).await?))
}

pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<Vec<PaymentStatusResponse>>> {
    Ok(Json(state.payments.list_payments(None).await?))
}
