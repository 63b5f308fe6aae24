use crate::storage::StorageError;
use shared::error::{AppError, ErrorCode};
use shared::models::{AlreadySettled, OrderStatus};
use thiserror::Error;

/// Order / payment domain errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(i64),

    /// (menu_item_id, name) of every unavailable item in the request
    #[error("Menu items unavailable: {}", format_items(.0))]
    MenuItemUnavailable(Vec<(i64, String)>),

    #[error("Order must contain at least one line")]
    EmptyOrder,

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Transaction {transaction_id} already recorded for order {order_id}")]
    DuplicatePayment {
        order_id: i64,
        transaction_id: String,
    },

    #[error("Order already paid: {0}")]
    AlreadyPaid(i64),

    #[error("Order {0} has payments and cannot be deleted")]
    OrderHasPayments(i64),

    #[error(transparent)]
    PaymentAlreadySettled(#[from] AlreadySettled),

    #[error("Payment verification failed: {0}")]
    GatewayVerificationFailed(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

pub type OrderResult<T> = Result<T, OrderError>;

fn format_items(items: &[(i64, String)]) -> String {
    items
        .iter()
        .map(|(id, name)| format!("{name} (#{id})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 存储层的约束错误翻译为领域错误，其余保持为 Storage
impl From<StorageError> for OrderError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::OrderNotFound(id) => OrderError::OrderNotFound(id),
            StorageError::OrderHasPayments(id) => OrderError::OrderHasPayments(id),
            StorageError::DuplicateTransaction {
                order_id,
                transaction_id,
            } => OrderError::DuplicatePayment {
                order_id,
                transaction_id,
            },
            other => OrderError::Storage(other),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::Validation(violations) => {
                AppError::with_message(ErrorCode::ValidationFailed, message)
                    .with_detail("violations", violations)
            }
            OrderError::TableNotFound(id) => {
                AppError::with_message(ErrorCode::TableNotFound, message).with_detail("tableId", id)
            }
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("orderId", id)
            }
            OrderError::MenuItemNotFound(id) => {
                AppError::with_message(ErrorCode::MenuItemNotFound, message)
                    .with_detail("menuItemId", id)
            }
            OrderError::MenuItemUnavailable(items) => {
                let items: Vec<serde_json::Value> = items
                    .into_iter()
                    .map(|(id, name)| serde_json::json!({ "menuItemId": id, "name": name }))
                    .collect();
                AppError::with_message(ErrorCode::MenuItemUnavailable, message)
                    .with_detail("items", items)
            }
            OrderError::EmptyOrder => AppError::with_message(ErrorCode::OrderEmpty, message),
            OrderError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::OrderInvalidTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            OrderError::DuplicatePayment { transaction_id, .. } => {
                AppError::with_message(ErrorCode::PaymentDuplicate, message)
                    .with_detail("transactionId", transaction_id)
            }
            OrderError::AlreadyPaid(_) => {
                AppError::with_message(ErrorCode::OrderAlreadyPaid, message)
            }
            OrderError::OrderHasPayments(_) => {
                AppError::with_message(ErrorCode::OrderHasPayments, message)
            }
            OrderError::PaymentAlreadySettled(_) => {
                AppError::with_message(ErrorCode::PaymentAlreadySettled, message)
            }
            OrderError::GatewayVerificationFailed(_) | OrderError::Gateway(_) => {
                AppError::with_message(ErrorCode::PaymentGatewayFailed, message)
            }
            OrderError::Storage(e) => {
                tracing::error!(error = %e, "Storage error occurred");
                AppError::database("Storage operation failed")
            }
        }
    }
}
