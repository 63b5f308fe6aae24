//! 错误码
//!
//! Numeric codes shared with the tablet, kitchen display and admin UIs.
//! Ranges: 0xxx general, 4xxx order, 5xxx payment, 6xxx menu, 7xxx table,
//! 9xxx system.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ===== 0xxx =====
    Success = 0,
    ValidationFailed = 2,

    // ===== 4xxx: 订单 =====
    OrderNotFound = 4001,
    OrderAlreadyPaid = 4002,
    OrderHasPayments = 4005,
    OrderEmpty = 4007,
    /// Target status is not reachable from the current one
    OrderInvalidTransition = 4008,

    // ===== 5xxx: 支付 =====
    /// Same transaction id already recorded for the order
    PaymentDuplicate = 5006,
    /// Gateway rejected, did not know, or did not answer in time
    PaymentGatewayFailed = 5007,
    PaymentAlreadySettled = 5008,

    // ===== 6xxx: 菜单 =====
    MenuItemNotFound = 6001,
    MenuItemUnavailable = 6003,

    // ===== 7xxx: 桌台 =====
    TableNotFound = 7001,

    // ===== 9xxx: 系统 =====
    InternalError = 9001,
    DatabaseError = 9002,
}

impl ErrorCode {
    const ALL: [ErrorCode; 15] = [
        ErrorCode::Success,
        ErrorCode::ValidationFailed,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderAlreadyPaid,
        ErrorCode::OrderHasPayments,
        ErrorCode::OrderEmpty,
        ErrorCode::OrderInvalidTransition,
        ErrorCode::PaymentDuplicate,
        ErrorCode::PaymentGatewayFailed,
        ErrorCode::PaymentAlreadySettled,
        ErrorCode::MenuItemNotFound,
        ErrorCode::MenuItemUnavailable,
        ErrorCode::TableNotFound,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default English message
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "OK",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order is already paid",
            ErrorCode::OrderHasPayments => "Order has existing payments",
            ErrorCode::OrderEmpty => "Order must contain at least one item",
            ErrorCode::OrderInvalidTransition => "Order status transition is not allowed",
            ErrorCode::PaymentDuplicate => "Payment already processed",
            ErrorCode::PaymentGatewayFailed => "Payment verification failed",
            ErrorCode::PaymentAlreadySettled => "Payment status already settled",
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Numeric value with no matching [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
