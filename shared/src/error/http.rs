//! ErrorCode → HTTP 状态码

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::OrderNotFound | Self::MenuItemNotFound | Self::TableNotFound => {
                StatusCode::NOT_FOUND
            }

            Self::OrderAlreadyPaid
            | Self::OrderHasPayments
            | Self::OrderInvalidTransition
            | Self::PaymentDuplicate
            | Self::PaymentAlreadySettled => StatusCode::CONFLICT,

            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 校验失败、菜品下架、网关校验失败
            Self::ValidationFailed
            | Self::OrderEmpty
            | Self::MenuItemUnavailable
            | Self::PaymentGatewayFailed => StatusCode::BAD_REQUEST,
        }
    }
}
