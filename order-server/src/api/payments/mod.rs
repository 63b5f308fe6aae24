//! Payment API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/payments | GET | 全部支付记录 (新 → 旧) |
//! | /api/payments/qrcode/{order_id} | GET | UPI 二维码数据 |
//! | /api/payments/initialize/{order_id} | POST | 向网关发起交易 |
//! | /api/payments/confirm | POST | 确认支付 |
//! | /api/payments/status/{order_id} | GET | 订单的支付记录 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_all))
        .route("/qrcode/{order_id}", get(handler::qr_code))
        .route("/initialize/{order_id}", post(handler::initialize))
        .route("/confirm", post(handler::confirm))
        .route("/status/{order_id}", get(handler::status))
}
