//! Order API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 下单 (201) |
//! | /api/orders | GET | 列表 (`?tableId=` / `?status=`) |
//! | /api/orders/{id} | GET | 订单详情 |
//! | /api/orders/{id} | DELETE | 删除 (无支付记录时, 204) |
//! | /api/orders/{id}/status | PUT | 状态流转 |
//! | /api/orders/table/{table_id} | GET | 按桌台 (新 → 旧) |
//! | /api/orders/status/{status} | GET | 按状态 (旧 → 新) |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/table/{table_id}", get(handler::list_by_table))
        .route("/status/{status}", get(handler::list_by_status))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/status", put(handler::update_status))
}
