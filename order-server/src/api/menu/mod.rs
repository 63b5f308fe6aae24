//! Menu API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/menu | GET | 菜单列表 |
//! | /api/menu/{id} | GET | 菜品详情 |
//! | /api/menu/{id} | PATCH | 部分更新 |
//! | /api/menu/{id}/availability | PATCH | 上下架 |

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id).patch(handler::update))
        .route("/{id}/availability", patch(handler::set_availability))
}
