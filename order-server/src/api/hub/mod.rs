//! Hub WebSocket endpoint
//!
//! GET /api/hub/ws
//!
//! 协议:
//! - Server → Client: `HubMessage` (Connected, JoinedTopic, LeftTopic, HubError, 领域事件)
//! - Client → Server: `HubCommand` (join / leave)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/hub/ws", get(handler::handle_hub_ws))
}
