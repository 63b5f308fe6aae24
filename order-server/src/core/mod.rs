//! 核心模块 - 启动流程
//!
//! - [`Config`] - 环境变量配置 (税率、流转策略、网关超时 ...)
//! - [`ServerState`] - 存储 + 订单/支付/菜单服务 + 推送主题表
//! - [`Server`] - axum HTTP / WebSocket 服务
//! - [`ServerError`] - 启动期错误

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{Config, StorageKind};
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
