//! Table Order Server - 餐厅点餐订单/支付推送核心
//!
//! # 架构概述
//!
//! ```text
//! HTTP / WS ──► OrderService / PaymentService
//!                    │
//!                    ├─► OrderLedger        (纯状态机 + 金额计算)
//!                    ├─► OrderStore (redb)  (持久化)
//!                    └─► EventBroadcaster ─► TopicRegistry ─► 订阅连接
//!                                            ("kitchen", "table:<N>")
//! ```
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── api/           # HTTP 路由和处理器 + WebSocket
//! ├── orders/        # 订单状态机、金额、订单服务
//! ├── payments/      # 支付网关端口、mock 网关、支付服务
//! ├── hub/           # 主题订阅表、事件广播
//! ├── menu/          # 菜单管理
//! ├── storage/       # 存储端口 + redb 实现
//! └── utils/         # 日志、校验、编号
//! ```

pub mod api;
pub mod core;
pub mod hub;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod storage;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use hub::{EventBroadcaster, TopicRegistry};
pub use orders::{OrderLedger, OrderService, TransitionPolicy};
pub use payments::{MockPaymentGateway, PaymentService};
pub use storage::{OrderStore, RedbStore};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
