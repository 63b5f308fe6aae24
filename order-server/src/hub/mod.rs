//! 实时推送
//!
//! - [`TopicRegistry`]: 连接 ↔ 主题成员关系，按主题推送
//! - [`EventBroadcaster`]: 领域事件解析目标主题后推送

mod broadcaster;
mod registry;

pub use broadcaster::EventBroadcaster;
pub use registry::{ConnectionId, DEFAULT_SUBSCRIBER_BUFFER, TopicRegistry};
