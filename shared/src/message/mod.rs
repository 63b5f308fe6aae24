//! Hub 消息类型定义
//!
//! 这些类型在 order-server 和订阅端（厨房屏、桌台平板、管理后台）之间共享，
//! 通过 WebSocket 文本帧以 JSON 传输。
//!
//! - 服务端推送: [`HubMessage`] `{ "eventName": ..., "payload": {...} }`
//! - 客户端指令: [`HubCommand`] `{ "action": "join", "topic": "kitchen" }`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod payload;
pub use payload::*;

/// 推送事件名 (非领域事件)
pub mod event_names {
    pub const CONNECTED: &str = "Connected";
    pub const JOINED_TOPIC: &str = "JoinedTopic";
    pub const LEFT_TOPIC: &str = "LeftTopic";
    pub const HUB_ERROR: &str = "HubError";
}

/// 订阅主题
///
/// Wire names are `kitchen` and `table:<N>`; the older `Kitchen` and
/// `Table_<N>` spellings are still accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Topic {
    Kitchen,
    Table(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown topic: {0}")]
pub struct InvalidTopic(pub String);

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Kitchen => f.write_str("kitchen"),
            Topic::Table(n) => write!(f, "table:{}", n),
        }
    }
}

impl FromStr for Topic {
    type Err = InvalidTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.eq_ignore_ascii_case("kitchen") {
            return Ok(Topic::Kitchen);
        }
        let number = raw
            .strip_prefix("table:")
            .or_else(|| raw.strip_prefix("Table_"))
            .and_then(|n| n.parse::<i32>().ok())
            .filter(|n| *n > 0);
        number.map(Topic::Table).ok_or_else(|| InvalidTopic(s.to_string()))
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.to_string()
    }
}

impl TryFrom<String> for Topic {
    type Error = InvalidTopic;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 服务端 → 客户端推送消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubMessage {
    pub event_name: String,
    pub payload: serde_json::Value,
}

impl HubMessage {
    pub fn new(event_name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_name: event_name.into(),
            payload,
        }
    }

    /// 连接建立后的第一条消息
    pub fn connected(connection_id: u64) -> Self {
        Self::new(
            event_names::CONNECTED,
            serde_json::json!({ "connectionId": connection_id }),
        )
    }

    pub fn joined(topic: Topic) -> Self {
        Self::new(
            event_names::JOINED_TOPIC,
            serde_json::json!({ "topic": topic.to_string() }),
        )
    }

    pub fn left(topic: Topic) -> Self {
        Self::new(
            event_names::LEFT_TOPIC,
            serde_json::json!({ "topic": topic.to_string() }),
        )
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(
            event_names::HUB_ERROR,
            serde_json::json!({ "message": message.into() }),
        )
    }
}

/// 客户端 → 服务端指令
///
/// `topic` stays a raw string so an unknown topic can be reported back
/// instead of failing the whole frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HubCommand {
    Join { topic: String },
    Leave { topic: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_display() {
        assert_eq!(Topic::Kitchen.to_string(), "kitchen");
        assert_eq!(Topic::Table(4).to_string(), "table:4");
    }

    #[test]
    fn test_topic_parse() {
        assert_eq!("kitchen".parse::<Topic>(), Ok(Topic::Kitchen));
        assert_eq!("Kitchen".parse::<Topic>(), Ok(Topic::Kitchen));
        assert_eq!("table:3".parse::<Topic>(), Ok(Topic::Table(3)));
        assert_eq!("Table_12".parse::<Topic>(), Ok(Topic::Table(12)));

        assert!("table:".parse::<Topic>().is_err());
        assert!("table:0".parse::<Topic>().is_err());
        assert!("table:-1".parse::<Topic>().is_err());
        assert!("bar".parse::<Topic>().is_err());
    }

    #[test]
    fn test_topic_serde_as_string() {
        assert_eq!(serde_json::to_string(&Topic::Table(2)).unwrap(), "\"table:2\"");
        let topic: Topic = serde_json::from_str("\"Table_2\"").unwrap();
        assert_eq!(topic, Topic::Table(2));
    }

    #[test]
    fn test_hub_command_parse() {
        let cmd: HubCommand =
            serde_json::from_str(r#"{"action":"join","topic":"kitchen"}"#).unwrap();
        assert_eq!(
            cmd,
            HubCommand::Join {
                topic: "kitchen".into()
            }
        );

        let cmd: HubCommand =
            serde_json::from_str(r#"{"action":"leave","topic":"table:3"}"#).unwrap();
        assert_eq!(
            cmd,
            HubCommand::Leave {
                topic: "table:3".into()
            }
        );

        assert!(serde_json::from_str::<HubCommand>(r#"{"action":"shout"}"#).is_err());
    }

    #[test]
    fn test_connected_message_shape() {
        let json = serde_json::to_value(HubMessage::connected(9)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"eventName": "Connected", "payload": {"connectionId": 9}})
        );
    }
}
