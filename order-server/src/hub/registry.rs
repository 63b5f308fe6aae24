//! TopicRegistry - 主题订阅表
//!
//! ```text
//! WS session ──connect()──► (ConnectionId, mpsc::Receiver)
//!      │ join / leave
//!      ▼
//! TopicRegistry
//!   ├── connections: ConnectionId → mpsc::Sender<Arc<HubMessage>>
//!   ├── topics:      Topic → {ConnectionId}
//!   └── memberships: ConnectionId → {Topic}
//!      │ publish(topic)
//!      ▼
//! 快照成员 → try_send（不阻塞，失败只影响该连接）
//! ```
//!
//! 所有写操作持写锁；publish 只在读锁下复制成员快照，然后在锁外投递。

use parking_lot::RwLock;
use shared::message::{HubMessage, Topic};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// 连接标识（进程内唯一）
pub type ConnectionId = u64;

/// 每个连接的出站队列默认容量
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 256;

#[derive(Default)]
struct Inner {
    connections: HashMap<ConnectionId, mpsc::Sender<Arc<HubMessage>>>,
    topics: HashMap<Topic, HashSet<ConnectionId>>,
    memberships: HashMap<ConnectionId, HashSet<Topic>>,
}

pub struct TopicRegistry {
    inner: RwLock<Inner>,
    next_id: AtomicU64,
    buffer: usize,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}

impl TopicRegistry {
    pub fn new(buffer: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            next_id: AtomicU64::new(1),
            buffer: buffer.max(1),
        }
    }

    /// 注册新连接，返回其 id 与出站接收端
    pub fn connect(&self) -> (ConnectionId, mpsc::Receiver<Arc<HubMessage>>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.buffer);
        self.inner.write().connections.insert(id, tx);
        tracing::debug!(connection_id = id, "Hub connection registered");
        (id, rx)
    }

    /// 加入主题（幂等）
    ///
    /// 未注册或已断开的连接返回 `false`。
    pub fn join(&self, connection_id: ConnectionId, topic: Topic) -> bool {
        let mut inner = self.inner.write();
        if !inner.connections.contains_key(&connection_id) {
            return false;
        }
        inner.topics.entry(topic).or_default().insert(connection_id);
        inner
            .memberships
            .entry(connection_id)
            .or_default()
            .insert(topic);
        true
    }

    /// 离开主题（幂等）
    ///
    /// 返回该连接之前是否在此主题中。
    pub fn leave(&self, connection_id: ConnectionId, topic: Topic) -> bool {
        let mut inner = self.inner.write();
        let was_member = match inner.topics.get_mut(&topic) {
            Some(members) => {
                let removed = members.remove(&connection_id);
                if members.is_empty() {
                    inner.topics.remove(&topic);
                }
                removed
            }
            None => false,
        };
        if let Some(topics) = inner.memberships.get_mut(&connection_id) {
            topics.remove(&topic);
        }
        was_member
    }

    /// 连接断开：从所有主题中移除并丢弃发送端
    pub fn on_disconnect(&self, connection_id: ConnectionId) {
        let mut inner = self.inner.write();
        inner.connections.remove(&connection_id);
        let Some(topics) = inner.memberships.remove(&connection_id) else {
            return;
        };
        for topic in topics {
            if let Some(members) = inner.topics.get_mut(&topic) {
                members.remove(&connection_id);
                if members.is_empty() {
                    inner.topics.remove(&topic);
                }
            }
        }
        tracing::debug!(connection_id, "Hub connection removed");
    }

    /// 推送到主题内所有连接，返回成功入队的数量
    ///
    /// 无订阅者时直接返回 0。
    pub fn publish(&self, topic: Topic, event_name: &str, payload: serde_json::Value) -> usize {
        self.publish_message(topic, Arc::new(HubMessage::new(event_name, payload)))
    }

    pub fn publish_message(&self, topic: Topic, message: Arc<HubMessage>) -> usize {
        let targets: Vec<(ConnectionId, mpsc::Sender<Arc<HubMessage>>)> = {
            let inner = self.inner.read();
            let Some(members) = inner.topics.get(&topic) else {
                return 0;
            };
            members
                .iter()
                .filter_map(|id| inner.connections.get(id).map(|tx| (*id, tx.clone())))
                .collect()
        };

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, tx) in targets {
            match tx.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = id,
                        topic = %topic,
                        event = %message.event_name,
                        "Subscriber queue full, message dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => closed.push(id),
            }
        }

        for id in closed {
            tracing::warn!(connection_id = id, topic = %topic, "Subscriber gone, removing");
            self.on_disconnect(id);
        }

        delivered
    }

    pub fn connection_count(&self) -> usize {
        self.inner.read().connections.len()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner.read().topics.get(&topic).map_or(0, HashSet::len)
    }
}
