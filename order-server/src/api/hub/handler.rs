use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use shared::message::{HubCommand, HubMessage, Topic};
use std::sync::Arc;
use tokio::time::Duration;

use crate::core::ServerState;
use crate::hub::{ConnectionId, TopicRegistry};

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// GET /api/hub/ws
pub async fn handle_hub_ws(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| hub_ws_session(socket, state.registry))
}

async fn hub_ws_session(socket: WebSocket, registry: Arc<TopicRegistry>) {
    let (mut sink, mut stream) = socket.split();
    let (connection_id, mut hub_rx) = registry.connect();

    tracing::info!(connection_id, "Hub WS connected");

    if send_message(&mut sink, &HubMessage::connected(connection_id))
        .await
        .is_err()
    {
        registry.on_disconnect(connection_id);
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                match event {
                    Some(msg) => {
                        if send_message(&mut sink, &msg).await.is_err() {
                            break;
                        }
                    }
                    // Registry dropped our sender
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_command(&registry, connection_id, &text);
                        if send_message(&mut sink, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    registry.on_disconnect(connection_id);
    tracing::info!(connection_id, "Hub WS disconnected");
}

/// Apply a client command and build the acknowledgement
fn handle_command(registry: &TopicRegistry, connection_id: ConnectionId, text: &str) -> HubMessage {
    let command = match serde_json::from_str::<HubCommand>(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!(connection_id, error = %e, "Invalid hub command");
            return HubMessage::error(format!("invalid command: {e}"));
        }
    };

    match command {
        HubCommand::Join { topic } => match topic.parse::<Topic>() {
            Ok(topic) => {
                registry.join(connection_id, topic);
                tracing::debug!(connection_id, topic = %topic, "Joined topic");
                HubMessage::joined(topic)
            }
            Err(e) => HubMessage::error(e.to_string()),
        },
        HubCommand::Leave { topic } => match topic.parse::<Topic>() {
            Ok(topic) => {
                registry.leave(connection_id, topic);
                tracing::debug!(connection_id, topic = %topic, "Left topic");
                HubMessage::left(topic)
            }
            Err(e) => HubMessage::error(e.to_string()),
        },
    }
}

async fn send_message<S>(sink: &mut S, msg: &HubMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::event_names;

    #[test]
    fn test_join_and_leave_commands() {
        let registry = TopicRegistry::default();
        let (id, _rx) = registry.connect();

        let reply = handle_command(&registry, id, r#"{"action":"join","topic":"Table_3"}"#);
        assert_eq!(reply.event_name, event_names::JOINED_TOPIC);
        assert_eq!(reply.payload["topic"], "table:3");
        assert_eq!(registry.subscriber_count(Topic::Table(3)), 1);

        let reply = handle_command(&registry, id, r#"{"action":"leave","topic":"table:3"}"#);
        assert_eq!(reply.event_name, event_names::LEFT_TOPIC);
        assert_eq!(registry.subscriber_count(Topic::Table(3)), 0);
    }

    #[test]
    fn test_bad_commands_get_hub_error() {
        let registry = TopicRegistry::default();
        let (id, _rx) = registry.connect();

        let reply = handle_command(&registry, id, r#"{"action":"join","topic":"bar"}"#);
        assert_eq!(reply.event_name, event_names::HUB_ERROR);

        let reply = handle_command(&registry, id, "not json");
        assert_eq!(reply.event_name, event_names::HUB_ERROR);
    }
}
