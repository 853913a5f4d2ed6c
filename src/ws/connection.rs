//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::api::dto::SessionResponse;
use crate::domain::{CatchEvent, SessionId};
use crate::service::CatchService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<CatchEvent>,
    catch_service: Arc<CatchService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &catch_service).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(catch_event) => {
                        if subs.matches(catch_event.session_id()) {
                            let msg = WsMessage::new(
                                uuid::Uuid::new_v4().to_string(),
                                WsMessageType::Event,
                                serde_json::to_value(&catch_event).unwrap_or_default(),
                            );
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    catch_service: &CatchService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error("", 400, "malformed JSON")).ok();
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let response = match command {
        WsCommand::Subscribe { session_ids } => {
            let (ids, wildcard) = parse_session_ids(&session_ids);
            subs.subscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { session_ids } => {
            let (ids, wildcard) = parse_session_ids(&session_ids);
            subs.unsubscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetSession { session_id } => {
            let Ok(uuid) = session_id.parse::<uuid::Uuid>() else {
                return serde_json::to_string(&WsMessage::error(msg.id, 400, "invalid session id"))
                    .ok();
            };
            match catch_service.session(SessionId::from_uuid(uuid)).await {
                Ok(snapshot) => WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::to_value(SessionResponse::from(snapshot)).unwrap_or_default(),
                ),
                Err(err) => WsMessage::error(msg.id, err.status_code().as_u16(), &err.to_string()),
            }
        }
    };
    serde_json::to_string(&response).ok()
}

/// Splits raw ids into parsed session ids and the wildcard flag.
/// Unparseable ids are ignored.
fn parse_session_ids(raw: &[String]) -> (Vec<SessionId>, bool) {
    let wildcard = raw.iter().any(|s| s == "*");
    let ids = raw
        .iter()
        .filter_map(|s| s.parse::<uuid::Uuid>().ok())
        .map(SessionId::from_uuid)
        .collect();
    (ids, wildcard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_and_invalid_ids() {
        let id = SessionId::new();
        let raw = vec!["*".to_string(), id.to_string(), "nope".to_string()];
        let (ids, wildcard) = parse_session_ids(&raw);
        assert!(wildcard);
        assert_eq!(ids, vec![id]);
    }
}
