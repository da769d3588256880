//! WebSocket event streaming.
//!
//! Each connection is one hub subscriber: every simulation event published
//! after the connection opens is forwarded as a JSON text frame, in
//! publish order, until the client disconnects. There is no replay of
//! events from before the connection.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tracing::{debug, warn};

use super::state::AppState;

/// Upgrade handler for `GET /ws`.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|socket| stream_events(socket, state))
}

async fn stream_events(socket: WebSocket, state: AppState) {
    let mut subscription = state.engine.hub().subscribe();
    let (mut sender, mut receiver) = socket.split();

    debug!("websocket subscriber connected");

    // Forward simulation events to the client.
    let mut forward = tokio::spawn(async move {
        let greeting = json!({
            "type": "hello",
            "msg": "train realtime ready",
        });
        if sender.send(Message::Text(greeting.to_string())).await.is_err() {
            return;
        }

        while let Some(event) = subscription.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(%error, "failed to serialise event, skipping");
                    continue;
                }
            };
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    // Drain the client side; any inbound traffic is ignored, but a close
    // (or error) ends the session.
    let mut drain = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut forward => drain.abort(),
        _ = &mut drain => forward.abort(),
    }

    debug!("websocket subscriber disconnected");
}
