use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use phonemart_auth_types::identity::IdentityHeaders;

use crate::infra::notify::Subscription;
use crate::state::AppState;

// ── GET /ws ──────────────────────────────────────────────────────────────────

pub async fn notifications_ws(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    // Subscribe before the upgrade so no event published meanwhile is missed.
    let subscription = state.hub.subscribe(identity.user_id);
    ws.on_upgrade(move |socket| forward(socket, identity, subscription))
}

async fn forward(socket: WebSocket, identity: IdentityHeaders, mut subscription: Subscription) {
    tracing::debug!(user_id = %identity.user_id, "notification stream opened");
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            notification = subscription.next() => {
                let Some(notification) = notification else { break };
                let text = match serde_json::to_string(&notification.event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = ?e, "failed to encode notification");
                        continue;
                    }
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!(user_id = %identity.user_id, "notification stream closed");
}
