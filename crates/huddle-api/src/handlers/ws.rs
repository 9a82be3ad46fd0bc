//! WebSocket upgrade handler and per-connection message pumps.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::warn;

use huddle_auth::claims::Identity;
use huddle_core::error::AppError;
use huddle_signaling::message::{ClientEvent, ServerEvent};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Connection token (either issuance path).
    pub token: Option<String>,
}

/// GET /ws?token={jwt} — authenticated WebSocket upgrade.
///
/// The token may arrive as a query parameter or an `Authorization` bearer
/// header, depending on the client type. Verification happens before the
/// upgrade; a refused connection never produces application events.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| AppError::authentication("No token provided"))?;

    let identity = state.gate.authenticate(&token)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, identity, socket)))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Drives one established connection until it closes.
async fn handle_socket(state: AppState, identity: Identity, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (conn, mut outbound_rx) = state.coordinator.register(identity).await;

    // Outbound pump: drains the coordinator's channel onto the socket so
    // event delivery never blocks coordinator operations.
    let outbound_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => state.coordinator.handle_event(&conn, event).await,
                Err(e) => {
                    conn.send(ServerEvent::error(&AppError::from(e)));
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn.id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.coordinator.disconnect(&conn).await;
}
