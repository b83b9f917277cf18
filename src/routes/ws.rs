//! WebSocket upgrade + message loop. Each connection owns one game session.
//! Client messages are parsed as JSON and forwarded to the session runner; every
//! applied transition is pushed back as a `state` message.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::runner::SessionHandle;
use crate::session::Outcome;
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "career_link", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn send_json(socket: &mut WebSocket, msg: &ServerWsMessage) -> bool {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  match socket.send(Message::Text(out)).await {
    Ok(()) => true,
    Err(e) => {
      error!(target: "career_link", error = %e, "WS send error");
      false
    }
  }
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let session = state.spawn_session();
  info!(target: "career_link", session_id = %session.id(), "WebSocket connected");

  let mut views = session.subscribe();
  let initial = ServerWsMessage::State { view: views.borrow_and_update().clone() };
  if !send_json(&mut socket, &initial).await {
    return;
  }

  loop {
    tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => {
            let reply = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(incoming) => {
                debug!(target: "career_link", session_id = %session.id(), msg_type = incoming.kind(), answer_len = ?incoming.answer_len(), "WS received");
                handle_client_ws(incoming, &session).await
              }
              Err(e) => Some(ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }),
            };
            if let Some(reply) = reply {
              if !send_json(&mut socket, &reply).await {
                break;
              }
            }
          }
          Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
          Message::Close(_) => break,
          _ => {}
        }
      }
      changed = views.changed() => {
        if changed.is_err() {
          break;
        }
        let view = views.borrow_and_update().clone();
        if !send_json(&mut socket, &ServerWsMessage::State { view }).await {
          break;
        }
      }
    }
  }
  info!(target: "career_link", session_id = %session.id(), "WebSocket disconnected");
}

/// Forward a client message. State changes are pushed by the view subscription,
/// so only pongs, rejections and errors produce a direct reply.
async fn handle_client_ws(msg: ClientWsMessage, session: &SessionHandle) -> Option<ServerWsMessage> {
  if matches!(msg, ClientWsMessage::Ping) {
    return Some(ServerWsMessage::Pong);
  }
  let intent = msg.intent()?;
  match session.dispatch(intent).await {
    Ok(d) => match d.outcome {
      Outcome::Applied => None,
      Outcome::Ignored(reason) => Some(ServerWsMessage::Rejected { reason: reason.to_string() }),
    },
    Err(e) => Some(ServerWsMessage::Error { message: e.to_string() }),
  }
}
