//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::{apply_edit, do_submit, do_syllabify, get_overview, EditReply};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "bigkas_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "bigkas_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "bigkas_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "bigkas_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "bigkas_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state, msg))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::OpenSession { lesson_id, content_type } => {
      let id = state.open_session(lesson_id, content_type).await;
      tracing::info!(target: "authoring", session = %id, "WS session opened");
      match get_overview(state, &id).await {
        Some(session) => ServerWsMessage::Session { session },
        None => ServerWsMessage::Error { message: "Session vanished during open.".into() },
      }
    }

    ClientWsMessage::Overview { session_id } => match get_overview(state, &session_id).await {
      Some(session) => ServerWsMessage::Session { session },
      None => ServerWsMessage::Error { message: format!("Unknown sessionId: {}", session_id) },
    },

    ClientWsMessage::Edit { session_id, op } => match apply_edit(state, &session_id, op).await {
      EditReply::Applied { data, session } => ServerWsMessage::Edited { data, session },
      EditReply::Rejected { code, message } => ServerWsMessage::Rejected { code, message },
      EditReply::UnknownSession => {
        ServerWsMessage::Error { message: format!("Unknown sessionId: {}", session_id) }
      }
    },

    ClientWsMessage::Submit { session_id } => match do_submit(state, &session_id).await {
      Some(outcome) => ServerWsMessage::SubmitResult {
        accepted: outcome.accepted,
        message: outcome.message,
      },
      None => ServerWsMessage::Error { message: format!("Unknown sessionId: {}", session_id) },
    },

    ClientWsMessage::CloseSession { session_id } => {
      if state.close_session(&session_id).await {
        ServerWsMessage::SessionClosed { session_id }
      } else {
        ServerWsMessage::Error { message: format!("Unknown sessionId: {}", session_id) }
      }
    }

    ClientWsMessage::Syllabify { word } => {
      let (parts, _rebuilds) = do_syllabify(&word);
      ServerWsMessage::Syllables { word, parts }
    }
  }
}
