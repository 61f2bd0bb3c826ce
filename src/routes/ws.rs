//! WebSocket upgrade + message loop. Each connection owns one `Session`.
//! Every client message is parsed as JSON and applied; the resulting view is
//! pushed back. Generation triggers push the loading view first and the
//! resolved view once the generator returns. The socket keeps being read while
//! a generation is in flight, so "go home" and reveals on the previous card
//! apply immediately.

use std::{future::Future, pin::Pin, sync::Arc};
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::domain::Exercise;
use crate::error::GenerationError;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::{Session, Step};
use crate::state::AppState;

type PendingExercise = Pin<Box<dyn Future<Output = Result<Exercise, GenerationError>> + Send>>;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "mates_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "mates_backend", "WebSocket connected");
  let mut session = Session::new();
  // At most one generation per connection; a new trigger replaces it.
  let mut pending: Option<PendingExercise> = None;

  loop {
    tokio::select! {
      received = socket.recv() => {
        let Some(Ok(msg)) = received else { break };
        match msg {
          Message::Text(txt) => {
            let incoming = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(m) => m,
              Err(e) => {
                let reply = ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) };
                if send(&mut socket, &reply).await.is_err() { break; }
                continue;
              }
            };
            debug!(target: "mates_backend", ?incoming, "WS received");

            let step = session.apply(incoming);
            if step == Step::Pong {
              if send(&mut socket, &ServerWsMessage::Pong).await.is_err() { break; }
              continue;
            }
            if step == Step::Generate {
              if pending.is_some() {
                debug!(target: "exercise", "Cancelling in-flight generation for a newer trigger");
              }
              let generator = state.generator.clone();
              pending = Some(Box::pin(async move { generator.generate().await }));
            }
            if send(&mut socket, &ServerWsMessage::View { view: session.view() }).await.is_err() { break; }
          }
          Message::Ping(payload) => {
            if let Err(e) = socket.send(Message::Pong(payload)).await {
              error!(target: "mates_backend", error = %e, "WS pong send error");
              break;
            }
          }
          Message::Close(_) => break,
          _ => {}
        }
      }
      outcome = finished(&mut pending), if pending.is_some() => {
        pending = None;
        if session.resolve(outcome) {
          info!(
            target: "exercise",
            phase = ?session.shell().phase(),
            id = session.shell().current().map(|e| e.id.as_str()).unwrap_or("-"),
            "WS exercise resolved"
          );
          if send(&mut socket, &ServerWsMessage::View { view: session.view() }).await.is_err() { break; }
        }
      }
    }
  }
  info!(target: "mates_backend", "WebSocket disconnected");
}

/// Outcome of the in-flight generation; never completes when there is none.
async fn finished(pending: &mut Option<PendingExercise>) -> Result<Exercise, GenerationError> {
  match pending {
    Some(fut) => fut.as_mut().await,
    None => std::future::pending().await,
  }
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await.map_err(|e| {
    error!(target: "mates_backend", error = %e, "WS send error");
    e
  })
}
