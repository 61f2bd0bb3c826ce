//! HTTP endpoint handlers. These are thin wrappers around the generator.
//! Each handler is instrumented and logs basic result info.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

/// One stateless exercise. Failures collapse to 502 + the student-facing message.
#[instrument(level = "info", skip(state))]
pub async fn http_get_exercise(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match state.generator.generate().await {
    Ok(ex) => {
      info!(target: "exercise", id = %ex.id, kind = ex.kind.as_str(), "HTTP exercise served");
      (StatusCode::OK, Json(to_out(&ex))).into_response()
    }
    Err(e) => {
      let error = e.user_message().to_string();
      (StatusCode::BAD_GATEWAY, Json(ErrorOut { error })).into_response()
    }
  }
}

#[instrument(level = "debug")]
pub async fn http_get_categories() -> impl IntoResponse {
  Json(categories())
}
