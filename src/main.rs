//! Mates Andalucía · exercise backend
//!
//! - Axum HTTP + WebSocket API
//! - Exercises generated by Google Gemini (schema-constrained JSON)
//! - Static SPA (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   GEMINI_API_KEY      : credential (falls back to API_KEY); not validated locally
//!   GEMINI_BASE_URL     : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL        : default "gemini-2.5-flash"
//!   GEMINI_TIMEOUT_SECS : optional request timeout (none by default)
//!   APP_CONFIG_PATH     : path to TOML config (prompts + numeric limits)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod gemini;
mod generator;
mod display;
mod shell;
mod session;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let state = Arc::new(AppState::from_env()?);
  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "mates_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
