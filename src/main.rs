//! Career Link · Football Trivia Backend
//!
//! - Axum HTTP + WebSocket API
//! - Optional OpenAI integration (via environment variables); offline challenge bank otherwise
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   OPENAI_API_KEY      : enables OpenAI integration if present
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_FAST_MODEL   : default "gpt-4o-mini" (answer validation)
//!   OPENAI_STRONG_MODEL : default "gpt-4o" (challenge generation)
//!   GATEWAY_MODE        : "fallback" (default) or "strict"
//!   FEEDBACK_PAUSE_MS   : pause after a correct answer (default 4000)
//!   SESSION_IDLE_TTL_SECS : idle HTTP sessions are dropped after this (default 1800)
//!   GAME_CONFIG_PATH    : path to TOML config (settings, prompts, challenge bank)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use career_link::routes::build_router;
use career_link::state::AppState;
use career_link::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (gateway, settings, session registry).
  let state = Arc::new(AppState::from_env());

  state.clone().spawn_idle_sweeper();

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "career_link", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "career_link", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "career_link", error = %e, "Failed to listen for Ctrl-C; shutting down");
  }
}
