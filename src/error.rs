//! Error types shared across the gateway, session runner and HTTP layer.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Failures of an outbound challenge/validation call.
#[derive(Debug, Error)]
pub enum GatewayError {
  /// Network failure, timeout or connection refused.
  #[error("transport error: {0}")]
  Transport(String),

  /// Upstream answered with a non-success HTTP status.
  #[error("upstream HTTP {status}: {message}")]
  Upstream { status: u16, message: String },

  /// Body present but does not match the expected shape.
  #[error("response does not match schema: {0}")]
  Schema(String),

  #[error("upstream returned an empty response")]
  EmptyResponse,

  /// Offline bank has nothing for this level.
  #[error("no challenge available for level {level}")]
  Exhausted { level: u32 },

  /// Offline bank has no reference answers for this pair.
  #[error("cannot verify answers for {subject_a} / {subject_b}")]
  Unverifiable { subject_a: String, subject_b: String },
}

impl From<reqwest::Error> for GatewayError {
  fn from(e: reqwest::Error) -> Self {
    GatewayError::Transport(e.to_string())
  }
}

/// The session runner has shut down and no longer accepts commands.
#[derive(Debug, Error)]
#[error("session {0} is closed")]
pub struct SessionClosed(pub Uuid);

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unknown session: {0}")]
  SessionNotFound(Uuid),
  #[error(transparent)]
  SessionClosed(#[from] SessionClosed),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
      ApiError::SessionClosed(_) => StatusCode::GONE,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
