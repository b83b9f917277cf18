//! HTTP endpoint handlers. These are thin wrappers that forward intents to the session runner.
//! Each handler is instrumented and logs the session id and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, Json, response::IntoResponse};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::chart::score_series;
use crate::error::ApiError;
use crate::protocol::*;
use crate::runner::{Intent, SessionHandle};
use crate::state::AppState;

async fn lookup(state: &AppState, id: Uuid) -> Result<SessionHandle, ApiError> {
  state.get_session(&id).await.ok_or(ApiError::SessionNotFound(id))
}

async fn command(state: &AppState, id: Uuid, intent: Intent) -> Result<Json<CommandOut>, ApiError> {
  let handle = lookup(state, id).await?;
  let dispatched = handle.dispatch(intent).await?;
  info!(target: "session", session_id = %id, accepted = dispatched.outcome.is_applied(), status = %dispatched.view.status, "HTTP command dispatched");
  Ok(Json(dispatched.into()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    ok: true,
    gateway: state.gateway.name(),
    mode: state.settings.gateway_mode.as_str(),
    sessions: state.session_count().await,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let handle = state.create_session().await;
  info!(target: "session", session_id = %handle.id(), "HTTP session created");
  (StatusCode::CREATED, Json(SessionOut { id: handle.id(), view: handle.view() }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionOut>, ApiError> {
  let handle = lookup(&state, id).await?;
  Ok(Json(SessionOut { id, view: handle.view() }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_start(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CommandOut>, ApiError> {
  command(&state, id, Intent::Start).await
}

#[instrument(level = "info", skip(state, body), fields(answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<CommandOut>, ApiError> {
  command(&state, id, Intent::Submit { answer: body.answer }).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_retry(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CommandOut>, ApiError> {
  command(&state, id, Intent::Retry).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_dismiss_error(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CommandOut>, ApiError> {
  command(&state, id, Intent::DismissError).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_chart(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ChartOut>, ApiError> {
  let handle = lookup(&state, id).await?;
  Ok(Json(ChartOut { points: score_series(&handle.view().history) }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if state.remove_session(&id).await {
    info!(target: "session", session_id = %id, "HTTP session deleted");
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::SessionNotFound(id))
  }
}
