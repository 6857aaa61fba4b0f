//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::logic::{apply_edit, do_submit, do_syllabify, get_overview, EditReply};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(lesson = %body.lesson_id, content = ?body.content_type))]
pub async fn http_open_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<OpenSessionIn>,
) -> impl IntoResponse {
  let id = state.open_session(body.lesson_id, body.content_type).await;
  info!(target: "authoring", session = %id, "HTTP session opened");
  match get_overview(&state, &id).await {
    Some(session) => Json(session).into_response(),
    None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
  }
}

#[instrument(level = "info", skip(state), fields(session = %id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  match get_overview(&state, &id).await {
    Some(session) => Json(session).into_response(),
    None => (
      StatusCode::NOT_FOUND,
      Json(RejectionOut { code: "unknown_session", message: format!("Unknown sessionId: {id}") }),
    )
      .into_response(),
  }
}

#[instrument(level = "info", skip(state), fields(session = %id))]
pub async fn http_close_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  if state.close_session(&id).await {
    StatusCode::NO_CONTENT.into_response()
  } else {
    (
      StatusCode::NOT_FOUND,
      Json(RejectionOut { code: "unknown_session", message: format!("Unknown sessionId: {id}") }),
    )
      .into_response()
  }
}

#[instrument(level = "info", skip(state, op), fields(session = %id))]
pub async fn http_post_edit(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(op): Json<EditOp>,
) -> impl IntoResponse {
  match apply_edit(&state, &id, op).await {
    EditReply::Applied { data, session } => {
      Json(serde_json::json!({ "data": data, "session": session })).into_response()
    }
    EditReply::Rejected { code, message } => (
      StatusCode::UNPROCESSABLE_ENTITY,
      Json(RejectionOut { code, message }),
    )
      .into_response(),
    EditReply::UnknownSession => (
      StatusCode::NOT_FOUND,
      Json(RejectionOut { code: "unknown_session", message: format!("Unknown sessionId: {id}") }),
    )
      .into_response(),
  }
}

#[instrument(level = "info", skip(state), fields(session = %id))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  match do_submit(&state, &id).await {
    Some(outcome) => Json(SubmitOut { accepted: outcome.accepted, message: outcome.message }).into_response(),
    None => (
      StatusCode::NOT_FOUND,
      Json(RejectionOut { code: "unknown_session", message: format!("Unknown sessionId: {id}") }),
    )
      .into_response(),
  }
}

#[instrument(level = "info", fields(word_len = q.word.len()))]
pub async fn http_get_syllabify(Query(q): Query<SyllabifyQuery>) -> impl IntoResponse {
  let (parts, rebuilds) = do_syllabify(&q.word);
  Json(SyllabifyOut { word: q.word, parts, rebuilds })
}
