//! Question endpoints
//!
//! Create and update accept the full payload (options and correct key
//! included) and always land the question in `pending`, whatever status
//! the payload or the stored row carried.

use axum::extract::{Path, State};
use axum::Json;

use qbank_common::api::types::{Ack, Created, QuestionPayload, StatusPayload};

use crate::api::ApiError;
use crate::db::questions;
use crate::AppState;

/// POST /api/admin/questions
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<QuestionPayload>,
) -> Result<Json<Created>, ApiError> {
    let id = questions::insert(&state.db, &payload).await?;
    tracing::info!(id, chapter_id = payload.chapter_id, "Created question");
    Ok(Json(Created { success: true, id }))
}

/// PUT /api/admin/questions/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<QuestionPayload>,
) -> Result<Json<Ack>, ApiError> {
    questions::update(&state.db, id, &payload).await?;
    Ok(Json(Ack::ok()))
}

/// DELETE /api/admin/questions/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    questions::delete(&state.db, id).await?;
    tracing::info!(id, "Deleted question");
    Ok(Json(Ack::ok()))
}

/// PUT /api/admin/questions/:id/status
///
/// The only way out of `pending`.
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<Ack>, ApiError> {
    questions::set_status(&state.db, id, payload.status).await?;
    tracing::info!(id, status = payload.status.as_str(), "Question status changed");
    Ok(Json(Ack::ok()))
}
