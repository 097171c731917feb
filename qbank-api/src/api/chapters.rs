//! Chapter endpoints

use axum::extract::{Path, State};
use axum::Json;

use qbank_common::api::types::{Ack, ChapterDetailResponse, ChapterPayload, Created};

use crate::api::subjects::require_name;
use crate::api::ApiError;
use crate::db::content;
use crate::AppState;

/// POST /api/admin/chapters
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ChapterPayload>,
) -> Result<Json<Created>, ApiError> {
    require_name(&payload.name)?;
    let id = content::insert_chapter(&state.db, &payload).await?;
    tracing::info!(id, subject_id = payload.subject_id, "Created chapter");
    Ok(Json(Created { success: true, id }))
}

/// PUT /api/admin/chapters/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ChapterPayload>,
) -> Result<Json<Ack>, ApiError> {
    require_name(&payload.name)?;
    content::update_chapter(&state.db, id, &payload).await?;
    Ok(Json(Ack::ok()))
}

/// DELETE /api/admin/chapters/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    content::delete_chapter(&state.db, id).await?;
    tracing::info!(id, "Deleted chapter (cascading)");
    Ok(Json(Ack::ok()))
}

/// GET /api/admin/chapters/:id/topics
///
/// Chapter-scoped view: the chapter, its topics, and its direct questions.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ChapterDetailResponse>, ApiError> {
    let (chapter, topics, questions) = content::chapter_detail(&state.db, id).await?;
    Ok(Json(ChapterDetailResponse {
        success: true,
        chapter,
        topics,
        questions,
    }))
}
