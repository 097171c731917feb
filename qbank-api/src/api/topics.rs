//! Topic endpoints

use axum::extract::{Path, State};
use axum::Json;

use qbank_common::api::types::{Ack, Created, TopicPayload};

use crate::api::subjects::require_name;
use crate::api::ApiError;
use crate::db::content;
use crate::AppState;

/// POST /api/admin/topics
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<TopicPayload>,
) -> Result<Json<Created>, ApiError> {
    require_name(&payload.name)?;
    let id = content::insert_topic(&state.db, &payload).await?;
    tracing::info!(id, chapter_id = payload.chapter_id, "Created topic");
    Ok(Json(Created { success: true, id }))
}

/// PUT /api/admin/topics/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TopicPayload>,
) -> Result<Json<Ack>, ApiError> {
    require_name(&payload.name)?;
    content::update_topic(&state.db, id, &payload).await?;
    Ok(Json(Ack::ok()))
}

/// DELETE /api/admin/topics/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    content::delete_topic(&state.db, id).await?;
    tracing::info!(id, "Deleted topic (cascading)");
    Ok(Json(Ack::ok()))
}
