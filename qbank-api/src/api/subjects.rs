//! Subject endpoints, including the full-hierarchy tree

use axum::extract::{Path, State};
use axum::Json;

use qbank_common::api::types::{
    Ack, Created, SubjectListResponse, SubjectPayload, TreeResponse,
};

use crate::api::ApiError;
use crate::db::content;
use crate::AppState;

/// GET /api/admin/subjects/tree
///
/// The entire hierarchy in one response. Clients rebuild their snapshot
/// from this after every mutation.
pub async fn tree(State(state): State<AppState>) -> Result<Json<TreeResponse>, ApiError> {
    let tree = content::load_tree(&state.db).await?;
    Ok(Json(TreeResponse { success: true, tree }))
}

/// GET /api/admin/subjects
pub async fn list(State(state): State<AppState>) -> Result<Json<SubjectListResponse>, ApiError> {
    let subjects = content::list_subjects(&state.db).await?;
    Ok(Json(SubjectListResponse { success: true, subjects }))
}

/// POST /api/admin/subjects
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<SubjectPayload>,
) -> Result<Json<Created>, ApiError> {
    require_name(&payload.name)?;
    let id = content::insert_subject(&state.db, &payload).await?;
    tracing::info!(id, name = %payload.name, "Created subject");
    Ok(Json(Created { success: true, id }))
}

/// PUT /api/admin/subjects/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SubjectPayload>,
) -> Result<Json<Ack>, ApiError> {
    require_name(&payload.name)?;
    content::update_subject(&state.db, id, &payload).await?;
    Ok(Json(Ack::ok()))
}

/// DELETE /api/admin/subjects/:id
///
/// Cascades to chapters, topics and questions at the store level.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    content::delete_subject(&state.db, id).await?;
    tracing::info!(id, "Deleted subject (cascading)");
    Ok(Json(Ack::ok()))
}

pub(crate) fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    Ok(())
}
