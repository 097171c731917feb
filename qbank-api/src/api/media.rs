//! Doctor media endpoints: explanation text and voice audio lifecycle
//!
//! Generation is idempotent unless `regenerate` is set: an existing asset
//! is returned as-is. Synthesis failures surface their message verbatim and
//! leave the stored asset untouched.

use axum::extract::{Path, Query, State};
use axum::Json;

use qbank_common::api::types::{
    Ack, ExplanationRequest, ExplanationResponse, QuestionPageResponse, VoiceQuery, VoiceRequest,
    VoiceResponse,
};
use qbank_common::models::Voice;
use serde::Deserialize;

use crate::api::ApiError;
use crate::db::questions;
use crate::AppState;

const PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// GET /api/doctor/questions
///
/// Paginated question listing for the review screen.
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<QuestionPageResponse>, ApiError> {
    let (total, page, questions) = questions::page(&state.db, query.page, PAGE_SIZE).await?;
    Ok(Json(QuestionPageResponse {
        success: true,
        page,
        page_size: PAGE_SIZE,
        total,
        questions,
    }))
}

/// POST /api/doctor/questions/:id/explanation
pub async fn generate_explanation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ExplanationRequest>,
) -> Result<Json<ExplanationResponse>, ApiError> {
    let question = questions::fetch_one(&state.db, id).await?;

    if let Some(existing) = &question.explanation {
        if !request.regenerate {
            return Ok(Json(ExplanationResponse {
                success: true,
                text: existing.clone(),
            }));
        }
    }

    let text = state
        .explainer
        .explain(
            &question.question_text,
            &question.question_options,
            question.correct_key.as_deref(),
        )
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    questions::set_explanation(&state.db, id, &text).await?;
    tracing::info!(id, regenerate = request.regenerate, "Explanation generated");

    Ok(Json(ExplanationResponse { success: true, text }))
}

/// DELETE /api/doctor/questions/:id/explanation
pub async fn delete_explanation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    questions::clear_explanation(&state.db, id).await?;
    Ok(Json(Ack::ok()))
}

/// POST /api/doctor/questions/:id/voice
pub async fn generate_voice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<VoiceRequest>,
) -> Result<Json<VoiceResponse>, ApiError> {
    let question = questions::fetch_one(&state.db, id).await?;

    let existing = match request.voice {
        Voice::Female => &question.female_explanation_audio_url,
        Voice::Male => &question.male_explanation_audio_url,
    };
    if let Some(url) = existing {
        if !request.regenerate {
            return Ok(Json(VoiceResponse { success: true, url: url.clone() }));
        }
    }

    // Narration needs explanation text to read.
    let text = question.explanation.as_deref().ok_or_else(|| {
        ApiError::BadRequest("Question has no explanation to narrate".to_string())
    })?;

    let url = state
        .speech
        .synthesize(id, request.voice, text)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    questions::set_voice_url(&state.db, id, request.voice, &url).await?;
    tracing::info!(
        id,
        voice = request.voice.as_str(),
        regenerate = request.regenerate,
        "Voice audio generated"
    );

    Ok(Json(VoiceResponse { success: true, url }))
}

/// DELETE /api/doctor/questions/:id/voice?voice=male|female
pub async fn delete_voice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<VoiceQuery>,
) -> Result<Json<Ack>, ApiError> {
    questions::clear_voice_url(&state.db, id, query.voice).await?;
    Ok(Json(Ack::ok()))
}
