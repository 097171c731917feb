//! Catalog endpoints: plans, add-ons, testimonials

use axum::extract::{Path, State};
use axum::Json;

use qbank_common::api::types::{
    Ack, AddonListResponse, AddonPayload, Created, PlanListResponse, PlanPayload,
    TestimonialListResponse, TestimonialPayload,
};

use crate::api::subjects::require_name;
use crate::api::ApiError;
use crate::db::catalog;
use crate::AppState;

const MIN_TESTIMONIAL_LEN: usize = 10;

// ============================================================================
// Plans
// ============================================================================

pub async fn list_plans(State(state): State<AppState>) -> Result<Json<PlanListResponse>, ApiError> {
    let plans = catalog::list_plans(&state.db).await?;
    Ok(Json(PlanListResponse { success: true, plans }))
}

pub async fn create_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanPayload>,
) -> Result<Json<Created>, ApiError> {
    validate_plan(&payload)?;
    let id = catalog::insert_plan(&state.db, &payload).await?;
    Ok(Json(Created { success: true, id }))
}

pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PlanPayload>,
) -> Result<Json<Ack>, ApiError> {
    validate_plan(&payload)?;
    catalog::update_plan(&state.db, id, &payload).await?;
    Ok(Json(Ack::ok()))
}

pub async fn remove_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    catalog::delete_plan(&state.db, id).await?;
    Ok(Json(Ack::ok()))
}

fn validate_plan(payload: &PlanPayload) -> Result<(), ApiError> {
    require_name(&payload.name)?;
    if payload.price < 0.0 {
        return Err(ApiError::BadRequest("Price must not be negative".to_string()));
    }
    if payload.duration_days <= 0 {
        return Err(ApiError::BadRequest(
            "Duration must be a positive number of days".to_string(),
        ));
    }
    if payload.device_limit <= 0 {
        return Err(ApiError::BadRequest("Device limit must be positive".to_string()));
    }
    Ok(())
}

// ============================================================================
// Add-ons
// ============================================================================

pub async fn list_addons(
    State(state): State<AppState>,
) -> Result<Json<AddonListResponse>, ApiError> {
    let addons = catalog::list_addons(&state.db).await?;
    Ok(Json(AddonListResponse { success: true, addons }))
}

pub async fn create_addon(
    State(state): State<AppState>,
    Json(payload): Json<AddonPayload>,
) -> Result<Json<Created>, ApiError> {
    require_name(&payload.name)?;
    if payload.price < 0.0 {
        return Err(ApiError::BadRequest("Price must not be negative".to_string()));
    }
    let id = catalog::insert_addon(&state.db, &payload).await?;
    Ok(Json(Created { success: true, id }))
}

pub async fn update_addon(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddonPayload>,
) -> Result<Json<Ack>, ApiError> {
    require_name(&payload.name)?;
    if payload.price < 0.0 {
        return Err(ApiError::BadRequest("Price must not be negative".to_string()));
    }
    catalog::update_addon(&state.db, id, &payload).await?;
    Ok(Json(Ack::ok()))
}

pub async fn remove_addon(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    catalog::delete_addon(&state.db, id).await?;
    Ok(Json(Ack::ok()))
}

// ============================================================================
// Testimonials
// ============================================================================

pub async fn list_testimonials(
    State(state): State<AppState>,
) -> Result<Json<TestimonialListResponse>, ApiError> {
    let testimonials = catalog::list_testimonials(&state.db).await?;
    Ok(Json(TestimonialListResponse { success: true, testimonials }))
}

pub async fn create_testimonial(
    State(state): State<AppState>,
    Json(payload): Json<TestimonialPayload>,
) -> Result<Json<Created>, ApiError> {
    validate_testimonial(&payload)?;
    let id = catalog::insert_testimonial(&state.db, &payload).await?;
    Ok(Json(Created { success: true, id }))
}

pub async fn update_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TestimonialPayload>,
) -> Result<Json<Ack>, ApiError> {
    validate_testimonial(&payload)?;
    catalog::update_testimonial(&state.db, id, &payload).await?;
    Ok(Json(Ack::ok()))
}

pub async fn remove_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    catalog::delete_testimonial(&state.db, id).await?;
    Ok(Json(Ack::ok()))
}

fn validate_testimonial(payload: &TestimonialPayload) -> Result<(), ApiError> {
    if payload.author.trim().is_empty() {
        return Err(ApiError::BadRequest("Author is required".to_string()));
    }
    if payload.message.trim().len() < MIN_TESTIMONIAL_LEN {
        return Err(ApiError::BadRequest(format!(
            "Message must be at least {} characters",
            MIN_TESTIMONIAL_LEN
        )));
    }
    Ok(())
}
