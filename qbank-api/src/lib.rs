//! qbank-api library - REST gateway over the question-bank store
//!
//! Stateless request/response endpoints fronting the SQLite entity store.
//! Each call is independent; the only cross-request state is JWT
//! verification against the process-wide secret.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

use crate::services::{ExplanationSynth, SpeechSynth};

pub mod api;
pub mod db;
pub mod services;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Secret for signing and verifying session tokens
    pub jwt_secret: Arc<str>,
    /// Voice synthesis backend for explanation audio
    pub speech: Arc<dyn SpeechSynth>,
    /// Explanation text synthesis backend
    pub explainer: Arc<dyn ExplanationSynth>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        jwt_secret: impl Into<Arc<str>>,
        speech: Arc<dyn SpeechSynth>,
        explainer: Arc<dyn ExplanationSynth>,
    ) -> Self {
        Self {
            db,
            jwt_secret: jwt_secret.into(),
            speech,
            explainer,
        }
    }
}

/// Build application router
///
/// Admin routes require an `admin` token; doctor routes accept `doctor` or
/// `admin`. Health and login are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    let admin = Router::new()
        .route("/api/admin/subjects/tree", get(api::subjects::tree))
        .route(
            "/api/admin/subjects",
            get(api::subjects::list).post(api::subjects::create),
        )
        .route(
            "/api/admin/subjects/:id",
            put(api::subjects::update).delete(api::subjects::remove),
        )
        .route("/api/admin/chapters", post(api::chapters::create))
        .route(
            "/api/admin/chapters/:id",
            put(api::chapters::update).delete(api::chapters::remove),
        )
        .route("/api/admin/chapters/:id/topics", get(api::chapters::detail))
        .route("/api/admin/topics", post(api::topics::create))
        .route(
            "/api/admin/topics/:id",
            put(api::topics::update).delete(api::topics::remove),
        )
        .route("/api/admin/questions", post(api::questions::create))
        .route(
            "/api/admin/questions/:id",
            put(api::questions::update).delete(api::questions::remove),
        )
        .route("/api/admin/questions/:id/status", put(api::questions::set_status))
        .route(
            "/api/admin/plans",
            get(api::catalog::list_plans).post(api::catalog::create_plan),
        )
        .route(
            "/api/admin/plans/:id",
            put(api::catalog::update_plan).delete(api::catalog::remove_plan),
        )
        .route(
            "/api/admin/addons",
            get(api::catalog::list_addons).post(api::catalog::create_addon),
        )
        .route(
            "/api/admin/addons/:id",
            put(api::catalog::update_addon).delete(api::catalog::remove_addon),
        )
        .route(
            "/api/admin/testimonials",
            get(api::catalog::list_testimonials).post(api::catalog::create_testimonial),
        )
        .route(
            "/api/admin/testimonials/:id",
            put(api::catalog::update_testimonial).delete(api::catalog::remove_testimonial),
        )
        .route(
            "/api/admin/users",
            get(api::accounts::list_users).post(api::accounts::create_user),
        )
        .route(
            "/api/admin/users/:id",
            put(api::accounts::update_user).delete(api::accounts::remove_user),
        )
        .route(
            "/api/admin/doctors",
            get(api::accounts::list_doctors).post(api::accounts::create_doctor),
        )
        .route(
            "/api/admin/doctors/:id",
            put(api::accounts::update_doctor).delete(api::accounts::remove_doctor),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_layer::require_admin,
        ));

    let doctor = Router::new()
        .route("/api/doctor/questions", get(api::media::list_questions))
        .route(
            "/api/doctor/questions/:id/explanation",
            post(api::media::generate_explanation).delete(api::media::delete_explanation),
        )
        .route(
            "/api/doctor/questions/:id/voice",
            post(api::media::generate_voice).delete(api::media::delete_voice),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_layer::require_doctor,
        ));

    let public = Router::new()
        .route("/health", get(api::health::health_check))
        .route("/api/v1/auth/login", post(api::login::login));

    Router::new()
        .merge(admin)
        .merge(doctor)
        .merge(public)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
