//! JWT login endpoint
//!
//! Fields are pulled from the raw JSON body so a missing field maps to 400
//! with the envelope, and bad credentials to 401 — never to a framework
//! rejection.

use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::info;

use qbank_common::api::auth::{issue_token, verify_password, Claims};
use qbank_common::api::types::{AccountSummary, LoginResponse};

use crate::api::ApiError;
use crate::db::accounts;
use crate::AppState;

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<LoginResponse>, ApiError> {
    let identifier = payload["identifier"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing identifier".to_string()))?;
    let password = payload["password"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing password".to_string()))?;

    let credential = accounts::find_credential(&state.db, identifier)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(password, &credential.password_salt, &credential.password_hash) {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let claims = Claims::new(
        credential.id,
        &credential.email,
        credential.phone.as_deref(),
        &credential.name,
        credential.role,
    );
    let token = issue_token(&state.jwt_secret, &claims)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(id = credential.id, role = credential.role.as_str(), "Login successful");

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: AccountSummary {
            id: credential.id,
            name: credential.name,
            email: credential.email,
            role: credential.role,
        },
    }))
}
