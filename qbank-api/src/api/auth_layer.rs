//! Bearer-token authentication middleware
//!
//! Verifies the JWT on every protected request; there is no other session
//! state. Verified claims are stored as a request extension for handlers
//! that need the caller's identity.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use qbank_common::api::auth::{verify_token, Claims};
use qbank_common::models::Role;

use crate::api::ApiError;
use crate::AppState;

/// Require an `admin` token.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&state, &req)?;
    if claims.role != Role::Admin {
        return Err(ApiError::Unauthorized("Admin role required".to_string()));
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Require a `doctor` token; admins pass as well.
pub async fn require_doctor(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&state, &req)?;
    if claims.role != Role::Doctor && claims.role != Role::Admin {
        return Err(ApiError::Unauthorized("Doctor role required".to_string()));
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn authenticate(state: &AppState, req: &Request) -> Result<Claims, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Malformed authorization header".to_string()))?;

    verify_token(&state.jwt_secret, token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))
}
