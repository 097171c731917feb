//! Account endpoints: users and doctors

use axum::extract::{Path, State};
use axum::Json;

use qbank_common::api::types::{
    Ack, Created, DoctorListResponse, DoctorPayload, UserListResponse, UserPayload,
};

use crate::api::ApiError;
use crate::db::accounts;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 6;

// ============================================================================
// Users
// ============================================================================

pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    let users = accounts::list_users(&state.db).await?;
    Ok(Json(UserListResponse { success: true, users }))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<Created>, ApiError> {
    validate_contact(&payload.name, &payload.email, payload.phone.as_deref())?;
    // Password is mandatory on create.
    match payload.password.as_deref() {
        None => return Err(ApiError::BadRequest("Password is required".to_string())),
        Some(p) => validate_password(p)?,
    }
    let id = accounts::insert_user(&state.db, &payload).await?;
    tracing::info!(id, email = %payload.email, "Created user");
    Ok(Json(Created { success: true, id }))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<Ack>, ApiError> {
    validate_contact(&payload.name, &payload.email, payload.phone.as_deref())?;
    if let Some(p) = payload.password.as_deref() {
        validate_password(p)?;
    }
    accounts::update_user(&state.db, id, &payload).await?;
    Ok(Json(Ack::ok()))
}

pub async fn remove_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    accounts::delete_user(&state.db, id).await?;
    Ok(Json(Ack::ok()))
}

// ============================================================================
// Doctors
// ============================================================================

pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<DoctorListResponse>, ApiError> {
    let doctors = accounts::list_doctors(&state.db).await?;
    Ok(Json(DoctorListResponse { success: true, doctors }))
}

pub async fn create_doctor(
    State(state): State<AppState>,
    Json(payload): Json<DoctorPayload>,
) -> Result<Json<Created>, ApiError> {
    validate_contact(&payload.name, &payload.email, payload.phone.as_deref())?;
    match payload.password.as_deref() {
        None => return Err(ApiError::BadRequest("Password is required".to_string())),
        Some(p) => validate_password(p)?,
    }
    let id = accounts::insert_doctor(&state.db, &payload).await?;
    tracing::info!(id, email = %payload.email, "Created doctor");
    Ok(Json(Created { success: true, id }))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DoctorPayload>,
) -> Result<Json<Ack>, ApiError> {
    validate_contact(&payload.name, &payload.email, payload.phone.as_deref())?;
    if let Some(p) = payload.password.as_deref() {
        validate_password(p)?;
    }
    accounts::update_doctor(&state.db, id, &payload).await?;
    Ok(Json(Ack::ok()))
}

pub async fn remove_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    accounts::delete_doctor(&state.db, id).await?;
    Ok(Json(Ack::ok()))
}

// ============================================================================
// Validation
// ============================================================================

fn validate_contact(name: &str, email: &str, phone: Option<&str>) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if !is_plausible_email(email) {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    if let Some(phone) = phone {
        if !is_plausible_phone(phone) {
            return Err(ApiError::BadRequest("Invalid phone number".to_string()));
        }
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// local-part@domain.tld with no whitespace.
pub(crate) fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// 7-15 digits, optional leading '+', separators allowed.
pub(crate) fn is_plausible_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_plausible_email("doc@example.com"));
        assert!(is_plausible_email("a.b+c@sub.example.org"));
        assert!(!is_plausible_email("no-at-sign"));
        assert!(!is_plausible_email("spaces in@example.com"));
        assert!(!is_plausible_email("x@nodot"));
        assert!(!is_plausible_email("@example.com"));
    }

    #[test]
    fn test_phone_shapes() {
        assert!(is_plausible_phone("+1 (555) 010-0100"));
        assert!(is_plausible_phone("5550100"));
        assert!(!is_plausible_phone("12345"));
        assert!(!is_plausible_phone("call me maybe"));
    }
}
