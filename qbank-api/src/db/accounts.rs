//! Account storage: users, doctors, and credential lookup for login

use qbank_common::api::auth::{generate_salt, hash_password};
use qbank_common::api::types::{DoctorPayload, UserPayload};
use qbank_common::models::{Doctor, Role, User};
use qbank_common::{Error, Result};
use sqlx::SqlitePool;

/// Stored credential material for one account, whichever table it lives in.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub password_hash: String,
    pub password_salt: String,
}

/// Resolve a login identifier: user email, then user phone, then doctor
/// email. First hit wins.
pub async fn find_credential(pool: &SqlitePool, identifier: &str) -> Result<Option<Credential>> {
    let user: Option<(i64, String, String, Option<String>, String, String, String)> =
        sqlx::query_as(
            "SELECT id, name, email, phone, role, password_hash, password_salt \
             FROM users WHERE email = ? OR phone = ? LIMIT 1",
        )
        .bind(identifier)
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

    if let Some((id, name, email, phone, role, password_hash, password_salt)) = user {
        return Ok(Some(Credential {
            id,
            name,
            email,
            phone,
            role: Role::parse(&role).unwrap_or(Role::User),
            password_hash,
            password_salt,
        }));
    }

    let doctor: Option<(i64, String, String, Option<String>, String, String)> = sqlx::query_as(
        "SELECT id, name, email, phone, password_hash, password_salt \
         FROM doctors WHERE email = ? LIMIT 1",
    )
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(doctor.map(
        |(id, name, email, phone, password_hash, password_salt)| Credential {
            id,
            name,
            email,
            phone,
            role: Role::Doctor,
            password_hash,
            password_salt,
        },
    ))
}

// ============================================================================
// Users
// ============================================================================

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows: Vec<(i64, String, String, Option<String>, String)> =
        sqlx::query_as("SELECT id, name, email, phone, role FROM users ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, email, phone, role)| User {
            id,
            name,
            email,
            phone,
            role: Role::parse(&role).unwrap_or(Role::User),
        })
        .collect())
}

pub async fn insert_user(pool: &SqlitePool, payload: &UserPayload) -> Result<i64> {
    let password = payload
        .password
        .as_deref()
        .ok_or_else(|| Error::InvalidInput("Password is required".to_string()))?;

    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    let result = sqlx::query(
        "INSERT INTO users (name, email, phone, password_hash, password_salt, role) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&hash)
    .bind(&salt)
    .bind(payload.role.as_str())
    .execute(pool)
    .await
    .map_err(reject_duplicate_email)?;

    Ok(result.last_insert_rowid())
}

/// Update user fields; a supplied password is re-hashed with a fresh salt,
/// an absent one keeps the stored hash.
pub async fn update_user(pool: &SqlitePool, id: i64, payload: &UserPayload) -> Result<()> {
    let result = match payload.password.as_deref() {
        Some(password) => {
            let salt = generate_salt();
            let hash = hash_password(password, &salt);
            sqlx::query(
                "UPDATE users SET name = ?, email = ?, phone = ?, role = ?, \
                 password_hash = ?, password_salt = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            )
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(payload.role.as_str())
            .bind(&hash)
            .bind(&salt)
            .bind(id)
            .execute(pool)
            .await
        }
        None => {
            sqlx::query(
                "UPDATE users SET name = ?, email = ?, phone = ?, role = ?, \
                 updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            )
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(payload.role.as_str())
            .bind(id)
            .execute(pool)
            .await
        }
    }
    .map_err(reject_duplicate_email)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("user {}", id)));
    }
    Ok(())
}

pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("user {}", id)));
    }
    Ok(())
}

// ============================================================================
// Doctors
// ============================================================================

pub async fn list_doctors(pool: &SqlitePool) -> Result<Vec<Doctor>> {
    let rows: Vec<(i64, String, String, Option<String>, Option<String>)> =
        sqlx::query_as("SELECT id, name, email, phone, specialty FROM doctors ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, email, phone, specialty)| Doctor { id, name, email, phone, specialty })
        .collect())
}

pub async fn insert_doctor(pool: &SqlitePool, payload: &DoctorPayload) -> Result<i64> {
    let password = payload
        .password
        .as_deref()
        .ok_or_else(|| Error::InvalidInput("Password is required".to_string()))?;

    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    let result = sqlx::query(
        "INSERT INTO doctors (name, email, phone, specialty, password_hash, password_salt) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.specialty)
    .bind(&hash)
    .bind(&salt)
    .execute(pool)
    .await
    .map_err(reject_duplicate_email)?;

    Ok(result.last_insert_rowid())
}

pub async fn update_doctor(pool: &SqlitePool, id: i64, payload: &DoctorPayload) -> Result<()> {
    let result = match payload.password.as_deref() {
        Some(password) => {
            let salt = generate_salt();
            let hash = hash_password(password, &salt);
            sqlx::query(
                "UPDATE doctors SET name = ?, email = ?, phone = ?, specialty = ?, \
                 password_hash = ?, password_salt = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            )
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(&payload.specialty)
            .bind(&hash)
            .bind(&salt)
            .bind(id)
            .execute(pool)
            .await
        }
        None => {
            sqlx::query(
                "UPDATE doctors SET name = ?, email = ?, phone = ?, specialty = ?, \
                 updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            )
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(&payload.specialty)
            .bind(id)
            .execute(pool)
            .await
        }
    }
    .map_err(reject_duplicate_email)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("doctor {}", id)));
    }
    Ok(())
}

pub async fn delete_doctor(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM doctors WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("doctor {}", id)));
    }
    Ok(())
}

fn reject_duplicate_email(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.message().contains("UNIQUE constraint failed") {
            return Error::InvalidInput("Email is already registered".to_string());
        }
    }
    Error::Database(err)
}
