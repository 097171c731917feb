//! Catalog storage: plans, add-ons, testimonials

use qbank_common::api::types::{AddonPayload, PlanPayload, TestimonialPayload};
use qbank_common::models::{Addon, Plan, Testimonial};
use qbank_common::{Error, Result};
use sqlx::SqlitePool;

// ============================================================================
// Plans
// ============================================================================

pub async fn list_plans(pool: &SqlitePool) -> Result<Vec<Plan>> {
    let rows: Vec<(i64, String, Option<String>, f64, i64, i64, String)> = sqlx::query_as(
        "SELECT id, name, description, price, duration_days, device_limit, access_features \
         FROM plans ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, description, price, duration_days, device_limit, features)| Plan {
            id,
            name,
            description,
            price,
            duration_days,
            device_limit,
            access_features: serde_json::from_str(&features)
                .unwrap_or_else(|_| serde_json::json!({})),
        })
        .collect())
}

pub async fn insert_plan(pool: &SqlitePool, payload: &PlanPayload) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO plans (name, description, price, duration_days, device_limit, access_features) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.duration_days)
    .bind(payload.device_limit)
    .bind(payload.access_features.to_string())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_plan(pool: &SqlitePool, id: i64, payload: &PlanPayload) -> Result<()> {
    let result = sqlx::query(
        "UPDATE plans SET name = ?, description = ?, price = ?, duration_days = ?, \
         device_limit = ?, access_features = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.duration_days)
    .bind(payload.device_limit)
    .bind(payload.access_features.to_string())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("plan {}", id)));
    }
    Ok(())
}

pub async fn delete_plan(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM plans WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("plan {}", id)));
    }
    Ok(())
}

// ============================================================================
// Add-ons
// ============================================================================

pub async fn list_addons(pool: &SqlitePool) -> Result<Vec<Addon>> {
    let rows: Vec<(i64, String, Option<String>, f64)> =
        sqlx::query_as("SELECT id, name, description, price FROM addons ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, description, price)| Addon { id, name, description, price })
        .collect())
}

pub async fn insert_addon(pool: &SqlitePool, payload: &AddonPayload) -> Result<i64> {
    let result = sqlx::query("INSERT INTO addons (name, description, price) VALUES (?, ?, ?)")
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_addon(pool: &SqlitePool, id: i64, payload: &AddonPayload) -> Result<()> {
    let result = sqlx::query(
        "UPDATE addons SET name = ?, description = ?, price = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("addon {}", id)));
    }
    Ok(())
}

pub async fn delete_addon(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM addons WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("addon {}", id)));
    }
    Ok(())
}

// ============================================================================
// Testimonials
// ============================================================================

pub async fn list_testimonials(pool: &SqlitePool) -> Result<Vec<Testimonial>> {
    let rows: Vec<(i64, String, Option<String>, String)> =
        sqlx::query_as("SELECT id, author, role, message FROM testimonials ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, author, role, message)| Testimonial { id, author, role, message })
        .collect())
}

pub async fn insert_testimonial(pool: &SqlitePool, payload: &TestimonialPayload) -> Result<i64> {
    let result = sqlx::query("INSERT INTO testimonials (author, role, message) VALUES (?, ?, ?)")
        .bind(&payload.author)
        .bind(&payload.role)
        .bind(&payload.message)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_testimonial(
    pool: &SqlitePool,
    id: i64,
    payload: &TestimonialPayload,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE testimonials SET author = ?, role = ?, message = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(&payload.author)
    .bind(&payload.role)
    .bind(&payload.message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("testimonial {}", id)));
    }
    Ok(())
}

pub async fn delete_testimonial(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM testimonials WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("testimonial {}", id)));
    }
    Ok(())
}
