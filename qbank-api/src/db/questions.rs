//! Question storage
//!
//! A question and its options/correct answer move together in one
//! transaction. Create and update both force `status = 'pending'`: every
//! submission re-enters review, whatever the row held before.

use std::collections::HashMap;

use qbank_common::api::types::QuestionPayload;
use qbank_common::models::{Question, QuestionOption, QuestionStatus, Voice};
use qbank_common::{Error, Result};
use sqlx::SqlitePool;

/// id, subject_id, chapter_id, topic_id, question_text, explanation,
/// image_url, status, correct_key, female_url, male_url
type QuestionRow = (
    i64,
    i64,
    i64,
    Option<i64>,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

const QUESTION_COLUMNS: &str = "q.id, q.subject_id, q.chapter_id, q.topic_id, q.question_text, \
     q.explanation, q.image_url, q.status, ca.correct_key, \
     q.female_explanation_audio_url, q.male_explanation_audio_url";

fn from_row(row: QuestionRow, options: Vec<QuestionOption>) -> Question {
    Question {
        id: row.0,
        subject_id: row.1,
        chapter_id: row.2,
        topic_id: row.3,
        question_text: row.4,
        explanation: row.5,
        image_url: row.6,
        status: QuestionStatus::parse(&row.7).unwrap_or(QuestionStatus::Pending),
        correct_key: row.8,
        female_explanation_audio_url: row.9,
        male_explanation_audio_url: row.10,
        question_options: options,
    }
}

/// Fetch every question with its options, keyed for tree assembly.
pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<Question>> {
    let rows: Vec<QuestionRow> = sqlx::query_as(&format!(
        "SELECT {} FROM questions q \
         LEFT JOIN correct_answers ca ON ca.question_id = q.id \
         ORDER BY q.id",
        QUESTION_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    let mut options = fetch_options(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let opts = options.remove(&row.0).unwrap_or_default();
            from_row(row, opts)
        })
        .collect())
}

/// Fetch one question with its options.
pub async fn fetch_one(pool: &SqlitePool, id: i64) -> Result<Question> {
    let row: Option<QuestionRow> = sqlx::query_as(&format!(
        "SELECT {} FROM questions q \
         LEFT JOIN correct_answers ca ON ca.question_id = q.id \
         WHERE q.id = ?",
        QUESTION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let row = row.ok_or_else(|| Error::NotFound(format!("question {}", id)))?;

    let opts: Vec<(String, String)> = sqlx::query_as(
        "SELECT option_key, content FROM question_options WHERE question_id = ? ORDER BY option_key",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(from_row(
        row,
        opts.into_iter()
            .map(|(option_key, content)| QuestionOption { option_key, content })
            .collect(),
    ))
}

async fn fetch_options(pool: &SqlitePool) -> Result<HashMap<i64, Vec<QuestionOption>>> {
    let rows: Vec<(i64, String, String)> = sqlx::query_as(
        "SELECT question_id, option_key, content FROM question_options \
         ORDER BY question_id, option_key",
    )
    .fetch_all(pool)
    .await?;

    let mut map: HashMap<i64, Vec<QuestionOption>> = HashMap::new();
    for (question_id, option_key, content) in rows {
        map.entry(question_id)
            .or_default()
            .push(QuestionOption { option_key, content });
    }
    Ok(map)
}

/// Keep only options that actually carry content; the admin form submits
/// empty lettered placeholders alongside the filled ones.
fn filled_options(payload: &QuestionPayload) -> Vec<&QuestionOption> {
    payload
        .options
        .iter()
        .filter(|o| !o.content.trim().is_empty())
        .collect()
}

/// Server-side gate mirroring the client validation, plus the referential
/// checks only the store can answer.
async fn validate(pool: &SqlitePool, payload: &QuestionPayload) -> Result<()> {
    if payload.question_text.trim().is_empty() {
        return Err(Error::InvalidInput("Question text is required".to_string()));
    }

    let filled = filled_options(payload);
    if filled.len() < 2 {
        return Err(Error::InvalidInput(
            "A question needs at least 2 options with content".to_string(),
        ));
    }

    if let Some(key) = &payload.correct_key {
        if !filled.iter().any(|o| &o.option_key == key) {
            return Err(Error::InvalidInput(
                "Correct answer must match one of the options".to_string(),
            ));
        }
    }

    if let Some(topic_id) = payload.topic_id {
        let chapter_id: Option<i64> =
            sqlx::query_scalar("SELECT chapter_id FROM topics WHERE id = ?")
                .bind(topic_id)
                .fetch_optional(pool)
                .await?;
        match chapter_id {
            None => {
                return Err(Error::InvalidInput(format!("Unknown topic {}", topic_id)));
            }
            Some(cid) if cid != payload.chapter_id => {
                return Err(Error::InvalidInput(
                    "Topic does not belong to the question's chapter".to_string(),
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

/// Insert a question with its options and correct answer.
pub async fn insert(pool: &SqlitePool, payload: &QuestionPayload) -> Result<i64> {
    validate(pool, payload).await?;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO questions
            (subject_id, chapter_id, topic_id, question_text, explanation, image_url, status)
        VALUES (?, ?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(payload.subject_id)
    .bind(payload.chapter_id)
    .bind(payload.topic_id)
    .bind(&payload.question_text)
    .bind(&payload.explanation)
    .bind(&payload.image_url)
    .execute(&mut *tx)
    .await?;

    let id = result.last_insert_rowid();

    for option in filled_options(payload) {
        sqlx::query("INSERT INTO question_options (question_id, option_key, content) VALUES (?, ?, ?)")
            .bind(id)
            .bind(&option.option_key)
            .bind(&option.content)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(key) = &payload.correct_key {
        sqlx::query("INSERT INTO correct_answers (question_id, correct_key) VALUES (?, ?)")
            .bind(id)
            .bind(key)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(id)
}

/// Full-object replace of the mutable fields. Options and the correct
/// answer are rewritten; status always drops back to `pending`.
pub async fn update(pool: &SqlitePool, id: i64, payload: &QuestionPayload) -> Result<()> {
    validate(pool, payload).await?;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE questions SET
            subject_id = ?, chapter_id = ?, topic_id = ?,
            question_text = ?, explanation = ?, image_url = ?,
            status = 'pending', updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(payload.subject_id)
    .bind(payload.chapter_id)
    .bind(payload.topic_id)
    .bind(&payload.question_text)
    .bind(&payload.explanation)
    .bind(&payload.image_url)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("question {}", id)));
    }

    sqlx::query("DELETE FROM question_options WHERE question_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    for option in filled_options(payload) {
        sqlx::query("INSERT INTO question_options (question_id, option_key, content) VALUES (?, ?, ?)")
            .bind(id)
            .bind(&option.option_key)
            .bind(&option.content)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM correct_answers WHERE question_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if let Some(key) = &payload.correct_key {
        sqlx::query("INSERT INTO correct_answers (question_id, correct_key) VALUES (?, ?)")
            .bind(id)
            .bind(key)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Admin-only review transition.
pub async fn set_status(pool: &SqlitePool, id: i64, status: QuestionStatus) -> Result<()> {
    let result = sqlx::query(
        "UPDATE questions SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(status.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("question {}", id)));
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("question {}", id)));
    }
    Ok(())
}

pub async fn set_explanation(pool: &SqlitePool, id: i64, text: &str) -> Result<()> {
    let result = sqlx::query(
        "UPDATE questions SET explanation = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(text)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("question {}", id)));
    }
    Ok(())
}

pub async fn clear_explanation(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        "UPDATE questions SET explanation = NULL, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("question {}", id)));
    }
    Ok(())
}

fn voice_column(voice: Voice) -> &'static str {
    match voice {
        Voice::Female => "female_explanation_audio_url",
        Voice::Male => "male_explanation_audio_url",
    }
}

pub async fn set_voice_url(pool: &SqlitePool, id: i64, voice: Voice, url: &str) -> Result<()> {
    let sql = format!(
        "UPDATE questions SET {} = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        voice_column(voice)
    );
    let result = sqlx::query(&sql).bind(url).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("question {}", id)));
    }
    Ok(())
}

pub async fn clear_voice_url(pool: &SqlitePool, id: i64, voice: Voice) -> Result<()> {
    let sql = format!(
        "UPDATE questions SET {} = NULL, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        voice_column(voice)
    );
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("question {}", id)));
    }
    Ok(())
}

/// Paginated question listing for the doctor review screen. `page` is
/// 1-indexed and clamped into range.
pub async fn page(
    pool: &SqlitePool,
    page: i64,
    page_size: i64,
) -> Result<(i64, i64, Vec<Question>)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await?;

    let total_pages = (total + page_size - 1) / page_size;
    let page = page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    let rows: Vec<QuestionRow> = sqlx::query_as(&format!(
        "SELECT {} FROM questions q \
         LEFT JOIN correct_answers ca ON ca.question_id = q.id \
         ORDER BY q.id LIMIT ? OFFSET ?",
        QUESTION_COLUMNS
    ))
    .bind(page_size)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let mut options = fetch_options(pool).await?;
    let questions = rows
        .into_iter()
        .map(|row| {
            let opts = options.remove(&row.0).unwrap_or_default();
            from_row(row, opts)
        })
        .collect();

    Ok((total, page, questions))
}
