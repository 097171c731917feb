//! Subject/chapter/topic storage and tree assembly
//!
//! The tree endpoint returns the whole hierarchy in one response; clients
//! rebuild their snapshot from it after every mutation instead of patching
//! in place. Assembly runs over four flat queries, grouped in memory.

use std::collections::HashMap;

use qbank_common::api::types::{ChapterNode, ChapterPayload, SubjectNode, SubjectPayload, TopicNode, TopicPayload};
use qbank_common::models::{Chapter, Question, Subject, Topic};
use qbank_common::{Error, Result};
use sqlx::SqlitePool;

use crate::db::questions;

// ============================================================================
// Subjects
// ============================================================================

pub async fn list_subjects(pool: &SqlitePool) -> Result<Vec<Subject>> {
    let rows: Vec<(i64, String, Option<String>)> =
        sqlx::query_as("SELECT id, name, description FROM subjects ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, description)| Subject { id, name, description })
        .collect())
}

pub async fn insert_subject(pool: &SqlitePool, payload: &SubjectPayload) -> Result<i64> {
    let result = sqlx::query("INSERT INTO subjects (name, description) VALUES (?, ?)")
        .bind(&payload.name)
        .bind(&payload.description)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_subject(pool: &SqlitePool, id: i64, payload: &SubjectPayload) -> Result<()> {
    let result = sqlx::query(
        "UPDATE subjects SET name = ?, description = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("subject {}", id)));
    }
    Ok(())
}

/// Cascades at the store level: chapters, topics, questions, options and
/// correct answers under this subject all go with it.
pub async fn delete_subject(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM subjects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("subject {}", id)));
    }
    Ok(())
}

// ============================================================================
// Chapters
// ============================================================================

pub async fn insert_chapter(pool: &SqlitePool, payload: &ChapterPayload) -> Result<i64> {
    let result = sqlx::query("INSERT INTO chapters (subject_id, name, description) VALUES (?, ?, ?)")
        .bind(payload.subject_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .execute(pool)
        .await
        .map_err(reject_missing_parent)?;
    Ok(result.last_insert_rowid())
}

pub async fn update_chapter(pool: &SqlitePool, id: i64, payload: &ChapterPayload) -> Result<()> {
    let result = sqlx::query(
        "UPDATE chapters SET subject_id = ?, name = ?, description = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(payload.subject_id)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(id)
    .execute(pool)
    .await
    .map_err(reject_missing_parent)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("chapter {}", id)));
    }
    Ok(())
}

pub async fn delete_chapter(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM chapters WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("chapter {}", id)));
    }
    Ok(())
}

/// Chapter-scoped view: the chapter row, its topics, and its direct
/// questions (topic_id IS NULL).
pub async fn chapter_detail(
    pool: &SqlitePool,
    chapter_id: i64,
) -> Result<(Chapter, Vec<Topic>, Vec<Question>)> {
    let row: Option<(i64, i64, String, Option<String>)> =
        sqlx::query_as("SELECT id, subject_id, name, description FROM chapters WHERE id = ?")
            .bind(chapter_id)
            .fetch_optional(pool)
            .await?;

    let chapter = row
        .map(|(id, subject_id, name, description)| Chapter { id, subject_id, name, description })
        .ok_or_else(|| Error::NotFound(format!("chapter {}", chapter_id)))?;

    let topics = list_topics_of_chapter(pool, chapter_id).await?;

    let direct_questions = questions::fetch_all(pool)
        .await?
        .into_iter()
        .filter(|q| q.chapter_id == chapter_id && q.topic_id.is_none())
        .collect();

    Ok((chapter, topics, direct_questions))
}

async fn list_topics_of_chapter(pool: &SqlitePool, chapter_id: i64) -> Result<Vec<Topic>> {
    let rows: Vec<(i64, i64, String, Option<String>)> = sqlx::query_as(
        "SELECT id, chapter_id, name, description FROM topics WHERE chapter_id = ? ORDER BY id",
    )
    .bind(chapter_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, chapter_id, name, description)| Topic { id, chapter_id, name, description })
        .collect())
}

// ============================================================================
// Topics
// ============================================================================

pub async fn insert_topic(pool: &SqlitePool, payload: &TopicPayload) -> Result<i64> {
    let result = sqlx::query("INSERT INTO topics (chapter_id, name, description) VALUES (?, ?, ?)")
        .bind(payload.chapter_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .execute(pool)
        .await
        .map_err(reject_missing_parent)?;
    Ok(result.last_insert_rowid())
}

pub async fn update_topic(pool: &SqlitePool, id: i64, payload: &TopicPayload) -> Result<()> {
    let result = sqlx::query(
        "UPDATE topics SET chapter_id = ?, name = ?, description = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(payload.chapter_id)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(id)
    .execute(pool)
    .await
    .map_err(reject_missing_parent)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("topic {}", id)));
    }
    Ok(())
}

pub async fn delete_topic(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM topics WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("topic {}", id)));
    }
    Ok(())
}

/// A foreign-key violation on insert/update means the referenced parent row
/// does not exist; surface that as bad input, not an internal fault.
fn reject_missing_parent(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.message().contains("FOREIGN KEY constraint failed") {
            return Error::InvalidInput("Referenced parent does not exist".to_string());
        }
    }
    Error::Database(err)
}

// ============================================================================
// Tree assembly
// ============================================================================

/// Load the entire hierarchy: subjects, each with nested chapters, each
/// with direct questions and topics, each topic with its questions.
pub async fn load_tree(pool: &SqlitePool) -> Result<Vec<SubjectNode>> {
    let subjects = list_subjects(pool).await?;

    let chapter_rows: Vec<(i64, i64, String, Option<String>)> =
        sqlx::query_as("SELECT id, subject_id, name, description FROM chapters ORDER BY id")
            .fetch_all(pool)
            .await?;

    let topic_rows: Vec<(i64, i64, String, Option<String>)> =
        sqlx::query_as("SELECT id, chapter_id, name, description FROM topics ORDER BY id")
            .fetch_all(pool)
            .await?;

    let all_questions = questions::fetch_all(pool).await?;

    // Group questions by topic, or by chapter for direct questions.
    let mut by_topic: HashMap<i64, Vec<Question>> = HashMap::new();
    let mut direct_by_chapter: HashMap<i64, Vec<Question>> = HashMap::new();
    for question in all_questions {
        match question.topic_id {
            Some(topic_id) => by_topic.entry(topic_id).or_default().push(question),
            None => direct_by_chapter
                .entry(question.chapter_id)
                .or_default()
                .push(question),
        }
    }

    let mut topics_by_chapter: HashMap<i64, Vec<TopicNode>> = HashMap::new();
    for (id, chapter_id, name, description) in topic_rows {
        let node = TopicNode {
            topic: Topic { id, chapter_id, name, description },
            questions: by_topic.remove(&id).unwrap_or_default(),
        };
        topics_by_chapter.entry(chapter_id).or_default().push(node);
    }

    let mut chapters_by_subject: HashMap<i64, Vec<ChapterNode>> = HashMap::new();
    for (id, subject_id, name, description) in chapter_rows {
        let node = ChapterNode {
            chapter: Chapter { id, subject_id, name, description },
            questions: direct_by_chapter.remove(&id).unwrap_or_default(),
            topics: topics_by_chapter.remove(&id).unwrap_or_default(),
        };
        chapters_by_subject.entry(subject_id).or_default().push(node);
    }

    Ok(subjects
        .into_iter()
        .map(|subject| SubjectNode {
            chapters: chapters_by_subject.remove(&subject.id).unwrap_or_default(),
            subject,
        })
        .collect())
}
