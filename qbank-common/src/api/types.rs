//! Wire types for the REST gateway
//!
//! Every response carries the uniform envelope `{success, error?, ...}`.
//! Payload keys sit beside `success` rather than under a wrapper object,
//! so each endpoint gets its own concrete response struct.

use serde::{Deserialize, Serialize};

use crate::models::{
    Addon, Chapter, Doctor, Plan, Question, QuestionOption, QuestionStatus, Subject, Testimonial,
    Topic, User, Voice,
};

/// Bare envelope for endpoints with no payload (deletes, updates).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, error: Some(message.into()) }
    }
}

/// Envelope for creates, returning the new row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Created {
    pub success: bool,
    pub id: i64,
}

// ============================================================================
// Content tree
// ============================================================================

/// One topic with its nested questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicNode {
    #[serde(flatten)]
    pub topic: Topic,
    pub questions: Vec<Question>,
}

/// One chapter with its direct questions and nested topics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterNode {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub questions: Vec<Question>,
    pub topics: Vec<TopicNode>,
}

/// One subject with its nested chapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectNode {
    #[serde(flatten)]
    pub subject: Subject,
    pub chapters: Vec<ChapterNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    pub success: bool,
    pub tree: Vec<SubjectNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectListResponse {
    pub success: bool,
    pub subjects: Vec<Subject>,
}

/// Chapter-scoped view used by the chapter detail page: the chapter, its
/// topics, and its direct questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterDetailResponse {
    pub success: bool,
    pub chapter: Chapter,
    pub topics: Vec<Topic>,
    pub questions: Vec<Question>,
}

// ============================================================================
// Content payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectPayload {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterPayload {
    pub name: String,
    pub description: Option<String>,
    pub subject_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicPayload {
    pub name: String,
    pub description: Option<String>,
    pub chapter_id: i64,
}

/// Full question payload for create and update. `status` is always sent as
/// `pending` by the admin form; the server forces it regardless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub subject_id: i64,
    pub chapter_id: i64,
    pub topic_id: Option<i64>,
    pub question_text: String,
    pub explanation: Option<String>,
    pub image_url: Option<String>,
    pub options: Vec<QuestionOption>,
    pub correct_key: Option<String>,
    pub status: QuestionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: QuestionStatus,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanPayload {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_days: i64,
    pub device_limit: i64,
    pub access_features: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonPayload {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestimonialPayload {
    pub author: String,
    pub role: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanListResponse {
    pub success: bool,
    pub plans: Vec<Plan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonListResponse {
    pub success: bool,
    pub addons: Vec<Addon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestimonialListResponse {
    pub success: bool,
    pub testimonials: Vec<Testimonial>,
}

// ============================================================================
// Accounts
// ============================================================================

/// User create/update payload. `password` is required on create, optional on
/// update (absent means keep the stored hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub role: crate::models::Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorPayload {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorListResponse {
    pub success: bool,
    pub doctors: Vec<Doctor>,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Minimal account view returned alongside the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: crate::models::Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: AccountSummary,
}

// ============================================================================
// Doctor media
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationRequest {
    pub regenerate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationResponse {
    pub success: bool,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceRequest {
    pub voice: Voice,
    pub regenerate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceResponse {
    pub success: bool,
    pub url: String,
}

/// `?voice=male|female` selector for voice deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceQuery {
    pub voice: Voice,
}

/// Paginated question listing for the doctor review screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPageResponse {
    pub success: bool,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub questions: Vec<Question>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_error_is_omitted_on_success() {
        let json = serde_json::to_string(&Ack::ok()).unwrap();
        assert_eq!(json, "{\"success\":true}");
    }

    #[test]
    fn test_envelope_error_round_trip() {
        let json = serde_json::to_string(&Ack::err("duplicate name")).unwrap();
        let ack: Ack = serde_json::from_str(&json).unwrap();
        assert!(!ack.success);
        assert_eq!(ack.error.as_deref(), Some("duplicate name"));
    }

    #[test]
    fn test_tree_node_flattens_entity_fields() {
        let node = SubjectNode {
            subject: Subject {
                id: 3,
                name: "Biology".into(),
                description: None,
            },
            chapters: vec![],
        };
        let value = serde_json::to_value(&node).unwrap();
        // Entity fields sit beside `chapters`, not under a nested key.
        assert_eq!(value["id"], 3);
        assert_eq!(value["name"], "Biology");
        assert!(value["chapters"].as_array().unwrap().is_empty());
    }
}
