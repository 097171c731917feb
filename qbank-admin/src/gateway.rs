//! REST gateway client
//!
//! One trait covering every call the controllers make, so tests can swap
//! in a recording implementation, plus the reqwest-backed production
//! client. Responses use the uniform envelope `{success, error?, ...}`;
//! a `success: false` body surfaces its error message verbatim, a
//! transport or parse failure becomes a generic network error.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use qbank_common::api::types::{
    AddonPayload, ChapterPayload, DoctorPayload, LoginResponse, PlanPayload, QuestionPayload,
    StatusPayload, SubjectNode, SubjectPayload, TestimonialPayload, TopicPayload, UserPayload,
};
use qbank_common::models::{QuestionStatus, Voice};

const USER_AGENT: &str = "QBank-Admin/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client-side error taxonomy.
///
/// `Validation` never reaches the network; `Gateway` is a business-rule
/// rejection relayed verbatim; `Network` is transport-level.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Gateway(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Every REST call the client core makes.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_tree(&self) -> Result<Vec<SubjectNode>, ClientError>;

    async fn create_subject(&self, payload: &SubjectPayload) -> Result<i64, ClientError>;
    async fn update_subject(&self, id: i64, payload: &SubjectPayload) -> Result<(), ClientError>;
    async fn delete_subject(&self, id: i64) -> Result<(), ClientError>;

    async fn create_chapter(&self, payload: &ChapterPayload) -> Result<i64, ClientError>;
    async fn update_chapter(&self, id: i64, payload: &ChapterPayload) -> Result<(), ClientError>;
    async fn delete_chapter(&self, id: i64) -> Result<(), ClientError>;

    async fn create_topic(&self, payload: &TopicPayload) -> Result<i64, ClientError>;
    async fn update_topic(&self, id: i64, payload: &TopicPayload) -> Result<(), ClientError>;
    async fn delete_topic(&self, id: i64) -> Result<(), ClientError>;

    async fn create_question(&self, payload: &QuestionPayload) -> Result<i64, ClientError>;
    async fn update_question(&self, id: i64, payload: &QuestionPayload) -> Result<(), ClientError>;
    async fn delete_question(&self, id: i64) -> Result<(), ClientError>;
    async fn set_question_status(&self, id: i64, status: QuestionStatus) -> Result<(), ClientError>;

    async fn create_plan(&self, payload: &PlanPayload) -> Result<i64, ClientError>;
    async fn update_plan(&self, id: i64, payload: &PlanPayload) -> Result<(), ClientError>;
    async fn delete_plan(&self, id: i64) -> Result<(), ClientError>;

    async fn create_addon(&self, payload: &AddonPayload) -> Result<i64, ClientError>;
    async fn update_addon(&self, id: i64, payload: &AddonPayload) -> Result<(), ClientError>;
    async fn delete_addon(&self, id: i64) -> Result<(), ClientError>;

    async fn create_testimonial(&self, payload: &TestimonialPayload) -> Result<i64, ClientError>;
    async fn update_testimonial(
        &self,
        id: i64,
        payload: &TestimonialPayload,
    ) -> Result<(), ClientError>;
    async fn delete_testimonial(&self, id: i64) -> Result<(), ClientError>;

    async fn create_user(&self, payload: &UserPayload) -> Result<i64, ClientError>;
    async fn update_user(&self, id: i64, payload: &UserPayload) -> Result<(), ClientError>;
    async fn delete_user(&self, id: i64) -> Result<(), ClientError>;

    async fn create_doctor(&self, payload: &DoctorPayload) -> Result<i64, ClientError>;
    async fn update_doctor(&self, id: i64, payload: &DoctorPayload) -> Result<(), ClientError>;
    async fn delete_doctor(&self, id: i64) -> Result<(), ClientError>;

    async fn generate_explanation(&self, id: i64, regenerate: bool) -> Result<String, ClientError>;
    async fn delete_explanation(&self, id: i64) -> Result<(), ClientError>;
    async fn generate_voice(
        &self,
        id: i64,
        voice: Voice,
        regenerate: bool,
    ) -> Result<String, ClientError>;
    async fn delete_voice(&self, id: i64, voice: Voice) -> Result<(), ClientError>;

    async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, ClientError>;
}

/// reqwest-backed gateway client.
pub struct HttpGateway {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach the bearer token used on every subsequent call.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        tracing::debug!(%path, "Gateway request");
        let mut builder = self
            .http_client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send, check the envelope, and deserialize the payload type.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if value["success"].as_bool() != Some(true) {
            let message = value["error"]
                .as_str()
                .unwrap_or("Request failed")
                .to_string();
            return Err(ClientError::Gateway(message));
        }

        serde_json::from_value(value).map_err(|e| ClientError::Network(e.to_string()))
    }

    async fn post_created<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<i64, ClientError> {
        let created: qbank_common::api::types::Created = self
            .send(self.request(reqwest::Method::POST, path).json(body))
            .await?;
        Ok(created.id)
    }

    async fn put_ack<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        let _: qbank_common::api::types::Ack = self
            .send(self.request(reqwest::Method::PUT, path).json(body))
            .await?;
        Ok(())
    }

    async fn delete_ack(&self, path: &str) -> Result<(), ClientError> {
        let _: qbank_common::api::types::Ack =
            self.send(self.request(reqwest::Method::DELETE, path)).await?;
        Ok(())
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_tree(&self) -> Result<Vec<SubjectNode>, ClientError> {
        let response: qbank_common::api::types::TreeResponse = self
            .send(self.request(reqwest::Method::GET, "/api/admin/subjects/tree"))
            .await?;
        Ok(response.tree)
    }

    async fn create_subject(&self, payload: &SubjectPayload) -> Result<i64, ClientError> {
        self.post_created("/api/admin/subjects", payload).await
    }

    async fn update_subject(&self, id: i64, payload: &SubjectPayload) -> Result<(), ClientError> {
        self.put_ack(&format!("/api/admin/subjects/{}", id), payload).await
    }

    async fn delete_subject(&self, id: i64) -> Result<(), ClientError> {
        self.delete_ack(&format!("/api/admin/subjects/{}", id)).await
    }

    async fn create_chapter(&self, payload: &ChapterPayload) -> Result<i64, ClientError> {
        self.post_created("/api/admin/chapters", payload).await
    }

    async fn update_chapter(&self, id: i64, payload: &ChapterPayload) -> Result<(), ClientError> {
        self.put_ack(&format!("/api/admin/chapters/{}", id), payload).await
    }

    async fn delete_chapter(&self, id: i64) -> Result<(), ClientError> {
        self.delete_ack(&format!("/api/admin/chapters/{}", id)).await
    }

    async fn create_topic(&self, payload: &TopicPayload) -> Result<i64, ClientError> {
        self.post_created("/api/admin/topics", payload).await
    }

    async fn update_topic(&self, id: i64, payload: &TopicPayload) -> Result<(), ClientError> {
        self.put_ack(&format!("/api/admin/topics/{}", id), payload).await
    }

    async fn delete_topic(&self, id: i64) -> Result<(), ClientError> {
        self.delete_ack(&format!("/api/admin/topics/{}", id)).await
    }

    async fn create_question(&self, payload: &QuestionPayload) -> Result<i64, ClientError> {
        self.post_created("/api/admin/questions", payload).await
    }

    async fn update_question(&self, id: i64, payload: &QuestionPayload) -> Result<(), ClientError> {
        self.put_ack(&format!("/api/admin/questions/{}", id), payload).await
    }

    async fn delete_question(&self, id: i64) -> Result<(), ClientError> {
        self.delete_ack(&format!("/api/admin/questions/{}", id)).await
    }

    async fn set_question_status(
        &self,
        id: i64,
        status: QuestionStatus,
    ) -> Result<(), ClientError> {
        self.put_ack(
            &format!("/api/admin/questions/{}/status", id),
            &StatusPayload { status },
        )
        .await
    }

    async fn create_plan(&self, payload: &PlanPayload) -> Result<i64, ClientError> {
        self.post_created("/api/admin/plans", payload).await
    }

    async fn update_plan(&self, id: i64, payload: &PlanPayload) -> Result<(), ClientError> {
        self.put_ack(&format!("/api/admin/plans/{}", id), payload).await
    }

    async fn delete_plan(&self, id: i64) -> Result<(), ClientError> {
        self.delete_ack(&format!("/api/admin/plans/{}", id)).await
    }

    async fn create_addon(&self, payload: &AddonPayload) -> Result<i64, ClientError> {
        self.post_created("/api/admin/addons", payload).await
    }

    async fn update_addon(&self, id: i64, payload: &AddonPayload) -> Result<(), ClientError> {
        self.put_ack(&format!("/api/admin/addons/{}", id), payload).await
    }

    async fn delete_addon(&self, id: i64) -> Result<(), ClientError> {
        self.delete_ack(&format!("/api/admin/addons/{}", id)).await
    }

    async fn create_testimonial(&self, payload: &TestimonialPayload) -> Result<i64, ClientError> {
        self.post_created("/api/admin/testimonials", payload).await
    }

    async fn update_testimonial(
        &self,
        id: i64,
        payload: &TestimonialPayload,
    ) -> Result<(), ClientError> {
        self.put_ack(&format!("/api/admin/testimonials/{}", id), payload).await
    }

    async fn delete_testimonial(&self, id: i64) -> Result<(), ClientError> {
        self.delete_ack(&format!("/api/admin/testimonials/{}", id)).await
    }

    async fn create_user(&self, payload: &UserPayload) -> Result<i64, ClientError> {
        self.post_created("/api/admin/users", payload).await
    }

    async fn update_user(&self, id: i64, payload: &UserPayload) -> Result<(), ClientError> {
        self.put_ack(&format!("/api/admin/users/{}", id), payload).await
    }

    async fn delete_user(&self, id: i64) -> Result<(), ClientError> {
        self.delete_ack(&format!("/api/admin/users/{}", id)).await
    }

    async fn create_doctor(&self, payload: &DoctorPayload) -> Result<i64, ClientError> {
        self.post_created("/api/admin/doctors", payload).await
    }

    async fn update_doctor(&self, id: i64, payload: &DoctorPayload) -> Result<(), ClientError> {
        self.put_ack(&format!("/api/admin/doctors/{}", id), payload).await
    }

    async fn delete_doctor(&self, id: i64) -> Result<(), ClientError> {
        self.delete_ack(&format!("/api/admin/doctors/{}", id)).await
    }

    async fn generate_explanation(&self, id: i64, regenerate: bool) -> Result<String, ClientError> {
        let response: qbank_common::api::types::ExplanationResponse = self
            .send(
                self.request(
                    reqwest::Method::POST,
                    &format!("/api/doctor/questions/{}/explanation", id),
                )
                .json(&qbank_common::api::types::ExplanationRequest { regenerate }),
            )
            .await?;
        Ok(response.text)
    }

    async fn delete_explanation(&self, id: i64) -> Result<(), ClientError> {
        self.delete_ack(&format!("/api/doctor/questions/{}/explanation", id)).await
    }

    async fn generate_voice(
        &self,
        id: i64,
        voice: Voice,
        regenerate: bool,
    ) -> Result<String, ClientError> {
        let response: qbank_common::api::types::VoiceResponse = self
            .send(
                self.request(
                    reqwest::Method::POST,
                    &format!("/api/doctor/questions/{}/voice", id),
                )
                .json(&qbank_common::api::types::VoiceRequest { voice, regenerate }),
            )
            .await?;
        Ok(response.url)
    }

    async fn delete_voice(&self, id: i64, voice: Voice) -> Result<(), ClientError> {
        self.delete_ack(&format!(
            "/api/doctor/questions/{}/voice?voice={}",
            id,
            voice.as_str()
        ))
        .await
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, ClientError> {
        self.send(
            self.request(reqwest::Method::POST, "/api/v1/auth/login")
                .json(&qbank_common::api::types::LoginRequest {
                    identifier: identifier.to_string(),
                    password: password.to_string(),
                }),
        )
        .await
    }
}

/// Recording gateway for controller tests: logs every call by name,
/// returns canned successes, and can be flipped into failure mode.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;
    use qbank_common::api::types::{AccountSummary, LoginResponse, SubjectNode};
    use qbank_common::models::Role;

    pub struct RecordingGateway {
        calls: Mutex<Vec<&'static str>>,
        fail: Mutex<bool>,
        tree: Mutex<Vec<SubjectNode>>,
    }

    impl RecordingGateway {
        pub fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: Mutex::new(false),
                tree: Mutex::new(Vec::new()),
            }
        }

        pub fn with_tree(tree: Vec<SubjectNode>) -> Self {
            let gateway = Self::new();
            *gateway.tree.lock().unwrap() = tree;
            gateway
        }

        /// Every call fails with a network error while set.
        pub fn set_fail(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        pub fn count(&self, name: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
        }

        pub fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn record(&self, name: &'static str) -> Result<(), ClientError> {
            self.calls.lock().unwrap().push(name);
            if *self.fail.lock().unwrap() {
                return Err(ClientError::Network("connection refused".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Gateway for RecordingGateway {
        async fn fetch_tree(&self) -> Result<Vec<SubjectNode>, ClientError> {
            self.record("fetch_tree")?;
            Ok(self.tree.lock().unwrap().clone())
        }

        async fn create_subject(&self, _payload: &SubjectPayload) -> Result<i64, ClientError> {
            self.record("create_subject")?;
            Ok(1)
        }

        async fn update_subject(
            &self,
            _id: i64,
            _payload: &SubjectPayload,
        ) -> Result<(), ClientError> {
            self.record("update_subject")
        }

        async fn delete_subject(&self, _id: i64) -> Result<(), ClientError> {
            self.record("delete_subject")
        }

        async fn create_chapter(&self, _payload: &ChapterPayload) -> Result<i64, ClientError> {
            self.record("create_chapter")?;
            Ok(1)
        }

        async fn update_chapter(
            &self,
            _id: i64,
            _payload: &ChapterPayload,
        ) -> Result<(), ClientError> {
            self.record("update_chapter")
        }

        async fn delete_chapter(&self, _id: i64) -> Result<(), ClientError> {
            self.record("delete_chapter")
        }

        async fn create_topic(&self, _payload: &TopicPayload) -> Result<i64, ClientError> {
            self.record("create_topic")?;
            Ok(1)
        }

        async fn update_topic(&self, _id: i64, _payload: &TopicPayload) -> Result<(), ClientError> {
            self.record("update_topic")
        }

        async fn delete_topic(&self, _id: i64) -> Result<(), ClientError> {
            self.record("delete_topic")
        }

        async fn create_question(&self, _payload: &QuestionPayload) -> Result<i64, ClientError> {
            self.record("create_question")?;
            Ok(1)
        }

        async fn update_question(
            &self,
            _id: i64,
            _payload: &QuestionPayload,
        ) -> Result<(), ClientError> {
            self.record("update_question")
        }

        async fn delete_question(&self, _id: i64) -> Result<(), ClientError> {
            self.record("delete_question")
        }

        async fn set_question_status(
            &self,
            _id: i64,
            _status: QuestionStatus,
        ) -> Result<(), ClientError> {
            self.record("set_question_status")
        }

        async fn create_plan(&self, _payload: &PlanPayload) -> Result<i64, ClientError> {
            self.record("create_plan")?;
            Ok(1)
        }

        async fn update_plan(&self, _id: i64, _payload: &PlanPayload) -> Result<(), ClientError> {
            self.record("update_plan")
        }

        async fn delete_plan(&self, _id: i64) -> Result<(), ClientError> {
            self.record("delete_plan")
        }

        async fn create_addon(&self, _payload: &AddonPayload) -> Result<i64, ClientError> {
            self.record("create_addon")?;
            Ok(1)
        }

        async fn update_addon(&self, _id: i64, _payload: &AddonPayload) -> Result<(), ClientError> {
            self.record("update_addon")
        }

        async fn delete_addon(&self, _id: i64) -> Result<(), ClientError> {
            self.record("delete_addon")
        }

        async fn create_testimonial(
            &self,
            _payload: &TestimonialPayload,
        ) -> Result<i64, ClientError> {
            self.record("create_testimonial")?;
            Ok(1)
        }

        async fn update_testimonial(
            &self,
            _id: i64,
            _payload: &TestimonialPayload,
        ) -> Result<(), ClientError> {
            self.record("update_testimonial")
        }

        async fn delete_testimonial(&self, _id: i64) -> Result<(), ClientError> {
            self.record("delete_testimonial")
        }

        async fn create_user(&self, _payload: &UserPayload) -> Result<i64, ClientError> {
            self.record("create_user")?;
            Ok(1)
        }

        async fn update_user(&self, _id: i64, _payload: &UserPayload) -> Result<(), ClientError> {
            self.record("update_user")
        }

        async fn delete_user(&self, _id: i64) -> Result<(), ClientError> {
            self.record("delete_user")
        }

        async fn create_doctor(&self, _payload: &DoctorPayload) -> Result<i64, ClientError> {
            self.record("create_doctor")?;
            Ok(1)
        }

        async fn update_doctor(
            &self,
            _id: i64,
            _payload: &DoctorPayload,
        ) -> Result<(), ClientError> {
            self.record("update_doctor")
        }

        async fn delete_doctor(&self, _id: i64) -> Result<(), ClientError> {
            self.record("delete_doctor")
        }

        async fn generate_explanation(
            &self,
            _id: i64,
            _regenerate: bool,
        ) -> Result<String, ClientError> {
            self.record("generate_explanation")?;
            Ok("Generated explanation text.".to_string())
        }

        async fn delete_explanation(&self, _id: i64) -> Result<(), ClientError> {
            self.record("delete_explanation")
        }

        async fn generate_voice(
            &self,
            id: i64,
            voice: Voice,
            _regenerate: bool,
        ) -> Result<String, ClientError> {
            self.record("generate_voice")?;
            Ok(format!("https://cdn.test/audio/{}-{}.mp3", id, voice.as_str()))
        }

        async fn delete_voice(&self, _id: i64, _voice: Voice) -> Result<(), ClientError> {
            self.record("delete_voice")
        }

        async fn login(
            &self,
            identifier: &str,
            _password: &str,
        ) -> Result<LoginResponse, ClientError> {
            self.record("login")?;
            Ok(LoginResponse {
                success: true,
                token: "test-token".to_string(),
                user: AccountSummary {
                    id: 1,
                    name: "Test".to_string(),
                    email: identifier.to_string(),
                    role: Role::Admin,
                },
            })
        }
    }
}
