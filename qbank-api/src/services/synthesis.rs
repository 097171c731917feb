//! Speech and explanation synthesis clients
//!
//! Both backends sit behind traits so the handlers (and tests) never care
//! which engine answers. The HTTP clients talk to the configured synthesis
//! services and surface their error messages verbatim; the gateway relays
//! them to the caller unchanged.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use qbank_common::models::{QuestionOption, Voice};

const USER_AGENT: &str = "QBank/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Synthesis client errors
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Synthesis service error {0}: {1}")]
    Service(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Voice audio generation for a question's explanation text.
#[async_trait]
pub trait SpeechSynth: Send + Sync {
    /// Render `text` in the given voice, returning the URL of the stored
    /// audio asset.
    async fn synthesize(
        &self,
        question_id: i64,
        voice: Voice,
        text: &str,
    ) -> Result<String, SynthesisError>;
}

/// Explanation text generation for a question.
#[async_trait]
pub trait ExplanationSynth: Send + Sync {
    async fn explain(
        &self,
        question_text: &str,
        options: &[QuestionOption],
        correct_key: Option<&str>,
    ) -> Result<String, SynthesisError>;
}

/// HTTP speech synthesis client
pub struct HttpSpeechClient {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SpeechReply {
    url: String,
}

impl HttpSpeechClient {
    pub fn new(base_url: &str) -> Result<Self, SynthesisError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl SpeechSynth for HttpSpeechClient {
    async fn synthesize(
        &self,
        question_id: i64,
        voice: Voice,
        text: &str,
    ) -> Result<String, SynthesisError> {
        tracing::debug!(question_id, voice = voice.as_str(), "Requesting voice synthesis");

        let response = self
            .http_client
            .post(&self.base_url)
            .json(&serde_json::json!({
                "question_id": question_id,
                "voice": voice.as_str(),
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Service(status.as_u16(), body));
        }

        let reply: SpeechReply = response
            .json()
            .await
            .map_err(|e| SynthesisError::Parse(e.to_string()))?;

        Ok(reply.url)
    }
}

/// HTTP explanation synthesis client
pub struct HttpExplanationClient {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ExplanationReply {
    text: String,
}

impl HttpExplanationClient {
    pub fn new(base_url: &str) -> Result<Self, SynthesisError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl ExplanationSynth for HttpExplanationClient {
    async fn explain(
        &self,
        question_text: &str,
        options: &[QuestionOption],
        correct_key: Option<&str>,
    ) -> Result<String, SynthesisError> {
        let response = self
            .http_client
            .post(&self.base_url)
            .json(&serde_json::json!({
                "question": question_text,
                "options": options,
                "correct_key": correct_key,
            }))
            .send()
            .await
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Service(status.as_u16(), body));
        }

        let reply: ExplanationReply = response
            .json()
            .await
            .map_err(|e| SynthesisError::Parse(e.to_string()))?;

        Ok(reply.text)
    }
}
