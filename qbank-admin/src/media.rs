//! Explanation/voice asset lifecycle
//!
//! Per question, three independently tracked assets: the explanation text
//! and the two voice recordings. Each asset moves through
//! `absent → generating → present → regenerating|deleting → …` with its
//! own busy flag, so acting on one asset never blocks another asset or
//! another question. A successful generate patches ONLY the targeted
//! field on the local copy — the one place the client patches instead of
//! reloading, so unrelated UI state (expansion, open forms) survives.

use std::collections::{HashMap, HashSet};

use qbank_common::models::{Question, Voice};

use crate::confirm::ConfirmAction;
use crate::forms::DeleteOutcome;
use crate::gateway::{ClientError, Gateway};

/// The three per-question assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Explanation,
    FemaleAudio,
    MaleAudio,
}

impl AssetKind {
    pub fn voice(self) -> Option<Voice> {
        match self {
            AssetKind::Explanation => None,
            AssetKind::FemaleAudio => Some(Voice::Female),
            AssetKind::MaleAudio => Some(Voice::Male),
        }
    }
}

/// What generate returned for the targeted asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// New asset value (text or URL).
    Generated(String),
    /// That asset was already busy; nothing was sent.
    Busy,
}

/// Local working copy of one question's assets.
#[derive(Debug, Clone, Default)]
pub struct QuestionMedia {
    pub explanation: Option<String>,
    pub female_audio_url: Option<String>,
    pub male_audio_url: Option<String>,
}

impl QuestionMedia {
    fn field(&self, kind: AssetKind) -> &Option<String> {
        match kind {
            AssetKind::Explanation => &self.explanation,
            AssetKind::FemaleAudio => &self.female_audio_url,
            AssetKind::MaleAudio => &self.male_audio_url,
        }
    }

    fn field_mut(&mut self, kind: AssetKind) -> &mut Option<String> {
        match kind {
            AssetKind::Explanation => &mut self.explanation,
            AssetKind::FemaleAudio => &mut self.female_audio_url,
            AssetKind::MaleAudio => &mut self.male_audio_url,
        }
    }
}

/// Asset lifecycle controller for the question cards on screen.
#[derive(Debug, Default)]
pub struct MediaController {
    media: HashMap<i64, QuestionMedia>,
    busy: HashSet<(i64, AssetKind)>,
}

impl MediaController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed (or refresh) the local copy from a fetched question.
    pub fn track(&mut self, question: &Question) {
        self.media.insert(
            question.id,
            QuestionMedia {
                explanation: question.explanation.clone(),
                female_audio_url: question.female_explanation_audio_url.clone(),
                male_audio_url: question.male_explanation_audio_url.clone(),
            },
        );
    }

    pub fn media(&self, question_id: i64) -> Option<&QuestionMedia> {
        self.media.get(&question_id)
    }

    pub fn asset(&self, question_id: i64, kind: AssetKind) -> Option<&str> {
        self.media
            .get(&question_id)
            .and_then(|m| m.field(kind).as_deref())
    }

    /// True while this specific asset has a request in flight. The matching
    /// button shows its busy label; everything else stays enabled.
    pub fn is_busy(&self, question_id: i64, kind: AssetKind) -> bool {
        self.busy.contains(&(question_id, kind))
    }

    fn try_begin(&mut self, question_id: i64, kind: AssetKind) -> bool {
        self.busy.insert((question_id, kind))
    }

    fn finish(&mut self, question_id: i64, kind: AssetKind) {
        self.busy.remove(&(question_id, kind));
    }

    /// Generate (or regenerate) one asset. On success the returned value
    /// replaces only the targeted field; every other field of every
    /// question is untouched. On failure the error message surfaces
    /// verbatim and the prior asset state is kept.
    pub async fn generate(
        &mut self,
        gateway: &impl Gateway,
        question_id: i64,
        kind: AssetKind,
        regenerate: bool,
    ) -> Result<GenerateOutcome, ClientError> {
        if !self.try_begin(question_id, kind) {
            return Ok(GenerateOutcome::Busy);
        }

        let result = match kind.voice() {
            None => gateway.generate_explanation(question_id, regenerate).await,
            Some(voice) => gateway.generate_voice(question_id, voice, regenerate).await,
        };

        self.finish(question_id, kind);

        match result {
            Ok(value) => {
                let media = self.media.entry(question_id).or_default();
                *media.field_mut(kind) = Some(value.clone());
                Ok(GenerateOutcome::Generated(value))
            }
            Err(err) => Err(err),
        }
    }

    /// Confirmation-gated delete of one asset. Clears only the targeted
    /// field on success; on failure the asset remains.
    pub async fn delete(
        &mut self,
        gateway: &impl Gateway,
        confirm: &impl ConfirmAction,
        question_id: i64,
        kind: AssetKind,
    ) -> Result<DeleteOutcome, ClientError> {
        let description = match kind {
            AssetKind::Explanation => {
                format!("delete the explanation of question #{}", question_id)
            }
            AssetKind::FemaleAudio => {
                format!("delete the female voice audio of question #{}", question_id)
            }
            AssetKind::MaleAudio => {
                format!("delete the male voice audio of question #{}", question_id)
            }
        };
        if !confirm.confirm(&description) {
            return Ok(DeleteOutcome::Cancelled);
        }

        if !self.try_begin(question_id, kind) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let result = match kind.voice() {
            None => gateway.delete_explanation(question_id).await,
            Some(voice) => gateway.delete_voice(question_id, voice).await,
        };

        self.finish(question_id, kind);

        match result {
            Ok(()) => {
                if let Some(media) = self.media.get_mut(&question_id) {
                    *media.field_mut(kind) = None;
                }
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{AssumeYes, Decline};
    use crate::gateway::testing::RecordingGateway;
    use qbank_common::models::QuestionStatus;

    fn question(id: i64) -> Question {
        Question {
            id,
            subject_id: 1,
            chapter_id: 1,
            topic_id: None,
            question_text: "Q".to_string(),
            explanation: Some("Existing explanation".to_string()),
            image_url: None,
            status: QuestionStatus::Pending,
            correct_key: Some("a".to_string()),
            female_explanation_audio_url: None,
            male_explanation_audio_url: None,
            question_options: vec![],
        }
    }

    #[tokio::test]
    async fn test_generate_patches_only_targeted_field() {
        let gateway = RecordingGateway::new();
        let mut controller = MediaController::new();
        controller.track(&question(7));
        controller.track(&question(8));

        let outcome = controller
            .generate(&gateway, 7, AssetKind::FemaleAudio, false)
            .await
            .unwrap();

        let url = match outcome {
            GenerateOutcome::Generated(url) => url,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert!(url.contains("female"));

        // Question 7: only the female field changed.
        let media = controller.media(7).unwrap();
        assert_eq!(media.female_audio_url.as_deref(), Some(url.as_str()));
        assert!(media.male_audio_url.is_none());
        assert_eq!(media.explanation.as_deref(), Some("Existing explanation"));

        // Question 8 is untouched entirely.
        let other = controller.media(8).unwrap();
        assert!(other.female_audio_url.is_none());
        assert!(other.male_audio_url.is_none());
    }

    #[tokio::test]
    async fn test_generating_both_voices_keeps_assets_independent() {
        let gateway = RecordingGateway::new();
        let mut controller = MediaController::new();
        controller.track(&question(7));

        controller
            .generate(&gateway, 7, AssetKind::FemaleAudio, false)
            .await
            .unwrap();
        controller
            .generate(&gateway, 7, AssetKind::MaleAudio, false)
            .await
            .unwrap();

        let media = controller.media(7).unwrap();
        assert!(media.female_audio_url.as_deref().unwrap().contains("female"));
        assert!(media.male_audio_url.as_deref().unwrap().contains("male"));
        assert_eq!(gateway.count("generate_voice"), 2);
    }

    #[tokio::test]
    async fn test_busy_asset_ignores_second_request() {
        let gateway = RecordingGateway::new();
        let mut controller = MediaController::new();
        controller.track(&question(7));

        // Claim the slot the way an in-flight request would hold it.
        assert!(controller.try_begin(7, AssetKind::Explanation));

        let outcome = controller
            .generate(&gateway, 7, AssetKind::Explanation, true)
            .await
            .unwrap();

        assert_eq!(outcome, GenerateOutcome::Busy);
        assert_eq!(gateway.total_calls(), 0);

        // A different asset of the same question is not blocked.
        assert!(!controller.is_busy(7, AssetKind::MaleAudio));
    }

    #[tokio::test]
    async fn test_failed_generate_keeps_prior_asset() {
        let gateway = RecordingGateway::new();
        gateway.set_fail(true);
        let mut controller = MediaController::new();
        controller.track(&question(7));

        let result = controller
            .generate(&gateway, 7, AssetKind::Explanation, true)
            .await;

        assert!(result.is_err());
        let media = controller.media(7).unwrap();
        assert_eq!(media.explanation.as_deref(), Some("Existing explanation"));
        // The busy flag is released for a manual retry.
        assert!(!controller.is_busy(7, AssetKind::Explanation));
    }

    #[tokio::test]
    async fn test_delete_is_confirmation_gated_and_clears_field() {
        let gateway = RecordingGateway::new();
        let mut controller = MediaController::new();
        controller.track(&question(7));

        let outcome = controller
            .delete(&gateway, &Decline, 7, AssetKind::Explanation)
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(gateway.total_calls(), 0);
        assert!(controller.media(7).unwrap().explanation.is_some());

        let outcome = controller
            .delete(&gateway, &AssumeYes, 7, AssetKind::Explanation)
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(controller.media(7).unwrap().explanation.is_none());
    }
}
