//! Per-entity create/edit form controllers
//!
//! One controller instance backs the single open form of a screen. The
//! lifecycle is `closed → open(create|edit) → submitting → closed` on
//! success, or back to `open` with the entered values intact on failure.
//! Validation is synchronous, reports the first failing rule, and aborts
//! before any network call. While a submission is in flight the
//! controller ignores further submits, so a double click can never issue
//! two requests.

use qbank_common::api::types::{
    AddonPayload, ChapterPayload, DoctorPayload, PlanPayload, QuestionPayload, SubjectPayload,
    TestimonialPayload, TopicPayload, UserPayload,
};
use qbank_common::models::{QuestionOption, QuestionStatus, Role};

use crate::confirm::ConfirmAction;
use crate::gateway::{ClientError, Gateway};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_TESTIMONIAL_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Edit of the row with this id.
    Edit(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The gateway accepted the submission; the form closed.
    Saved,
    /// A submission was already in flight; nothing was sent.
    Busy,
    /// No form is open.
    NotOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation prompt; nothing was sent.
    Cancelled,
}

// ============================================================================
// Entity forms
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SubjectForm {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ChapterForm {
    pub subject_id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct TopicForm {
    pub chapter_id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct QuestionForm {
    pub subject_id: i64,
    pub chapter_id: i64,
    pub topic_id: Option<i64>,
    pub question_text: String,
    pub explanation: String,
    pub image_url: String,
    pub options: Vec<QuestionOption>,
    pub correct_key: Option<String>,
}

impl QuestionForm {
    /// Fresh question under a chapter (or topic): four empty lettered
    /// options, nothing selected.
    pub fn new(subject_id: i64, chapter_id: i64, topic_id: Option<i64>) -> Self {
        Self {
            subject_id,
            chapter_id,
            topic_id,
            question_text: String::new(),
            explanation: String::new(),
            image_url: String::new(),
            options: ["a", "b", "c", "d"]
                .iter()
                .map(|key| QuestionOption {
                    option_key: key.to_string(),
                    content: String::new(),
                })
                .collect(),
            correct_key: None,
        }
    }

    fn filled_options(&self) -> Vec<&QuestionOption> {
        self.options
            .iter()
            .filter(|o| !o.content.trim().is_empty())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PlanForm {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub duration_days: i64,
    pub device_limit: i64,
    pub access_features: serde_json::Value,
}

impl Default for PlanForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: 0.0,
            duration_days: 30,
            device_limit: 1,
            access_features: Self::default_features(),
        }
    }
}

impl PlanForm {
    /// The fixed feature map every new plan starts from.
    pub fn default_features() -> serde_json::Value {
        serde_json::json!({
            "question_bank": true,
            "explanations": true,
            "audio_explanations": false,
            "mock_exams": false,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddonForm {
    pub name: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TestimonialForm {
    pub author: String,
    pub role: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            password: String::new(),
            role: Role::User,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DoctorForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub password: String,
}

/// The one open form of a screen, tagged by entity kind.
#[derive(Debug, Clone)]
pub enum EntityForm {
    Subject(SubjectForm),
    Chapter(ChapterForm),
    Topic(TopicForm),
    Question(QuestionForm),
    Plan(PlanForm),
    Addon(AddonForm),
    Testimonial(TestimonialForm),
    User(UserForm),
    Doctor(DoctorForm),
}

// ============================================================================
// Validation
// ============================================================================

fn require(condition: bool, rule: &str) -> Result<(), ClientError> {
    if condition {
        Ok(())
    } else {
        Err(ClientError::Validation(rule.to_string()))
    }
}

fn opt(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// local-part@domain.tld with no whitespace.
fn is_plausible_email(email: &str) -> bool {
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
fn is_plausible_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

fn validate_account(
    name: &str,
    email: &str,
    phone: &str,
    password: &str,
    mode: FormMode,
) -> Result<(), ClientError> {
    require(!name.trim().is_empty(), "Name is required")?;
    require(is_plausible_email(email), "Invalid email address")?;
    if !phone.trim().is_empty() {
        require(is_plausible_phone(phone), "Invalid phone number")?;
    }
    match mode {
        FormMode::Create => require(
            password.len() >= MIN_PASSWORD_LEN,
            "Password must be at least 6 characters",
        )?,
        FormMode::Edit(_) => {
            if !password.is_empty() {
                require(
                    password.len() >= MIN_PASSWORD_LEN,
                    "Password must be at least 6 characters",
                )?;
            }
        }
    }
    Ok(())
}

impl EntityForm {
    /// First failing rule, or Ok. Runs before any network call.
    pub fn validate(&self, mode: FormMode) -> Result<(), ClientError> {
        match self {
            EntityForm::Subject(form) => require(!form.name.trim().is_empty(), "Name is required"),
            EntityForm::Chapter(form) => require(!form.name.trim().is_empty(), "Name is required"),
            EntityForm::Topic(form) => require(!form.name.trim().is_empty(), "Name is required"),
            EntityForm::Question(form) => {
                require(
                    !form.question_text.trim().is_empty(),
                    "Question text is required",
                )?;
                let filled = form.filled_options();
                require(
                    filled.len() >= 2,
                    "A question needs at least 2 options with content",
                )?;
                if let Some(key) = &form.correct_key {
                    require(
                        filled.iter().any(|o| &o.option_key == key),
                        "Correct answer must match one of the options",
                    )?;
                }
                Ok(())
            }
            EntityForm::Plan(form) => {
                require(!form.name.trim().is_empty(), "Name is required")?;
                require(form.price >= 0.0, "Price must not be negative")?;
                require(
                    form.duration_days > 0,
                    "Duration must be a positive number of days",
                )?;
                require(form.device_limit > 0, "Device limit must be positive")
            }
            EntityForm::Addon(form) => {
                require(!form.name.trim().is_empty(), "Name is required")?;
                require(form.price >= 0.0, "Price must not be negative")
            }
            EntityForm::Testimonial(form) => {
                require(!form.author.trim().is_empty(), "Author is required")?;
                require(
                    form.message.trim().len() >= MIN_TESTIMONIAL_LEN,
                    "Message must be at least 10 characters",
                )
            }
            EntityForm::User(form) => {
                validate_account(&form.name, &form.email, &form.phone, &form.password, mode)
            }
            EntityForm::Doctor(form) => {
                validate_account(&form.name, &form.email, &form.phone, &form.password, mode)
            }
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

#[derive(Debug, Clone)]
enum FormState {
    Closed,
    Open { mode: FormMode, form: EntityForm },
    Submitting { mode: FormMode, form: EntityForm },
}

/// Form lifecycle controller. One per screen.
#[derive(Debug)]
pub struct FormController {
    state: FormState,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self { state: FormState::Closed }
    }

    /// Open a create form, replacing whatever was open before.
    pub fn open_create(&mut self, form: EntityForm) {
        self.state = FormState::Open { mode: FormMode::Create, form };
    }

    /// Open an edit form seeded from the existing entity's fields.
    pub fn open_edit(&mut self, id: i64, form: EntityForm) {
        self.state = FormState::Open { mode: FormMode::Edit(id), form };
    }

    pub fn close(&mut self) {
        self.state = FormState::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, FormState::Closed)
    }

    /// True while a request is in flight; the submit button is disabled.
    pub fn is_submitting(&self) -> bool {
        matches!(self.state, FormState::Submitting { .. })
    }

    /// The current form fields, for rendering.
    pub fn form(&self) -> Option<&EntityForm> {
        match &self.state {
            FormState::Closed => None,
            FormState::Open { form, .. } | FormState::Submitting { form, .. } => Some(form),
        }
    }

    /// Validate and claim the in-flight slot. `Ok(None)` means there is
    /// nothing to send: either no form is open, or one is already
    /// submitting (the double-submit no-op).
    fn begin_submit(&mut self) -> Result<Option<(FormMode, EntityForm)>, ClientError> {
        match &self.state {
            FormState::Closed | FormState::Submitting { .. } => Ok(None),
            FormState::Open { mode, form } => {
                form.validate(*mode)?;
                let claimed = (*mode, form.clone());
                self.state = FormState::Submitting { mode: claimed.0, form: claimed.1.clone() };
                Ok(Some(claimed))
            }
        }
    }

    /// Submit the open form: exactly one POST (create) or PUT (edit).
    ///
    /// Validation failure aborts with no network call and the form stays
    /// open. Gateway rejection reopens the form with values intact and
    /// returns the error for display. Success closes the form; the caller
    /// then triggers the tree/list reload.
    pub async fn submit(&mut self, gateway: &impl Gateway) -> Result<SubmitOutcome, ClientError> {
        let (mode, form) = match self.begin_submit()? {
            Some(claimed) => claimed,
            None if self.is_submitting() => return Ok(SubmitOutcome::Busy),
            None => return Ok(SubmitOutcome::NotOpen),
        };

        match dispatch(gateway, mode, &form).await {
            Ok(()) => {
                self.state = FormState::Closed;
                Ok(SubmitOutcome::Saved)
            }
            Err(err) => {
                // No data loss: reopen with the entered values.
                self.state = FormState::Open { mode, form };
                Err(err)
            }
        }
    }
}

/// Route the claimed form to the matching gateway call.
async fn dispatch(
    gateway: &impl Gateway,
    mode: FormMode,
    form: &EntityForm,
) -> Result<(), ClientError> {
    match (form, mode) {
        (EntityForm::Subject(f), mode) => {
            let payload = SubjectPayload { name: f.name.trim().to_string(), description: opt(&f.description) };
            match mode {
                FormMode::Create => gateway.create_subject(&payload).await.map(|_| ()),
                FormMode::Edit(id) => gateway.update_subject(id, &payload).await,
            }
        }
        (EntityForm::Chapter(f), mode) => {
            let payload = ChapterPayload {
                name: f.name.trim().to_string(),
                description: opt(&f.description),
                subject_id: f.subject_id,
            };
            match mode {
                FormMode::Create => gateway.create_chapter(&payload).await.map(|_| ()),
                FormMode::Edit(id) => gateway.update_chapter(id, &payload).await,
            }
        }
        (EntityForm::Topic(f), mode) => {
            let payload = TopicPayload {
                name: f.name.trim().to_string(),
                description: opt(&f.description),
                chapter_id: f.chapter_id,
            };
            match mode {
                FormMode::Create => gateway.create_topic(&payload).await.map(|_| ()),
                FormMode::Edit(id) => gateway.update_topic(id, &payload).await,
            }
        }
        (EntityForm::Question(f), mode) => {
            // Status is pending on every submission, create or edit.
            let payload = QuestionPayload {
                subject_id: f.subject_id,
                chapter_id: f.chapter_id,
                topic_id: f.topic_id,
                question_text: f.question_text.trim().to_string(),
                explanation: opt(&f.explanation),
                image_url: opt(&f.image_url),
                options: f.options.clone(),
                correct_key: f.correct_key.clone(),
                status: QuestionStatus::Pending,
            };
            match mode {
                FormMode::Create => gateway.create_question(&payload).await.map(|_| ()),
                FormMode::Edit(id) => gateway.update_question(id, &payload).await,
            }
        }
        (EntityForm::Plan(f), mode) => {
            let payload = PlanPayload {
                name: f.name.trim().to_string(),
                description: opt(&f.description),
                price: f.price,
                duration_days: f.duration_days,
                device_limit: f.device_limit,
                access_features: f.access_features.clone(),
            };
            match mode {
                FormMode::Create => gateway.create_plan(&payload).await.map(|_| ()),
                FormMode::Edit(id) => gateway.update_plan(id, &payload).await,
            }
        }
        (EntityForm::Addon(f), mode) => {
            let payload = AddonPayload {
                name: f.name.trim().to_string(),
                description: opt(&f.description),
                price: f.price,
            };
            match mode {
                FormMode::Create => gateway.create_addon(&payload).await.map(|_| ()),
                FormMode::Edit(id) => gateway.update_addon(id, &payload).await,
            }
        }
        (EntityForm::Testimonial(f), mode) => {
            let payload = TestimonialPayload {
                author: f.author.trim().to_string(),
                role: opt(&f.role),
                message: f.message.trim().to_string(),
            };
            match mode {
                FormMode::Create => gateway.create_testimonial(&payload).await.map(|_| ()),
                FormMode::Edit(id) => gateway.update_testimonial(id, &payload).await,
            }
        }
        (EntityForm::User(f), mode) => {
            let payload = UserPayload {
                name: f.name.trim().to_string(),
                email: f.email.trim().to_string(),
                phone: opt(&f.phone),
                password: opt(&f.password),
                role: f.role,
            };
            match mode {
                FormMode::Create => gateway.create_user(&payload).await.map(|_| ()),
                FormMode::Edit(id) => gateway.update_user(id, &payload).await,
            }
        }
        (EntityForm::Doctor(f), mode) => {
            let payload = DoctorPayload {
                name: f.name.trim().to_string(),
                email: f.email.trim().to_string(),
                phone: opt(&f.phone),
                specialty: opt(&f.specialty),
                password: opt(&f.password),
            };
            match mode {
                FormMode::Create => gateway.create_doctor(&payload).await.map(|_| ()),
                FormMode::Edit(id) => gateway.update_doctor(id, &payload).await,
            }
        }
    }
}

// ============================================================================
// Deletion
// ============================================================================

/// What a confirmed delete targets.
#[derive(Debug, Clone)]
pub enum DeleteTarget {
    Subject { id: i64, name: String },
    Chapter { id: i64, name: String },
    Topic { id: i64, name: String },
    Question { id: i64 },
    Plan { id: i64, name: String },
    Addon { id: i64, name: String },
    Testimonial { id: i64, author: String },
    User { id: i64, name: String },
    Doctor { id: i64, name: String },
}

impl DeleteTarget {
    /// Human description for the confirmation prompt, naming the entity.
    pub fn describe(&self) -> String {
        match self {
            DeleteTarget::Subject { name, .. } => {
                format!("delete subject \"{}\" and everything under it", name)
            }
            DeleteTarget::Chapter { name, .. } => {
                format!("delete chapter \"{}\" and everything under it", name)
            }
            DeleteTarget::Topic { name, .. } => {
                format!("delete topic \"{}\" and its questions", name)
            }
            DeleteTarget::Question { id } => format!("delete question #{}", id),
            DeleteTarget::Plan { name, .. } => format!("delete plan \"{}\"", name),
            DeleteTarget::Addon { name, .. } => format!("delete add-on \"{}\"", name),
            DeleteTarget::Testimonial { author, .. } => {
                format!("delete the testimonial by \"{}\"", author)
            }
            DeleteTarget::User { name, .. } => format!("delete user \"{}\"", name),
            DeleteTarget::Doctor { name, .. } => format!("delete doctor \"{}\"", name),
        }
    }
}

/// Confirmation-gated delete. Declining sends nothing; parent deletes rely
/// on the store cascade, and the caller reloads the tree afterwards.
pub async fn delete(
    gateway: &impl Gateway,
    confirm: &impl ConfirmAction,
    target: DeleteTarget,
) -> Result<DeleteOutcome, ClientError> {
    if !confirm.confirm(&target.describe()) {
        return Ok(DeleteOutcome::Cancelled);
    }

    match &target {
        DeleteTarget::Subject { id, .. } => gateway.delete_subject(*id).await?,
        DeleteTarget::Chapter { id, .. } => gateway.delete_chapter(*id).await?,
        DeleteTarget::Topic { id, .. } => gateway.delete_topic(*id).await?,
        DeleteTarget::Question { id } => gateway.delete_question(*id).await?,
        DeleteTarget::Plan { id, .. } => gateway.delete_plan(*id).await?,
        DeleteTarget::Addon { id, .. } => gateway.delete_addon(*id).await?,
        DeleteTarget::Testimonial { id, .. } => gateway.delete_testimonial(*id).await?,
        DeleteTarget::User { id, .. } => gateway.delete_user(*id).await?,
        DeleteTarget::Doctor { id, .. } => gateway.delete_doctor(*id).await?,
    }

    Ok(DeleteOutcome::Deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{AssumeYes, Decline};
    use crate::gateway::testing::RecordingGateway;

    fn filled_question_form() -> QuestionForm {
        let mut form = QuestionForm::new(1, 2, None);
        form.question_text = "What is the powerhouse of the cell?".to_string();
        form.options[0].content = "Mitochondria".to_string();
        form.options[1].content = "Nucleus".to_string();
        form.correct_key = Some("a".to_string());
        form
    }

    #[test]
    fn test_new_question_defaults_to_four_lettered_options() {
        let form = QuestionForm::new(1, 2, None);
        let keys: Vec<&str> = form.options.iter().map(|o| o.option_key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "c", "d"]);
        assert!(form.options.iter().all(|o| o.content.is_empty()));
        assert!(form.correct_key.is_none());
    }

    #[test]
    fn test_plan_defaults_carry_feature_map() {
        let form = PlanForm::default();
        assert_eq!(form.access_features, PlanForm::default_features());
        assert_eq!(form.access_features["question_bank"], true);
    }

    #[tokio::test]
    async fn test_question_with_too_few_options_never_reaches_network() {
        let gateway = RecordingGateway::new();
        let mut controller = FormController::new();

        let mut form = QuestionForm::new(1, 2, None);
        form.question_text = "Lonely question?".to_string();
        form.options[0].content = "Only option".to_string();
        controller.open_create(EntityForm::Question(form));

        let result = controller.submit(&gateway).await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert_eq!(gateway.total_calls(), 0);
        // The form stays open with its values for correction.
        assert!(controller.is_open());
        assert!(!controller.is_submitting());
    }

    #[tokio::test]
    async fn test_correct_key_must_match_a_filled_option() {
        let gateway = RecordingGateway::new();
        let mut controller = FormController::new();

        let mut form = filled_question_form();
        form.correct_key = Some("d".to_string()); // option d has no content
        controller.open_create(EntityForm::Question(form));

        let result = controller.submit(&gateway).await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_submits_once_and_closes() {
        let gateway = RecordingGateway::new();
        let mut controller = FormController::new();
        controller.open_create(EntityForm::Question(filled_question_form()));

        let outcome = controller.submit(&gateway).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Saved);
        assert_eq!(gateway.count("create_question"), 1);
        assert!(!controller.is_open());
    }

    #[tokio::test]
    async fn test_edit_issues_put_not_post() {
        let gateway = RecordingGateway::new();
        let mut controller = FormController::new();
        controller.open_edit(42, EntityForm::Question(filled_question_form()));

        controller.submit(&gateway).await.unwrap();

        assert_eq!(gateway.count("update_question"), 1);
        assert_eq!(gateway.count("create_question"), 0);
    }

    #[tokio::test]
    async fn test_double_submit_is_a_no_op() {
        let gateway = RecordingGateway::new();
        let mut controller = FormController::new();
        controller.open_create(EntityForm::Subject(SubjectForm {
            name: "Biology".to_string(),
            description: String::new(),
        }));

        // First submit claims the in-flight slot.
        let first = controller.begin_submit().unwrap();
        assert!(first.is_some());
        assert!(controller.is_submitting());

        // A second submit while in flight sends nothing.
        let second = controller.begin_submit().unwrap();
        assert!(second.is_none());

        // Drive only the claimed submission to completion.
        let (mode, form) = first.unwrap();
        dispatch(&gateway, mode, &form).await.unwrap();
        assert_eq!(gateway.count("create_subject"), 1);
    }

    #[tokio::test]
    async fn test_gateway_rejection_keeps_form_values() {
        let gateway = RecordingGateway::new();
        gateway.set_fail(true);
        let mut controller = FormController::new();
        controller.open_create(EntityForm::Subject(SubjectForm {
            name: "Biology".to_string(),
            description: String::new(),
        }));

        let result = controller.submit(&gateway).await;

        assert!(result.is_err());
        assert!(controller.is_open());
        assert!(!controller.is_submitting());
        match controller.form() {
            Some(EntityForm::Subject(form)) => assert_eq!(form.name, "Biology"),
            other => panic!("unexpected form state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_user_password_required_on_create_only() {
        let form = UserForm {
            name: "Pat".to_string(),
            email: "pat@example.com".to_string(),
            phone: String::new(),
            password: String::new(),
            role: Role::User,
        };

        let create = EntityForm::User(form.clone()).validate(FormMode::Create);
        assert!(matches!(create, Err(ClientError::Validation(_))));

        let edit = EntityForm::User(form).validate(FormMode::Edit(5));
        assert!(edit.is_ok());
    }

    #[tokio::test]
    async fn test_testimonial_message_minimum_length() {
        let form = EntityForm::Testimonial(TestimonialForm {
            author: "A. Student".to_string(),
            role: String::new(),
            message: "Too short".to_string(),
        });
        assert!(matches!(form.validate(FormMode::Create), Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let gateway = RecordingGateway::new();

        let outcome = delete(
            &gateway,
            &Decline,
            DeleteTarget::Subject { id: 1, name: "Biology".to_string() },
        )
        .await
        .unwrap();

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(gateway.total_calls(), 0);

        let outcome = delete(
            &gateway,
            &AssumeYes,
            DeleteTarget::Subject { id: 1, name: "Biology".to_string() },
        )
        .await
        .unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(gateway.count("delete_subject"), 1);
    }
}
