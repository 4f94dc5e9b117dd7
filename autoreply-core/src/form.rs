//! Form state for configuring an autoresponder on a selected post.
//!
//! The form is an explicit value mutated through [`FormCommand`]s. Every
//! command returns a [`FormEffect`] telling the caller what to do next, which
//! keeps the network steps (identity lookup, then the insert) outside the form
//! while the form alone decides when they may run.

use crate::error::ValidationError;
use crate::error_utils::ErrorExt;
use crate::identity::OwnerId;
use crate::keywords::KeywordSet;
use crate::types::{
    AutoresponderConfig, AutoresponderRecord, NewAutoresponder, SelectedPost,
    DM_MESSAGE_SOFT_LIMIT,
};
use crate::validation::FormValidator;
use tracing::{debug, error, info};

pub mod notices {
    pub const SAVED: &str = "Autoresponder created successfully!";
    pub const SAVE_FAILED: &str = "Failed to create autoresponder. Please try again.";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    ResolvingIdentity,
    Persisting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FormCommand {
    SetName(String),
    SetKeywordInput(String),
    /// Adds the pending keyword input and clears it.
    AddKeyword,
    AddKeywordText(String),
    RemoveKeyword(usize),
    SetMessage(String),
    Submit,
    IdentityResolved(OwnerId),
    PersistSucceeded(AutoresponderRecord),
    PersistFailed(String),
    Back,
    DismissNotice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEffect {
    None,
    Rejected(ValidationError),
    ResolveIdentity,
    Persist(NewAutoresponder),
    Completed(AutoresponderConfig),
    Back,
}

#[derive(Debug, Clone)]
pub struct AutoresponderForm {
    post: SelectedPost,
    name: String,
    keyword_input: String,
    keywords: KeywordSet,
    dm_message: String,
    phase: SubmissionPhase,
    pending: Option<AutoresponderConfig>,
    notice: Option<Notice>,
}

impl AutoresponderForm {
    pub fn new(post: SelectedPost) -> Self {
        Self {
            post,
            name: String::new(),
            keyword_input: String::new(),
            keywords: KeywordSet::new(),
            dm_message: String::new(),
            phase: SubmissionPhase::Idle,
            pending: None,
            notice: None,
        }
    }

    pub fn post(&self) -> &SelectedPost {
        &self.post
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keyword_input(&self) -> &str {
        &self.keyword_input
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn dm_message(&self) -> &str {
        &self.dm_message
    }

    pub fn message_char_count(&self) -> usize {
        self.dm_message.chars().count()
    }

    pub fn is_message_over_limit(&self) -> bool {
        self.message_char_count() > DM_MESSAGE_SOFT_LIMIT
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase != SubmissionPhase::Idle
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn update(&mut self, command: FormCommand) -> FormEffect {
        match command {
            FormCommand::Submit => self.submit(),
            FormCommand::IdentityResolved(owner) => self.identity_resolved(owner),
            FormCommand::PersistSucceeded(record) => self.persist_succeeded(record),
            FormCommand::PersistFailed(reason) => self.persist_failed(&reason),
            FormCommand::Back => FormEffect::Back,
            FormCommand::DismissNotice => {
                self.notice = None;
                FormEffect::None
            }
            edit if self.is_submitting() => {
                debug!("Ignoring {:?} while a submission is in flight", edit);
                FormEffect::None
            }
            FormCommand::SetName(name) => {
                self.name = name;
                FormEffect::None
            }
            FormCommand::SetKeywordInput(input) => {
                self.keyword_input = input;
                FormEffect::None
            }
            FormCommand::AddKeyword => {
                let input = std::mem::take(&mut self.keyword_input);
                self.keywords.add(&input);
                FormEffect::None
            }
            FormCommand::AddKeywordText(raw) => {
                self.keywords.add(&raw);
                FormEffect::None
            }
            FormCommand::RemoveKeyword(index) => {
                self.keywords.remove(index);
                FormEffect::None
            }
            FormCommand::SetMessage(message) => {
                self.dm_message = message;
                FormEffect::None
            }
        }
    }

    fn submit(&mut self) -> FormEffect {
        if self.is_submitting() {
            debug!("Submission already in flight, ignoring submit");
            return FormEffect::None;
        }

        self.phase = SubmissionPhase::Validating;
        if let Err(reason) = FormValidator::validate(&self.name, &self.keywords, &self.dm_message)
        {
            self.notice = Some(Notice::error(reason.user_friendly_message()));
            self.phase = SubmissionPhase::Idle;
            return FormEffect::Rejected(reason);
        }

        self.pending = Some(self.finalize());
        self.notice = None;
        self.phase = SubmissionPhase::ResolvingIdentity;
        info!("Submitting autoresponder for post {}", self.post.id);
        FormEffect::ResolveIdentity
    }

    fn identity_resolved(&mut self, owner: OwnerId) -> FormEffect {
        let row = match (&self.phase, &self.pending) {
            (SubmissionPhase::ResolvingIdentity, Some(config)) => {
                NewAutoresponder::new(owner.to_string(), config)
            }
            _ => {
                debug!("Identity resolved outside of a submission, ignoring");
                return FormEffect::None;
            }
        };

        self.phase = SubmissionPhase::Persisting;
        FormEffect::Persist(row)
    }

    fn persist_succeeded(&mut self, record: AutoresponderRecord) -> FormEffect {
        if self.phase != SubmissionPhase::Persisting {
            debug!("Persist result outside of a submission, ignoring");
            return FormEffect::None;
        }

        self.phase = SubmissionPhase::Idle;
        match self.pending.take() {
            Some(config) => {
                info!("Autoresponder {} saved as row {}", config.name, record.id);
                self.notice = Some(Notice::success(notices::SAVED));
                FormEffect::Completed(config)
            }
            None => FormEffect::None,
        }
    }

    fn persist_failed(&mut self, reason: &str) -> FormEffect {
        if self.phase != SubmissionPhase::Persisting {
            debug!("Persist failure outside of a submission, ignoring");
            return FormEffect::None;
        }

        error!("Failed to save autoresponder: {}", reason);
        self.phase = SubmissionPhase::Idle;
        self.pending = None;
        self.notice = Some(Notice::error(notices::SAVE_FAILED));
        FormEffect::None
    }

    fn finalize(&self) -> AutoresponderConfig {
        AutoresponderConfig {
            name: self.name.trim().to_string(),
            keywords: self.keywords.as_slice().to_vec(),
            dm_message: self.dm_message.trim().to_string(),
            post_id: self.post.id.clone(),
            post_url: self.post.permalink.clone(),
            post_caption: self.post.caption.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post() -> SelectedPost {
        SelectedPost {
            id: "17900001".to_string(),
            permalink: "https://instagram.com/p/abc".to_string(),
            caption: Some("New drop".to_string()),
            thumbnail_url: None,
            media_url: None,
            timestamp: "2024-05-01T10:00:00+0000".to_string(),
            media_type: None,
        }
    }

    fn filled_form() -> AutoresponderForm {
        let mut form = AutoresponderForm::new(post());
        form.update(FormCommand::SetName("  Launch  ".to_string()));
        form.update(FormCommand::AddKeywordText("Lead".to_string()));
        form.update(FormCommand::SetMessage(" Here is the link ".to_string()));
        form
    }

    fn record_for(row: &NewAutoresponder) -> AutoresponderRecord {
        AutoresponderRecord {
            id: "row-1".to_string(),
            user_id: row.user_id.clone(),
            post_id: row.post_id.clone(),
            post_url: row.post_url.clone(),
            post_caption: row.post_caption.clone(),
            name: row.name.clone(),
            keywords: row.keywords.clone(),
            dm_message: row.dm_message.clone(),
            is_active: row.is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_keyword_input_is_cleared_after_add() {
        let mut form = AutoresponderForm::new(post());
        form.update(FormCommand::SetKeywordInput(" Price ".to_string()));
        form.update(FormCommand::AddKeyword);
        assert_eq!(form.keyword_input(), "");
        assert_eq!(form.keywords().as_slice(), ["price"]);
    }

    #[test]
    fn test_full_submission_flow() {
        let mut form = filled_form();

        assert_eq!(form.update(FormCommand::Submit), FormEffect::ResolveIdentity);
        assert_eq!(form.phase(), SubmissionPhase::ResolvingIdentity);

        let row = match form.update(FormCommand::IdentityResolved(OwnerId::Page("42".into()))) {
            FormEffect::Persist(row) => row,
            other => panic!("Expected Persist, got {:?}", other),
        };
        assert_eq!(row.user_id, "page_42");
        assert_eq!(row.name, "Launch");
        assert_eq!(row.dm_message, "Here is the link");
        assert!(row.is_active);
        assert_eq!(form.phase(), SubmissionPhase::Persisting);

        let effect = form.update(FormCommand::PersistSucceeded(record_for(&row)));
        let config = match effect {
            FormEffect::Completed(config) => config,
            other => panic!("Expected Completed, got {:?}", other),
        };
        assert_eq!(config.keywords, vec!["lead".to_string()]);
        assert_eq!(config.post_url, "https://instagram.com/p/abc");
        assert_eq!(config.post_caption.as_deref(), Some("New drop"));
        assert_eq!(form.phase(), SubmissionPhase::Idle);
        assert_eq!(form.notice().map(|n| n.kind), Some(NoticeKind::Success));
    }

    #[test]
    fn test_validation_rejection_returns_to_idle() {
        let mut form = AutoresponderForm::new(post());
        form.update(FormCommand::AddKeywordText("lead".to_string()));

        let effect = form.update(FormCommand::Submit);
        assert_eq!(effect, FormEffect::Rejected(ValidationError::MissingName));
        assert_eq!(form.phase(), SubmissionPhase::Idle);

        let notice = form.notice().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, "Please enter a name for the autoresponder");
    }

    #[test]
    fn test_second_submit_while_in_flight_is_ignored() {
        let mut form = filled_form();
        assert_eq!(form.update(FormCommand::Submit), FormEffect::ResolveIdentity);
        assert_eq!(form.update(FormCommand::Submit), FormEffect::None);

        form.update(FormCommand::IdentityResolved(OwnerId::Anonymous));
        assert_eq!(form.update(FormCommand::Submit), FormEffect::None);
        assert!(form.is_submitting());
    }

    #[test]
    fn test_edits_ignored_while_in_flight() {
        let mut form = filled_form();
        form.update(FormCommand::Submit);
        form.update(FormCommand::SetName("Other".to_string()));
        form.update(FormCommand::RemoveKeyword(0));
        assert_eq!(form.name(), "  Launch  ");
        assert_eq!(form.keywords().len(), 1);
    }

    #[test]
    fn test_persist_failure_keeps_fields() {
        let mut form = filled_form();
        form.update(FormCommand::Submit);
        form.update(FormCommand::IdentityResolved(OwnerId::Anonymous));

        let effect = form.update(FormCommand::PersistFailed("db down".to_string()));
        assert_eq!(effect, FormEffect::None);
        assert_eq!(form.phase(), SubmissionPhase::Idle);
        assert_eq!(form.name(), "  Launch  ");
        assert_eq!(form.keywords().as_slice(), ["lead"]);
        assert_eq!(form.dm_message(), " Here is the link ");
        assert_eq!(
            form.notice().map(|n| n.text.as_str()),
            Some(notices::SAVE_FAILED)
        );

        // Retry is possible right away.
        assert_eq!(form.update(FormCommand::Submit), FormEffect::ResolveIdentity);
    }

    #[test]
    fn test_stray_results_are_ignored() {
        let mut form = filled_form();
        assert_eq!(
            form.update(FormCommand::IdentityResolved(OwnerId::Anonymous)),
            FormEffect::None
        );
        assert_eq!(
            form.update(FormCommand::PersistFailed("late".to_string())),
            FormEffect::None
        );
        assert_eq!(form.phase(), SubmissionPhase::Idle);
    }

    #[test]
    fn test_message_soft_limit() {
        let mut form = AutoresponderForm::new(post());
        form.update(FormCommand::SetMessage("x".repeat(DM_MESSAGE_SOFT_LIMIT)));
        assert!(!form.is_message_over_limit());
        form.update(FormCommand::SetMessage("x".repeat(DM_MESSAGE_SOFT_LIMIT + 1)));
        assert!(form.is_message_over_limit());
        assert_eq!(form.message_char_count(), DM_MESSAGE_SOFT_LIMIT + 1);
    }

    #[test]
    fn test_back() {
        let mut form = filled_form();
        assert_eq!(form.update(FormCommand::Back), FormEffect::Back);
    }
}
