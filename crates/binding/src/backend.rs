//! The REST calls a binding session depends on.

use async_trait::async_trait;
use doorctl_client::{AdminApi, ApiError};
use doorctl_core::models::{BindingStatus, Registration};

/// Who the card is being bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindTarget {
    /// A person already on the roster (`POST /mode/register`).
    ExistingSubject,
    /// Register a new person and bind their first card (`POST /register`).
    NewSubject {
        name: String,
        email: Option<String>,
        telegram_id: Option<String>,
    },
}

/// Parameters of one binding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub subject_id: String,
    pub card_nickname: Option<String>,
    pub target: BindTarget,
    /// The subject's card count as the caller last saw it. Used as the
    /// completion baseline when the backend does not report one.
    pub known_card_count: Option<u32>,
}

impl BindRequest {
    /// Bind another card to an existing subject.
    pub fn existing(subject_id: impl Into<String>, card_nickname: Option<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            card_nickname,
            target: BindTarget::ExistingSubject,
            known_card_count: None,
        }
    }

    /// Register a new subject together with their first card.
    pub fn new_subject(
        subject_id: impl Into<String>,
        name: impl Into<String>,
        card_nickname: Option<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            card_nickname,
            target: BindTarget::NewSubject {
                name: name.into(),
                email: None,
                telegram_id: None,
            },
            known_card_count: Some(0),
        }
    }

    pub fn with_known_card_count(mut self, count: u32) -> Self {
        self.known_card_count = Some(count);
        self
    }

    pub fn with_contact(mut self, email: Option<String>, telegram_id: Option<String>) -> Self {
        if let BindTarget::NewSubject {
            email: e,
            telegram_id: t,
            ..
        } = &mut self.target
        {
            *e = email;
            *t = telegram_id;
        }
        self
    }
}

/// Backend operations used by [`BindingController`](crate::BindingController).
///
/// Implemented for [`AdminApi`]; tests substitute scripted backends.
#[async_trait]
pub trait BindingBackend: Send + Sync + 'static {
    /// Open the backend's "awaiting scan" window. Returns the backend's
    /// acknowledgement message, if any.
    async fn initiate(&self, request: &BindRequest) -> Result<Option<String>, ApiError>;

    /// Fetch the current binding progress for a subject.
    async fn check_status(&self, subject_id: &str) -> Result<BindingStatus, ApiError>;
}

#[async_trait]
impl BindingBackend for AdminApi {
    async fn initiate(&self, request: &BindRequest) -> Result<Option<String>, ApiError> {
        let ack = match &request.target {
            BindTarget::ExistingSubject => {
                self.start_card_binding(&request.subject_id, request.card_nickname.as_deref())
                    .await?
            }
            BindTarget::NewSubject {
                name,
                email,
                telegram_id,
            } => {
                let registration = Registration {
                    student_id: request.subject_id.clone(),
                    name: name.clone(),
                    email: email.clone(),
                    telegram_id: telegram_id.clone(),
                    nickname: request.card_nickname.clone(),
                };
                self.register_subject(&registration).await?
            }
        };
        Ok(ack.message)
    }

    async fn check_status(&self, subject_id: &str) -> Result<BindingStatus, ApiError> {
        AdminApi::check_status(self, subject_id).await
    }
}
