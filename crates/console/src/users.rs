//! Personnel list, CRUD, and card binding.

use std::sync::Arc;

use doorctl_binding::{
    BindRequest, BindingConfig, BindingController, BindingOutcome, SessionId,
};
use doorctl_client::AdminApi;
use doorctl_core::batch::BatchOutcome;
use doorctl_core::error::CoreError;
use doorctl_core::models::{Card, NewUser, Registration, User, UserUpdate};
use doorctl_core::types::EntityId;
use doorctl_core::validation::{
    non_blank, validate_name, validate_optional_email, validate_subject_id,
};

use crate::error::ViewError;
use crate::list::{run_batch, run_batch_with, ListState};
use crate::notice::Notice;

/// The personnel page of one console tab.
///
/// Owns the tab's [`BindingController`]; dropping the view disposes of any
/// binding still in progress.
pub struct UsersView {
    api: AdminApi,
    list: ListState<User>,
    binding: Arc<BindingController<AdminApi>>,
}

impl UsersView {
    pub fn new(api: AdminApi) -> Self {
        Self::with_binding_config(api, BindingConfig::default())
    }

    pub fn with_binding_config(api: AdminApi, config: BindingConfig) -> Self {
        let binding = Arc::new(BindingController::new(Arc::new(api.clone()), config));
        Self {
            api,
            list: ListState::default(),
            binding,
        }
    }

    pub fn list(&self) -> &ListState<User> {
        &self.list
    }

    /// Handle for observing or cancelling the tab's binding session while
    /// this view is borrowed elsewhere.
    pub fn binding(&self) -> Arc<BindingController<AdminApi>> {
        Arc::clone(&self.binding)
    }

    /// A loaded user by id.
    pub fn get(&self, id: &str) -> Result<&User, ViewError> {
        self.list.get(id).ok_or_else(|| {
            CoreError::NotFound {
                entity: "user",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Fetch every user, replacing local rows.
    pub async fn load(&mut self) -> Result<usize, ViewError> {
        let fetched = self.api.list_users().await;
        Ok(self.list.apply("users", fetched)?)
    }

    /// Match on student id, name, e-mail and Telegram id.
    pub fn filter(&self, term: &str) -> Vec<&User> {
        self.list.filter(term)
    }

    pub async fn create(&mut self, user: NewUser) -> Result<Notice, ViewError> {
        validate_subject_id(&user.student_id)?;
        validate_name(&user.name)?;
        validate_optional_email(user.email.as_deref())?;
        let user = NewUser {
            email: non_blank(user.email.as_deref()),
            telegram_id: non_blank(user.telegram_id.as_deref()),
            ..user
        };

        let ack = self.api.create_user(&user).await?;
        tracing::info!(student_id = %user.student_id, "User created");
        self.reload().await;
        Ok(Notice::acknowledged("Add user", &ack, "User added"))
    }

    pub async fn update(&mut self, id: &str, update: UserUpdate) -> Result<Notice, ViewError> {
        validate_subject_id(&update.student_id)?;
        validate_name(&update.name)?;
        validate_optional_email(update.email.as_deref())?;

        let ack = self.api.update_user(id, &update).await?;
        tracing::info!(user_id = %id, "User updated");
        self.reload().await;
        Ok(Notice::acknowledged("Edit user", &ack, "User updated"))
    }

    pub async fn delete(&mut self, id: &str) -> Result<Notice, ViewError> {
        let ack = self.api.delete_user(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        self.reload().await;
        Ok(Notice::acknowledged("Delete user", &ack, "User deleted"))
    }

    /// Enable or disable each selected user in turn.
    ///
    /// The backend requires the full record on update, so ids that are not
    /// among the loaded rows are recorded as failures without a request.
    pub async fn set_active_many(
        &mut self,
        ids: &[EntityId],
        active: bool,
    ) -> Result<BatchOutcome, ViewError> {
        let mut outcome = BatchOutcome::new();
        let mut updates = Vec::with_capacity(ids.len());
        for id in ids {
            match self.list.get(id) {
                Some(user) => {
                    updates.push((id.clone(), UserUpdate::from_user(user).with_active(active)));
                }
                None => outcome.record_failure(id.clone(), "User is not loaded"),
            }
        }

        let api = &self.api;
        let action = if active { "enable users" } else { "disable users" };
        let sent = run_batch_with(action, updates, |id, update| async move {
            api.update_user(&id, &update).await
        })
        .await?;
        outcome.items.extend(sent.items);

        self.reload().await;
        Ok(outcome)
    }

    pub async fn delete_many(&mut self, ids: &[EntityId]) -> Result<BatchOutcome, ViewError> {
        let api = &self.api;
        let outcome = run_batch("delete users", ids, |id| async move {
            api.delete_user(&id).await
        })
        .await?;
        self.reload().await;
        Ok(outcome)
    }

    /// Cards bound to one user.
    pub async fn cards_of(&self, id: &str) -> Result<Vec<Card>, ViewError> {
        Ok(self.api.list_user_cards(id).await?)
    }

    // ---- card binding ----

    /// Start binding another card to a loaded user.
    ///
    /// The user's current card count seeds the completion baseline.
    pub fn start_binding(
        &self,
        student_id: &str,
        card_nickname: Option<&str>,
    ) -> Result<SessionId, ViewError> {
        let mut request = BindRequest::existing(student_id, non_blank(card_nickname));
        if let Some(user) = self.list.items().iter().find(|u| u.student_id == student_id) {
            request = request.with_known_card_count(user.card_count);
        }
        Ok(self.binding.start(request)?)
    }

    /// Register a new person and start binding their first card.
    pub fn start_registration(&self, registration: Registration) -> Result<SessionId, ViewError> {
        validate_name(&registration.name)?;
        validate_optional_email(registration.email.as_deref())?;
        let request = BindRequest::new_subject(
            registration.student_id,
            registration.name,
            non_blank(registration.nickname.as_deref()),
        )
        .with_contact(
            non_blank(registration.email.as_deref()),
            non_blank(registration.telegram_id.as_deref()),
        );
        Ok(self.binding.start(request)?)
    }

    /// Wait for `session` to end, reload after a successful binding, and
    /// return the terminal notice (`None` when cancelled).
    pub async fn finish_binding(&mut self, session: SessionId) -> Result<Option<Notice>, ViewError> {
        let Some(outcome) = self.binding.wait_for_outcome(session).await else {
            return Ok(None);
        };
        let snapshot = self.binding.snapshot();
        if let BindingOutcome::Bound { .. } = outcome {
            self.reload().await;
        }
        Ok(Notice::binding(&outcome, &snapshot))
    }

    /// [`start_binding`](Self::start_binding) followed by
    /// [`finish_binding`](Self::finish_binding).
    pub async fn bind_new_card(
        &mut self,
        student_id: &str,
        card_nickname: Option<&str>,
    ) -> Result<Option<Notice>, ViewError> {
        let session = self.start_binding(student_id, card_nickname)?;
        self.finish_binding(session).await
    }

    /// Close the terminal binding notice.
    pub fn dismiss_binding(&self) -> bool {
        self.binding.dismiss()
    }

    async fn reload(&mut self) {
        let fetched = self.api.list_users().await;
        self.list.reconcile("users", fetched);
    }
}

impl Drop for UsersView {
    fn drop(&mut self) {
        self.binding.dispose();
    }
}
