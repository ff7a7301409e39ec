//! Administrator accounts.

use doorctl_client::AdminApi;
use doorctl_core::batch::BatchOutcome;
use doorctl_core::models::{Admin, NewAdmin};
use doorctl_core::types::EntityId;
use doorctl_core::validation::{validate_name, validate_required};

use crate::error::ViewError;
use crate::list::{run_batch, ListState};
use crate::notice::Notice;

pub struct AdminsView {
    api: AdminApi,
    list: ListState<Admin>,
}

impl AdminsView {
    pub fn new(api: AdminApi) -> Self {
        Self {
            api,
            list: ListState::default(),
        }
    }

    pub fn list(&self) -> &ListState<Admin> {
        &self.list
    }

    pub async fn load(&mut self) -> Result<usize, ViewError> {
        let fetched = self.api.list_admins().await;
        Ok(self.list.apply("admins", fetched)?)
    }

    pub fn filter(&self, term: &str) -> Vec<&Admin> {
        self.list.filter(term)
    }

    pub async fn create(&mut self, admin: NewAdmin) -> Result<Notice, ViewError> {
        validate_required("Username", &admin.username)?;
        validate_required("Password", &admin.password)?;
        validate_name(&admin.name)?;

        let ack = self.api.create_admin(&admin).await?;
        tracing::info!(username = %admin.username, "Administrator added");
        self.reload().await;
        Ok(Notice::acknowledged("Add administrator", &ack, "Administrator added"))
    }

    pub async fn delete(&mut self, id: &str) -> Result<Notice, ViewError> {
        let ack = self.api.delete_admin(id).await?;
        tracing::info!(admin_id = %id, "Administrator deleted");
        self.reload().await;
        Ok(Notice::acknowledged("Delete administrator", &ack, "Administrator deleted"))
    }

    pub async fn delete_many(&mut self, ids: &[EntityId]) -> Result<BatchOutcome, ViewError> {
        let api = &self.api;
        let outcome = run_batch("delete admins", ids, |id| async move {
            api.delete_admin(&id).await
        })
        .await?;
        self.reload().await;
        Ok(outcome)
    }

    async fn reload(&mut self) {
        let fetched = self.api.list_admins().await;
        self.list.reconcile("admins", fetched);
    }
}
