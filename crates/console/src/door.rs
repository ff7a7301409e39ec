//! Remote door control.

use doorctl_client::AdminApi;
use doorctl_core::error::CoreError;
use doorctl_core::models::{DoorStatus, LockMode};

use crate::error::ViewError;
use crate::notice::Notice;

pub struct DoorView {
    api: AdminApi,
    status: Option<DoorStatus>,
}

impl DoorView {
    pub fn new(api: AdminApi) -> Self {
        Self { api, status: None }
    }

    /// Last fetched status, if any.
    pub fn status(&self) -> Option<&DoorStatus> {
        self.status.as_ref()
    }

    pub async fn refresh(&mut self) -> Result<&DoorStatus, ViewError> {
        let status = self.api.door_status().await?;
        Ok(&*self.status.insert(status))
    }

    pub async fn unlock(&mut self) -> Result<Notice, ViewError> {
        let ack = self.api.unlock_door().await?;
        tracing::info!("Door unlocked remotely");
        Ok(Notice::acknowledged("Unlock door", &ack, "Door unlocked"))
    }

    pub async fn set_mode(&mut self, mode: LockMode) -> Result<Notice, ViewError> {
        if mode == LockMode::Unknown {
            return Err(CoreError::Validation("Choose normal, unlocked or locked".into()).into());
        }
        let ack = self.api.set_lock_mode(mode).await?;
        tracing::info!(mode = %mode, "Door lock mode changed");
        self.status = None;
        Ok(Notice::acknowledged(
            "Lock mode",
            &ack,
            &format!("Lock mode set to {mode}"),
        ))
    }
}
