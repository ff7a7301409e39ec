//! Door actuation endpoints.

use doorctl_core::models::{Ack, DoorStatus, LockMode};

use crate::api::{AdminApi, AuthScope};
use crate::error::ApiError;

impl AdminApi {
    /// `POST /admin/door/unlock` -- pulse the lock open.
    pub async fn unlock_door(&self) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["admin", "door", "unlock"])?;
        self.send_ack(self.post(url), AuthScope::Session).await
    }

    /// `GET /admin/door/status`.
    pub async fn door_status(&self) -> Result<DoorStatus, ApiError> {
        let url = self.endpoint(&["admin", "door", "status"])?;
        self.send_json(self.get(url), AuthScope::Session).await
    }

    /// `POST /admin/door/lock-mode` (urlencoded `mode`).
    pub async fn set_lock_mode(&self, mode: LockMode) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["admin", "door", "lock-mode"])?;
        let request = self.post(url).form(&[("mode", mode.as_str())]);
        self.send_ack(request, AuthScope::Session).await
    }
}
