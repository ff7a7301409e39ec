//! Administrator accounts and access logs.

use doorctl_core::models::{AccessLog, Ack, Admin, NewAdmin};
use reqwest::multipart::Form;

use crate::api::{AdminApi, AuthScope};
use crate::error::ApiError;

/// Number of log rows the backend returns when no limit is given.
pub const DEFAULT_LOG_LIMIT: u32 = 50;

impl AdminApi {
    /// `GET /admin/admins`.
    pub async fn list_admins(&self) -> Result<Vec<Admin>, ApiError> {
        let url = self.endpoint(&["admin", "admins"])?;
        self.send_json(self.get(url), AuthScope::Session).await
    }

    /// `POST /admin/admins` (multipart).
    pub async fn create_admin(&self, admin: &NewAdmin) -> Result<Ack, ApiError> {
        let form = Form::new()
            .text("username", admin.username.clone())
            .text("password", admin.password.clone())
            .text("name", admin.name.clone());

        let url = self.endpoint(&["admin", "admins"])?;
        self.send_ack(self.post(url).multipart(form), AuthScope::Session)
            .await
    }

    /// `DELETE /admin/admins/{id}`.
    pub async fn delete_admin(&self, id: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["admin", "admins", id])?;
        self.send_ack(self.delete(url), AuthScope::Session).await
    }

    /// `GET /admin/logs?limit=N`, newest first.
    pub async fn list_logs(&self, limit: Option<u32>) -> Result<Vec<AccessLog>, ApiError> {
        let mut url = self.endpoint(&["admin", "logs"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.unwrap_or(DEFAULT_LOG_LIMIT).to_string());
        self.send_json(self.get(url), AuthScope::Session).await
    }
}
