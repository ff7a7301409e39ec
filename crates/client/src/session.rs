//! Login, logout and session introspection.

use doorctl_core::models::{Ack, CurrentAdmin};
use reqwest::multipart::Form;

use crate::api::{AdminApi, AuthScope};
use crate::error::ApiError;

impl AdminApi {
    /// `POST /login` (multipart). On success the session cookie is stored
    /// and the auth signal is reset.
    ///
    /// A `401` here means bad credentials and is returned as
    /// [`ApiError::Request`] without raising the auth signal.
    pub async fn login(&self, username: &str, password: &str) -> Result<Ack, ApiError> {
        let form = Form::new()
            .text("username", username.to_string())
            .text("password", password.to_string());

        let url = self.endpoint(&["login"])?;
        let ack = self
            .send_ack(self.post(url).multipart(form), AuthScope::LoginStep)
            .await?;

        self.auth_signal().reset();
        tracing::info!(username, "Admin session opened");
        Ok(ack)
    }

    /// `POST /logout`.
    pub async fn logout(&self) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["logout"])?;
        self.send_ack(self.post(url), AuthScope::LoginStep).await
    }

    /// `GET /me`. Returns `None` when there is no valid session.
    pub async fn current_admin(&self) -> Result<Option<CurrentAdmin>, ApiError> {
        let url = self.endpoint(&["me"])?;
        match self.send_json(self.get(url), AuthScope::LoginStep).await {
            Ok(admin) => Ok(Some(admin)),
            Err(ApiError::Request { status: 401, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
