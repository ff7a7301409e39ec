//! Login step.

use doorctl_client::AdminApi;
use doorctl_core::models::CurrentAdmin;
use doorctl_core::validation::validate_required;

use crate::error::ViewError;
use crate::notice::Notice;

pub struct SessionView {
    api: AdminApi,
    current: Option<CurrentAdmin>,
}

impl SessionView {
    pub fn new(api: AdminApi) -> Self {
        Self { api, current: None }
    }

    pub fn current(&self) -> Option<&CurrentAdmin> {
        self.current.as_ref()
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<Notice, ViewError> {
        validate_required("Username", username)?;
        validate_required("Password", password)?;

        let ack = self.api.login(username.trim(), password).await?;
        self.current = self.api.current_admin().await?;
        let fallback = match &self.current {
            Some(admin) => format!("Signed in as {}", admin.display_name()),
            None => "Signed in".to_string(),
        };
        Ok(Notice::acknowledged("Login", &ack, &fallback))
    }

    pub async fn logout(&mut self) -> Result<Notice, ViewError> {
        let ack = self.api.logout().await?;
        self.current = None;
        tracing::info!("Admin session closed");
        Ok(Notice::acknowledged("Logout", &ack, "Signed out"))
    }

    /// Ask the backend who owns the session cookie.
    pub async fn whoami(&mut self) -> Result<Option<&CurrentAdmin>, ViewError> {
        self.current = self.api.current_admin().await?;
        Ok(self.current.as_ref())
    }
}
