//! Card-binding endpoints.
//!
//! These start a backend "awaiting scan" window and report its progress;
//! the client-side state machine lives in `doorctl-binding`.

use doorctl_core::models::{Ack, BindingStatus, Registration};
use reqwest::multipart::Form;

use crate::api::{AdminApi, AuthScope};
use crate::error::ApiError;

impl AdminApi {
    /// `POST /register` (multipart) -- create a person and start binding
    /// their first card.
    pub async fn register_subject(&self, registration: &Registration) -> Result<Ack, ApiError> {
        let mut form = Form::new()
            .text("student_id", registration.student_id.clone())
            .text("name", registration.name.clone());
        if let Some(email) = &registration.email {
            form = form.text("email", email.clone());
        }
        if let Some(telegram_id) = &registration.telegram_id {
            form = form.text("telegram_id", telegram_id.clone());
        }
        if let Some(nickname) = &registration.nickname {
            form = form.text("nickname", nickname.clone());
        }

        let url = self.endpoint(&["register"])?;
        self.send_ack(self.post(url).multipart(form), AuthScope::Session)
            .await
    }

    /// `POST /mode/register` (urlencoded) -- start binding another card
    /// for an existing person.
    pub async fn start_card_binding(
        &self,
        student_id: &str,
        nickname: Option<&str>,
    ) -> Result<Ack, ApiError> {
        let mut params = vec![("student_id", student_id)];
        if let Some(nickname) = nickname {
            params.push(("nickname", nickname));
        }

        let url = self.endpoint(&["mode", "register"])?;
        self.send_ack(self.post(url).form(&params), AuthScope::Session)
            .await
    }

    /// `GET /check_status/{student_id}`.
    pub async fn check_status(&self, student_id: &str) -> Result<BindingStatus, ApiError> {
        let url = self.endpoint(&["check_status", student_id])?;
        self.send_json(self.get(url), AuthScope::Session).await
    }
}
