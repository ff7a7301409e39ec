//! Personnel endpoints (`/admin/users`).

use doorctl_core::models::{Ack, Card, NewUser, User, UserUpdate};
use reqwest::multipart::Form;

use crate::api::{AdminApi, AuthScope};
use crate::error::ApiError;

impl AdminApi {
    /// `GET /admin/users` -- every user with their card count.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let url = self.endpoint(&["admin", "users"])?;
        self.send_json(self.get(url), AuthScope::Session).await
    }

    /// `POST /admin/users` (multipart).
    pub async fn create_user(&self, user: &NewUser) -> Result<Ack, ApiError> {
        let mut form = Form::new()
            .text("student_id", user.student_id.clone())
            .text("name", user.name.clone());
        if let Some(email) = &user.email {
            form = form.text("email", email.clone());
        }
        if let Some(telegram_id) = &user.telegram_id {
            form = form.text("telegram_id", telegram_id.clone());
        }

        let url = self.endpoint(&["admin", "users"])?;
        self.send_ack(self.post(url).multipart(form), AuthScope::Session)
            .await
    }

    /// `PUT /admin/users/{id}` (multipart). Unset optional fields are not
    /// sent; `is_active` is sent as `"true"` / `"false"`.
    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<Ack, ApiError> {
        let mut form = Form::new()
            .text("student_id", update.student_id.clone())
            .text("name", update.name.clone());
        if let Some(email) = &update.email {
            form = form.text("email", email.clone());
        }
        if let Some(telegram_id) = &update.telegram_id {
            form = form.text("telegram_id", telegram_id.clone());
        }
        if let Some(active) = update.is_active {
            form = form.text("is_active", active.to_string());
        }

        let url = self.endpoint(&["admin", "users", id])?;
        self.send_ack(self.put(url).multipart(form), AuthScope::Session)
            .await
    }

    /// `DELETE /admin/users/{id}` -- also removes the user's cards.
    pub async fn delete_user(&self, id: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["admin", "users", id])?;
        self.send_ack(self.delete(url), AuthScope::Session).await
    }

    /// `GET /admin/users/{id}/cards`.
    pub async fn list_user_cards(&self, id: &str) -> Result<Vec<Card>, ApiError> {
        let url = self.endpoint(&["admin", "users", id, "cards"])?;
        self.send_json(self.get(url), AuthScope::Session).await
    }
}
