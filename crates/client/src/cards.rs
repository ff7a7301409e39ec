//! Card endpoints (`/admin/cards`).

use doorctl_core::models::{Ack, Card, CardUpdate, NewCard};
use reqwest::multipart::Form;

use crate::api::{AdminApi, AuthScope};
use crate::error::ApiError;

impl AdminApi {
    /// `GET /admin/cards`.
    pub async fn list_cards(&self) -> Result<Vec<Card>, ApiError> {
        let url = self.endpoint(&["admin", "cards"])?;
        self.send_json(self.get(url), AuthScope::Session).await
    }

    /// `POST /admin/cards` (multipart) -- register a card by its UID
    /// without a physical scan.
    pub async fn create_card(&self, card: &NewCard) -> Result<Ack, ApiError> {
        let mut form = Form::new()
            .text("user_id", card.user_id.clone())
            .text("rfid_uid", card.rfid_uid.clone());
        if let Some(nickname) = &card.nickname {
            form = form.text("nickname", nickname.clone());
        }

        let url = self.endpoint(&["admin", "cards"])?;
        self.send_ack(self.post(url).multipart(form), AuthScope::Session)
            .await
    }

    /// `PUT /admin/cards/{id}` (multipart, partial).
    pub async fn update_card(&self, id: &str, update: &CardUpdate) -> Result<Ack, ApiError> {
        let mut form = Form::new();
        if let Some(nickname) = &update.nickname {
            form = form.text("nickname", nickname.clone());
        }
        if let Some(active) = update.is_active {
            form = form.text("is_active", active.to_string());
        }

        let url = self.endpoint(&["admin", "cards", id])?;
        self.send_ack(self.put(url).multipart(form), AuthScope::Session)
            .await
    }

    /// `DELETE /admin/cards/{id}`.
    pub async fn delete_card(&self, id: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["admin", "cards", id])?;
        self.send_ack(self.delete(url), AuthScope::Session).await
    }
}
