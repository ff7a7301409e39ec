//! Card list and CRUD.

use doorctl_client::AdminApi;
use doorctl_core::batch::BatchOutcome;
use doorctl_core::models::{Card, CardUpdate, NewCard};
use doorctl_core::types::EntityId;
use doorctl_core::validation::{non_blank, validate_required};

use crate::error::ViewError;
use crate::list::{run_batch, ListState};
use crate::notice::Notice;

pub struct CardsView {
    api: AdminApi,
    list: ListState<Card>,
}

impl CardsView {
    pub fn new(api: AdminApi) -> Self {
        Self {
            api,
            list: ListState::default(),
        }
    }

    pub fn list(&self) -> &ListState<Card> {
        &self.list
    }

    pub async fn load(&mut self) -> Result<usize, ViewError> {
        let fetched = self.api.list_cards().await;
        Ok(self.list.apply("cards", fetched)?)
    }

    /// Match on RFID UID, nickname and owner id.
    pub fn filter(&self, term: &str) -> Vec<&Card> {
        self.list.filter(term)
    }

    /// Register a card by UID without scanning it.
    pub async fn create(&mut self, card: NewCard) -> Result<Notice, ViewError> {
        validate_required("User", &card.user_id)?;
        validate_required("RFID UID", &card.rfid_uid)?;
        let card = NewCard {
            rfid_uid: card.rfid_uid.trim().to_string(),
            nickname: non_blank(card.nickname.as_deref()),
            ..card
        };

        let ack = self.api.create_card(&card).await?;
        tracing::info!(rfid_uid = %card.rfid_uid, user_id = %card.user_id, "Card added");
        self.reload().await;
        Ok(Notice::acknowledged("Add card", &ack, "Card added"))
    }

    pub async fn rename(&mut self, id: &str, nickname: &str) -> Result<Notice, ViewError> {
        validate_required("Nickname", nickname)?;
        self.update(id, CardUpdate::rename(nickname.trim()), "Card renamed")
            .await
    }

    pub async fn set_active(&mut self, id: &str, active: bool) -> Result<Notice, ViewError> {
        let fallback = if active { "Card enabled" } else { "Card disabled" };
        self.update(id, CardUpdate::active(active), fallback).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<Notice, ViewError> {
        let ack = self.api.delete_card(id).await?;
        tracing::info!(card_id = %id, "Card deleted");
        self.reload().await;
        Ok(Notice::acknowledged("Delete card", &ack, "Card deleted"))
    }

    pub async fn set_active_many(
        &mut self,
        ids: &[EntityId],
        active: bool,
    ) -> Result<BatchOutcome, ViewError> {
        let api = &self.api;
        let update = CardUpdate::active(active);
        let update = &update;
        let action = if active { "enable cards" } else { "disable cards" };
        let outcome = run_batch(action, ids, |id| async move {
            api.update_card(&id, update).await
        })
        .await?;
        self.reload().await;
        Ok(outcome)
    }

    pub async fn delete_many(&mut self, ids: &[EntityId]) -> Result<BatchOutcome, ViewError> {
        let api = &self.api;
        let outcome = run_batch("delete cards", ids, |id| async move {
            api.delete_card(&id).await
        })
        .await?;
        self.reload().await;
        Ok(outcome)
    }

    async fn update(
        &mut self,
        id: &str,
        update: CardUpdate,
        fallback: &str,
    ) -> Result<Notice, ViewError> {
        let ack = self.api.update_card(id, &update).await?;
        tracing::info!(card_id = %id, "Card updated");
        self.reload().await;
        Ok(Notice::acknowledged("Edit card", &ack, fallback))
    }

    async fn reload(&mut self) {
        let fetched = self.api.list_cards().await;
        self.list.reconcile("cards", fetched);
    }
}
