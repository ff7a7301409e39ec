//! Per-item results of a bulk action.
//!
//! The backend has no batch endpoints, so a bulk enable/disable/delete is
//! a sequence of single-entity calls. A failure part-way through is
//! recorded and the loop continues; nothing is rolled back.

use serde::Serialize;

use crate::types::EntityId;

/// Result of one entity within a bulk action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutcome {
    pub id: EntityId,
    /// `Err` carries the message shown to the administrator.
    pub result: Result<(), String>,
}

/// Results of a whole bulk action, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub items: Vec<ItemOutcome>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, id: impl Into<EntityId>) {
        self.items.push(ItemOutcome {
            id: id.into(),
            result: Ok(()),
        });
    }

    pub fn record_failure(&mut self, id: impl Into<EntityId>, message: impl Into<String>) {
        self.items.push(ItemOutcome {
            id: id.into(),
            result: Err(message.into()),
        });
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &EntityId> {
        self.items
            .iter()
            .filter(|item| item.result.is_ok())
            .map(|item| &item.id)
    }

    pub fn failed(&self) -> impl Iterator<Item = (&EntityId, &str)> {
        self.items.iter().filter_map(|item| match &item.result {
            Ok(()) => None,
            Err(message) => Some((&item.id, message.as_str())),
        })
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// One-line summary, e.g. `"2 succeeded, 1 failed"`.
    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed",
            self.success_count(),
            self.failure_count()
        )
    }
}
