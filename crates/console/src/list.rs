//! Shared list-view plumbing: load state, local filtering, bulk loops.

use std::future::Future;

use doorctl_client::ApiError;
use doorctl_core::batch::BatchOutcome;
use doorctl_core::models::{AccessLog, Ack, Admin, Card, User};
use doorctl_core::search::{self, Searchable};
use doorctl_core::types::EntityId;

/// A backend record with a stable id.
pub trait Record: Searchable {
    fn record_id(&self) -> &str;
}

impl Record for User {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for Card {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for Admin {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for AccessLog {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// What a list view currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    NotLoaded,
    Loaded(Vec<T>),
    /// The last `load()` failed; the view offers a retry instead of rows.
    Failed { detail: String },
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::NotLoaded
    }
}

/// Loaded records of one entity type.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    state: LoadState<T>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            state: LoadState::NotLoaded,
        }
    }
}

impl<T: Record> ListState<T> {
    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded(_))
    }

    /// Loaded rows, empty unless the last load succeeded.
    pub fn items(&self) -> &[T] {
        match &self.state {
            LoadState::Loaded(items) => items,
            _ => &[],
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items().iter().find(|item| item.record_id() == id)
    }

    /// Case-insensitive substring search over the loaded rows.
    pub fn filter(&self, term: &str) -> Vec<&T> {
        search::filter(self.items(), term)
    }

    /// Replace local state with the result of a fetch.
    ///
    /// A failed fetch drops the previous rows: the view shows the retry
    /// affordance rather than stale data.
    pub fn apply(
        &mut self,
        entity: &'static str,
        fetched: Result<Vec<T>, ApiError>,
    ) -> Result<usize, ApiError> {
        match fetched {
            Ok(items) => {
                let count = items.len();
                tracing::debug!(entity, count, "List loaded");
                self.state = LoadState::Loaded(items);
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(entity, error = %e, "Failed to load list");
                self.state = LoadState::Failed {
                    detail: e.user_message(),
                };
                Err(e)
            }
        }
    }

    /// Refresh after a change the backend already accepted.
    ///
    /// A failed fetch leaves [`LoadState::Failed`] for a later retry but is
    /// not returned: the change itself went through.
    pub fn reconcile(&mut self, entity: &'static str, fetched: Result<Vec<T>, ApiError>) {
        if let Err(e) = self.apply(entity, fetched) {
            tracing::warn!(entity, error = %e, "Change applied but refreshing the list failed");
        }
    }
}

/// Run `op` for each id in order and record every result.
///
/// A failing item does not stop the loop and completed items are not
/// rolled back. An expired session does stop it: every later call would
/// fail the same way.
pub(crate) async fn run_batch<F, Fut>(
    action: &'static str,
    ids: &[EntityId],
    mut op: F,
) -> Result<BatchOutcome, ApiError>
where
    F: FnMut(EntityId) -> Fut,
    Fut: Future<Output = Result<Ack, ApiError>>,
{
    let items = ids.iter().map(|id| (id.clone(), ()));
    run_batch_with(action, items, |id, ()| op(id)).await
}

/// [`run_batch`] with a per-item payload.
pub(crate) async fn run_batch_with<I, F, Fut>(
    action: &'static str,
    items: impl IntoIterator<Item = (EntityId, I)>,
    mut op: F,
) -> Result<BatchOutcome, ApiError>
where
    F: FnMut(EntityId, I) -> Fut,
    Fut: Future<Output = Result<Ack, ApiError>>,
{
    let mut outcome = BatchOutcome::new();
    for (id, input) in items {
        match op(id.clone(), input).await {
            Ok(_) => outcome.record_success(id),
            Err(ApiError::AuthExpired) => return Err(ApiError::AuthExpired),
            Err(e) => {
                tracing::warn!(action, id = %id, error = %e, "Bulk item failed");
                outcome.record_failure(id, e.user_message());
            }
        }
    }
    tracing::info!(
        action,
        succeeded = outcome.success_count(),
        failed = outcome.failure_count(),
        "Bulk action finished",
    );
    Ok(outcome)
}
