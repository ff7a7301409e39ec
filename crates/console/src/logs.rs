//! Access log, newest first as returned by the backend.

use doorctl_client::{AdminApi, DEFAULT_LOG_LIMIT};
use doorctl_core::models::AccessLog;

use crate::error::ViewError;
use crate::list::ListState;

pub struct LogsView {
    api: AdminApi,
    list: ListState<AccessLog>,
    limit: u32,
}

impl LogsView {
    pub fn new(api: AdminApi) -> Self {
        Self {
            api,
            list: ListState::default(),
            limit: DEFAULT_LOG_LIMIT,
        }
    }

    pub fn list(&self) -> &ListState<AccessLog> {
        &self.list
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Change how many entries the next `load()` fetches. Zero is
    /// treated as one.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit.max(1);
    }

    pub async fn load(&mut self) -> Result<usize, ViewError> {
        let fetched = self.api.list_logs(Some(self.limit)).await;
        Ok(self.list.apply("logs", fetched)?)
    }

    /// Match on user name, student id, RFID UID and action.
    pub fn filter(&self, term: &str) -> Vec<&AccessLog> {
        self.list.filter(term)
    }
}
