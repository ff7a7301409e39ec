//! Blocking notices shown to the administrator after an action.

use std::fmt;

use doorctl_binding::{BindingOutcome, BindingSnapshot};
use doorctl_core::batch::BatchOutcome;
use doorctl_core::models::Ack;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A message the administrator must acknowledge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Short heading, e.g. "Card binding timed out".
    pub title: String,
    pub message: String,
    /// What to do next, if anything.
    pub guidance: Option<String>,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
            guidance: None,
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.into(),
            message: message.into(),
            guidance: None,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
            guidance: None,
        }
    }

    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.guidance = Some(guidance.into());
        self
    }

    /// Success notice using the backend's acknowledgement when it sent one.
    pub fn acknowledged(title: &str, ack: &Ack, fallback: &str) -> Self {
        let message = ack
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback);
        Self::success(title, message)
    }

    /// Summary of a bulk action, listing every failed item.
    pub fn batch(title: &str, outcome: &BatchOutcome) -> Self {
        if outcome.is_complete_success() {
            return Self::success(title, outcome.summary());
        }
        let failures: Vec<String> = outcome
            .failed()
            .map(|(id, message)| format!("{id}: {message}"))
            .collect();
        let message = format!("{}\n{}", outcome.summary(), failures.join("\n"));
        if outcome.success_count() == 0 {
            Self::error(title, message)
        } else {
            Self::warning(title, message)
        }
    }

    /// Terminal notice for a card binding. `None` for a cancelled session,
    /// which the administrator triggered themselves.
    pub fn binding(outcome: &BindingOutcome, snapshot: &BindingSnapshot) -> Option<Self> {
        let notice = match outcome {
            BindingOutcome::Bound { .. } => {
                Self::success("Card bound", snapshot.message.clone())
            }
            BindingOutcome::TimedOut => {
                Self::warning("Card binding timed out", snapshot.message.clone())
            }
            BindingOutcome::Failed { message } => {
                Self::error("Card binding failed", message.clone())
            }
            BindingOutcome::Cancelled => return None,
        };
        Some(match outcome.guidance() {
            Some(guidance) => notice.with_guidance(guidance),
            None => notice,
        })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)?;
        if let Some(guidance) = &self.guidance {
            write!(f, "\n{guidance}")?;
        }
        Ok(())
    }
}
