//! Synchronous binding state machine.
//!
//! The controller's timer task never mutates session fields directly: a
//! countdown tick, a poll response, a cancellation and a disposal are all
//! method calls on [`BindingMachine`]. The first terminal transition stops
//! both timers before anything else is written, so whichever timer loses
//! the race observes a stopped session and its call is ignored.

use doorctl_core::models::BindingStatus;

use crate::config::BindingConfig;
use crate::error::BindingError;
use crate::state::{BindingOutcome, BindingSnapshot, BindingState};

pub const MSG_SUBMITTING: &str = "Starting card binding...";
pub const MSG_TIMEOUT: &str = "Card scan timed out. Start a new binding to try again.";
pub const MSG_CONNECTION_LOST: &str =
    "Lost connection to the access-control server. Check connectivity and start a new binding.";
pub const MSG_INITIATION_FAILED: &str = "Failed to start card binding";

/// Result of feeding an event into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The event does not apply to the current state (stale timer tick,
    /// double cancel, ...). Nothing changed.
    Ignored,
    /// Session fields changed; the session is still live.
    Updated,
    /// The session reached a terminal state and its timers are stopped.
    Finished(BindingOutcome),
}

impl Step {
    /// Whether the timer task should keep running after this step.
    pub fn keeps_timers(&self) -> bool {
        matches!(self, Step::Updated)
    }
}

/// Binding completion rule.
///
/// Complete when the backend reports the subject as bound AND either the
/// backend is no longer binding, or the card count strictly exceeds the
/// initial count. A missing `binding_in_progress` counts as "not in
/// progress": older backends only report `bound`.
pub fn is_binding_complete(status: &BindingStatus, initial_card_count: Option<u32>) -> bool {
    if !status.bound {
        return false;
    }
    let finished_binding = status.binding_in_progress != Some(true);
    let count_increased = matches!(
        (status.card_count, initial_card_count),
        (Some(current), Some(initial)) if current > initial
    );
    finished_binding || count_increased
}

/// One console tab's binding session.
#[derive(Debug, Clone)]
pub struct BindingMachine {
    config: BindingConfig,
    session_id: u64,
    subject_id: Option<String>,
    card_nickname: Option<String>,
    state: BindingState,
    step: u32,
    initial_card_count: Option<u32>,
    card_count: Option<u32>,
    remaining_seconds: u32,
    message: String,
    timers_running: bool,
}

impl BindingMachine {
    pub fn new(config: BindingConfig) -> Self {
        let remaining_seconds = config.budget_secs;
        Self {
            config,
            session_id: 0,
            subject_id: None,
            card_nickname: None,
            state: BindingState::Idle,
            step: 0,
            initial_card_count: None,
            card_count: None,
            remaining_seconds,
            message: String::new(),
            timers_running: false,
        }
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn timers_running(&self) -> bool {
        self.timers_running
    }

    pub fn snapshot(&self) -> BindingSnapshot {
        BindingSnapshot {
            session_id: self.session_id,
            subject_id: self.subject_id.clone(),
            card_nickname: self.card_nickname.clone(),
            state: self.state,
            step: self.step,
            initial_card_count: self.initial_card_count,
            card_count: self.card_count,
            remaining_seconds: self.remaining_seconds,
            message: self.message.clone(),
            timers_running: self.timers_running,
        }
    }

    // ---- lifecycle ----

    /// `Idle | terminal -> Submitting` for a fresh session.
    ///
    /// Every field of the previous session is reset: `step` to 0, the
    /// countdown to the full budget, and the message.
    pub fn begin(
        &mut self,
        session_id: u64,
        subject_id: &str,
        card_nickname: Option<String>,
        known_card_count: Option<u32>,
    ) -> Result<(), BindingError> {
        if self.state.is_active() {
            return Err(BindingError::SessionActive {
                subject_id: self.subject_id.clone().unwrap_or_default(),
            });
        }
        doorctl_core::validation::validate_subject_id(subject_id)?;

        self.session_id = session_id;
        self.subject_id = Some(subject_id.to_string());
        self.card_nickname = card_nickname;
        self.state = BindingState::Submitting;
        self.step = 0;
        self.initial_card_count = known_card_count;
        self.card_count = known_card_count;
        self.remaining_seconds = self.config.budget_secs;
        self.message = MSG_SUBMITTING.to_string();
        self.timers_running = false;
        Ok(())
    }

    /// `Submitting -> AwaitingScan`: the backend accepted the bind request.
    /// Starts both timers.
    pub fn on_initiated(&mut self, backend_message: Option<String>) -> Step {
        if self.state != BindingState::Submitting {
            return Step::Ignored;
        }
        self.state = BindingState::AwaitingScan;
        self.step = 0;
        self.remaining_seconds = self.config.budget_secs;
        self.timers_running = true;
        self.message = backend_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                format!(
                    "Scan the card twice within {} seconds...",
                    self.config.budget_secs
                )
            });
        Step::Updated
    }

    /// `Submitting -> Error`: the bind request was rejected or never
    /// arrived. Timers are never started.
    pub fn on_initiation_failed(&mut self, message: Option<String>) -> Step {
        if self.state != BindingState::Submitting {
            return Step::Ignored;
        }
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| MSG_INITIATION_FAILED.to_string());
        self.finish(BindingState::Error, message)
    }

    /// One countdown tick. Reaching zero while awaiting scans is a timeout.
    pub fn on_countdown_tick(&mut self) -> Step {
        if !self.accepts_timer_events() {
            return Step::Ignored;
        }
        self.remaining_seconds = self
            .remaining_seconds
            .saturating_sub(self.config.countdown_step());
        if self.remaining_seconds == 0 {
            return self.finish(BindingState::Timeout, MSG_TIMEOUT.to_string());
        }
        Step::Updated
    }

    /// Interpret one successful `check_status` response.
    pub fn on_poll(&mut self, status: &BindingStatus) -> Step {
        if !self.accepts_timer_events() {
            return Step::Ignored;
        }

        if let Some(initial) = status.initial_count {
            self.initial_card_count = Some(initial);
        }
        if let Some(step) = status.step {
            self.step = step;
        }
        if status.card_count.is_some() {
            self.card_count = status.card_count;
        }

        if is_binding_complete(status, self.initial_card_count) {
            let subject = self.subject_id.as_deref().unwrap_or("The subject");
            let message = match status.card_count {
                Some(count) => format!("Card bound. {subject} now has {count} card(s)."),
                None => format!("Card bound to {subject}."),
            };
            return self.finish(BindingState::Success, message);
        }

        // Without any reported baseline, the first count seen becomes one.
        if self.initial_card_count.is_none() {
            self.initial_card_count = status.card_count;
        }
        if let Some(progress) = status.status_message.as_ref().filter(|m| !m.trim().is_empty()) {
            self.message = progress.clone();
        }
        Step::Updated
    }

    /// A poll request failed at the transport or decode layer, or the
    /// backend rejected it. Not retried. `message` is what the operator sees.
    pub fn on_poll_failed(&mut self, message: impl Into<String>) -> Step {
        if !self.accepts_timer_events() {
            return Step::Ignored;
        }
        self.finish(BindingState::Error, message.into())
    }

    /// Explicit administrator cancellation from `Submitting` or
    /// `AwaitingScan`. Stops timers, discards the session, returns to
    /// `Idle`. Any other state is a no-op, so repeated calls are safe.
    pub fn cancel(&mut self) -> Step {
        if !self.state.is_active() {
            return Step::Ignored;
        }
        self.timers_running = false;
        self.reset_fields();
        Step::Finished(BindingOutcome::Cancelled)
    }

    /// Teardown of the owning view. Always safe. Stops timers; a live
    /// session goes back to `Idle`, a terminal one keeps its state.
    pub fn dispose(&mut self) -> Step {
        let was_running = self.timers_running;
        self.timers_running = false;
        if self.state.is_active() {
            self.reset_fields();
            return Step::Finished(BindingOutcome::Cancelled);
        }
        if was_running {
            Step::Updated
        } else {
            Step::Ignored
        }
    }

    /// The administrator closed a terminal notice: back to `Idle`.
    pub fn dismiss(&mut self) -> Step {
        if !self.state.is_terminal() {
            return Step::Ignored;
        }
        self.reset_fields();
        Step::Updated
    }

    // ---- private helpers ----

    fn accepts_timer_events(&self) -> bool {
        self.state == BindingState::AwaitingScan && self.timers_running
    }

    /// Terminal transition. Timers stop first.
    fn finish(&mut self, state: BindingState, message: String) -> Step {
        self.timers_running = false;
        self.state = state;
        self.message = message;
        Step::Finished(BindingOutcome::from_snapshot(&self.snapshot()))
    }

    fn reset_fields(&mut self) {
        self.state = BindingState::Idle;
        self.subject_id = None;
        self.card_nickname = None;
        self.step = 0;
        self.initial_card_count = None;
        self.card_count = None;
        self.remaining_seconds = self.config.budget_secs;
        self.message.clear();
    }
}
