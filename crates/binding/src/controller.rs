//! Per-tab binding controller and the tokio task that drives its timers.
//!
//! A controller owns at most one live session. Starting a session spawns
//! one task which first submits the bind request, then runs the countdown
//! and the poll timer side by side in a single `select!` loop. Both timers
//! live in that one task, so they always start and stop together.
//!
//! Every transition goes through the [`BindingMachine`] behind the shared
//! mutex and is tagged with the session id that caused it. Calls carrying a
//! stale id (a poll response that raced a cancel, a countdown tick from a
//! superseded session) are dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use doorctl_client::ApiError;
use doorctl_core::models::BindingStatus;
use futures::future::{BoxFuture, OptionFuture};
use futures::FutureExt;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::backend::{BindRequest, BindingBackend};
use crate::config::BindingConfig;
use crate::error::BindingError;
use crate::machine::{BindingMachine, Step, MSG_CONNECTION_LOST};
use crate::state::{BindingOutcome, BindingSnapshot};

/// Identity of one binding session within a controller.
pub type SessionId = u64;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct Inner {
    machine: BindingMachine,
    /// Cancels the running driver task, if any.
    cancel: Option<CancellationToken>,
    /// Outcome of the most recently finished session.
    last_outcome: Option<(SessionId, BindingOutcome)>,
}

struct Shared {
    inner: Mutex<Inner>,
    snapshots: watch::Sender<BindingSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the machine in a valid
        // state; every transition is a single method call.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a transition if `session` is still the current session.
    ///
    /// Returns `None` for a stale session. Publishes a snapshot after every
    /// transition that changed something.
    fn apply(
        &self,
        session: SessionId,
        f: impl FnOnce(&mut BindingMachine) -> Step,
    ) -> Option<Step> {
        let mut inner = self.lock();
        if inner.machine.session_id() != session {
            return None;
        }
        let step = f(&mut inner.machine);
        self.commit(&mut inner, &step);
        Some(step)
    }

    fn commit(&self, inner: &mut Inner, step: &Step) {
        if let Step::Finished(outcome) = step {
            if let Some(token) = inner.cancel.take() {
                token.cancel();
            }
            inner.last_outcome = Some((inner.machine.session_id(), outcome.clone()));
            tracing::info!(
                session_id = inner.machine.session_id(),
                outcome = ?outcome,
                "Card binding finished",
            );
        }
        if *step != Step::Ignored {
            self.snapshots.send_replace(inner.machine.snapshot());
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Binding session owner for one console tab.
///
/// Dropping the controller disposes of any live session.
pub struct BindingController<B: BindingBackend> {
    backend: Arc<B>,
    config: BindingConfig,
    shared: Arc<Shared>,
}

impl<B: BindingBackend> BindingController<B> {
    pub fn new(backend: Arc<B>, config: BindingConfig) -> Self {
        let machine = BindingMachine::new(config.clone());
        let (snapshots, _) = watch::channel(machine.snapshot());
        Self {
            backend,
            config,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    machine,
                    cancel: None,
                    last_outcome: None,
                }),
                snapshots,
            }),
        }
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Start a new session and spawn its driver task.
    ///
    /// Must be called from within a tokio runtime. Fails without side
    /// effects when the subject id is invalid or a session is already
    /// submitting or awaiting scans.
    pub fn start(&self, request: BindRequest) -> Result<SessionId, BindingError> {
        let token = CancellationToken::new();
        let session = {
            let mut inner = self.shared.lock();
            let session = inner.machine.session_id() + 1;
            inner.machine.begin(
                session,
                &request.subject_id,
                request.card_nickname.clone(),
                request.known_card_count,
            )?;
            inner.cancel = Some(token.clone());
            self.shared.snapshots.send_replace(inner.machine.snapshot());
            session
        };

        tracing::info!(
            session_id = session,
            subject_id = %request.subject_id,
            "Starting card binding",
        );

        tokio::spawn(drive(
            Arc::clone(&self.shared),
            Arc::clone(&self.backend),
            self.config.clone(),
            request,
            session,
            token,
        ));
        Ok(session)
    }

    /// Cancel a submitting or awaiting session. Returns whether anything
    /// was cancelled; calling it again is a no-op.
    pub fn cancel(&self) -> bool {
        let mut inner = self.shared.lock();
        let step = inner.machine.cancel();
        self.shared.commit(&mut inner, &step);
        let cancelled = step != Step::Ignored;
        if cancelled {
            tracing::info!(session_id = inner.machine.session_id(), "Card binding cancelled");
        }
        cancelled
    }

    /// Stop all timers. Safe to call at any time, any number of times.
    pub fn dispose(&self) {
        let mut inner = self.shared.lock();
        let step = inner.machine.dispose();
        if let Some(token) = inner.cancel.take() {
            token.cancel();
        }
        self.shared.commit(&mut inner, &step);
    }

    /// Close a terminal notice and return to `Idle`.
    pub fn dismiss(&self) -> bool {
        let mut inner = self.shared.lock();
        let step = inner.machine.dismiss();
        self.shared.commit(&mut inner, &step);
        step != Step::Ignored
    }

    pub fn snapshot(&self) -> BindingSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Receive a snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<BindingSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Wait until `session` is no longer submitting or awaiting scans.
    ///
    /// Returns `None` once a later session has finished, since only the
    /// latest outcome is kept.
    pub async fn wait_for_outcome(&self, session: SessionId) -> Option<BindingOutcome> {
        let mut rx = self.shared.snapshots.subscribe();
        // The sender lives in `self.shared`, so this cannot fail while
        // `self` is borrowed.
        let _ = rx
            .wait_for(|snap| snap.session_id != session || !snap.state.is_active())
            .await;
        let inner = self.shared.lock();
        match &inner.last_outcome {
            Some((id, outcome)) if *id == session => Some(outcome.clone()),
            _ => None,
        }
    }
}

impl<B: BindingBackend> Drop for BindingController<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ---------------------------------------------------------------------------
// Driver task
// ---------------------------------------------------------------------------

async fn drive<B: BindingBackend>(
    shared: Arc<Shared>,
    backend: Arc<B>,
    config: BindingConfig,
    request: BindRequest,
    session: SessionId,
    cancel: CancellationToken,
) {
    let initiated = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        result = backend.initiate(&request) => result,
    };

    match initiated {
        Ok(message) => {
            let step = shared.apply(session, |m| m.on_initiated(message));
            if !step.is_some_and(|s| s.keeps_timers()) {
                return;
            }
        }
        Err(e) => {
            tracing::warn!(
                session_id = session,
                subject_id = %request.subject_id,
                error = %e,
                "Card binding request failed",
            );
            let message = initiation_failure_message(&e);
            shared.apply(session, |m| m.on_initiation_failed(message));
            return;
        }
    }

    let now = Instant::now();
    let mut countdown = interval_at(now + config.countdown_tick(), config.countdown_tick());
    let mut poll = interval_at(now + config.poll_interval, config.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut in_flight: Option<BoxFuture<'static, Result<BindingStatus, ApiError>>> = None;

    loop {
        let step = tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            _ = countdown.tick() => shared.apply(session, |m| m.on_countdown_tick()),

            Some(result) = OptionFuture::from(in_flight.as_mut()) => {
                in_flight = None;
                match result {
                    Ok(status) => {
                        tracing::debug!(
                            session_id = session,
                            bound = status.bound,
                            in_progress = ?status.binding_in_progress,
                            card_count = ?status.card_count,
                            "Binding status polled",
                        );
                        shared.apply(session, |m| m.on_poll(&status))
                    }
                    Err(e) => {
                        tracing::warn!(
                            session_id = session,
                            subject_id = %request.subject_id,
                            error = %e,
                            "Binding status poll failed",
                        );
                        let message = poll_failure_message(&e);
                        shared.apply(session, |m| m.on_poll_failed(message))
                    }
                }
            }

            _ = poll.tick(), if in_flight.is_none() => {
                let backend = Arc::clone(&backend);
                let subject_id = request.subject_id.clone();
                in_flight = Some(async move { backend.check_status(&subject_id).await }.boxed());
                continue;
            }
        };

        if !step.is_some_and(|s| s.keeps_timers()) {
            break;
        }
    }
}

/// Message shown when the bind request itself fails.
fn initiation_failure_message(error: &ApiError) -> Option<String> {
    match error {
        ApiError::Request { detail, .. } => detail.clone(),
        ApiError::Transport(_) => Some(MSG_CONNECTION_LOST.to_string()),
        ApiError::AuthExpired => Some(error.user_message()),
        ApiError::Decode(_) | ApiError::InvalidUrl(_) => None,
    }
}

/// An expired admin session is reported as such; every other poll failure
/// reads as lost connectivity.
fn poll_failure_message(error: &ApiError) -> String {
    match error {
        ApiError::AuthExpired => error.user_message(),
        _ => MSG_CONNECTION_LOST.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initiation_message_prefers_backend_detail() {
        let err = ApiError::Request {
            status: 404,
            detail: Some("User not found".into()),
        };
        assert_eq!(initiation_failure_message(&err).as_deref(), Some("User not found"));

        let err = ApiError::Request {
            status: 500,
            detail: None,
        };
        assert!(initiation_failure_message(&err).is_none());
        assert!(initiation_failure_message(&ApiError::Decode("eof".into())).is_none());
    }

    #[test]
    fn poll_failure_message_separates_expired_session() {
        assert_eq!(
            poll_failure_message(&ApiError::AuthExpired),
            ApiError::AuthExpired.user_message()
        );
        assert_eq!(
            poll_failure_message(&ApiError::Decode("eof".into())),
            MSG_CONNECTION_LOST
        );
    }
}
