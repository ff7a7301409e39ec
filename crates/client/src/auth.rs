//! Process-wide "session expired" signal.
//!
//! Any `401` answer from an authenticated endpoint flips the signal to
//! [`AuthState::Expired`]. The console shell watches it and sends the
//! administrator back to the login step, abandoning whatever was in
//! flight.

use std::sync::Arc;

use tokio::sync::watch;

/// Whether the admin session cookie is still considered valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Active,
    Expired,
}

/// Cloneable handle to the shared auth state. All clones observe the same
/// value.
#[derive(Debug, Clone)]
pub struct AuthSignal {
    tx: Arc<watch::Sender<AuthState>>,
}

impl AuthSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AuthState::Active);
        Self { tx: Arc::new(tx) }
    }

    /// Mark the session as expired. Idempotent.
    pub fn expire(&self) {
        let previous = self.tx.send_replace(AuthState::Expired);
        if previous == AuthState::Active {
            tracing::warn!("Admin session expired, login required");
        }
    }

    /// Mark the session as valid again (after a successful login).
    pub fn reset(&self) {
        self.tx.send_replace(AuthState::Active);
    }

    pub fn state(&self) -> AuthState {
        *self.tx.borrow()
    }

    pub fn is_expired(&self) -> bool {
        self.state() == AuthState::Expired
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    /// Resolve once the session is (or already was) expired.
    pub async fn expired(&self) {
        let mut rx = self.subscribe();
        // `wait_for` only errors when the sender is dropped, which cannot
        // happen while `self` holds it.
        let _ = rx.wait_for(|state| *state == AuthState::Expired).await;
    }
}

impl Default for AuthSignal {
    fn default() -> Self {
        Self::new()
    }
}
