//! Observable session state.

use serde::Serialize;

/// Lifecycle of a binding session.
///
/// `Idle -> Submitting -> AwaitingScan -> {Success | Timeout | Error}`;
/// `Submitting` and `AwaitingScan` may also be cancelled back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingState {
    Idle,
    Submitting,
    AwaitingScan,
    Success,
    Timeout,
    Error,
}

impl BindingState {
    /// `Submitting` or `AwaitingScan`.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitting | Self::AwaitingScan)
    }

    /// `Success`, `Timeout` or `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Timeout | Self::Error)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::AwaitingScan => "awaiting scan",
            Self::Success => "success",
            Self::Timeout => "timeout",
            Self::Error => "error",
        }
    }
}

/// Point-in-time copy of a session, published to observers after every
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingSnapshot {
    /// Monotonic identity; `0` before the first session of a controller.
    pub session_id: u64,
    pub subject_id: Option<String>,
    pub card_nickname: Option<String>,
    pub state: BindingState,
    /// Scans observed so far, as reported by the backend. Display only.
    pub step: u32,
    pub initial_card_count: Option<u32>,
    /// Latest card count reported by the backend.
    pub card_count: Option<u32>,
    pub remaining_seconds: u32,
    pub message: String,
    /// Whether the poll and countdown timers are running. They always run
    /// or stop together.
    pub timers_running: bool,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BindingOutcome {
    /// A new card was bound. Carries the subject's card count when the
    /// backend reported one.
    Bound { card_count: Option<u32> },
    /// The budget ran out before the backend reported completion.
    TimedOut,
    /// Initiation or a poll failed.
    Failed { message: String },
    /// Cancelled or disposed before reaching a terminal state.
    Cancelled,
}

impl BindingOutcome {
    /// Derive the outcome from a snapshot that is no longer active.
    pub fn from_snapshot(snapshot: &BindingSnapshot) -> Self {
        match snapshot.state {
            BindingState::Success => Self::Bound {
                card_count: snapshot.card_count,
            },
            BindingState::Timeout => Self::TimedOut,
            BindingState::Error => Self::Failed {
                message: snapshot.message.clone(),
            },
            BindingState::Idle | BindingState::Submitting | BindingState::AwaitingScan => {
                Self::Cancelled
            }
        }
    }

    /// Operator guidance for the terminal notice.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::Bound { .. } | Self::Cancelled => None,
            Self::TimedOut => Some("Start a new binding and scan the card again."),
            Self::Failed { .. } => {
                Some("Check the connection to the access-control server, then retry.")
            }
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound { .. })
    }
}
