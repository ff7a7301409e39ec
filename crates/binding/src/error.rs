use doorctl_core::error::CoreError;

/// Reasons a binding session cannot be started.
///
/// Failures after a session has started never surface here; they become
/// [`BindingState::Error`](crate::BindingState::Error) or
/// [`BindingState::Timeout`](crate::BindingState::Timeout) on the session.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The subject id failed validation.
    #[error(transparent)]
    InvalidSubject(#[from] CoreError),

    /// This console tab already has a binding that is submitting or
    /// awaiting scans.
    #[error("A card binding for {subject_id} is already in progress")]
    SessionActive { subject_id: String },
}
