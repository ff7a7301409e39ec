use doorctl_binding::BindingError;
use doorctl_client::ApiError;
use doorctl_core::error::CoreError;

use crate::notice::Notice;

/// Why a view operation did not complete.
///
/// Local state is untouched whenever one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The backend rejected the request or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Form input failed a local check; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// A card binding could not be started.
    #[error(transparent)]
    Binding(#[from] BindingError),
}

impl ViewError {
    /// The session cookie is gone; the shell should return to login.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ViewError::Api(ApiError::AuthExpired))
    }

    /// Blocking notice for a failed action.
    pub fn notice(&self, title: &str) -> Notice {
        let message = match self {
            ViewError::Api(e) => e.user_message(),
            ViewError::Invalid(CoreError::Validation(msg)) => msg.clone(),
            ViewError::Invalid(e) => e.to_string(),
            ViewError::Binding(e) => e.to_string(),
        };
        Notice::error(title, message)
    }
}
