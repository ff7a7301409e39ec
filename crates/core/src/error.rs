/// Failures detected locally, before anything is sent to the backend.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A record the action refers to is not among the loaded rows.
    #[error("No {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Form input failed a check; the message is shown as-is.
    #[error("Validation failed: {0}")]
    Validation(String),
}
