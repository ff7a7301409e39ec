//! Error type for the REST client layer.

/// Message shown when the backend rejects a request without a `detail`.
pub const GENERIC_REQUEST_FAILURE: &str = "The request could not be completed";

/// Errors from the door-access REST API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend returned a non-2xx status other than `401`.
    #[error("Backend error ({status}): {}", .detail.as_deref().unwrap_or(GENERIC_REQUEST_FAILURE))]
    Request {
        /// HTTP status code.
        status: u16,
        /// The backend's `detail` message, when it sent one.
        detail: Option<String>,
    },

    /// The backend answered `401`; the admin session is no longer valid.
    #[error("Administrator session expired")]
    AuthExpired,

    /// A 2xx response body could not be decoded.
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// The base URL or a path segment produced an unusable URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Text to surface to the administrator.
    ///
    /// The backend `detail` is passed through verbatim; other variants get
    /// a fixed message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Request {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Request { status, detail: None } => {
                format!("{GENERIC_REQUEST_FAILURE} (HTTP {status})")
            }
            ApiError::Transport(_) => "Unable to reach the access-control server".into(),
            ApiError::AuthExpired => "Your session has expired, please log in again".into(),
            ApiError::Decode(_) => "The server sent an unexpected response".into(),
            ApiError::InvalidUrl(url) => format!("Invalid server address: {url}"),
        }
    }

    /// Whether the failure happened below HTTP (no response at all).
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// HTTP status of the failure, if there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            ApiError::AuthExpired => Some(401),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Understands `{"detail": "..."}`, validation-style
/// `{"detail": [{"msg": "..."}, ...]}`, and `{"error": "..."}`. Falls back
/// to a short plain-text body.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        // Plain-text bodies are only useful when short (not an HTML page).
        return (trimmed.len() <= 200 && !trimmed.starts_with('<')).then(|| trimmed.to_string());
    };

    match json.get("detail").or_else(|| json.get("error")) {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => json
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
    }
}
