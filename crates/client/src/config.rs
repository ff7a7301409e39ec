use std::time::Duration;

/// Default backend address used during local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// REST client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend on the same machine.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (default: `http://localhost:8000`).
    pub base_url: String,
    /// Per-request timeout (default: 10 s).
    pub request_timeout: Duration,
    /// Admin username used to open a session, if configured.
    pub username: Option<String>,
    /// Admin password used to open a session, if configured.
    pub password: Option<String>,
}

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ClientConfig {
    /// Configuration for a specific backend with default timeout and no
    /// credentials.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            username: None,
            password: None,
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                 |
    /// |--------------------------------|-------------------------|
    /// | `DOORCTL_BASE_URL`             | `http://localhost:8000` |
    /// | `DOORCTL_REQUEST_TIMEOUT_SECS` | `10`                    |
    /// | `DOORCTL_USERNAME`             | unset                   |
    /// | `DOORCTL_PASSWORD`             | unset                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("DOORCTL_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());

        let request_timeout_secs = match lookup("DOORCTL_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                var: "DOORCTL_REQUEST_TIMEOUT_SECS",
                expected: "number of seconds",
                value: raw.clone(),
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            username: lookup("DOORCTL_USERNAME").filter(|v| !v.is_empty()),
            password: lookup("DOORCTL_PASSWORD"),
        })
    }

    /// Both username and password, when configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}
