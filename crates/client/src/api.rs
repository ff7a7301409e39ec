//! Core HTTP plumbing shared by every endpoint group.
//!
//! Endpoint methods live in sibling modules as further `impl AdminApi`
//! blocks; this module owns URL construction, sending, status checks and
//! body decoding.

use doorctl_core::models::Ack;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::auth::AuthSignal;
use crate::config::ClientConfig;
use crate::error::{extract_detail, ApiError};

/// HTTP client for one door-access backend.
///
/// Cheap to clone; clones share the connection pool, the session cookie
/// jar, and the [`AuthSignal`].
#[derive(Debug, Clone)]
pub struct AdminApi {
    client: reqwest::Client,
    base_url: Url,
    auth: AuthSignal,
}

/// Whether a `401` from this call should raise the global auth signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthScope {
    /// Authenticated admin endpoint: `401` means the session expired.
    Session,
    /// Login-step endpoint: `401` means bad credentials or no session yet.
    LoginStep,
}

impl AdminApi {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;
        Self::with_client(client, &config.base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`]. The client
    /// should have its cookie store enabled for the session to persist.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url,
            auth: AuthSignal::new(),
        })
    }

    /// Backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The shared auth signal raised on any session `401`.
    pub fn auth_signal(&self) -> &AuthSignal {
        &self.auth
    }

    // ---- crate helpers ----

    /// Build an endpoint URL from path segments. Each segment is
    /// percent-encoded, so ids can never alter the route.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }

    pub(crate) fn put(&self, url: Url) -> RequestBuilder {
        self.client.put(url)
    }

    pub(crate) fn delete(&self, url: Url) -> RequestBuilder {
        self.client.delete(url)
    }

    /// Send a request and decode a JSON success body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        scope: AuthScope,
    ) -> Result<T, ApiError> {
        let response = self.send(request, scope).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(error = %e, "Failed to decode backend response");
            ApiError::Decode(e.to_string())
        })
    }

    /// Send a mutation and decode its optional `{message}` acknowledgement.
    /// Empty and non-JSON success bodies yield an empty [`Ack`].
    pub(crate) async fn send_ack(
        &self,
        request: RequestBuilder,
        scope: AuthScope,
    ) -> Result<Ack, ApiError> {
        let response = self.send(request, scope).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Ack::default());
        }
        match serde_json::from_slice(&bytes) {
            Ok(ack) => Ok(ack),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    body = %String::from_utf8_lossy(&bytes),
                    "Success body is not a JSON acknowledgement",
                );
                Ok(Ack::default())
            }
        }
    }

    /// Send a request and map non-success statuses into [`ApiError`].
    async fn send(&self, request: RequestBuilder, scope: AuthScope) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Backend request failed");
            ApiError::Transport(e)
        })?;
        self.ensure_success(response, scope).await
    }

    /// Return the response unchanged on success, otherwise an error
    /// carrying the status and the backend's detail message.
    async fn ensure_success(
        &self,
        response: Response,
        scope: AuthScope,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);

        if status == StatusCode::UNAUTHORIZED && scope == AuthScope::Session {
            tracing::warn!(path = %url, "Backend rejected session cookie");
            self.auth.expire();
            return Err(ApiError::AuthExpired);
        }

        tracing::debug!(
            path = %url,
            status = status.as_u16(),
            detail = detail.as_deref().unwrap_or(""),
            "Backend returned error status",
        );
        Err(ApiError::Request {
            status: status.as_u16(),
            detail,
        })
    }
}
