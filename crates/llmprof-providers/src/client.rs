//! Provider client seam and shared HTTP plumbing

use async_trait::async_trait;
use llmprof_core::{Profile, ProviderType};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProbeError;

/// Longest provider error text carried into a message
const MAX_MESSAGE_LEN: usize = 300;

/// A model offered by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

/// Credentials and endpoint to probe
///
/// Built from a stored [`Profile`] or from loose form fields; nothing needs
/// to be persisted first.
#[derive(Clone, Copy)]
pub struct ProbeTarget<'a> {
    pub provider: ProviderType,
    pub base_url: &'a str,
    pub api_key: &'a str,
    pub model: &'a str,
}

impl fmt::Debug for ProbeTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeTarget")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl<'a> From<&'a Profile> for ProbeTarget<'a> {
    fn from(profile: &'a Profile) -> Self {
        Self {
            provider: profile.provider_type,
            base_url: &profile.base_url,
            api_key: &profile.api_key,
            model: &profile.model,
        }
    }
}

/// Raw HTTP reply, before classification
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

impl HttpReply {
    /// Best-effort human readable error from the reply body
    #[must_use]
    pub fn error_message(&self) -> String {
        extract_error_message(&self.body).unwrap_or_else(|| {
            self.status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
    }

    /// Turn a non-success reply into the matching error
    #[must_use]
    pub fn into_error(self) -> ProbeError {
        let message = self.error_message();
        match self.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProbeError::Auth {
                status: self.status.as_u16(),
                message,
            },
            status => ProbeError::Protocol(format!("HTTP {}: {message}", status.as_u16())),
        }
    }
}

/// One implementation per provider API
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Provider this client speaks to
    fn provider(&self) -> ProviderType;

    /// Fetch the models the credentials can use
    async fn list_models(&self, base_url: &str, api_key: &str)
        -> Result<Vec<ModelInfo>, ProbeError>;

    /// Issue the smallest request that proves the credentials and model work
    ///
    /// Provider-side rejections come back as a non-success [`HttpReply`];
    /// only transport failures are errors.
    async fn ping(&self, target: &ProbeTarget<'_>) -> Result<HttpReply, ProbeError>;
}

/// Join a base URL and an API path without doubling slashes
#[must_use]
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Send a request and read the whole body
///
/// # Errors
/// Returns an error for transport failures only
pub async fn send(request: RequestBuilder) -> Result<HttpReply, ProbeError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    Ok(HttpReply { status, body })
}

/// Parse a success body, mapping shape mismatches to `Protocol`
///
/// # Errors
/// Returns an error if the body does not match `T`
pub fn parse_body<'de, T: Deserialize<'de>>(body: &'de str) -> Result<T, ProbeError> {
    serde_json::from_str(body)
        .map_err(|e| ProbeError::Protocol(format!("Unexpected response body: {e}")))
}

fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let message = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .pointer("/error/message")
            .or_else(|| value.get("error").filter(|e| e.is_string()))
            .or_else(|| value.get("message"))
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string)?,
        Err(_) => trimmed.to_string(),
    };

    Some(truncate(&message, MAX_MESSAGE_LEN))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}
