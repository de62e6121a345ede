//! Probe error types

use thiserror::Error;

/// Errors from talking to a provider endpoint
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Provider rejected the credentials (401/403)
    #[error("Authentication failed (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// Transport failure or timeout below the HTTP layer
    #[error("Network error: {0}")]
    Network(String),

    /// Unexpected status or response body
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Base URL could not be turned into a request
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// A newer probe in the same slot replaced this one
    #[error("Probe superseded by a newer request")]
    Superseded,
}

impl ProbeError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "AUTH_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Protocol(_) => "PROTOCOL_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::Superseded => "SUPERSEDED",
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidEndpoint(err.to_string())
        } else if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::Protocol(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
