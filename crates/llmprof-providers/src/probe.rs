//! Connection probe: model discovery and connection tests
//!
//! The probe holds only an HTTP client and never touches the profile store,
//! so a slow or abandoned probe cannot affect stored profiles.

use std::future::Future;
use std::time::Duration;

use llmprof_core::ProviderType;
use reqwest::Client;
use serde::Serialize;

use crate::anthropic::AnthropicClient;
use crate::client::{ModelInfo, ProbeTarget, ProviderClient};
use crate::error::ProbeError;
use crate::openai::OpenAiClient;

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of a connection test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
}

/// Issues list-models and test-connection calls against provider endpoints
pub struct ConnectionProbe {
    timeout: Duration,
    openai: OpenAiClient,
    anthropic: AnthropicClient,
}

impl ConnectionProbe {
    /// Create a probe with the given per-call timeout
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("llmprof/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProbeError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(http, timeout))
    }

    /// Create a probe around an existing HTTP client
    #[must_use]
    pub fn with_http_client(http: Client, timeout: Duration) -> Self {
        Self {
            timeout,
            openai: OpenAiClient::new(http.clone()),
            anthropic: AnthropicClient::new(http),
        }
    }

    /// Per-call timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn client(&self, provider: ProviderType) -> &dyn ProviderClient {
        match provider {
            ProviderType::OpenAi => &self.openai,
            ProviderType::Anthropic => &self.anthropic,
        }
    }

    /// List the models available to these credentials
    ///
    /// # Errors
    /// `Auth` if the key is rejected, `Network` on transport failure or
    /// timeout, `Protocol` on any other unexpected reply
    pub async fn list_models(
        &self,
        provider: ProviderType,
        base_url: &str,
        api_key: &str,
    ) -> Result<Vec<ModelInfo>, ProbeError> {
        let client = self.client(provider);
        self.bounded(client.list_models(base_url, api_key)).await
    }

    /// Check that the endpoint is reachable and accepts the credentials and model
    ///
    /// Provider rejections are reported as `success: false`.
    ///
    /// # Errors
    /// Returns an error only for transport failures, timeouts, or an
    /// unusable base URL
    pub async fn test_connection(
        &self,
        target: &ProbeTarget<'_>,
    ) -> Result<ConnectionReport, ProbeError> {
        let client = self.client(target.provider);
        let reply = self.bounded(client.ping(target)).await?;

        if reply.status.is_success() {
            return Ok(ConnectionReport {
                success: true,
                message: format!(
                    "Connected to {} using model {}",
                    target.provider, target.model
                ),
            });
        }

        let message = format!("HTTP {}: {}", reply.status.as_u16(), reply.error_message());
        tracing::warn!(provider = %target.provider, status = reply.status.as_u16(), "Connection test rejected");
        Ok(ConnectionReport {
            success: false,
            message,
        })
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, ProbeError>>,
    ) -> Result<T, ProbeError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| {
                ProbeError::Network(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })?
    }
}
