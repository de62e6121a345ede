//! Anthropic Messages API client

use async_trait::async_trait;
use llmprof_core::ProviderType;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;

use crate::client::{endpoint, parse_body, send, HttpReply, ModelInfo, ProbeTarget, ProviderClient};
use crate::error::ProbeError;

/// API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Page size requested from `/models`
const PAGE_LIMIT: u32 = 100;

/// Upper bound on pages followed, in case `has_more` never clears
const MAX_PAGES: usize = 20;

#[derive(Debug, Deserialize)]
struct ModelPage {
    data: Vec<ModelEntry>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    last_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Client for `/models` and `/messages`
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: Client,
}

impl AnthropicClient {
    #[must_use]
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    fn authorized(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    fn provider(&self) -> ProviderType {
        ProviderType::Anthropic
    }

    async fn list_models(
        &self,
        base_url: &str,
        api_key: &str,
    ) -> Result<Vec<ModelInfo>, ProbeError> {
        let url = endpoint(base_url, "models");
        let mut models = Vec::new();
        let mut after_id: Option<String> = None;

        for _ in 0..MAX_PAGES {
            tracing::debug!(%url, after_id = after_id.as_deref(), "Listing Anthropic models");

            let mut request = self
                .authorized(self.http.get(&url), api_key)
                .query(&[("limit", PAGE_LIMIT.to_string())]);
            if let Some(after) = &after_id {
                request = request.query(&[("after_id", after)]);
            }

            let reply = send(request).await?;
            if !reply.status.is_success() {
                return Err(reply.into_error());
            }

            let page: ModelPage = parse_body(&reply.body)?;
            models.extend(page.data.into_iter().map(|m| ModelInfo {
                name: m.display_name.unwrap_or_else(|| m.id.clone()),
                id: m.id,
            }));

            match page.last_id {
                Some(last) if page.has_more => after_id = Some(last),
                _ => break,
            }
        }

        Ok(models)
    }

    async fn ping(&self, target: &ProbeTarget<'_>) -> Result<HttpReply, ProbeError> {
        let url = endpoint(target.base_url, "messages");
        tracing::debug!(%url, model = target.model, "Testing Anthropic connection");

        let body = json!({
            "model": target.model,
            "max_tokens": 1,
            "messages": [{"role": "user", "content": "ping"}],
        });
        send(self.authorized(self.http.post(&url), target.api_key).json(&body)).await
    }
}
