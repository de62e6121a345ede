//! OpenAI (and OpenAI-compatible) API client

use async_trait::async_trait;
use llmprof_core::ProviderType;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::client::{endpoint, parse_body, send, HttpReply, ModelInfo, ProbeTarget, ProviderClient};
use crate::error::ProbeError;

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Client for `/models` and `/chat/completions`
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
}

impl OpenAiClient {
    #[must_use]
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    fn provider(&self) -> ProviderType {
        ProviderType::OpenAi
    }

    async fn list_models(
        &self,
        base_url: &str,
        api_key: &str,
    ) -> Result<Vec<ModelInfo>, ProbeError> {
        let url = endpoint(base_url, "models");
        tracing::debug!(%url, "Listing OpenAI models");

        let reply = send(self.http.get(&url).bearer_auth(api_key)).await?;
        if !reply.status.is_success() {
            return Err(reply.into_error());
        }

        let list: ModelList = parse_body(&reply.body)?;
        // The API returns models in no particular order
        let mut models: Vec<ModelInfo> = list
            .data
            .into_iter()
            .map(|m| ModelInfo {
                name: m.id.clone(),
                id: m.id,
            })
            .collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(models)
    }

    async fn ping(&self, target: &ProbeTarget<'_>) -> Result<HttpReply, ProbeError> {
        let url = endpoint(target.base_url, "chat/completions");
        tracing::debug!(%url, model = target.model, "Testing OpenAI connection");

        let body = json!({
            "model": target.model,
            "messages": [{"role": "user", "content": "ping"}],
            "max_tokens": 1,
        });
        send(self.http.post(&url).bearer_auth(target.api_key).json(&body)).await
    }
}
