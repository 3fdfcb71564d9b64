// OpenAI-compatible embeddings API implementation.
//
// POST {base_url}/embeddings with {"model", "input": [texts]} and a bearer
// token. The whole batch goes out in one request. Each response item carries
// the index of the input it belongs to; we sort by that index and refuse
// responses with missing or duplicated indices instead of trusting the order
// of the `data` array.
//
// API docs: https://platform.openai.com/docs/api-reference/embeddings

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::EmbeddingProvider;
use crate::error::{PipelineError, PipelineResult};

/// Default API endpoint (anything speaking the same wire format works).
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// HTTP embedding provider for the OpenAI embeddings endpoint.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    /// Create a provider with an explicit credential and request timeout.
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("dreadmap/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed_batch(&self, model: &str, texts: &[String]) -> PipelineResult<Vec<Vec<f64>>> {
        let url = format!("{}/embeddings", self.base_url);

        let request = EmbeddingRequest {
            model,
            input: texts,
        };

        debug!(model = model, inputs = texts.len(), "Embedding request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(&url, "failed to call", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::ProviderError(format!(
                "embeddings API returned {status}: {body}"
            )));
        }

        // The client timeout also covers reading the body.
        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| transport_error(&url, "failed to parse embeddings response from", e))?;

        if let Some(usage) = &result.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                total_tokens = usage.total_tokens,
                "Embedding usage"
            );
        }

        order_by_index(result.data, texts.len())
    }
}

/// Map a reqwest failure to `ProviderError`, naming timeouts as such.
fn transport_error(url: &str, what: &str, e: reqwest::Error) -> PipelineError {
    if e.is_timeout() {
        PipelineError::ProviderError(format!("request to {url} timed out"))
    } else {
        PipelineError::ProviderError(format!("{what} {url}: {e}"))
    }
}

/// Place each response item at the position its `index` names.
///
/// Fails with `DimensionMismatch` if any input position is missing, repeated,
/// or out of range.
fn order_by_index(items: Vec<EmbeddingItem>, expected: usize) -> PipelineResult<Vec<Vec<f64>>> {
    if items.len() != expected {
        return Err(PipelineError::DimensionMismatch(format!(
            "requested {expected} embeddings, provider returned {}",
            items.len()
        )));
    }

    let mut slots: Vec<Option<Vec<f64>>> = vec![None; expected];
    for item in items {
        let slot = slots.get_mut(item.index).ok_or_else(|| {
            PipelineError::DimensionMismatch(format!(
                "response index {} is outside the {expected} inputs",
                item.index
            ))
        })?;
        if slot.is_some() {
            return Err(PipelineError::DimensionMismatch(format!(
                "response index {} appears twice",
                item.index
            )));
        }
        *slot = Some(item.embedding);
    }

    // Lengths match and there are no duplicates, so every slot is filled.
    Ok(slots.into_iter().flatten().collect())
}

// --- Embeddings API request/response types ---

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f64>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    total_tokens: u64,
}
