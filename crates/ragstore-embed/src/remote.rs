//! HTTP embedder speaking the OpenAI embeddings protocol.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ragstore_core::config::EmbeddingConfig;
use ragstore_core::traits::EmbeddingModel;
use ragstore_core::{Error, Result};

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedding model served over HTTP.
///
/// The API key is read from the environment variable named in the
/// config; requests are sent unauthenticated when it is unset, which
/// suits local inference servers speaking the same protocol.
pub struct RemoteEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    dim: usize,
}

impl RemoteEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Embedding(format!("http client: {e}")))?;
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            debug!(var = %config.api_key_env, "no API key in environment, sending unauthenticated");
        }
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            dim: config.dim,
        })
    }
}

#[async_trait]
impl EmbeddingModel for RemoteEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/embeddings", self.base_url);
        let mut request = self.client.post(&url).json(&EmbeddingsRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("request to {url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "embedding service returned {status}: {body}"
            )));
        }
        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("malformed response: {e}")))?;

        if parsed.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }
        let mut rows = parsed.data;
        rows.sort_by_key(|row| row.index);
        let mut vectors = Vec::with_capacity(rows.len());
        for row in rows {
            if row.embedding.len() != self.dim {
                return Err(Error::Embedding(format!(
                    "embedding dim mismatch: got {}, expected {}",
                    row.embedding.len(),
                    self.dim
                )));
            }
            vectors.push(row.embedding);
        }
        Ok(vectors)
    }
}
