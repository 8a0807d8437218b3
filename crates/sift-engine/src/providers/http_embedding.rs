//! Embeddings client implementing [`IEmbeddingProvider`] over `reqwest::blocking`.
//!
//! The blocking client is built on first use, so constructing the provider inside
//! an async runtime is fine; calls must still come from a blocking context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sift_core::config::EmbeddingConfig;
use sift_core::traits::IEmbeddingProvider;
use sift_core::{SiftError, SiftResult};
use tracing::{debug, warn};

use super::api_key_from_env;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct HttpEmbeddingProvider {
    client: OnceLock<reqwest::blocking::Client>,
    endpoint: String,
    model_version: String,
    dimensions: usize,
    api_key: Option<String>,
    available: AtomicBool,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> SiftResult<Self> {
        if config.dimensions == 0 {
            return Err(embed_err("configured dimensions must be positive"));
        }
        Ok(Self {
            client: OnceLock::new(),
            endpoint: config.endpoint.clone(),
            model_version: config.model_version.clone(),
            dimensions: config.dimensions,
            api_key: api_key_from_env(&config.api_key_env),
            available: AtomicBool::new(true),
        })
    }

    fn client(&self) -> SiftResult<&reqwest::blocking::Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .build()
            .map_err(|e| embed_err(format!("http client: {e}")))?;
        Ok(self.client.get_or_init(|| client))
    }

    /// Send with exponential backoff; after the last failure the provider reports unavailable.
    fn request_embeddings(&self, texts: &[String]) -> SiftResult<Vec<Vec<f32>>> {
        let mut last_err = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                std::thread::sleep(Duration::from_millis(100 * 2u64.pow(attempt - 1)));
                debug!(attempt, "retrying embedding request");
            }
            match self.send(texts) {
                Ok(vectors) => {
                    self.available.store(true, Ordering::Relaxed);
                    return Ok(vectors);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "embedding request failed");
                    last_err = Some(e);
                }
            }
        }
        self.available.store(false, Ordering::Relaxed);
        Err(last_err.unwrap_or_else(|| embed_err("all retries exhausted")))
    }

    fn send(&self, texts: &[String]) -> SiftResult<Vec<Vec<f32>>> {
        let mut request = self.client()?.post(&self.endpoint).json(&EmbedRequest {
            model: &self.model_version,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .map_err(|e| embed_err(format!("http error: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| embed_err(format!("reading response: {e}")))?;
        if !status.is_success() {
            return Err(embed_err(format!("embedding service returned {status}")));
        }
        parse_embeddings(&body, texts.len(), self.dimensions)
    }
}

/// Vectors in input order. The service may answer out of order; `index` decides.
fn parse_embeddings(body: &str, expected: usize, dimensions: usize) -> SiftResult<Vec<Vec<f32>>> {
    let response: EmbedResponse =
        serde_json::from_str(body).map_err(|e| embed_err(format!("malformed response: {e}")))?;
    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for item in response.data {
        if item.embedding.len() != dimensions {
            return Err(embed_err(format!(
                "expected {dimensions} dimensions, got {}",
                item.embedding.len()
            )));
        }
        match slots.get_mut(item.index) {
            Some(slot) => *slot = Some(item.embedding),
            None => return Err(embed_err(format!("index {} out of range", item.index))),
        }
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| embed_err(format!("missing embedding for input {i}"))))
        .collect()
}

fn embed_err(reason: impl Into<String>) -> SiftError {
    SiftError::EmbeddingFailed {
        reason: reason.into(),
    }
}

impl IEmbeddingProvider for HttpEmbeddingProvider {
    fn embed(&self, text: &str) -> SiftResult<Vec<f32>> {
        self.request_embeddings(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| embed_err("empty response"))
    }

    fn embed_batch(&self, texts: &[String]) -> SiftResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }

    fn name(&self) -> &str {
        "http-embeddings"
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }
}
