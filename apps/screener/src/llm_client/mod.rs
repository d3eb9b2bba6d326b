/// LLM Client — the single point of entry for all generative-service calls.
///
/// ARCHITECTURAL RULE: No other module may call the generative or embedding
/// API directly. All model interactions MUST go through this module, behind
/// the `TextGenerator` / `Embedder` traits so the pipeline can be exercised
/// with test doubles.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const GENERATE_PATH: &str = "/api/generate";
const EMBEDDINGS_PATH: &str = "/api/embeddings";
const MAX_RETRIES: u32 = 3;

/// Transport-level failure talking to the generative service. Distinct from
/// a content-level sentinel parse: this means a candidate could not be
/// evaluated at all.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Service unavailable after {retries} retries")]
    Exhausted { retries: u32 },

    #[error("Model returned empty content")]
    EmptyContent,
}

/// Produces a free-text completion for a prompt. One call per resume.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Maps a text block to a fixed-dimension vector. Pure function of its
/// input: no state carried between calls, so embedding order is irrelevant.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: DecodingOptions,
}

/// Do-not-sample decoding. Repeated runs against unchanged inputs must
/// produce a stable comparison baseline.
#[derive(Debug, Serialize)]
struct DecodingOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

/// The single client used for both text generation and embeddings.
/// Wraps an Ollama-style API with retry and exponential backoff.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    generation_model: String,
    embedding_model: String,
}

impl LlmClient {
    pub fn new(base_url: String, generation_model: String, embedding_model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            generation_model,
            embedding_model,
        }
    }

    /// POSTs a JSON body, retrying on connection errors, 429 and 5xx with
    /// exponential backoff (1s, 2s, 4s).
    async fn post_with_retry<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&url).json(body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json::<R>().await?);
        }

        Err(last_error.unwrap_or(LlmError::Exhausted {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model: &self.generation_model,
            prompt,
            stream: false,
            options: DecodingOptions { temperature: 0.0 },
        };

        let response: GenerateResponse = self.post_with_retry(GENERATE_PATH, &request).await?;

        if response.response.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!(
            model = %self.generation_model,
            reply_len = response.response.len(),
            "generation call succeeded"
        );
        Ok(response.response)
    }
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = EmbeddingsRequest {
            model: &self.embedding_model,
            prompt: text,
        };

        let response: EmbeddingsResponse = self.post_with_retry(EMBEDDINGS_PATH, &request).await?;

        if response.embedding.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!(
            model = %self.embedding_model,
            dimensions = response.embedding.len(),
            "embedding call succeeded"
        );
        Ok(response.embedding)
    }
}
