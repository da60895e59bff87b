//! Embedding backend — wraps the OpenAI embeddings API behind a trait so
//! handlers and tests can inject a stub via `Arc<dyn Embedder>`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
/// The embedding model used for all chunks and queries.
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Output dimensionality of `EMBEDDING_MODEL`. A stored chunk embedding is
/// either empty (failure sentinel) or exactly this long.
pub const EMBEDDING_DIM: usize = 1536;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding response contained no vectors")]
    EmptyResponse,
}

/// Semantic embedding backend. Callers decide how to treat failure: the
/// upload path degrades to an empty vector, the query path propagates.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI embeddings client with a bounded request timeout. Timeout expiry
/// surfaces as an HTTP error, i.e. backend-unavailable.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = normalize_for_embedding(text);
        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: EMBEDDING_MODEL,
                input: &input,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response.json().await?;
        let vector = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::EmptyResponse)?;

        debug!("Embedded {} chars into {} dims", input.len(), vector.len());
        Ok(vector)
    }
}

/// Collapses newlines to spaces before sending text to the embedding API.
/// Stored chunk text is never altered; only the embedding input is.
pub fn normalize_for_embedding(text: &str) -> String {
    text.replace('\n', " ")
}
