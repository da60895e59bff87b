use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    /// Pluggable embedding backend. Production: `OpenAiEmbedder`; tests stub it.
    pub embedder: Arc<dyn Embedder>,
    pub config: Config,
}
