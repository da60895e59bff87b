//! Upload pipeline: validate → extract text → store PDF in S3 → chunk →
//! embed (degrading on failure) → persist document + chunks.

use aws_sdk_s3::primitives::ByteStream;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::documents::chunking::{chunk_words, DEFAULT_WORDS_PER_CHUNK};
use crate::documents::extract::extract_pdf_text;
use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::models::document::{DocKind, DocumentRow};

pub struct IngestResult {
    pub document: DocumentRow,
    pub chunk_count: usize,
}

/// Runs the full upload pipeline for one PDF.
///
/// Embedding failures do not abort the upload: the affected chunks are stored
/// with empty vectors and the document is flagged `embedding_failed`, so a
/// quota-limited embedding backend never blocks users from uploading.
pub async fn ingest_document(
    pool: &PgPool,
    s3: &aws_sdk_s3::Client,
    config: &Config,
    embedder: &dyn Embedder,
    user_id: Uuid,
    kind: DocKind,
    file_name: &str,
    data: &[u8],
) -> Result<IngestResult, AppError> {
    // Validation and extraction happen before any external call persists state.
    let text = extract_pdf_text(data)?;

    let document_id = Uuid::new_v4();
    let s3_key = format!("documents/{user_id}/{document_id}.pdf");

    s3.put_object()
        .bucket(&config.s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(data.to_vec()))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("PDF upload failed: {e}")))?;

    let file_url = format!(
        "{}/{}/{}",
        config.s3_endpoint.trim_end_matches('/'),
        config.s3_bucket,
        s3_key
    );

    let chunks = chunk_words(&text, DEFAULT_WORDS_PER_CHUNK);
    let (vectors, embedding_failed) = embed_chunks(embedder, &chunks).await;

    if embedding_failed {
        warn!(
            "Embedding degraded for document {document_id}: storing {} chunk(s) with empty vectors",
            vectors.iter().filter(|v| v.is_empty()).count()
        );
    }

    // Document and chunks land together or not at all.
    let mut tx = pool.begin().await?;

    let document = sqlx::query_as::<_, DocumentRow>(
        r#"
        INSERT INTO documents (id, user_id, doc_type, file_name, file_url, embedding_failed)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(document_id)
    .bind(user_id)
    .bind(kind.as_str())
    .bind(file_name)
    .bind(&file_url)
    .bind(embedding_failed)
    .fetch_one(&mut *tx)
    .await?;

    for (position, (content, embedding)) in chunks.iter().zip(vectors.iter()).enumerate() {
        sqlx::query(
            r#"
            INSERT INTO document_chunks (id, document_id, position, content, embedding)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(document_id)
        .bind(position as i32)
        .bind(content)
        .bind(embedding)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "Ingested {} document {document_id} for user {user_id}: {} chunk(s), embedding_failed={embedding_failed}",
        kind.as_str(),
        chunks.len()
    );

    Ok(IngestResult {
        chunk_count: chunks.len(),
        document,
    })
}

/// Embeds chunks sequentially, one call per chunk. A failed call becomes an
/// empty vector; the second element of the result reports whether any chunk
/// degraded. Output order always matches input order.
pub async fn embed_chunks(embedder: &dyn Embedder, chunks: &[String]) -> (Vec<Vec<f32>>, bool) {
    let mut vectors = Vec::with_capacity(chunks.len());
    let mut any_failed = false;

    for chunk in chunks {
        match embedder.embed(chunk).await {
            Ok(vector) => vectors.push(vector),
            Err(e) => {
                warn!("Embedding skipped for one chunk: {e}");
                any_failed = true;
                vectors.push(Vec::new());
            }
        }
    }

    (vectors, any_failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingError;
    use async_trait::async_trait;

    /// Fails every call, like a quota-exhausted backend.
    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Api {
                status: 429,
                message: "quota exceeded".to_string(),
            })
        }
    }

    /// Succeeds for every chunk except ones containing "poison".
    struct FlakyEmbedder;

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if text.contains("poison") {
                Err(EmbeddingError::EmptyResponse)
            } else {
                Ok(vec![1.0, 0.0])
            }
        }
    }

    fn chunks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_total_embedding_failure_degrades_every_chunk() {
        let (vectors, failed) =
            embed_chunks(&FailingEmbedder, &chunks(&["first", "second"])).await;
        assert!(failed);
        assert_eq!(vectors, vec![Vec::<f32>::new(), Vec::<f32>::new()]);
    }

    #[tokio::test]
    async fn test_partial_failure_preserves_order_and_sets_flag() {
        let (vectors, failed) =
            embed_chunks(&FlakyEmbedder, &chunks(&["ok one", "poison", "ok two"])).await;
        assert!(failed);
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0], vec![1.0, 0.0]);
        assert!(vectors[1].is_empty());
        assert_eq!(vectors[2], vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_all_success_leaves_flag_unset() {
        let (vectors, failed) = embed_chunks(&FlakyEmbedder, &chunks(&["a", "b"])).await;
        assert!(!failed);
        assert!(vectors.iter().all(|v| !v.is_empty()));
    }

    #[tokio::test]
    async fn test_no_chunks_means_no_failure() {
        let (vectors, failed) = embed_chunks(&FailingEmbedder, &[]).await;
        assert!(!failed);
        assert!(vectors.is_empty());
    }
}
