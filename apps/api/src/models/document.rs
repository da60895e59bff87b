use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One uploaded file. Immutable after creation except `embedding_failed`.
/// Chunks live in `document_chunks`, ordered by `position`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub doc_type: String,
    pub file_name: String,
    pub file_url: String,
    pub embedding_failed: bool,
    pub created_at: DateTime<Utc>,
}

/// A contiguous slice of a document's extracted text plus its embedding.
/// `embedding` is empty when the embedding call failed for this chunk,
/// otherwise exactly `embedding::EMBEDDING_DIM` floats.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChunkRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub position: i32,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// Document kind, stored as text in `documents.doc_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    Resume,
    JobDescription,
}

impl DocKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Resume => "resume",
            DocKind::JobDescription => "job_description",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "resume" => Some(DocKind::Resume),
            "job_description" => Some(DocKind::JobDescription),
            _ => None,
        }
    }
}
