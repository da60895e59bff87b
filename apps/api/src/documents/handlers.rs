//! Axum route handlers for the Documents API.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::documents::ingest::ingest_document;
use crate::errors::AppError;
use crate::models::document::{DocKind, DocumentRow};
use crate::models::ensure_owned;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub document: DocumentRow,
    pub chunk_count: usize,
}

/// POST /api/v1/documents/upload
///
/// Multipart fields: `file` (PDF bytes), `type` (`resume` | `job_description`),
/// `user_id`. Missing fields and empty extraction are rejected before any
/// external call; embedding failure still returns 201 with the document
/// flagged `embedding_failed`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut doc_type: Option<String> = None;
    let mut user_id: Option<Uuid> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("document.pdf").to_string();
                let data = field.bytes().await.map_err(bad_multipart)?;
                file = Some((name, data));
            }
            Some("type") => doc_type = Some(field.text().await.map_err(bad_multipart)?),
            Some("user_id") => {
                let raw = field.text().await.map_err(bad_multipart)?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation("user_id must be a valid UUID".to_string()))?;
                user_id = Some(id);
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let doc_type =
        doc_type.ok_or_else(|| AppError::Validation("Document type is required".to_string()))?;
    let kind = DocKind::parse(doc_type.trim()).ok_or_else(|| {
        AppError::Validation("type must be 'resume' or 'job_description'".to_string())
    })?;
    let user_id =
        user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;

    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let result = ingest_document(
        &state.db,
        &state.s3,
        &state.config,
        state.embedder.as_ref(),
        user_id,
        kind,
        &file_name,
        &data,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Document uploaded and processed successfully".to_string(),
            document: result.document,
            chunk_count: result.chunk_count,
        }),
    ))
}

/// GET /api/v1/documents?user_id=
///
/// Returns the caller's documents newest-first. Chunk payloads are never
/// included in listings.
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<DocumentRow>>, AppError> {
    let documents = sqlx::query_as::<_, DocumentRow>(
        "SELECT * FROM documents WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(params.user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(documents))
}

/// DELETE /api/v1/documents/:id?user_id=
///
/// Owner-only. Chunks are removed with the document (FK cascade); the stored
/// S3 blob is retained — object storage is treated as append-only.
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let document =
        sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = $1")
            .bind(document_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))?;

    ensure_owned(document.user_id, params.user_id)?;

    sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(document_id)
        .execute(&state.db)
        .await?;

    Ok(Json(
        serde_json::json!({ "message": "Document deleted successfully" }),
    ))
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart payload: {e}"))
}
