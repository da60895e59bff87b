//! Session store — sqlx persistence for interview sessions and turns.
//!
//! Every read that crosses a user boundary enforces ownership here, and the
//! two turns of an evaluation cycle are only ever written together.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::chat::{ChatSessionRow, Role, TurnRow};
use crate::models::document::{ChunkRow, DocKind, DocumentRow};
use crate::models::ensure_owned;

/// Content of the system turn that opens every session.
pub const SESSION_OPENED: &str = "Interview session started.";

/// Returns the user's most recently uploaded document of the given kind.
pub async fn latest_document(
    pool: &PgPool,
    user_id: Uuid,
    kind: DocKind,
) -> Result<Option<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT * FROM documents
        WHERE user_id = $1 AND doc_type = $2
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(kind.as_str())
    .fetch_optional(pool)
    .await
}

/// Returns a document's chunks in original order.
pub async fn document_chunks(
    pool: &PgPool,
    document_id: Uuid,
) -> Result<Vec<ChunkRow>, sqlx::Error> {
    sqlx::query_as::<_, ChunkRow>(
        "SELECT * FROM document_chunks WHERE document_id = $1 ORDER BY position ASC",
    )
    .bind(document_id)
    .fetch_all(pool)
    .await
}

/// Creates a session with its two opening turns (system marker, assistant
/// question blob) in one transaction.
pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
    jd_id: Uuid,
    questions_blob: &str,
) -> Result<(ChatSessionRow, Vec<TurnRow>), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let session = sqlx::query_as::<_, ChatSessionRow>(
        r#"
        INSERT INTO chat_sessions (id, user_id, resume_id, jd_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(resume_id)
    .bind(jd_id)
    .fetch_one(&mut *tx)
    .await?;

    let system_turn =
        insert_turn(&mut tx, session.id, 0, Role::System, SESSION_OPENED, None).await?;
    let questions_turn =
        insert_turn(&mut tx, session.id, 1, Role::Assistant, questions_blob, None).await?;

    tx.commit().await?;

    info!("Created interview session {} for user {user_id}", session.id);
    Ok((session, vec![system_turn, questions_turn]))
}

/// Loads a session, enforcing ownership. A session owned by someone else is
/// `Forbidden` with the same generic body as any other denial, so existence
/// of other users' sessions is not leaked.
pub async fn get_session_owned(
    pool: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<ChatSessionRow, AppError> {
    let session = sqlx::query_as::<_, ChatSessionRow>("SELECT * FROM chat_sessions WHERE id = $1")
        .bind(session_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    ensure_owned(session.user_id, user_id)?;

    Ok(session)
}

/// Returns a session's turns in order.
pub async fn list_turns(pool: &PgPool, session_id: Uuid) -> Result<Vec<TurnRow>, sqlx::Error> {
    sqlx::query_as::<_, TurnRow>(
        "SELECT * FROM chat_turns WHERE session_id = $1 ORDER BY position ASC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
}

/// Opens a transaction holding a per-session advisory lock. Concurrent
/// evaluation requests against the same session queue here, which is what
/// keeps turn pairs from interleaving on a double-submit.
pub async fn begin_session_work(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
        .bind(session_id)
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Transaction-scoped variant of `list_turns`, for reads that must see the
/// state protected by the session lock.
pub async fn list_turns_tx(
    tx: &mut Transaction<'static, Postgres>,
    session_id: Uuid,
) -> Result<Vec<TurnRow>, sqlx::Error> {
    sqlx::query_as::<_, TurnRow>(
        "SELECT * FROM chat_turns WHERE session_id = $1 ORDER BY position ASC",
    )
    .bind(session_id)
    .fetch_all(&mut **tx)
    .await
}

/// Appends the user answer and the scored assistant feedback as consecutive
/// turns inside the caller's locked transaction. Returns the assistant turn.
pub async fn append_exchange(
    tx: &mut Transaction<'static, Postgres>,
    session_id: Uuid,
    answer: &str,
    feedback: &str,
    score: f32,
) -> Result<TurnRow, sqlx::Error> {
    let max_position: i32 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), -1) FROM chat_turns WHERE session_id = $1",
    )
    .bind(session_id)
    .fetch_one(&mut **tx)
    .await?;

    insert_turn(tx, session_id, max_position + 1, Role::User, answer, None).await?;
    insert_turn(
        tx,
        session_id,
        max_position + 2,
        Role::Assistant,
        feedback,
        Some(score),
    )
    .await
}

async fn insert_turn(
    tx: &mut Transaction<'static, Postgres>,
    session_id: Uuid,
    position: i32,
    role: Role,
    content: &str,
    score: Option<f32>,
) -> Result<TurnRow, sqlx::Error> {
    sqlx::query_as::<_, TurnRow>(
        r#"
        INSERT INTO chat_turns (id, session_id, position, role, content, score)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(position)
    .bind(role.as_str())
    .bind(content)
    .bind(score)
    .fetch_one(&mut **tx)
    .await
}
