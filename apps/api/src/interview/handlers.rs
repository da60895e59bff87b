//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::documents::handlers::UserIdQuery;
use crate::errors::AppError;
use crate::interview::evaluator::evaluate_answer;
use crate::interview::questions::generate_questions;
use crate::interview::store;
use crate::models::chat::{ChatSessionRow, TurnRow};
use crate::models::document::DocKind;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: ChatSessionRow,
    pub turns: Vec<TurnRow>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub user_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    /// The scored assistant feedback turn.
    pub turn: TurnRow,
    /// 0-based index of the question that was answered.
    pub question_index: usize,
    /// Questions still unanswered; the client disables input at zero.
    pub questions_remaining: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews/start
///
/// Finds the caller's most recent resume and job description, generates three
/// interview questions from the JD, and creates a session with its two
/// opening turns (system marker, assistant question list).
pub async fn handle_start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let resume = store::latest_document(&state.db, request.user_id, DocKind::Resume).await?;
    let jd = store::latest_document(&state.db, request.user_id, DocKind::JobDescription).await?;

    let (resume, jd) = match (resume, jd) {
        (Some(resume), Some(jd)) => (resume, jd),
        _ => {
            return Err(AppError::NotFound(
                "Resume and/or job description not found. Upload both before starting an interview."
                    .to_string(),
            ))
        }
    };

    let jd_text = store::document_chunks(&state.db, jd.id)
        .await?
        .into_iter()
        .map(|c| c.content)
        .collect::<Vec<_>>()
        .join(" ");

    let questions_blob = generate_questions(&jd_text, &state.llm).await?;

    let (session, turns) =
        store::create_session(&state.db, request.user_id, resume.id, jd.id, &questions_blob)
            .await?;

    Ok((StatusCode::CREATED, Json(SessionResponse { session, turns })))
}

/// POST /api/v1/interviews/:id/answer
///
/// Evaluates the caller's answer to the session's current question (derived
/// server-side from turn history) and appends the user/assistant turn pair.
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    if request.answer.trim().is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }

    let session = store::get_session_owned(&state.db, session_id, request.user_id).await?;

    let outcome = evaluate_answer(
        &state.db,
        &state.llm,
        state.embedder.as_ref(),
        &session,
        &request.answer,
    )
    .await?;

    Ok(Json(AnswerResponse {
        turn: outcome.turn,
        question_index: outcome.question_index,
        questions_remaining: outcome.questions_remaining,
    }))
}

/// GET /api/v1/interviews/:id?user_id=
///
/// Returns the session and its full turn history, owner-only.
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = store::get_session_owned(&state.db, session_id, params.user_id).await?;
    let turns = store::list_turns(&state.db, session_id).await?;

    Ok(Json(SessionResponse { session, turns }))
}
