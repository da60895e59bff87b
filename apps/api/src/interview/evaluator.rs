//! Answer evaluation — the RAG core of an interview session.
//!
//! Per answer: derive the current question from persisted turn history, embed
//! the answer, rank the resume's chunks by similarity, prompt the LLM with
//! question + answer + retrieved context, parse the scored feedback, and
//! append the user/assistant turn pair atomically.

use std::sync::LazyLock;

use regex::Regex;
use sqlx::PgPool;
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::interview::prompts::{
    EVALUATION_PROMPT_TEMPLATE, EVALUATION_SYSTEM, NO_CONTEXT_PLACEHOLDER,
};
use crate::interview::questions::split_questions;
use crate::interview::store;
use crate::llm_client::LlmClient;
use crate::models::chat::{ChatSessionRow, Role, TurnRow};
use crate::retrieval::{top_k_texts, CONTEXT_TOP_K};

/// Fallback score when the model's response format drifts.
pub const DEFAULT_SCORE: f32 = 5.0;
const MIN_SCORE: f32 = 1.0;
const MAX_SCORE: f32 = 10.0;
const EVALUATION_MAX_TOKENS: u32 = 300;

static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SCORE:\s*(\d+(?:\.\d+)?)").expect("valid score regex"));
static FEEDBACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)FEEDBACK:\s*(.+)").expect("valid feedback regex"));

/// Result of parsing a model evaluation response. The fallback path is a
/// first-class variant: an `Unparsed` response still produces user-facing
/// feedback (the raw text) and the default score — format drift is never
/// fatal to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Parsed { score: f32, feedback: String },
    Unparsed { raw: String },
}

impl Evaluation {
    pub fn score(&self) -> f32 {
        match self {
            Evaluation::Parsed { score, .. } => *score,
            Evaluation::Unparsed { .. } => DEFAULT_SCORE,
        }
    }

    pub fn feedback(&self) -> &str {
        match self {
            Evaluation::Parsed { feedback, .. } => feedback,
            Evaluation::Unparsed { raw } => raw,
        }
    }
}

/// Extracts `SCORE: <number>` and `FEEDBACK: <text>` from a model response.
/// Both markers must be present for a `Parsed` result; anything else is
/// `Unparsed` with the full raw text preserved. Scores are clamped to 1-10.
pub fn parse_evaluation(raw: &str) -> Evaluation {
    let score = SCORE_RE
        .captures(raw)
        .and_then(|c| c[1].parse::<f32>().ok());
    let feedback = FEEDBACK_RE
        .captures(raw)
        .map(|c| c[1].trim().to_string());

    match (score, feedback) {
        (Some(score), Some(feedback)) => Evaluation::Parsed {
            score: score.clamp(MIN_SCORE, MAX_SCORE),
            feedback,
        },
        _ => Evaluation::Unparsed {
            raw: raw.to_string(),
        },
    }
}

/// Derives the question list from a session's first unscored assistant turn
/// (the persisted question blob).
pub fn questions_from_turns(turns: &[TurnRow]) -> Result<Vec<String>, AppError> {
    let blob = turns
        .iter()
        .find(|t| t.role == Role::Assistant.as_str() && t.score.is_none())
        .map(|t| t.content.as_str())
        .ok_or_else(|| {
            AppError::Validation("Session has no generated questions".to_string())
        })?;

    let questions = split_questions(blob);
    if questions.is_empty() {
        return Err(AppError::Validation(
            "Session has no generated questions".to_string(),
        ));
    }
    Ok(questions)
}

/// The current 0-based question index: one question is consumed per scored
/// assistant turn. Derived server-side from turn history so a client can
/// never answer an arbitrary or mismatched question.
pub fn current_question_index(turns: &[TurnRow]) -> usize {
    turns.iter().filter(|t| t.is_scored_answer()).count()
}

pub struct AnswerOutcome {
    /// The newly appended scored assistant turn.
    pub turn: TurnRow,
    /// Index of the question this answer addressed.
    pub question_index: usize,
    /// Questions still unanswered after this one.
    pub questions_remaining: usize,
}

/// Evaluates one answer against the session's current question.
///
/// External calls run with no transaction open: a slow embedding or LLM
/// backend must never pin pool connections. The append happens in a short
/// per-session advisory-lock transaction that re-derives the question index
/// first, so a concurrent double-submit cannot interleave turn pairs or
/// answer the same question twice — the loser is rejected.
pub async fn evaluate_answer(
    pool: &PgPool,
    llm: &LlmClient,
    embedder: &dyn Embedder,
    session: &ChatSessionRow,
    answer: &str,
) -> Result<AnswerOutcome, AppError> {
    let resume_id = session_resume_id(session)?;

    let turns = store::list_turns(pool, session.id).await?;
    let questions = questions_from_turns(&turns)?;
    let index = current_question_index(&turns);
    if index >= questions.len() {
        return Err(AppError::Validation(
            "All interview questions have already been answered".to_string(),
        ));
    }
    let question = &questions[index];

    let query_vector = embedder
        .embed(answer)
        .await
        .map_err(|e| AppError::Embedding(format!("Failed to embed answer: {e}")))?;

    let candidates: Vec<(String, Vec<f32>)> = store::document_chunks(pool, resume_id)
        .await?
        .into_iter()
        .map(|c| (c.content, c.embedding))
        .collect();
    let retrieved = top_k_texts(&query_vector, &candidates, CONTEXT_TOP_K);
    let context = if retrieved.is_empty() {
        NO_CONTEXT_PLACEHOLDER.to_string()
    } else {
        retrieved.join("\n\n")
    };

    let prompt = EVALUATION_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{answer}", answer)
        .replace("{context}", &context);

    let raw = llm
        .call(&prompt, EVALUATION_SYSTEM, EVALUATION_MAX_TOKENS)
        .await
        .map_err(|e| AppError::Llm(format!("Answer evaluation failed: {e}")))?;

    let evaluation = parse_evaluation(&raw);

    let mut tx = store::begin_session_work(pool, session.id).await?;
    let locked_turns = store::list_turns_tx(&mut tx, session.id).await?;
    verify_question_unchanged(index, &locked_turns)?;
    let turn = store::append_exchange(
        &mut tx,
        session.id,
        answer,
        evaluation.feedback(),
        evaluation.score(),
    )
    .await?;
    tx.commit().await?;

    Ok(AnswerOutcome {
        turn,
        question_index: index,
        questions_remaining: questions.len() - index - 1,
    })
}

/// A session whose resume was deleted after creation can no longer evaluate
/// answers; callers get a not-found for the missing resume.
fn session_resume_id(session: &ChatSessionRow) -> Result<Uuid, AppError> {
    session.resume_id.ok_or_else(|| {
        AppError::NotFound("Resume for this session no longer exists".to_string())
    })
}

/// Rejects the append when another request evaluated an answer for this
/// session while this one was waiting on the embedding/LLM backends.
fn verify_question_unchanged(expected_index: usize, turns: &[TurnRow]) -> Result<(), AppError> {
    if current_question_index(turns) != expected_index {
        return Err(AppError::Validation(
            "Another answer was just evaluated for this session; submit the next answer"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_parse_exact_format() {
        let eval = parse_evaluation("SCORE: 7\nFEEDBACK: Good answer.");
        assert_eq!(
            eval,
            Evaluation::Parsed {
                score: 7.0,
                feedback: "Good answer.".to_string()
            }
        );
        assert_eq!(eval.score(), 7.0);
        assert_eq!(eval.feedback(), "Good answer.");
    }

    #[test]
    fn test_parse_fractional_score() {
        let eval = parse_evaluation("SCORE: 7.5\nFEEDBACK: Solid.");
        assert_eq!(eval.score(), 7.5);
    }

    #[test]
    fn test_parse_clamps_out_of_range_scores() {
        assert_eq!(parse_evaluation("SCORE: 42\nFEEDBACK: x").score(), 10.0);
        assert_eq!(parse_evaluation("SCORE: 0\nFEEDBACK: x").score(), 1.0);
    }

    #[test]
    fn test_parse_multiline_feedback_is_kept_whole() {
        let raw = "SCORE: 6\nFEEDBACK: First line.\nSecond line with detail.";
        let eval = parse_evaluation(raw);
        assert_eq!(eval.feedback(), "First line.\nSecond line with detail.");
    }

    #[test]
    fn test_unrecognized_response_falls_back_to_raw() {
        let raw = "I think the candidate did reasonably well overall.";
        let eval = parse_evaluation(raw);
        assert_eq!(
            eval,
            Evaluation::Unparsed {
                raw: raw.to_string()
            }
        );
        assert_eq!(eval.score(), DEFAULT_SCORE);
        assert_eq!(eval.feedback(), raw);
    }

    #[test]
    fn test_partial_markers_fall_back_to_raw() {
        let eval = parse_evaluation("SCORE: 8\nbut no feedback marker");
        assert_eq!(eval.score(), DEFAULT_SCORE);
    }

    fn turn(role: Role, content: &str, score: Option<f32>) -> TurnRow {
        TurnRow {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            position: 0,
            role: role.as_str().to_string(),
            content: content.to_string(),
            score,
            created_at: Utc::now(),
        }
    }

    fn fresh_session_turns() -> Vec<TurnRow> {
        vec![
            turn(Role::System, "Interview session started.", None),
            turn(Role::Assistant, "Q1?\nQ2?\nQ3?", None),
        ]
    }

    #[test]
    fn test_questions_recovered_from_first_assistant_turn() {
        let questions = questions_from_turns(&fresh_session_turns()).unwrap();
        assert_eq!(questions, vec!["Q1?", "Q2?", "Q3?"]);
    }

    #[test]
    fn test_question_index_starts_at_zero() {
        assert_eq!(current_question_index(&fresh_session_turns()), 0);
    }

    #[test]
    fn test_question_index_advances_once_per_scored_turn() {
        let mut turns = fresh_session_turns();
        turns.push(turn(Role::User, "my answer", None));
        turns.push(turn(Role::Assistant, "feedback", Some(6.0)));
        assert_eq!(current_question_index(&turns), 1);

        turns.push(turn(Role::User, "another answer", None));
        turns.push(turn(Role::Assistant, "feedback", Some(8.0)));
        assert_eq!(current_question_index(&turns), 2);
    }

    #[test]
    fn test_session_without_questions_is_rejected() {
        let turns = vec![turn(Role::System, "Interview session started.", None)];
        assert!(matches!(
            questions_from_turns(&turns),
            Err(AppError::Validation(_))
        ));
    }

    fn session(resume_id: Option<Uuid>) -> ChatSessionRow {
        ChatSessionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            resume_id,
            jd_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_with_resume_resolves_its_id() {
        let resume_id = Uuid::new_v4();
        let id = session_resume_id(&session(Some(resume_id))).unwrap();
        assert_eq!(id, resume_id);
    }

    #[test]
    fn test_deleted_resume_is_reported_missing_not_fatal() {
        // Owners may delete a resume that a session still references; a later
        // answer on that session gets a not-found, never a server error.
        let result = session_resume_id(&session(None));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_append_allowed_when_question_index_unchanged() {
        let turns = fresh_session_turns();
        assert!(verify_question_unchanged(0, &turns).is_ok());
    }

    #[test]
    fn test_append_rejected_when_concurrent_answer_advanced_index() {
        // Simulates losing a double-submit race: another request appended a
        // scored pair while this one was waiting on the external backends.
        let mut turns = fresh_session_turns();
        turns.push(turn(Role::User, "first answer", None));
        turns.push(turn(Role::Assistant, "feedback", Some(7.0)));
        assert!(matches!(
            verify_question_unchanged(0, &turns),
            Err(AppError::Validation(_))
        ));
        assert!(verify_question_unchanged(1, &turns).is_ok());
    }
}
