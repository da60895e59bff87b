use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One mock-interview conversation. The referenced resume and job description
/// always belong to the same user as the session; a reference becomes `None`
/// when the owner later deletes the underlying document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub jd_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// One message in a session. `score` is present only on assistant turns that
/// carry an evaluated answer; the first assistant turn (the generated question
/// list) has no score.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TurnRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub position: i32,
    pub role: String,
    pub content: String,
    pub score: Option<f32>,
    pub created_at: DateTime<Utc>,
}

/// Turn role, stored as text in `chat_turns.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl TurnRow {
    /// True for assistant turns that carry an evaluated answer.
    pub fn is_scored_answer(&self) -> bool {
        self.role == Role::Assistant.as_str() && self.score.is_some()
    }
}
