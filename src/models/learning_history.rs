use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One graded answer. Rows are append-only and unique per (session, word).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearningHistory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub word_id: Uuid,
    pub session_id: Uuid,
    pub is_correct: bool,
    pub user_answer: String,
    pub answered_at: DateTime<Utc>,
}

/// History row joined with the word it refers to, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearningHistoryEntry {
    pub id: Uuid,
    pub word_id: Uuid,
    pub japanese_meaning: String,
    pub session_id: Uuid,
    pub is_correct: bool,
    pub user_answer: String,
    pub answered_at: DateTime<Utc>,
}
