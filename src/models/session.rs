use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::question::Question;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_questions: i32,
    pub completed_questions: i32,
    pub is_completed: bool,
    pub questions_snapshot: Json<Vec<Question>>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn question(&self, word_id: Uuid) -> Option<&Question> {
        self.questions_snapshot.iter().find(|q| q.id == word_id)
    }
}
