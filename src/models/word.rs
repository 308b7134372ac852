use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Word {
    pub id: Uuid,
    pub japanese_meaning: String,
    pub synonyms: Vec<String>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WordAnswer {
    pub id: Uuid,
    pub word_id: Uuid,
    pub answer: String,
    pub is_primary: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// A word together with its answers, primary answer first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordWithAnswers {
    #[serde(flatten)]
    pub word: Word,
    pub answers: Vec<WordAnswer>,
}

impl WordWithAnswers {
    pub fn answer_texts(&self) -> Vec<String> {
        self.answers.iter().map(|a| a.answer.clone()).collect()
    }
}

/// Projection used when drawing questions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SampledWord {
    pub id: Uuid,
    pub japanese_meaning: String,
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRef {
    pub answer: String,
    pub is_primary: bool,
}

/// Validated input for a new word. The first answer becomes the primary one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWord {
    pub japanese_meaning: String,
    pub answers: Vec<String>,
    pub synonyms: Vec<String>,
}

/// Partial update. `None` leaves a field untouched; `Some(vec![])` on
/// `answers` or `synonyms` is a real replacement with an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordChanges {
    pub japanese_meaning: Option<String>,
    pub answers: Option<Vec<String>>,
    pub synonyms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl ActiveFilter {
    pub fn matches(self, is_active: bool) -> bool {
        match self {
            ActiveFilter::Active => is_active,
            ActiveFilter::Inactive => !is_active,
            ActiveFilter::All => true,
        }
    }

    /// `None` means no filter on the column.
    pub fn as_column_value(self) -> Option<bool> {
        match self {
            ActiveFilter::Active => Some(true),
            ActiveFilter::Inactive => Some(false),
            ActiveFilter::All => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordFilter {
    pub search: Option<String>,
    pub status: ActiveFilter,
    pub limit: i64,
    pub offset: i64,
}
