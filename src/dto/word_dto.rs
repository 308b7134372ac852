use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::word::{ActiveFilter, NewWord, Word, WordChanges, WordWithAnswers};
use crate::services::word_batch_writer::BatchReport;
use crate::utils::validation::{
    clean_list, validate_answer_items, validate_not_blank, validate_synonym_items,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateWordPayload {
    #[validate(length(min = 1, max = 500), custom(function = "validate_not_blank"))]
    pub japanese_meaning: String,
    #[validate(length(min = 1, max = 10), custom(function = "validate_answer_items"))]
    pub answers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20), custom(function = "validate_synonym_items"))]
    pub synonyms: Option<Vec<String>>,
}

impl From<CreateWordPayload> for NewWord {
    fn from(payload: CreateWordPayload) -> Self {
        Self {
            japanese_meaning: payload.japanese_meaning.trim().to_string(),
            answers: clean_list(payload.answers),
            synonyms: clean_list(payload.synonyms.unwrap_or_default()),
        }
    }
}

/// `answers: null` or an absent key leaves answers untouched; `answers: []`
/// clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateWordPayload {
    #[validate(length(min = 1, max = 500), custom(function = "validate_not_blank"))]
    pub japanese_meaning: Option<String>,
    #[validate(length(max = 10), custom(function = "validate_answer_items"))]
    pub answers: Option<Vec<String>>,
    #[validate(length(max = 20), custom(function = "validate_synonym_items"))]
    pub synonyms: Option<Vec<String>>,
}

impl From<UpdateWordPayload> for WordChanges {
    fn from(payload: UpdateWordPayload) -> Self {
        Self {
            japanese_meaning: payload.japanese_meaning.map(|m| m.trim().to_string()),
            answers: payload.answers.map(clean_list),
            synonyms: payload.synonyms.map(clean_list),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BatchCreateWordsPayload {
    #[validate(length(min = 1, max = 100), nested)]
    pub words: Vec<CreateWordPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WordListQuery {
    pub search: Option<String>,
    pub status: Option<ActiveFilter>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub id: Uuid,
    pub answer: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordResponse {
    pub id: Uuid,
    pub japanese_meaning: String,
    pub answers: Vec<AnswerResponse>,
    pub synonyms: Vec<String>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WordWithAnswers> for WordResponse {
    fn from(value: WordWithAnswers) -> Self {
        Self {
            id: value.word.id,
            japanese_meaning: value.word.japanese_meaning,
            answers: value
                .answers
                .into_iter()
                .map(|a| AnswerResponse {
                    id: a.id,
                    answer: a.answer,
                    is_primary: a.is_primary,
                })
                .collect(),
            synonyms: value.word.synonyms,
            is_active: value.word.is_active,
            deleted_at: value.word.deleted_at,
            created_at: value.word.created_at,
            updated_at: value.word.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedWordResponse {
    pub id: Uuid,
    pub japanese_meaning: String,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Word> for DeletedWordResponse {
    fn from(word: Word) -> Self {
        Self {
            id: word.id,
            japanese_meaning: word.japanese_meaning,
            is_active: word.is_active,
            deleted_at: word.deleted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_next: bool,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, limit: i64, offset: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            total,
            limit,
            offset,
            has_next: offset + limit < total,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordListResponse {
    pub items: Vec<WordResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCreateResponse {
    pub created: usize,
    pub failed: usize,
    pub errors: Vec<BatchItemErrorResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemErrorResponse {
    pub index: usize,
    pub japanese_meaning: String,
    pub error: String,
}

impl From<BatchReport> for BatchCreateResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            created: report.created,
            failed: report.failed,
            errors: report
                .errors
                .into_iter()
                .map(|e| BatchItemErrorResponse {
                    index: e.index,
                    japanese_meaning: e.japanese_meaning,
                    error: e.error,
                })
                .collect(),
        }
    }
}

/// Body returned when CSV input cannot be turned into word records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRejectedResponse {
    pub success: bool,
    pub errors: Vec<String>,
}
