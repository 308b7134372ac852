use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::WordRepository;
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::services::fallback_session_store::{with_fallback, Served};
use crate::services::grading_service::GradingService;
use crate::services::session_store::{select_questions, MAX_QUESTIONS, MIN_QUESTIONS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCheck {
    pub is_correct: bool,
    pub user_answer: String,
}

/// Free practice outside of sessions, with the same database-first policy as
/// the session store.
#[derive(Clone)]
pub struct WordPracticeService {
    primary: Arc<dyn WordRepository>,
    fallback: Arc<dyn WordRepository>,
}

impl WordPracticeService {
    pub fn new(primary: Arc<dyn WordRepository>, fallback: Arc<dyn WordRepository>) -> Self {
        Self { primary, fallback }
    }

    pub async fn random_words(&self, count: i32) -> Result<Served<Vec<Question>>> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count) {
            return Err(Error::BadRequest(format!(
                "count must be between {} and {}, got {}",
                MIN_QUESTIONS, MAX_QUESTIONS, count
            )));
        }
        with_fallback(
            "random_words",
            self.primary.as_ref(),
            self.fallback.as_ref(),
            |words| Box::pin(select_questions(words, count)),
        )
        .await
    }

    pub async fn get_word(&self, id: Uuid) -> Result<Served<Question>> {
        with_fallback(
            "get_word",
            self.primary.as_ref(),
            self.fallback.as_ref(),
            |words| {
                Box::pin(async move {
                    let word = words
                        .find_word_by_id(id)
                        .await?
                        .filter(|w| w.word.is_active)
                        .ok_or(Error::WordNotFound(id))?;
                    Ok(Question {
                        id: word.word.id,
                        answers: word.answer_texts(),
                        japanese_meaning: word.word.japanese_meaning,
                        synonyms: word.word.synonyms,
                    })
                })
            },
        )
        .await
    }

    pub async fn check_answer(&self, id: Uuid, answer: &str) -> Result<Served<AnswerCheck>> {
        with_fallback(
            "check_answer",
            self.primary.as_ref(),
            self.fallback.as_ref(),
            |words| {
                Box::pin(async move {
                    let word = words
                        .find_word_by_id(id)
                        .await?
                        .ok_or(Error::WordNotFound(id))?;
                    let accepted = word.answer_texts();
                    Ok(AnswerCheck {
                        is_correct: GradingService::is_correct(&accepted, answer),
                        user_answer: answer.trim().to_string(),
                    })
                })
            },
        )
        .await
    }
}
