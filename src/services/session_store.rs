use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::WordRepository;
use crate::error::{Error, Result};
use crate::models::question::Question;

pub const MIN_QUESTIONS: i32 = 1;
pub const MAX_QUESTIONS: i32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: Uuid,
    pub total_questions: i32,
    pub questions: Vec<Question>,
}

/// Result of grading one answer. The full answer key is always returned so
/// the learner can see it regardless of correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_answers: Vec<String>,
    pub user_answer: String,
    pub synonyms: Vec<String>,
    pub completed_questions: i32,
    pub total_questions: i32,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: Uuid,
    pub total_questions: i32,
    pub completed_questions: i32,
    pub correct_answers: i64,
    pub incorrect_answers: i64,
    /// Share of answered questions that were correct, 0.0..=1.0, two decimals.
    pub accuracy: f64,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub total_questions: i32,
    pub completed_questions: i32,
    pub is_completed: bool,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Lifecycle of a practice session.
///
/// Contract shared by every backing:
/// - `submit_answer` checks, in order: session exists, session not completed,
///   word belongs to the session, word not yet answered in the session.
/// - a (session, word) pair is graded at most once, even under concurrent
///   submissions, and `completed_questions` moves by exactly one per graded
///   answer.
/// - the session completes in the same step that records its last answer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, user_id: Uuid, total_questions: i32) -> Result<CreatedSession>;

    async fn submit_answer(
        &self,
        session_id: Uuid,
        word_id: Uuid,
        user_answer: &str,
    ) -> Result<AnswerOutcome>;

    async fn get_stats(&self, session_id: Uuid) -> Result<SessionStats>;

    async fn get_session(&self, session_id: Uuid) -> Result<SessionDetail>;
}

pub fn check_question_count(total_questions: i32) -> Result<()> {
    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&total_questions) {
        return Err(Error::BadRequest(format!(
            "total_questions must be between {} and {}, got {}",
            MIN_QUESTIONS, MAX_QUESTIONS, total_questions
        )));
    }
    Ok(())
}

/// Draws `total_questions` distinct active words and snapshots them.
pub async fn select_questions(
    words: &dyn WordRepository,
    total_questions: i32,
) -> Result<Vec<Question>> {
    let required = i64::from(total_questions);
    let available = words.count_active_words().await?;
    if available < required {
        return Err(Error::InsufficientWordPool {
            required,
            available,
        });
    }

    let sampled = words.sample_random_words(required).await?;
    if (sampled.len() as i64) < required {
        // pool shrank between the count and the draw
        return Err(Error::InsufficientWordPool {
            required,
            available: sampled.len() as i64,
        });
    }

    let ids: Vec<Uuid> = sampled.iter().map(|w| w.id).collect();
    let mut answers = words.find_answers_for_word_ids(&ids).await?;

    Ok(sampled
        .into_iter()
        .map(|word| {
            let answers = answers
                .remove(&word.id)
                .unwrap_or_default()
                .into_iter()
                .map(|a| a.answer)
                .collect();
            Question {
                id: word.id,
                japanese_meaning: word.japanese_meaning,
                answers,
                synonyms: word.synonyms,
            }
        })
        .collect())
}

pub fn accuracy(correct: i64, answered: i64) -> f64 {
    if answered <= 0 {
        return 0.0;
    }
    let ratio = correct as f64 / answered as f64;
    (ratio * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::word_repository::MockWordRepository;
    use crate::database::InMemoryWordRepository;
    use crate::models::word::SampledWord;

    #[test]
    fn question_count_bounds() {
        assert!(check_question_count(0).is_err());
        assert!(check_question_count(1).is_ok());
        assert!(check_question_count(50).is_ok());
        assert!(check_question_count(51).is_err());
    }

    #[test]
    fn accuracy_is_rounded_to_two_decimals() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(2, 3), 0.67);
        assert_eq!(accuracy(1, 3), 0.33);
        assert_eq!(accuracy(3, 3), 1.0);
    }

    #[tokio::test]
    async fn snapshots_carry_answers_and_synonyms() {
        let repo = InMemoryWordRepository::with_sample_vocabulary();
        let questions = select_questions(&repo, 20).await.unwrap();
        assert_eq!(questions.len(), 20);
        let run = questions
            .iter()
            .find(|q| q.japanese_meaning == "走る")
            .expect("every word is drawn");
        assert_eq!(run.answers, vec!["run", "jog"]);
        assert_eq!(run.synonyms, vec!["駆ける", "疾走する"]);
    }

    #[tokio::test]
    async fn short_pool_is_rejected_with_counts() {
        let repo = InMemoryWordRepository::with_sample_vocabulary();
        let err = select_questions(&repo, 50).await.unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientWordPool {
                required: 50,
                available: 20
            }
        ));
    }

    #[tokio::test]
    async fn short_sample_after_count_is_an_error() {
        let mut repo = MockWordRepository::new();
        repo.expect_count_active_words().returning(|| Ok(3));
        repo.expect_sample_random_words().returning(|_| {
            Ok(vec![SampledWord {
                id: Uuid::new_v4(),
                japanese_meaning: "猫".into(),
                synonyms: vec![],
            }])
        });

        let err = select_questions(&repo, 3).await.unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientWordPool {
                required: 3,
                available: 1
            }
        ));
    }
}
