use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::database::WordRepository;
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::services::grading_service::GradingService;
use crate::services::session_store::{
    accuracy, check_question_count, select_questions, AnswerOutcome, CreatedSession,
    SessionDetail, SessionStats, SessionStore,
};

#[derive(Debug, Clone)]
struct RecordedAnswer {
    word_id: Uuid,
    is_correct: bool,
}

#[derive(Debug, Clone)]
struct MemorySession {
    user_id: Uuid,
    questions: Vec<Question>,
    answers: Vec<RecordedAnswer>,
    completed_questions: i32,
    is_completed: bool,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl MemorySession {
    fn total_questions(&self) -> i32 {
        self.questions.len() as i32
    }
}

/// Volatile single-process session store.
///
/// Every check-and-mutate step of `submit_answer` runs under one lock, so
/// concurrent submissions for the same question serialize and the loser sees
/// `DuplicateAnswer`. Not crash-safe: sessions vanish on restart.
pub struct InMemorySessionStore {
    words: Arc<dyn WordRepository>,
    sessions: Mutex<HashMap<Uuid, MemorySession>>,
}

impl InMemorySessionStore {
    pub fn new(words: Arc<dyn WordRepository>) -> Self {
        Self {
            words,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user_id: Uuid, total_questions: i32) -> Result<CreatedSession> {
        check_question_count(total_questions)?;
        let questions = select_questions(self.words.as_ref(), total_questions).await?;

        let session_id = Uuid::new_v4();
        self.sessions.lock().insert(
            session_id,
            MemorySession {
                user_id,
                questions: questions.clone(),
                answers: Vec::new(),
                completed_questions: 0,
                is_completed: false,
                created_at: Utc::now(),
                completed_at: None,
            },
        );

        tracing::info!(%session_id, %user_id, total_questions, "created in-memory session");
        Ok(CreatedSession {
            session_id,
            total_questions,
            questions,
        })
    }

    async fn submit_answer(
        &self,
        session_id: Uuid,
        word_id: Uuid,
        user_answer: &str,
    ) -> Result<AnswerOutcome> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&session_id)
            .ok_or(Error::SessionNotFound(session_id))?;

        if session.is_completed {
            return Err(Error::SessionAlreadyCompleted(session_id));
        }
        let question = session
            .questions
            .iter()
            .find(|q| q.id == word_id)
            .cloned()
            .ok_or(Error::QuestionNotInSession { session_id, word_id })?;
        if session.answers.iter().any(|a| a.word_id == word_id) {
            return Err(Error::DuplicateAnswer { session_id, word_id });
        }

        let user_answer = user_answer.trim().to_string();
        let is_correct = GradingService::is_correct(&question.answers, &user_answer);

        session.answers.push(RecordedAnswer {
            word_id,
            is_correct,
        });
        session.completed_questions += 1;
        if session.completed_questions >= session.total_questions() {
            session.is_completed = true;
            session.completed_at = Some(Utc::now());
            tracing::info!(%session_id, "in-memory session completed");
        }

        Ok(AnswerOutcome {
            is_correct,
            correct_answers: question.answers,
            user_answer,
            synonyms: question.synonyms,
            completed_questions: session.completed_questions,
            total_questions: session.total_questions(),
            is_completed: session.is_completed,
        })
    }

    async fn get_stats(&self, session_id: Uuid) -> Result<SessionStats> {
        let sessions = self.sessions.lock();
        let session = sessions
            .get(&session_id)
            .ok_or(Error::SessionNotFound(session_id))?;

        let correct = session.answers.iter().filter(|a| a.is_correct).count() as i64;
        let answered = session.answers.len() as i64;
        Ok(SessionStats {
            session_id,
            total_questions: session.total_questions(),
            completed_questions: session.completed_questions,
            correct_answers: correct,
            incorrect_answers: answered - correct,
            accuracy: accuracy(correct, answered),
            is_completed: session.is_completed,
        })
    }

    async fn get_session(&self, session_id: Uuid) -> Result<SessionDetail> {
        let sessions = self.sessions.lock();
        let session = sessions
            .get(&session_id)
            .ok_or(Error::SessionNotFound(session_id))?;

        Ok(SessionDetail {
            session_id,
            user_id: session.user_id,
            total_questions: session.total_questions(),
            completed_questions: session.completed_questions,
            is_completed: session.is_completed,
            questions: session.questions.clone(),
            created_at: session.created_at,
            completed_at: session.completed_at,
        })
    }
}
