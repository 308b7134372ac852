use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::PgWordRepository;
use crate::error::{Error, Result};
use crate::models::session::Session;
use crate::services::grading_service::GradingService;
use crate::services::session_store::{
    accuracy, check_question_count, select_questions, AnswerOutcome, CreatedSession,
    SessionDetail, SessionStats, SessionStore,
};

#[derive(Debug, FromRow)]
struct ProgressRow {
    completed_questions: i32,
    total_questions: i32,
    is_completed: bool,
}

#[derive(Debug, FromRow)]
struct StatsRow {
    total_questions: i32,
    completed_questions: i32,
    is_completed: bool,
    correct_answers: i64,
    incorrect_answers: i64,
}

/// Durable session store.
///
/// `submit_answer` locks the session row, relies on the
/// `(session_id, word_id)` unique key of `learning_history` for at-most-once
/// grading, and derives completion from the post-increment counter inside the
/// same transaction.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
    words: PgWordRepository,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        let words = PgWordRepository::new(pool.clone());
        Self { pool, words }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, user_id: Uuid, total_questions: i32) -> Result<CreatedSession> {
        check_question_count(total_questions)?;

        let user_exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)"#)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(Error::UserNotFound(user_id));
        }

        let questions = select_questions(&self.words, total_questions).await?;

        let session_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO sessions (user_id, total_questions, questions_snapshot)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(total_questions)
        .bind(Json(&questions))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(%session_id, %user_id, total_questions, "created session");
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
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, Session>(
            r#"SELECT * FROM sessions WHERE id = $1 FOR UPDATE"#,
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(Error::SessionNotFound(session_id))?;

        if session.is_completed {
            return Err(Error::SessionAlreadyCompleted(session_id));
        }
        let question = session
            .question(word_id)
            .cloned()
            .ok_or(Error::QuestionNotInSession { session_id, word_id })?;

        let user_answer = user_answer.trim().to_string();
        let is_correct = GradingService::is_correct(&question.answers, &user_answer);

        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO learning_history (user_id, word_id, session_id, is_correct, user_answer)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT ON CONSTRAINT learning_history_session_word_key DO NOTHING
            RETURNING id
            "#,
        )
        .bind(session.user_id)
        .bind(word_id)
        .bind(session_id)
        .bind(is_correct)
        .bind(&user_answer)
        .fetch_optional(&mut *tx)
        .await?;
        if inserted.is_none() {
            return Err(Error::DuplicateAnswer { session_id, word_id });
        }

        let progress = sqlx::query_as::<_, ProgressRow>(
            r#"
            UPDATE sessions
            SET completed_questions = completed_questions + 1,
                is_completed = (completed_questions + 1 >= total_questions),
                completed_at = CASE
                    WHEN completed_questions + 1 >= total_questions THEN NOW()
                    ELSE completed_at
                END
            WHERE id = $1
            RETURNING completed_questions, total_questions, is_completed
            "#,
        )
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if progress.is_completed {
            tracing::info!(%session_id, "session completed");
        }

        Ok(AnswerOutcome {
            is_correct,
            correct_answers: question.answers,
            user_answer,
            synonyms: question.synonyms,
            completed_questions: progress.completed_questions,
            total_questions: progress.total_questions,
            is_completed: progress.is_completed,
        })
    }

    async fn get_stats(&self, session_id: Uuid) -> Result<SessionStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT s.total_questions,
                   s.completed_questions,
                   s.is_completed,
                   COUNT(h.id) FILTER (WHERE h.is_correct) AS correct_answers,
                   COUNT(h.id) FILTER (WHERE NOT h.is_correct) AS incorrect_answers
            FROM sessions s
            LEFT JOIN learning_history h ON h.session_id = s.id
            WHERE s.id = $1
            GROUP BY s.id
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::SessionNotFound(session_id))?;

        let answered = row.correct_answers + row.incorrect_answers;
        Ok(SessionStats {
            session_id,
            total_questions: row.total_questions,
            completed_questions: row.completed_questions,
            correct_answers: row.correct_answers,
            incorrect_answers: row.incorrect_answers,
            accuracy: accuracy(row.correct_answers, answered),
            is_completed: row.is_completed,
        })
    }

    async fn get_session(&self, session_id: Uuid) -> Result<SessionDetail> {
        let session = sqlx::query_as::<_, Session>(r#"SELECT * FROM sessions WHERE id = $1"#)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::SessionNotFound(session_id))?;

        Ok(SessionDetail {
            session_id: session.id,
            user_id: session.user_id,
            total_questions: session.total_questions,
            completed_questions: session.completed_questions,
            is_completed: session.is_completed,
            questions: session.questions_snapshot.0,
            created_at: session.created_at,
            completed_at: session.completed_at,
        })
    }
}
