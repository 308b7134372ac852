use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::services::session_store::{
    AnswerOutcome, CreatedSession, SessionDetail, SessionStats, SessionStore,
};

/// Which store produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backing {
    Database,
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Served<T> {
    pub backing: Backing,
    pub value: T,
}

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Runs `call` against `primary`; when that fails with an infrastructure
/// error, runs it once more against `fallback`. Domain errors from the
/// primary are returned as-is. The choice is made per call.
pub(crate) async fn with_fallback<'a, S, T, F>(
    operation: &'static str,
    primary: &'a S,
    fallback: &'a S,
    call: F,
) -> Result<Served<T>>
where
    S: ?Sized,
    F: Fn(&'a S) -> BoxFuture<'a, T>,
{
    match call(primary).await {
        Ok(value) => Ok(Served {
            backing: Backing::Database,
            value,
        }),
        Err(err) if err.is_infrastructure() => {
            tracing::warn!(operation, error = %err, "database unavailable, serving from memory");
            let value = call(fallback).await?;
            Ok(Served {
                backing: Backing::Memory,
                value,
            })
        }
        Err(err) => Err(err),
    }
}

/// [`with_fallback`] for calls addressing one session. A session the primary
/// does not know may have been created in the fallback during an outage, so a
/// `SessionNotFound` for that id is also retried there.
async fn with_session_fallback<'a, S, T, F>(
    operation: &'static str,
    session_id: Uuid,
    primary: &'a S,
    fallback: &'a S,
    call: F,
) -> Result<Served<T>>
where
    S: ?Sized,
    F: Fn(&'a S) -> BoxFuture<'a, T>,
{
    match call(primary).await {
        Ok(value) => Ok(Served {
            backing: Backing::Database,
            value,
        }),
        Err(Error::SessionNotFound(id)) if id == session_id => {
            let value = call(fallback).await?;
            tracing::info!(operation, %session_id, "session is held in memory");
            Ok(Served {
                backing: Backing::Memory,
                value,
            })
        }
        Err(err) if err.is_infrastructure() => {
            tracing::warn!(operation, error = %err, "database unavailable, serving from memory");
            let value = call(fallback).await?;
            Ok(Served {
                backing: Backing::Memory,
                value,
            })
        }
        Err(err) => Err(err),
    }
}

/// Session store decorator implementing the database-first policy.
#[derive(Clone)]
pub struct FallbackSessionStore {
    primary: Arc<dyn SessionStore>,
    fallback: Arc<dyn SessionStore>,
}

impl FallbackSessionStore {
    pub fn new(primary: Arc<dyn SessionStore>, fallback: Arc<dyn SessionStore>) -> Self {
        Self { primary, fallback }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        total_questions: i32,
    ) -> Result<Served<CreatedSession>> {
        with_fallback(
            "create_session",
            self.primary.as_ref(),
            self.fallback.as_ref(),
            |store| store.create(user_id, total_questions),
        )
        .await
    }

    pub async fn submit_answer(
        &self,
        session_id: Uuid,
        word_id: Uuid,
        user_answer: &str,
    ) -> Result<Served<AnswerOutcome>> {
        with_session_fallback(
            "submit_answer",
            session_id,
            self.primary.as_ref(),
            self.fallback.as_ref(),
            |store| store.submit_answer(session_id, word_id, user_answer),
        )
        .await
    }

    pub async fn get_stats(&self, session_id: Uuid) -> Result<Served<SessionStats>> {
        with_session_fallback(
            "session_stats",
            session_id,
            self.primary.as_ref(),
            self.fallback.as_ref(),
            |store| store.get_stats(session_id),
        )
        .await
    }

    pub async fn get_session(&self, session_id: Uuid) -> Result<Served<SessionDetail>> {
        with_session_fallback(
            "get_session",
            session_id,
            self.primary.as_ref(),
            self.fallback.as_ref(),
            |store| store.get_session(session_id),
        )
        .await
    }
}
