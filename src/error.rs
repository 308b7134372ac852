use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure classes. The HTTP layer derives its status code from these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Infrastructure,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Not enough words to build a session (required: {required}, available: {available})")]
    InsufficientWordPool { required: i64, available: i64 },

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session {0} is already completed")]
    SessionAlreadyCompleted(Uuid),

    #[error("Word {word_id} is not a question of session {session_id}")]
    QuestionNotInSession { session_id: Uuid, word_id: Uuid },

    #[error("Word {word_id} has already been answered in session {session_id}")]
    DuplicateAnswer { session_id: Uuid, word_id: Uuid },

    #[error("This meaning is already registered: {0}")]
    DuplicateWord(String),

    #[error("Word not found: {0}")]
    WordNotFound(Uuid),

    #[error("Word {0} has already been deleted")]
    WordAlreadyDeleted(Uuid),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadRequest(_) | Error::Validation(_) => ErrorKind::Validation,
            Error::UserNotFound(_)
            | Error::SessionNotFound(_)
            | Error::WordNotFound(_)
            | Error::NotFound(_) => ErrorKind::NotFound,
            Error::InsufficientWordPool { .. }
            | Error::SessionAlreadyCompleted(_)
            | Error::QuestionNotInSession { .. }
            | Error::DuplicateAnswer { .. }
            | Error::DuplicateWord(_)
            | Error::WordAlreadyDeleted(_) => ErrorKind::Conflict,
            Error::Database(err) if is_connectivity_error(err) => ErrorKind::Infrastructure,
            _ => ErrorKind::Internal,
        }
    }

    /// True when the backing store could not be reached at all, as opposed to
    /// the store rejecting the statement.
    pub fn is_infrastructure(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIGURATION_ERROR",
            Error::BadRequest(_) | Error::Validation(_) => "VALIDATION_ERROR",
            Error::InsufficientWordPool { .. } => "INSUFFICIENT_WORD_POOL",
            Error::UserNotFound(_) => "USER_NOT_FOUND",
            Error::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Error::SessionAlreadyCompleted(_) => "SESSION_ALREADY_COMPLETED",
            Error::QuestionNotInSession { .. } => "QUESTION_NOT_IN_SESSION",
            Error::DuplicateAnswer { .. } => "DUPLICATE_ANSWER",
            Error::DuplicateWord(_) => "DUPLICATE_WORD",
            Error::WordNotFound(_) => "WORD_NOT_FOUND",
            Error::WordAlreadyDeleted(_) => "WORD_ALREADY_DELETED",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Database(_) => "DATABASE_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::InsufficientWordPool {
                required,
                available,
            } => Some(json!({ "required": required, "available": available })),
            Error::QuestionNotInSession {
                session_id,
                word_id,
            }
            | Error::DuplicateAnswer {
                session_id,
                word_id,
            } => Some(json!({ "session_id": session_id, "word_id": word_id })),
            Error::UserNotFound(id)
            | Error::SessionNotFound(id)
            | Error::SessionAlreadyCompleted(id)
            | Error::WordNotFound(id)
            | Error::WordAlreadyDeleted(id) => Some(json!({ "id": id })),
            _ => None,
        }
    }
}

fn is_connectivity_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// Postgres `unique_violation`.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Infrastructure | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self.kind() {
            ErrorKind::Infrastructure => {
                tracing::error!(error = %self, "store unavailable");
                "The database is currently unavailable".to_string()
            }
            ErrorKind::Internal => {
                tracing::error!(error = ?self, "request failed");
                "An unexpected error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let mut body = json!({ "error": message, "code": self.code() });
        if let Some(details) = self.details() {
            body["details"] = details;
        }
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
