use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::session_dto::{CreateSessionPayload, ServedResponse, SubmitAnswerPayload},
    error::Result,
    AppState,
};

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let total_questions = payload
        .total_questions
        .unwrap_or(state.default_question_count);
    let served = state
        .sessions
        .create(payload.user_id, total_questions)
        .await?;
    Ok((StatusCode::CREATED, Json(ServedResponse::from(served))))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let served = state.sessions.get_session(id).await?;
    Ok(Json(ServedResponse::from(served)))
}

#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAnswerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let served = state
        .sessions
        .submit_answer(id, payload.word_id, &payload.user_answer)
        .await?;
    Ok(Json(ServedResponse::from(served)))
}

#[axum::debug_handler]
pub async fn session_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let served = state.sessions.get_stats(id).await?;
    Ok(Json(ServedResponse::from(served)))
}
