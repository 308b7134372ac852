use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::session_dto::{CheckAnswerPayload, RandomWordsQuery, ServedResponse},
    error::Result,
    models::question::Question,
    services::fallback_session_store::Served,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct RandomWords {
    pub words: Vec<Question>,
}

#[axum::debug_handler]
pub async fn random_words(
    State(state): State<AppState>,
    Query(query): Query<RandomWordsQuery>,
) -> Result<impl IntoResponse> {
    let count = query.count.unwrap_or(state.default_question_count);
    let served = state.practice_service.random_words(count).await?;
    let served = Served {
        backing: served.backing,
        value: RandomWords {
            words: served.value,
        },
    };
    Ok(Json(ServedResponse::from(served)))
}

#[axum::debug_handler]
pub async fn get_word(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let served = state.practice_service.get_word(id).await?;
    Ok(Json(ServedResponse::from(served)))
}

#[axum::debug_handler]
pub async fn check_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckAnswerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let served = state
        .practice_service
        .check_answer(id, &payload.answer)
        .await?;
    Ok(Json(ServedResponse::from(served)))
}
