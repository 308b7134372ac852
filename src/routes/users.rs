use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        session_dto::ServedResponse,
        user_dto::{HistoryQuery, LoginPayload},
    },
    error::Result,
    AppState,
};

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let served = state.user_service.login(&payload.display_name).await?;
    Ok(Json(ServedResponse::from(served)))
}

#[axum::debug_handler]
pub async fn user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let stats = state.user_service.get_user_stats(user_id).await?;
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn learning_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .user_service
        .list_history(query.user_id, query.limit, query.offset)
        .await?;
    Ok(Json(page))
}
