use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::word_dto::{
        BatchCreateResponse, BatchCreateWordsPayload, CreateWordPayload, CsvRejectedResponse,
        DeletedWordResponse, Pagination, UpdateWordPayload, WordListQuery, WordListResponse,
        WordResponse,
    },
    error::Result,
    models::word::NewWord,
    services::{
        csv_import_service::CsvImportService,
        word_batch_writer::{BatchOutcome, BatchReport},
    },
    AppState,
};

fn batch_response(report: BatchReport) -> Response {
    let status = match report.outcome() {
        BatchOutcome::AllCreated => StatusCode::CREATED,
        BatchOutcome::Partial => StatusCode::MULTI_STATUS,
        BatchOutcome::AllFailed => StatusCode::BAD_REQUEST,
    };
    (status, Json(BatchCreateResponse::from(report))).into_response()
}

#[axum::debug_handler]
pub async fn list_words(
    State(state): State<AppState>,
    Query(query): Query<WordListQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .word_service
        .search(query.search, query.status, query.limit, query.offset)
        .await?;
    Ok(Json(WordListResponse {
        pagination: Pagination::new(page.total, page.limit, page.offset),
        items: page.items.into_iter().map(WordResponse::from).collect(),
    }))
}

#[axum::debug_handler]
pub async fn create_word(
    State(state): State<AppState>,
    Json(payload): Json<CreateWordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let word = state.word_service.create(NewWord::from(payload)).await?;
    Ok((StatusCode::CREATED, Json(WordResponse::from(word))))
}

#[axum::debug_handler]
pub async fn get_word(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let word = state.word_service.get(id).await?;
    Ok(Json(WordResponse::from(word)))
}

#[axum::debug_handler]
pub async fn update_word(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let word = state.word_service.update(id, payload.into()).await?;
    Ok(Json(WordResponse::from(word)))
}

#[axum::debug_handler]
pub async fn delete_word(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let word = state.word_service.delete(id).await?;
    Ok(Json(DeletedWordResponse::from(word)))
}

#[axum::debug_handler]
pub async fn batch_create_words(
    State(state): State<AppState>,
    Json(payload): Json<BatchCreateWordsPayload>,
) -> Result<Response> {
    payload.validate()?;
    let candidates = payload.words.into_iter().map(NewWord::from).collect();
    let report = state.batch_writer.write(candidates).await?;
    Ok(batch_response(report))
}

/// Accepts a raw `text/csv` body.
#[axum::debug_handler]
pub async fn import_words_csv(State(state): State<AppState>, body: String) -> Result<Response> {
    let parsed = match CsvImportService::parse_words(&body) {
        Ok(words) => words,
        Err(rejection) => {
            tracing::info!(errors = rejection.errors.len(), "CSV import rejected");
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(CsvRejectedResponse {
                    success: false,
                    errors: rejection.errors,
                }),
            )
                .into_response());
        }
    };

    let candidates = parsed.into_iter().map(NewWord::from).collect();
    let report = state.batch_writer.write(candidates).await?;
    Ok(batch_response(report))
}
