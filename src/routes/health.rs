use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

/// Liveness plus a database probe. The service stays up when the probe fails
/// because session traffic can be served from memory.
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => "up",
        Err(err) => {
            tracing::warn!(error = %err, "health probe could not reach the database");
            "down"
        }
    };
    let body = json!({
        "status": "ok",
        "database": database,
    });
    (StatusCode::OK, Json(body))
}
