pub mod admin_words;
pub mod health;
pub mod sessions;
pub mod users;
pub mod words;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    let practice_api = Router::new()
        .route("/api/auth/login", post(users::login))
        .route("/api/sessions", post(sessions::create_session))
        .route("/api/sessions/:id", get(sessions::get_session))
        .route("/api/sessions/:id/answer", post(sessions::submit_answer))
        .route("/api/sessions/:id/stats", get(sessions::session_stats))
        .route("/api/words/random", get(words::random_words))
        .route("/api/words/:id", get(words::get_word))
        .route("/api/words/:id/check", post(words::check_answer))
        .route("/api/users/:user_id/stats", get(users::user_stats))
        .route("/api/learning-history", get(users::learning_history));

    let admin_api = Router::new()
        .route(
            "/api/admin/words",
            get(admin_words::list_words).post(admin_words::create_word),
        )
        .route(
            "/api/admin/words/:id",
            get(admin_words::get_word)
                .put(admin_words::update_word)
                .delete(admin_words::delete_word),
        )
        .route("/api/admin/words/batch", post(admin_words::batch_create_words))
        .route("/api/admin/words/import", post(admin_words::import_words_csv));

    Router::new()
        .route("/health", get(health::health))
        .merge(practice_api)
        .merge(admin_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
