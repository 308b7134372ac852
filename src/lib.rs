pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::{InMemoryWordRepository, PgWordRepository, WordRepository};
use crate::services::{
    fallback_session_store::FallbackSessionStore, memory_session_store::InMemorySessionStore,
    pg_session_store::PgSessionStore, user_service::UserService,
    word_batch_writer::WordBatchWriter, word_practice_service::WordPracticeService,
    word_service::WordService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sessions: FallbackSessionStore,
    pub word_service: WordService,
    pub batch_writer: WordBatchWriter,
    pub practice_service: WordPracticeService,
    pub user_service: UserService,
    pub default_question_count: i32,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let pg_words: Arc<dyn WordRepository> = Arc::new(PgWordRepository::new(pool.clone()));
        // offline question source shared by sessions and free practice
        let sample_words: Arc<dyn WordRepository> =
            Arc::new(InMemoryWordRepository::with_sample_vocabulary());

        let sessions = FallbackSessionStore::new(
            Arc::new(PgSessionStore::new(pool.clone())),
            Arc::new(InMemorySessionStore::new(sample_words.clone())),
        );
        let word_service = WordService::new(pg_words.clone());
        let batch_writer = WordBatchWriter::new(pg_words.clone());
        let practice_service = WordPracticeService::new(pg_words, sample_words);
        let user_service = UserService::new(pool.clone());

        Self {
            pool,
            sessions,
            word_service,
            batch_writer,
            practice_service,
            user_service,
            default_question_count: config.default_question_count,
        }
    }
}
